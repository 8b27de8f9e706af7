//! Scenario and property tests for the budget analytics engine.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{BudgetId, BudgetItemId, TagId, TransactionId, UserId};
use uuid::Uuid;

use super::comparison::{ComparisonService, partition};
use super::overview::{OverviewService, OverviewSettings, ceil_days, select_budgets};
use super::pace::SpendingPace;
use super::types::{Budget, BudgetItem, Tag, Transaction, TransactionType};

fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
}

fn tag(n: u128, name: &str) -> Tag {
    Tag {
        id: TagId::from_uuid(Uuid::from_u128(n)),
        name: name.to_string(),
        color: format!("#00000{}", n % 10),
    }
}

fn txn(amount: Decimal, primary: Option<&Tag>, occurred_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        user_id: UserId::from_uuid(Uuid::nil()),
        transaction_type: TransactionType::Expense,
        amount,
        currency: "USD".to_string(),
        description: None,
        occurred_at,
        tags: primary.into_iter().cloned().collect(),
        primary_tag: primary.cloned(),
    }
}

fn item(budget_id: BudgetId, tag: Option<&Tag>, expected: Decimal) -> BudgetItem {
    BudgetItem {
        id: BudgetItemId::new(),
        budget_id,
        tag_id: tag.map(|t| t.id),
        tag: tag.cloned(),
        expected_amount: expected,
    }
}

/// January 2026 budget in USD with the given `(tag, expected)` items.
fn january(items: &[(Option<&Tag>, Decimal)]) -> Budget {
    let id = BudgetId::new();
    Budget {
        id,
        user_id: UserId::from_uuid(Uuid::nil()),
        name: "January".to_string(),
        start_date: at(1, 1, 0),
        end_date: Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap(),
        currency: "USD".to_string(),
        items: items
            .iter()
            .map(|(tag, expected)| item(id, *tag, *expected))
            .collect(),
    }
}

mod comparison_scenarios {
    use super::*;

    #[test]
    fn test_items_and_misc_are_matched() {
        let groceries = tag(1, "Groceries");
        let budget = january(&[(Some(&groceries), dec!(200)), (None, dec!(50))]);
        let transactions = vec![
            txn(dec!(120), Some(&groceries), at(1, 5, 10)),
            txn(dec!(90), Some(&groceries), at(1, 12, 10)),
            txn(dec!(30), None, at(1, 14, 10)),
        ];

        let result = ComparisonService::compare(budget, transactions);

        let groceries_row = &result.items[0];
        assert_eq!(groceries_row.actual, dec!(210));
        assert_eq!(groceries_row.difference, dec!(10));
        assert_eq!(groceries_row.percentage, dec!(105.00));
        assert_eq!(groceries_row.transactions.len(), 2);

        let misc_row = &result.items[1];
        assert!(misc_row.item.is_misc());
        assert_eq!(misc_row.actual, dec!(30));
        assert_eq!(misc_row.difference, dec!(-20));
        assert_eq!(misc_row.percentage, dec!(60.00));

        assert_eq!(result.totals.total_expected, dec!(250));
        assert_eq!(result.totals.total_actual, dec!(240));
        assert_eq!(result.totals.total_difference, dec!(-10));
        assert!(result.alerts.is_empty());
        assert_eq!(result.dropped_untagged, None);
    }

    #[test]
    fn test_uncovered_tag_raises_alert_and_counts_in_totals() {
        let groceries = tag(1, "Groceries");
        let entertainment = tag(2, "Entertainment");
        let budget = january(&[(Some(&groceries), dec!(200)), (None, dec!(50))]);
        let transactions = vec![
            txn(dec!(120), Some(&groceries), at(1, 5, 10)),
            txn(dec!(90), Some(&groceries), at(1, 12, 10)),
            txn(dec!(30), None, at(1, 14, 10)),
            txn(dec!(40), Some(&entertainment), at(1, 15, 20)),
        ];

        let result = ComparisonService::compare(budget, transactions);

        assert_eq!(result.alerts.len(), 1);
        let alert = &result.alerts[0];
        assert_eq!(alert.tag_id, entertainment.id);
        assert_eq!(alert.tag_name, "Entertainment");
        assert_eq!(alert.transaction_count, 1);
        assert_eq!(alert.total_amount, dec!(40));

        assert_eq!(result.totals.total_actual, dec!(280));
        assert_eq!(result.totals.total_difference, dec!(30));
    }

    #[test]
    fn test_alerts_keep_first_seen_order() {
        let rent = tag(1, "Rent");
        let travel = tag(9, "Travel");
        let books = tag(3, "Books");
        let budget = january(&[(Some(&rent), dec!(1000))]);
        let transactions = vec![
            txn(dec!(5), Some(&travel), at(1, 2, 0)),
            txn(dec!(7), Some(&books), at(1, 3, 0)),
            txn(dec!(11), Some(&travel), at(1, 4, 0)),
        ];

        let result = ComparisonService::compare(budget, transactions);

        let names: Vec<&str> = result.alerts.iter().map(|a| a.tag_name.as_str()).collect();
        assert_eq!(names, ["Travel", "Books"]);
        assert_eq!(result.alerts[0].total_amount, dec!(16));
        assert_eq!(result.alerts[0].transaction_count, 2);
    }

    #[test]
    fn test_untagged_without_misc_item_is_dropped() {
        let rent = tag(1, "Rent");
        let budget = january(&[(Some(&rent), dec!(1000))]);
        let transactions = vec![
            txn(dec!(1000), Some(&rent), at(1, 1, 9)),
            txn(dec!(12.50), None, at(1, 8, 9)),
            txn(dec!(7.50), None, at(1, 9, 9)),
        ];

        let result = ComparisonService::compare(budget, transactions);

        let dropped = result.dropped_untagged.expect("untagged spend reported");
        assert_eq!(dropped.transaction_count, 2);
        assert_eq!(dropped.total_amount, dec!(20.00));
        assert_eq!(result.totals.total_actual, dec!(1000));
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_out_of_scope_transactions_ignored() {
        let groceries = tag(1, "Groceries");
        let budget = january(&[(Some(&groceries), dec!(100))]);

        let mut euro = txn(dec!(50), Some(&groceries), at(1, 10, 0));
        euro.currency = "EUR".to_string();
        let new_year_eve = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let before = txn(dec!(60), Some(&groceries), new_year_eve);
        let after = txn(dec!(70), Some(&groceries), at(2, 1, 0));
        let on_end = txn(dec!(5), Some(&groceries), budget.end_date);
        let on_start = txn(dec!(3), Some(&groceries), budget.start_date);

        let result =
            ComparisonService::compare(budget, vec![euro, before, after, on_end, on_start]);

        assert_eq!(result.items[0].actual, dec!(8));
        assert_eq!(result.items[0].transactions.len(), 2);
    }

    #[test]
    fn test_item_without_spend_reports_full_underspend() {
        let rent = tag(1, "Rent");
        let budget = january(&[(Some(&rent), dec!(800))]);

        let result = ComparisonService::compare(budget, Vec::new());

        assert_eq!(result.items[0].actual, Decimal::ZERO);
        assert_eq!(result.items[0].difference, dec!(-800));
        assert_eq!(result.items[0].percentage, Decimal::ZERO);
        assert_eq!(result.totals.total_actual, Decimal::ZERO);
    }

    #[test]
    fn test_zero_expected_with_spend_has_zero_percentage() {
        let gifts = tag(1, "Gifts");
        let unplanned = item(BudgetId::new(), Some(&gifts), Decimal::ZERO);
        let spent = vec![txn(dec!(10), Some(&gifts), at(1, 9, 12))];

        let row = ComparisonService::compare_item(&unplanned, spent);

        assert_eq!(row.expected, Decimal::ZERO);
        assert_eq!(row.actual, dec!(10));
        assert_eq!(row.difference, dec!(10));
        assert_eq!(row.percentage, Decimal::ZERO);

        let budget = january(&[(Some(&gifts), Decimal::ZERO), (None, dec!(40))]);
        let result = ComparisonService::compare(
            budget,
            vec![
                txn(dec!(10), Some(&gifts), at(1, 9, 12)),
                txn(dec!(20), None, at(1, 10, 12)),
            ],
        );

        assert_eq!(result.items[0].percentage, Decimal::ZERO);
        assert_eq!(result.items[1].percentage, dec!(50.00));
        assert_eq!(result.totals.total_actual, dec!(30));
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        let coffee = tag(1, "Coffee");
        let budget = january(&[(Some(&coffee), dec!(8))]);
        // 1.0004 / 8 = 12.505%
        let result = ComparisonService::compare(
            budget,
            vec![txn(dec!(1.0004), Some(&coffee), at(1, 3, 8))],
        );

        assert_eq!(result.items[0].percentage, dec!(12.51));

        let tiny = january(&[(Some(&coffee), dec!(3))]);
        let result =
            ComparisonService::compare(tiny, vec![txn(dec!(2), Some(&coffee), at(1, 3, 8))]);
        assert_eq!(result.items[0].percentage, dec!(66.67));
    }

    #[test]
    fn test_partition_only_uses_primary_tag() {
        let groceries = tag(1, "Groceries");
        let household = tag(2, "Household");
        let budget = january(&[(Some(&groceries), dec!(100))]);

        let mut mixed = txn(dec!(25), Some(&household), at(1, 6, 0));
        mixed.tags.push(groceries.clone());

        let parts = partition(&budget, vec![mixed]);

        assert!(parts.tagged.is_empty());
        assert_eq!(parts.alerts.len(), 1);
        assert_eq!(parts.alerts[0].tag_id, household.id);
    }
}

mod overview_scenarios {
    use super::*;

    fn misc_budget(expected: Decimal) -> Budget {
        january(&[(None, expected)])
    }

    fn spend(budget: &Budget, amounts: &[Decimal]) -> (BudgetId, Vec<Transaction>) {
        let transactions = amounts
            .iter()
            .map(|amount| txn(*amount, None, at(1, 10, 12)))
            .collect();
        (budget.id, transactions)
    }

    #[test]
    fn test_risk_bands() {
        let over = misc_budget(dec!(100));
        let nearing = misc_budget(dec!(100));
        let transactions: HashMap<_, _> = [
            spend(&over, &[dec!(60), dec!(50)]),
            spend(&nearing, &[dec!(85)]),
        ]
        .into_iter()
        .collect();
        let budgets = vec![over, nearing];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.risk_summary.over_budget, 1);
        assert_eq!(overview.risk_summary.nearing_limit, 1);
        assert_eq!(overview.risk_summary.total_active, 2);
        assert_eq!(overview.overall_health.total_expected, dec!(200));
        assert_eq!(overview.overall_health.total_actual, dec!(195));
        assert_eq!(overview.overall_health.remaining, dec!(5));
        assert_eq!(overview.overall_health.overall_percentage, dec!(97.50));
    }

    #[test]
    fn test_exact_thresholds() {
        let at_limit = misc_budget(dec!(100));
        let at_nearing = misc_budget(dec!(100));
        let below = misc_budget(dec!(100));
        let transactions: HashMap<_, _> = [
            spend(&at_limit, &[dec!(100)]),
            spend(&at_nearing, &[dec!(80)]),
            spend(&below, &[dec!(79.99)]),
        ]
        .into_iter()
        .collect();
        let budgets = vec![at_limit, at_nearing, below];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.risk_summary.nearing_limit, 2);
        assert_eq!(overview.risk_summary.over_budget, 0);
    }

    #[test]
    fn test_minority_currency_excluded() {
        let usd_a = misc_budget(dec!(100));
        let usd_b = misc_budget(dec!(300));
        let mut eur = misc_budget(dec!(1000));
        eur.currency = "EUR".to_string();

        let mut eur_spend = txn(dec!(900), None, at(1, 10, 0));
        eur_spend.currency = "EUR".to_string();
        let transactions: HashMap<_, _> = [
            spend(&usd_a, &[dec!(50)]),
            spend(&usd_b, &[dec!(150)]),
            (eur.id, vec![eur_spend]),
        ]
        .into_iter()
        .collect();
        let budgets = vec![eur, usd_a, usd_b];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.overall_health.currency.as_deref(), Some("USD"));
        assert_eq!(overview.overall_health.active_count, 2);
        assert_eq!(overview.overall_health.total_expected, dec!(400));
        assert_eq!(overview.overall_health.total_actual, dec!(200));
        assert_eq!(overview.context.total_budgets, 3);
        assert_eq!(overview.context.total_expected_all, dec!(1400));
    }

    #[test]
    fn test_currency_tie_goes_to_first_seen() {
        let mut eur = misc_budget(dec!(10));
        eur.currency = "EUR".to_string();
        let usd = misc_budget(dec!(20));
        let budgets = vec![eur, usd];

        let selection = select_budgets(&budgets, at(1, 16, 0));

        assert_eq!(selection.primary_currency.as_deref(), Some("EUR"));
        assert_eq!(selection.budgets.len(), 1);
    }

    #[test]
    fn test_no_active_budgets_yields_zeroed_payload() {
        let budgets = vec![misc_budget(dec!(100)), misc_budget(dec!(250))];

        let overview = OverviewService::build(
            &budgets,
            &HashMap::new(),
            at(3, 1, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.overall_health.active_count, 0);
        assert_eq!(overview.overall_health.total_expected, Decimal::ZERO);
        assert_eq!(overview.overall_health.currency, None);
        assert_eq!(overview.risk_summary.total_active, 0);
        assert_eq!(overview.time_context.spending_pace, None);
        assert_eq!(overview.time_context.earliest_end_date, None);
        assert!(overview.top_spenders.is_empty());
        assert_eq!(overview.context.total_budgets, 2);
        assert_eq!(overview.context.total_expected_all, dec!(350));
    }

    #[test]
    fn test_no_budgets_at_all() {
        let overview = OverviewService::build(
            &[],
            &HashMap::new(),
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview, Default::default());
    }

    #[test]
    fn test_top_spenders_ranked_and_limited() {
        let rent = tag(1, "Rent");
        let food = tag(2, "Food");
        let fuel = tag(3, "Fuel");
        let gym = tag(4, "Gym");
        let budget = january(&[(None, dec!(1000))]);
        let transactions: HashMap<_, _> = [(
            budget.id,
            vec![
                txn(dec!(10), Some(&gym), at(1, 2, 0)),
                txn(dec!(50), Some(&food), at(1, 3, 0)),
                txn(dec!(500), Some(&rent), at(1, 4, 0)),
                txn(dec!(30), Some(&fuel), at(1, 5, 0)),
                txn(dec!(25), Some(&food), at(1, 6, 0)),
                txn(dec!(20), None, at(1, 7, 0)),
            ],
        )]
        .into_iter()
        .collect();
        let budgets = vec![budget];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        let ranked: Vec<(&str, Decimal)> = overview
            .top_spenders
            .iter()
            .map(|s| (s.tag_name.as_str(), s.amount))
            .collect();
        assert_eq!(
            ranked,
            [("Rent", dec!(500)), ("Food", dec!(75)), ("Fuel", dec!(30))]
        );
        // 500 / 635
        assert_eq!(overview.top_spenders[0].percentage, dec!(78.74));
    }

    #[test]
    fn test_top_spender_ties_ordered_by_tag_id() {
        let later = tag(7, "Later");
        let earlier = tag(2, "Earlier");
        let budget = january(&[(None, dec!(100))]);
        let transactions: HashMap<_, _> = [(
            budget.id,
            vec![
                txn(dec!(10), Some(&later), at(1, 2, 0)),
                txn(dec!(10), Some(&earlier), at(1, 3, 0)),
            ],
        )]
        .into_iter()
        .collect();
        let budgets = vec![budget];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.top_spenders[0].tag_id, earlier.id);
        assert_eq!(overview.top_spenders[1].tag_id, later.id);
        assert_eq!(overview.top_spenders[0].percentage, dec!(50.00));
    }

    #[test]
    fn test_top_spenders_merge_across_budgets() {
        let food = tag(2, "Food");
        let first = january(&[(Some(&food), dec!(100))]);
        let second = january(&[(None, dec!(100))]);
        let transactions: HashMap<_, _> = [
            (first.id, vec![txn(dec!(40), Some(&food), at(1, 2, 0))]),
            (second.id, vec![txn(dec!(15), Some(&food), at(1, 3, 0))]),
        ]
        .into_iter()
        .collect();
        let budgets = vec![first, second];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.top_spenders.len(), 1);
        assert_eq!(overview.top_spenders[0].amount, dec!(55));
        assert_eq!(overview.top_spenders[0].percentage, dec!(100.00));
    }

    #[test]
    fn test_time_context_and_pace() {
        let mut budget = misc_budget(dec!(300));
        budget.end_date = at(1, 31, 0);
        let transactions: HashMap<_, _> = [spend(&budget, &[dec!(200)])].into_iter().collect();
        let budgets = vec![budget];

        // 10 of 30 days gone, two thirds spent.
        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 11, 0),
            &OverviewSettings::default(),
        );

        let time = &overview.time_context;
        assert_eq!(time.days_remaining, 20);
        assert_eq!(time.days_elapsed, 10);
        assert_eq!(time.total_days, 30);
        assert_eq!(time.earliest_end_date, Some(at(1, 31, 0)));
        assert_eq!(time.spending_pace, Some(SpendingPace::Faster));
    }

    #[test]
    fn test_days_elapsed_is_at_least_one() {
        let budget = misc_budget(dec!(100));
        let budgets = vec![budget];

        let overview = OverviewService::build(
            &budgets,
            &HashMap::new(),
            at(1, 1, 0),
            &OverviewSettings::default(),
        );

        assert_eq!(overview.time_context.days_elapsed, 1);
        assert_eq!(overview.time_context.spending_pace, Some(SpendingPace::Slower));
    }

    #[test]
    fn test_custom_thresholds() {
        let budget = misc_budget(dec!(100));
        let transactions: HashMap<_, _> = [spend(&budget, &[dec!(60)])].into_iter().collect();
        let budgets = vec![budget];
        let settings = OverviewSettings {
            nearing_limit_percent: dec!(50),
            ..OverviewSettings::default()
        };

        let overview = OverviewService::build(&budgets, &transactions, at(1, 16, 0), &settings);

        assert_eq!(overview.risk_summary.nearing_limit, 1);
    }

    #[test]
    fn test_ceil_days() {
        assert_eq!(ceil_days(TimeDelta::zero()), 0);
        assert_eq!(ceil_days(TimeDelta::days(3)), 3);
        assert_eq!(ceil_days(TimeDelta::hours(36)), 2);
        assert_eq!(ceil_days(TimeDelta::milliseconds(1)), 1);
        assert_eq!(ceil_days(TimeDelta::hours(-36)), -1);
        assert_eq!(ceil_days(TimeDelta::days(-2)), -2);
    }
}

fn arb_cents() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn prop_item_difference_is_exact(
        expected in arb_cents(),
        amounts in prop::collection::vec(arb_cents(), 0..20),
    ) {
        let groceries = tag(1, "Groceries");
        let budget = january(&[(Some(&groceries), expected)]);
        let transactions = amounts
            .iter()
            .map(|amount| txn(*amount, Some(&groceries), at(1, 10, 0)))
            .collect();

        let result = ComparisonService::compare(budget, transactions);
        let actual: Decimal = amounts.iter().copied().sum();

        prop_assert_eq!(result.items[0].actual, actual);
        prop_assert_eq!(result.items[0].difference, actual - expected);
        prop_assert!(result.items[0].percentage.scale() <= 2);
    }

    #[test]
    fn prop_every_transaction_lands_in_one_place(
        assignments in prop::collection::vec((0u128..5, arb_cents()), 0..40),
        with_misc in any::<bool>(),
    ) {
        // Tags 1 and 2 have items, 3 and 4 do not, 0 means untagged.
        let tags: Vec<Tag> = (1..5).map(|n| tag(n, "t")).collect();
        let mut items = vec![(Some(&tags[0]), dec!(100)), (Some(&tags[1]), dec!(100))];
        if with_misc {
            items.push((None, dec!(100)));
        }
        let budget = january(&items);
        let transactions: Vec<Transaction> = assignments
            .iter()
            .map(|(n, amount)| {
                let primary = (*n > 0).then(|| &tags[(*n - 1) as usize]);
                txn(*amount, primary, at(1, 10, 0))
            })
            .collect();
        let grand_total: Decimal = assignments.iter().map(|(_, amount)| *amount).sum();

        let result = ComparisonService::compare(budget, transactions);

        let in_items: usize = result.items.iter().map(|i| i.transactions.len()).sum();
        let in_alerts: usize = result.alerts.iter().map(|a| a.transaction_count).sum();
        let dropped = result.dropped_untagged.as_ref().map_or(0, |d| d.transaction_count);
        prop_assert_eq!(in_items + in_alerts + dropped, assignments.len());

        let dropped_amount = result
            .dropped_untagged
            .as_ref()
            .map_or(Decimal::ZERO, |d| d.total_amount);
        prop_assert_eq!(result.totals.total_actual + dropped_amount, grand_total);
        if with_misc {
            prop_assert!(result.dropped_untagged.is_none());
        }

        for alert in &result.alerts {
            prop_assert!(alert.tag_id == tags[2].id || alert.tag_id == tags[3].id);
        }
    }

    #[test]
    fn prop_overview_percentages_have_two_decimals(
        expected in arb_cents(),
        amounts in prop::collection::vec(arb_cents(), 1..10),
    ) {
        let food = tag(2, "Food");
        let budget = january(&[(None, expected)]);
        let transactions: HashMap<_, _> = [(
            budget.id,
            amounts.iter().map(|amount| txn(*amount, Some(&food), at(1, 10, 0))).collect(),
        )]
        .into_iter()
        .collect();
        let budgets = vec![budget];

        let overview = OverviewService::build(
            &budgets,
            &transactions,
            at(1, 16, 0),
            &OverviewSettings::default(),
        );

        prop_assert!(overview.overall_health.overall_percentage.scale() <= 2);
        prop_assert_eq!(
            overview.overall_health.remaining,
            overview.overall_health.total_expected - overview.overall_health.total_actual
        );
        for spender in &overview.top_spenders {
            prop_assert!(spender.percentage.scale() <= 2);
        }
    }
}
