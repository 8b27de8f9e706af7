//! Database seeder for Tally development and testing.
//!
//! Seeds a demo user with a handful of tags, a budget for the current month
//! and transactions spread over it, so the comparison and overview endpoints
//! have something to show.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{TimeDelta, Utc};
use rust_decimal::Decimal;
use tally_core::budget::{BudgetInput, BudgetItemInput, Tag, TransactionType};
use tally_core::period::PeriodPreset;
use tally_db::{
    BudgetRepository, CreateTransactionInput, TagRepository, TransactionRepository,
    UserRepository,
};
use tally_shared::types::UserId;

const DEMO_EMAIL: &str = "demo@tally.dev";
const DEMO_CURRENCY: &str = "USD";

/// Demo tags with their colors and planned monthly amounts (in cents).
const DEMO_TAGS: &[(&str, &str, i64)] = &[
    ("Groceries", "#22c55e", 40_000),
    ("Dining", "#f97316", 15_000),
    ("Transport", "#3b82f6", 8_000),
    ("Entertainment", "#a855f7", 0),
];

/// Planned Misc amount, in cents.
const MISC_EXPECTED: i64 = 5_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let users = UserRepository::new(&db);
    if users.email_exists(DEMO_EMAIL).await? {
        println!("  Demo user already exists, skipping...");
        return Ok(());
    }

    println!("Seeding demo user...");
    let user = users.create(DEMO_EMAIL, "Demo User").await?;
    let user_id = UserId::from_uuid(user.id);
    println!("  Created demo user {user_id} ({DEMO_EMAIL})");

    println!("Seeding tags...");
    let tags = seed_tags(&TagRepository::new(&db), user_id).await?;

    println!("Seeding budget...");
    seed_budget(&BudgetRepository::new(&db), user_id, &tags).await?;

    println!("Seeding transactions...");
    let count = seed_transactions(&TransactionRepository::new(&db), user_id, &tags).await?;
    println!("  Created {count} transactions");

    println!("Seeding complete! Send requests with X-User-Id: {user_id}");
    Ok(())
}

async fn seed_tags(repo: &TagRepository<'_>, user_id: UserId) -> anyhow::Result<Vec<Tag>> {
    let mut tags = Vec::with_capacity(DEMO_TAGS.len());
    for (name, color, _) in DEMO_TAGS {
        tags.push(repo.create_tag(user_id, name, Some(*color)).await?);
        println!("  Created tag: {name}");
    }
    Ok(tags)
}

/// Current month budget. "Entertainment" gets no item so its spend shows up
/// as an alert.
async fn seed_budget(
    repo: &BudgetRepository<'_>,
    user_id: UserId,
    tags: &[Tag],
) -> anyhow::Result<()> {
    let range = PeriodPreset::current_month(Utc::now().date_naive()).range_in(&Utc);

    let mut items: Vec<BudgetItemInput> = tags
        .iter()
        .zip(DEMO_TAGS)
        .filter(|(_, (_, _, cents))| *cents > 0)
        .map(|(tag, (_, _, cents))| BudgetItemInput {
            tag_id: Some(tag.id),
            expected_amount: Decimal::new(*cents, 2),
        })
        .collect();
    items.push(BudgetItemInput {
        tag_id: None,
        expected_amount: Decimal::new(MISC_EXPECTED, 2),
    });

    let budget = repo
        .create_budget(
            user_id,
            BudgetInput {
                name: format!("{} budget", range.start.format("%B %Y")),
                start_date: range.start,
                end_date: range.end,
                currency: DEMO_CURRENCY.to_string(),
                items,
            },
        )
        .await?;

    println!("  Created budget: {} ({} items)", budget.name, budget.items.len());
    Ok(())
}

/// Spend spread over the month so far, including one untagged purchase.
async fn seed_transactions(
    repo: &TransactionRepository<'_>,
    user_id: UserId,
    tags: &[Tag],
) -> anyhow::Result<usize> {
    let now = Utc::now();
    let start = PeriodPreset::current_month(now.date_naive())
        .range_in(&Utc)
        .start;
    let elapsed_hours = (now - start).num_hours().max(1);

    // (tag index, cents, description)
    let spend: &[(Option<usize>, i64, &str)] = &[
        (Some(0), 8_245, "Weekly groceries"),
        (Some(0), 6_310, "Farmers market"),
        (Some(1), 4_200, "Dinner out"),
        (Some(2), 2_750, "Transit pass top-up"),
        (Some(3), 1_599, "Streaming subscription"),
        (None, 1_200, "Hardware store"),
    ];

    for (i, (tag_index, cents, description)) in spend.iter().enumerate() {
        let tag_id = (*tag_index).and_then(|index| tags.get(index)).map(|tag| tag.id);
        let offset = elapsed_hours * i64::try_from(i)? / i64::try_from(spend.len())?;

        repo.create_transaction(CreateTransactionInput {
            user_id,
            transaction_type: TransactionType::Expense,
            amount: Decimal::new(*cents, 2),
            currency: DEMO_CURRENCY.to_string(),
            description: Some((*description).to_string()),
            occurred_at: start + TimeDelta::hours(offset),
            tag_ids: tag_id.into_iter().collect(),
            primary_tag_id: tag_id,
        })
        .await?;
    }

    Ok(spend.len())
}
