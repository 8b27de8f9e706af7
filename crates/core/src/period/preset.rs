//! Period preset calculator.

use std::fmt::Display;

use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc,
};
use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// Earliest year a preset can be built for.
pub const MIN_PRESET_YEAR: i32 = 1;
/// Latest year a preset can be built for.
pub const MAX_PRESET_YEAR: i32 = 9999;

/// Kind of period a preset describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    /// A single calendar month.
    Monthly,
    /// A single calendar year.
    Yearly,
    /// An arbitrary inclusive day range.
    Custom,
}

/// Inclusive `{start, end}` instant pair.
#[derive(Debug, Clone)]
pub struct DateRange<Tz: TimeZone> {
    /// First instant of the range.
    pub start: DateTime<Tz>,
    /// Last instant of the range.
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DateRange<Tz> {
    /// Converts both bounds to UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateRange<Utc> {
        DateRange {
            start: self.start.with_timezone(&Utc),
            end: self.end.with_timezone(&Utc),
        }
    }

    /// Returns true if `at` falls within the range, bounds included.
    #[must_use]
    pub fn contains<Tz2: TimeZone>(&self, at: &DateTime<Tz2>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// A validated period preset.
///
/// Constructors reject invalid months, out-of-range years and inverted custom
/// ranges, so turning a preset into a [`DateRange`] never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodPreset {
    kind: PresetKind,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl PeriodPreset {
    /// Builds the preset for one calendar month.
    pub fn monthly(year: i32, month: u32) -> Result<Self, PeriodError> {
        check_year(year)?;
        let first_day =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidMonth(month))?;
        let last_day = last_day_of_month(first_day).ok_or(PeriodError::YearOutOfRange(year))?;

        Ok(Self {
            kind: PresetKind::Monthly,
            first_day,
            last_day,
        })
    }

    /// Builds the preset for one calendar year.
    pub fn yearly(year: i32) -> Result<Self, PeriodError> {
        check_year(year)?;
        let first_day =
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(PeriodError::YearOutOfRange(year))?;
        let last_day =
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or(PeriodError::YearOutOfRange(year))?;

        Ok(Self {
            kind: PresetKind::Yearly,
            first_day,
            last_day,
        })
    }

    /// Builds a custom preset spanning `start..=end` (whole days).
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvalidRange { start, end });
        }

        Ok(Self {
            kind: PresetKind::Custom,
            first_day: start,
            last_day: end,
        })
    }

    /// The month containing `today`.
    #[must_use]
    pub fn current_month(today: NaiveDate) -> Self {
        let first_day = today.with_day(1).unwrap_or(today);
        let last_day = last_day_of_month(first_day).unwrap_or(NaiveDate::MAX);

        Self {
            kind: PresetKind::Monthly,
            first_day,
            last_day,
        }
    }

    /// The year containing `today`.
    #[must_use]
    pub fn current_year(today: NaiveDate) -> Self {
        let first_day = today.with_ordinal(1).unwrap_or(today);
        let last_day = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(NaiveDate::MAX);

        Self {
            kind: PresetKind::Yearly,
            first_day,
            last_day,
        }
    }

    /// Kind of this preset.
    #[must_use]
    pub const fn kind(&self) -> PresetKind {
        self.kind
    }

    /// First calendar day covered.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day covered.
    #[must_use]
    pub const fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Resolves the preset to its first and last instant in `tz`.
    #[must_use]
    pub fn range_in<Tz: TimeZone>(&self, tz: &Tz) -> DateRange<Tz> {
        DateRange {
            start: start_of_day(tz, self.first_day),
            end: end_of_day(tz, self.last_day),
        }
    }

    /// Display name of the preset when resolved in `tz`.
    #[must_use]
    pub fn name_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        format_preset_name(self.kind, &self.range_in(tz))
    }
}

/// "This month" in local time.
#[must_use]
pub fn current_month_preset() -> DateRange<Local> {
    PeriodPreset::current_month(Local::now().date_naive()).range_in(&Local)
}

/// "This year" in local time.
#[must_use]
pub fn current_year_preset() -> DateRange<Local> {
    PeriodPreset::current_year(Local::now().date_naive()).range_in(&Local)
}

/// An arbitrary month in local time.
pub fn monthly_preset(year: i32, month: u32) -> Result<DateRange<Local>, PeriodError> {
    Ok(PeriodPreset::monthly(year, month)?.range_in(&Local))
}

/// An arbitrary year in local time.
pub fn yearly_preset(year: i32) -> Result<DateRange<Local>, PeriodError> {
    Ok(PeriodPreset::yearly(year)?.range_in(&Local))
}

/// Display name for a range: `"January 2026"`, `"2026"` or
/// `"Jan 5, 2026 - Feb 10, 2026"`.
#[must_use]
pub fn format_preset_name<Tz: TimeZone>(kind: PresetKind, range: &DateRange<Tz>) -> String
where
    Tz::Offset: Display,
{
    match kind {
        PresetKind::Monthly => range.start.format("%B %Y").to_string(),
        PresetKind::Yearly => range.start.format("%Y").to_string(),
        PresetKind::Custom => format!(
            "{} - {}",
            range.start.format("%b %-d, %Y"),
            range.end.format("%b %-d, %Y")
        ),
    }
}

fn check_year(year: i32) -> Result<(), PeriodError> {
    if (MIN_PRESET_YEAR..=MAX_PRESET_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(PeriodError::YearOutOfRange(year))
    }
}

fn last_day_of_month(first_day: NaiveDate) -> Option<NaiveDate> {
    first_day
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let last_instant = day
        .and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::days(1) - TimeDelta::milliseconds(1))
        .unwrap_or(NaiveDateTime::MAX);
    tz.from_local_datetime(&last_instant)
        .latest()
        .unwrap_or_else(|| tz.from_utc_datetime(&last_instant))
}
