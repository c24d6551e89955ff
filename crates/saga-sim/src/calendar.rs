//! World calendar and time-of-day system.
//!
//! This module provides world time management:
//! - Fixed calendar of 12 months with 30 days each (no leap days)
//! - Hour/day/month/year rollover in both directions
//! - Season, time-of-day, and festival lookups

use serde::{Deserialize, Serialize};

use crate::subsystem::Subsystem;
use crate::weather::ClimateZone;

/// Days in every month.
pub const DAYS_PER_MONTH: u32 = 30;
/// Months in every year.
pub const MONTHS_PER_YEAR: u32 = 12;
/// Hours in a day.
pub const HOURS_PER_DAY: i64 = 24;

/// Most dates a single advance reports (ten years).
pub const MAX_ENTERED_DAYS: i64 = 3600;
/// Days in every year.
const DAYS_PER_YEAR: i64 = DAYS_PER_MONTH as i64 * MONTHS_PER_YEAR as i64;

/// Default starting hour (8:00, morning).
const DEFAULT_START_HOUR: u32 = 8;

/// Month names, indexed by `month - 1`.
const MONTH_NAMES: [&str; 12] = [
    "Deepwinter",
    "Icemelt",
    "Seedtime",
    "Rainmoon",
    "Bloomtide",
    "Highsun",
    "Goldfield",
    "Harvest",
    "Leaffall",
    "Mistmoon",
    "Frostfall",
    "Longnight",
];

/// Festival table: `(month, day, name)`. At most one festival per date.
const FESTIVALS: [(u32, u32, &str); 7] = [
    (1, 1, "Turning of the Year"),
    (3, 15, "Seedblessing"),
    (5, 20, "Bloomtide Fair"),
    (6, 30, "Midsummer Bonfires"),
    (8, 28, "Harvest Home"),
    (10, 30, "Night of Masks"),
    (12, 21, "Longnight Vigil"),
];

/// Seasons of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Season {
    /// Months 3-5
    Spring,
    /// Months 6-8
    Summer,
    /// Months 9-11
    Autumn,
    /// Months 12, 1, 2
    Winter,
}

impl Season {
    /// Season for a month (1-12).
    #[must_use]
    pub const fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    /// Get the display name of this season.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }

    /// Index into per-season tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Spring => 0,
            Self::Summer => 1,
            Self::Autumn => 2,
            Self::Winter => 3,
        }
    }
}

/// Period of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeOfDay {
    /// Early morning (5-7)
    Dawn,
    /// Morning (8-11)
    Morning,
    /// Afternoon (12-16)
    Afternoon,
    /// Evening (17-20)
    Evening,
    /// Night (21-4)
    Night,
}

impl TimeOfDay {
    /// Get period from hour.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=7 => Self::Dawn,
            8..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Get the display name of this period.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

/// Name of a month (1-12). Out-of-range months are clamped.
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    let idx = month.clamp(1, MONTHS_PER_YEAR) as usize - 1;
    MONTH_NAMES[idx]
}

/// Festival falling on the given date, if any.
#[must_use]
pub fn festival(month: u32, day: u32) -> Option<&'static str> {
    FESTIVALS
        .iter()
        .find(|(m, d, _)| *m == month && *d == day)
        .map(|(_, _, name)| *name)
}

/// Days since the epoch (year 1, month 1, day 1 is day 0).
fn day_number(date: CalendarDate) -> i64 {
    (i64::from(date.year) - 1) * DAYS_PER_YEAR
        + (i64::from(date.month) - 1) * i64::from(DAYS_PER_MONTH)
        + i64::from(date.day)
        - 1
}

fn date_from_day_number(days: i64) -> CalendarDate {
    let days = days.max(0);
    let year = i32::try_from(days / DAYS_PER_YEAR + 1).unwrap_or(i32::MAX);
    let within_year = days % DAYS_PER_YEAR;
    let month = (within_year / i64::from(DAYS_PER_MONTH)) as u32 + 1;
    let day = (within_year % i64::from(DAYS_PER_MONTH)) as u32 + 1;
    CalendarDate::new(year, month, day)
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// A calendar date without the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    /// Year (1-based)
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
    /// Day (1-30)
    pub day: u32,
}

impl CalendarDate {
    /// Creates a date.
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Season of this date.
    #[must_use]
    pub const fn season(self) -> Season {
        Season::from_month(self.month)
    }

    /// Whether this date closes a week (`day % 7 == 0`).
    #[must_use]
    pub const fn is_week_boundary(self) -> bool {
        self.day % 7 == 0
    }

    /// Whether this date opens a month.
    #[must_use]
    pub const fn is_month_start(self) -> bool {
        self.day == 1
    }
}

impl Default for CalendarDate {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {}, Year {}",
            ordinal(self.day),
            month_name(self.month),
            self.year
        )
    }
}

/// Persisted world time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeState {
    /// Year (>= 1)
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
    /// Day of month (1-30)
    pub day: u32,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Active climate zone, read by the weather generator.
    pub climate_zone: ClimateZone,
}

impl Default for TimeState {
    fn default() -> Self {
        Self {
            year: 1,
            month: 1,
            day: 1,
            hour: DEFAULT_START_HOUR,
            climate_zone: ClimateZone::default(),
        }
    }
}

impl TimeState {
    /// Create with a specific date and hour.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let mut time = Self {
            year,
            month,
            day,
            hour,
            ..Self::default()
        };
        time.normalize();
        time
    }

    /// Current date (without the hour).
    #[must_use]
    pub const fn date(&self) -> CalendarDate {
        CalendarDate::new(self.year, self.month, self.day)
    }

    /// Current season.
    #[must_use]
    pub const fn season(&self) -> Season {
        Season::from_month(self.month)
    }

    /// Current period of the day.
    #[must_use]
    pub const fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.hour)
    }

    /// Festival on the current date, if any.
    #[must_use]
    pub fn festival(&self) -> Option<&'static str> {
        festival(self.month, self.day)
    }

    /// Clamp every field into range.
    pub fn normalize(&mut self) {
        self.year = self.year.max(1);
        self.month = self.month.clamp(1, MONTHS_PER_YEAR);
        self.day = self.day.clamp(1, DAYS_PER_MONTH);
        self.hour = self.hour.min(23);
    }

    /// Advance (or rewind, for negative values) by days and hours.
    ///
    /// Returns every date entered through a forward day rollover, in order,
    /// at most [`MAX_ENTERED_DAYS`] of them: a longer jump moves the clock the
    /// whole way and reports only its final stretch. Rewinding never reports
    /// dates. Rewinding past the first hour of year 1 stops at that epoch.
    pub fn advance(&mut self, days: i64, hours: i64) -> Vec<CalendarDate> {
        self.normalize();
        let start_day = day_number(self.date());
        let start = start_day * HOURS_PER_DAY + i64::from(self.hour);
        let latest = day_number(CalendarDate::new(i32::MAX, MONTHS_PER_YEAR, DAYS_PER_MONTH))
            * HOURS_PER_DAY
            + (HOURS_PER_DAY - 1);
        let end = start
            .saturating_add(hours)
            .saturating_add(days.saturating_mul(HOURS_PER_DAY))
            .clamp(0, latest);

        let end_day = end / HOURS_PER_DAY;
        let date = date_from_day_number(end_day);
        self.year = date.year;
        self.month = date.month;
        self.day = date.day;
        self.hour = (end % HOURS_PER_DAY) as u32;

        let first = start_day + 1;
        let first_reported = first.max(end_day - MAX_ENTERED_DAYS + 1);
        if first_reported > first {
            tracing::warn!(
                "Skipping {} days of simulation in a single advance",
                first_reported - first
            );
        }
        (first_reported..=end_day).map(date_from_day_number).collect()
    }

    /// Formatted current date with time of day and festival.
    #[must_use]
    pub fn current_date(&self) -> String {
        let mut text = format!(
            "{}, {} ({})",
            self.date(),
            self.time_of_day().display_name(),
            self.season().display_name()
        );
        if let Some(name) = self.festival() {
            text.push_str(&format!(", festival: {name}"));
        }
        text
    }
}

impl Subsystem for TimeState {
    fn name(&self) -> &'static str {
        "time"
    }

    fn init(&mut self, _rng: &mut dyn saga_common::RandomSource) {
        self.normalize();
    }

    fn summary(&self) -> String {
        self.current_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_time() {
        let time = TimeState::default();
        assert_eq!(time.date(), CalendarDate::new(1, 1, 1));
        assert_eq!(time.hour, 8);
        assert_eq!(time.time_of_day(), TimeOfDay::Morning);
    }

    #[test]
    fn test_advance_hours_within_day() {
        let mut time = TimeState::at(1, 1, 1, 10);
        let entered = time.advance(0, 5);
        assert_eq!(time.hour, 15);
        assert!(entered.is_empty());
    }

    #[test]
    fn test_advance_zero_is_noop() {
        let mut time = TimeState::at(3, 4, 5, 6);
        let before = time.clone();
        assert!(time.advance(0, 0).is_empty());
        assert_eq!(time, before);
    }

    #[test]
    fn test_month_and_year_rollover() {
        let mut time = TimeState::at(1, 12, 30, 23);
        let entered = time.advance(0, 1);
        assert_eq!(time.date(), CalendarDate::new(2, 1, 1));
        assert_eq!(time.hour, 0);
        assert_eq!(entered, vec![CalendarDate::new(2, 1, 1)]);
    }

    #[test]
    fn test_multi_day_advance_reports_each_day() {
        let mut time = TimeState::at(1, 1, 28, 8);
        let entered = time.advance(3, 0);
        assert_eq!(time.date(), CalendarDate::new(1, 2, 1));
        assert_eq!(
            entered,
            vec![
                CalendarDate::new(1, 1, 29),
                CalendarDate::new(1, 1, 30),
                CalendarDate::new(1, 2, 1),
            ]
        );
    }

    #[test]
    fn test_rewind_across_year() {
        let mut time = TimeState::at(2, 1, 1, 2);
        let entered = time.advance(0, -3);
        assert!(entered.is_empty());
        assert_eq!(time.date(), CalendarDate::new(1, 12, 30));
        assert_eq!(time.hour, 23);
    }

    #[test]
    fn test_rewind_stops_at_epoch() {
        let mut time = TimeState::at(1, 1, 2, 5);
        time.advance(-10, 0);
        assert_eq!(time.date(), CalendarDate::new(1, 1, 1));
        assert_eq!(time.hour, 0);
    }

    #[test]
    fn test_huge_deltas_saturate() {
        let mut time = TimeState::default();
        let entered = time.advance(0, i64::MAX);
        assert_eq!(time.year, i32::MAX);
        assert_eq!((time.month, time.day, time.hour), (12, 30, 23));
        assert_eq!(entered.len() as i64, MAX_ENTERED_DAYS);
        assert_eq!(entered.last().copied(), Some(time.date()));

        assert!(time.advance(i64::MAX, i64::MAX).is_empty());
        assert_eq!(time.year, i32::MAX);

        assert!(time.advance(i64::MIN, i64::MIN).is_empty());
        assert_eq!(time, TimeState::at(1, 1, 1, 0));
    }

    #[test]
    fn test_day_numbers() {
        assert_eq!(day_number(CalendarDate::new(1, 1, 1)), 0);
        assert_eq!(day_number(CalendarDate::new(2, 1, 1)), 360);
        for days in [0, 29, 30, 359, 360, 1_000_000] {
            assert_eq!(day_number(date_from_day_number(days)), days);
        }
    }

    #[test]
    fn test_season_table() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(7), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }

    #[test]
    fn test_time_of_day_table() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(8), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    }

    #[test]
    fn test_festival_lookup() {
        assert_eq!(festival(6, 30), Some("Midsummer Bonfires"));
        assert_eq!(festival(6, 29), None);
    }

    #[test]
    fn test_current_date_format() {
        let time = TimeState::at(3, 10, 30, 22);
        assert_eq!(
            time.current_date(),
            "30th of Mistmoon, Year 3, Night (Autumn), festival: Night of Masks"
        );

        let plain = TimeState::at(1, 2, 2, 9);
        assert_eq!(plain.current_date(), "2nd of Icemelt, Year 1, Morning (Winter)");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
    }

    #[test]
    fn test_week_and_month_boundaries() {
        assert!(CalendarDate::new(1, 1, 14).is_week_boundary());
        assert!(!CalendarDate::new(1, 1, 15).is_week_boundary());
        assert!(CalendarDate::new(1, 2, 1).is_month_start());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(TimeState::default()).expect("serialize");
        assert_eq!(json["climateZone"], "temperate");
        assert_eq!(json["year"], 1);
    }

    proptest! {
        #[test]
        fn prop_advance_then_reverse_round_trips(
            year in 100i32..200,
            month in 1u32..=12,
            day in 1u32..=30,
            hour in 0u32..24,
            hours in -20_000i64..20_000,
        ) {
            let mut time = TimeState::at(year, month, day, hour);
            let original = time.clone();
            time.advance(0, hours);
            prop_assert!((1..=12).contains(&time.month));
            prop_assert!((1..=30).contains(&time.day));
            prop_assert!(time.hour < 24);
            time.advance(0, -hours);
            prop_assert_eq!(time, original);
        }
    }
}
