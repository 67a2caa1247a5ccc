//! Data models for the bikeshare explorer.
//!
//! This module contains the calendar enums, the filter selection collected
//! from the user, and the fixed-schema trip records a dataset is made of.

use crate::analysis::{DurationStats, StationStats, TimeStats, UserStats};
use crate::error::{BikeshareError, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Calendar month of a trip's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Months the datasets cover and the user may filter by.
    pub const SELECTABLE: [Month; 6] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    /// Month of a timestamp.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::ALL[timestamp.month0() as usize]
    }

    /// 1-based calendar number.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    /// Lowercase English name.
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, indexed 0 (Monday) to 6 (Sunday).
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Day of a timestamp.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::ALL[timestamp.weekday().num_days_from_monday() as usize]
    }

    /// 0-based index where Monday is 0.
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Lowercase English name.
    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Month half of a filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    /// No month filter.
    #[default]
    All,
    /// Keep only trips that started in this month.
    Only(Month),
}

impl MonthFilter {
    /// Every value a user may pick, in prompt order.
    pub fn choices() -> Vec<MonthFilter> {
        Month::SELECTABLE
            .iter()
            .copied()
            .map(MonthFilter::Only)
            .chain(std::iter::once(MonthFilter::All))
            .collect()
    }

    /// Parse a month name or "all".
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        Self::choices()
            .into_iter()
            .find(|choice| choice.to_string() == normalized)
            .ok_or_else(|| BikeshareError::InvalidFilter {
                field: "month",
                value: value.to_string(),
            })
    }

    /// Whether a trip month passes this filter.
    pub fn matches(&self, month: Month) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(wanted) => *wanted == month,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(month) => month.fmt(f),
        }
    }
}

impl Serialize for MonthFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Day half of a filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    /// No day filter.
    #[default]
    All,
    /// Keep only trips that started on this day of the week.
    Only(DayOfWeek),
}

impl DayFilter {
    /// Every value a user may pick, in prompt order.
    ///
    /// Sunday leads the list, matching how the day prompt reads.
    pub fn choices() -> Vec<DayFilter> {
        std::iter::once(DayOfWeek::Sunday)
            .chain(DayOfWeek::ALL[..6].iter().copied())
            .map(DayFilter::Only)
            .chain(std::iter::once(DayFilter::All))
            .collect()
    }

    /// Parse a weekday name or "all".
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        Self::choices()
            .into_iter()
            .find(|choice| choice.to_string() == normalized)
            .ok_or_else(|| BikeshareError::InvalidFilter {
                field: "day",
                value: value.to_string(),
            })
    }

    /// Whether a trip day passes this filter.
    pub fn matches(&self, day: DayOfWeek) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(wanted) => *wanted == day,
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(day) => day.fmt(f),
        }
    }
}

impl Serialize for DayFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The `(city, month, day)` triple one analysis cycle runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    /// Lowercase city name, a key of the configured sources.
    pub city: String,
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSelection {
    pub fn new(city: impl Into<String>, month: MonthFilter, day: DayFilter) -> Self {
        Self {
            city: city.into().to_lowercase(),
            month,
            day,
        }
    }

    /// Build a selection from free-text names.
    ///
    /// The city is only normalised here; the loader checks it against its
    /// configured sources.
    pub fn from_names(city: &str, month: &str, day: &str) -> Result<Self> {
        let city = city.trim();
        if city.is_empty() {
            return Err(BikeshareError::InvalidFilter {
                field: "city",
                value: city.to_string(),
            });
        }
        Ok(Self::new(city, MonthFilter::parse(month)?, DayFilter::parse(day)?))
    }

    /// Selection with no month or day filter.
    pub fn unfiltered(city: impl Into<String>) -> Self {
        Self::new(city, MonthFilter::All, DayFilter::All)
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city: {}, month: {}, day: {}", self.city, self.month, self.day)
    }
}

/// Column layout of a city's source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Trip columns only.
    Basic,
    /// Trip columns plus gender and birth year.
    WithDemographics,
}

impl Schema {
    pub fn has_demographics(&self) -> bool {
        matches!(self, Schema::WithDemographics)
    }
}

/// Rider profile columns, present only for demographic schemas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Demographics {
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

/// One bike trip with its derived calendar fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Trip length in whole seconds.
    pub duration_secs: u64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: Option<String>,
    /// Derived from `start_time`.
    pub month: Month,
    /// Derived from `start_time`.
    pub day: DayOfWeek,
    /// `Some` for every trip of a demographic dataset, `None` otherwise.
    pub demographics: Option<Demographics>,
}

impl Trip {
    /// Hour of day (0-23) the trip started.
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}

/// A filtered, read-only set of trips for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: String,
    schema: Schema,
    trips: Vec<Trip>,
}

impl Dataset {
    pub fn new(city: impl Into<String>, schema: Schema, trips: Vec<Trip>) -> Self {
        Self {
            city: city.into(),
            schema,
            trips,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Whether gender and birth year statistics apply to this dataset.
    pub fn has_demographics(&self) -> bool {
        self.schema.has_demographics()
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Up to `size` trips starting at `offset`; empty past the end.
    pub fn page(&self, offset: usize, size: usize) -> &[Trip] {
        let start = offset.min(self.trips.len());
        let end = offset.saturating_add(size).min(self.trips.len());
        &self.trips[start..end]
    }
}

/// Metadata about one analysis cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Filters the cycle ran with.
    pub selection: FilterSelection,
    /// Trips left after filtering.
    pub trip_count: usize,
    /// Whether the city carries gender and birth year columns.
    pub has_demographics: bool,
    /// When the statistics were computed.
    pub generated_at: DateTime<Utc>,
}

/// Every statistics group of one analysis cycle.
///
/// Groups that need at least one trip are `None` for an empty dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub time: Option<TimeStats>,
    pub stations: Option<StationStats>,
    pub duration: Option<DurationStats>,
    pub users: UserStats,
}
