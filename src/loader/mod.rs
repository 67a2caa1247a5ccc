//! Dataset loader for city trip files.
//!
//! This module reads a city's CSV source, derives the calendar fields each
//! trip is filtered and summarised on, and keeps the trips that match a
//! [`FilterSelection`].

use crate::error::{BikeshareError, Result};
use crate::models::{Dataset, DayOfWeek, Demographics, FilterSelection, Month, Schema, Trip};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Columns every city file must carry.
const TRIP_COLUMNS: [&str; 6] = [
    "Start Time",
    "End Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

/// Longest trip accepted, in seconds (one year).
const MAX_TRIP_SECONDS: f64 = 365.0 * 24.0 * 3600.0;

/// Extra columns of demographic city files.
const DEMOGRAPHIC_COLUMNS: [&str; 2] = ["Gender", "Birth Year"];

/// A supported city and the file its trips are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitySource {
    /// Lowercase city name.
    pub name: String,
    pub path: PathBuf,
    pub schema: Schema,
}

impl CitySource {
    pub fn new(name: &str, path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            path: path.into(),
            schema,
        }
    }
}

/// The city → source mapping a loader is built with.
#[derive(Debug, Clone)]
pub struct CitySources {
    cities: Vec<CitySource>,
    timestamp_format: String,
}

impl CitySources {
    pub fn new(cities: Vec<CitySource>, timestamp_format: impl Into<String>) -> Self {
        Self {
            cities,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Look up a city by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&CitySource> {
        let name = name.trim().to_lowercase();
        self.cities.iter().find(|city| city.name == name)
    }

    /// City names in configured order.
    pub fn names(&self) -> Vec<&str> {
        self.cities.iter().map(|city| city.name.as_str()).collect()
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }
}

/// Options for loading a dataset.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Whether to show a spinner while reading.
    pub show_progress: bool,
}

/// One CSV row as written in the source files.
///
/// Demographic columns are optional here; the schema check on the header
/// decides whether they must be present.
#[derive(Debug, Deserialize)]
struct TripRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: Option<String>,
    #[serde(rename = "Gender")]
    gender: Option<String>,
    #[serde(rename = "Birth Year")]
    birth_year: Option<f64>,
}

/// Loads and filters city datasets.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    sources: CitySources,
    options: LoadOptions,
}

impl DatasetLoader {
    pub fn new(sources: CitySources) -> Self {
        Self {
            sources,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sources(&self) -> &CitySources {
        &self.sources
    }

    /// Load a city's trips from free-text filter names.
    pub fn load_named(&self, city: &str, month: &str, day: &str) -> Result<Dataset> {
        self.load(&FilterSelection::from_names(city, month, day)?)
    }

    /// Load the selected city and keep the trips matching its month and day.
    pub fn load(&self, selection: &FilterSelection) -> Result<Dataset> {
        let source =
            self.sources
                .get(&selection.city)
                .ok_or_else(|| BikeshareError::InvalidFilter {
                    field: "city",
                    value: selection.city.clone(),
                })?;

        info!("Loading {} trips from {}", source.name, source.path.display());

        let unavailable = |err: csv::Error| BikeshareError::DataUnavailable {
            city: source.name.clone(),
            path: source.path.clone(),
            source: err,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&source.path)
            .map_err(unavailable)?;

        let headers = reader.headers().map_err(unavailable)?.clone();
        check_columns(&headers, source)?;

        let progress = self.progress_bar(&source.name);
        let format = self.sources.timestamp_format();
        let mut trips = Vec::new();
        let mut rows_read = 0usize;

        for (i, result) in reader.deserialize::<TripRow>().enumerate() {
            let row_no = i + 1;
            let row = result.map_err(|err| {
                if err.is_io_error() {
                    unavailable(err)
                } else {
                    malformed(&source.path, row_no, err.to_string())
                }
            })?;
            rows_read += 1;

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            let trip = build_trip(row, source, format, row_no)?;
            if selection.month.matches(trip.month) && selection.day.matches(trip.day) {
                trips.push(trip);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        debug!(
            "Read {} rows from {}, kept {} ({})",
            rows_read,
            source.path.display(),
            trips.len(),
            selection
        );

        Ok(Dataset::new(&source.name, source.schema, trips))
    }

    fn progress_bar(&self, city: &str) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} rows")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {} trips", city));
        Some(pb)
    }
}

/// Fail if the header lacks a column the city's schema needs.
fn check_columns(headers: &csv::StringRecord, source: &CitySource) -> Result<()> {
    let demographic: &[&str] = if source.schema.has_demographics() {
        &DEMOGRAPHIC_COLUMNS
    } else {
        &[]
    };

    for column in TRIP_COLUMNS.iter().chain(demographic) {
        if !headers.iter().any(|h| h == *column) {
            return Err(malformed(
                &source.path,
                0,
                format!("missing column '{}'", column),
            ));
        }
    }
    Ok(())
}

fn build_trip(row: TripRow, source: &CitySource, format: &str, row_no: usize) -> Result<Trip> {
    let start_time = parse_timestamp(&row.start_time, format)
        .map_err(|reason| malformed(&source.path, row_no, format!("start time {}", reason)))?;
    let end_time = parse_timestamp(&row.end_time, format)
        .map_err(|reason| malformed(&source.path, row_no, format!("end time {}", reason)))?;

    let duration_secs = whole_seconds(row.trip_duration).ok_or_else(|| {
        malformed(
            &source.path,
            row_no,
            format!("invalid trip duration {}", row.trip_duration),
        )
    })?;

    let demographics = source.schema.has_demographics().then(|| Demographics {
        gender: row.gender,
        birth_year: row
            .birth_year
            .filter(|year| year.is_finite())
            .map(|year| year.round() as i32),
    });

    Ok(Trip {
        month: Month::of(&start_time),
        day: DayOfWeek::of(&start_time),
        start_time,
        end_time,
        duration_secs,
        start_station: row.start_station,
        end_station: row.end_station,
        user_type: row.user_type,
        demographics,
    })
}

fn parse_timestamp(value: &str, format: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, format)
        .map_err(|e| format!("'{}' does not match '{}': {}", value, format, e))
}

/// Round a recorded duration to whole seconds.
///
/// Negative, non-finite and longer-than-a-year values are invalid.
fn whole_seconds(raw: f64) -> Option<u64> {
    if raw.is_finite() && (0.0..=MAX_TRIP_SECONDS).contains(&raw) {
        Some(raw.round() as u64)
    } else {
        None
    }
}

fn malformed(path: &Path, row: usize, reason: String) -> BikeshareError {
    BikeshareError::MalformedRecord {
        path: path.to_path_buf(),
        row,
        reason,
    }
}
