//! Console and JSON rendering.
//!
//! This module turns statistics groups and raw trip pages into the text
//! the session prints, and serialises whole cycles as JSON.

use crate::analysis::{
    duration_stats, station_stats, time_stats, user_stats, DemographicStats, DurationStats,
    FrequencyTable, StationStats, TimeStats, UserStats,
};
use crate::error::BikeshareError;
use crate::models::{Dataset, FilterSelection, Report, ReportMetadata, Trip};
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;

/// Width of the rule printed under each section.
const RULE_WIDTH: usize = 40;

/// Title lines of the four statistics sections.
pub const TIME_TITLE: &str = "Calculating The Most Frequent Times of Travel...";
pub const STATION_TITLE: &str = "Calculating The Most Popular Stations and Trip...";
pub const DURATION_TITLE: &str = "Calculating Trip Duration...";
pub const USER_TITLE: &str = "Calculating User Stats...";

/// Horizontal rule separating sections.
pub fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Wrap a section body with its title, optional timing and a closing rule.
pub fn render_section(title: &str, body: &str, elapsed: Option<Duration>) -> String {
    let mut section = String::new();

    section.push_str(&format!("\n{}\n\n", title));
    section.push_str(body);
    if let Some(elapsed) = elapsed {
        section.push_str(&format!(
            "\nThis took {:.6} seconds.\n",
            elapsed.as_secs_f64()
        ));
    }
    section.push_str(&rule());
    section.push('\n');

    section
}

/// Body used in place of a statistics group that failed.
pub fn render_error(err: &BikeshareError) -> String {
    match err {
        BikeshareError::EmptyDataset => {
            "No trips match the selected filters; nothing to summarise.\n".to_string()
        }
        other => format!("Could not compute statistics: {}\n", other),
    }
}

/// Generate the time statistics body.
pub fn render_time_stats(stats: &TimeStats) -> String {
    let mut body = String::new();

    body.push_str(&format!("Most Common Month: {}\n", stats.most_common_month));
    body.push_str(&format!("Most Common Day: {}\n", stats.most_common_day));
    body.push_str(&format!("Most Common Hour: {}\n", stats.most_common_hour));

    body
}

/// Generate the station statistics body.
pub fn render_station_stats(stats: &StationStats) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "Most commonly used start station: {}\n",
        stats.most_common_start
    ));
    body.push_str(&format!(
        "Most commonly used end station: {}\n",
        stats.most_common_end
    ));
    body.push_str(&format!(
        "Most frequent combination of start station and end station trip: {} -> {} ({} trips)\n",
        stats.most_common_trip.start, stats.most_common_trip.end, stats.most_common_trip.count
    ));

    body
}

/// Generate the trip duration body.
pub fn render_duration_stats(stats: &DurationStats) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "Total Trip Duration: {} seconds ({})\n",
        stats.total_seconds,
        format_duration(stats.total_seconds)
    ));
    body.push_str(&format!(
        "Mean Trip Duration: {:.2} seconds ({})\n",
        stats.mean_seconds,
        format_duration(stats.mean_seconds.round() as u64)
    ));

    body
}

/// Generate the user statistics body.
pub fn render_user_stats(stats: &UserStats) -> String {
    let mut body = String::new();

    body.push_str("User Type Counts:\n");
    body.push_str(&render_counts(&stats.user_types));

    if let Some(ref demographics) = stats.demographics {
        body.push_str(&render_demographics(demographics));
    }

    body
}

fn render_demographics(stats: &DemographicStats) -> String {
    let mut body = String::new();

    body.push_str("\nGender Counts:\n");
    body.push_str(&render_counts(&stats.gender_counts));

    let year = |y: Option<i32>| y.map_or_else(|| "n/a".to_string(), |y| y.to_string());
    body.push_str(&format!("\nEarliest Year: {}\n", year(stats.earliest_year)));
    body.push_str(&format!("Most Recent Year: {}\n", year(stats.most_recent_year)));
    body.push_str(&format!(
        "Most Common Year of Birth: {}\n",
        year(stats.most_common_year)
    ));

    body
}

/// One `value  count` line per entry, highest count first.
fn render_counts(table: &FrequencyTable<String>) -> String {
    if table.is_empty() {
        return "  (no data)\n".to_string();
    }

    let sorted = table.sorted();
    let width = sorted.iter().map(|(v, _)| v.len()).max().unwrap_or(0);

    sorted
        .into_iter()
        .map(|(value, count)| format!("  {:<width$}  {}\n", value, count, width = width))
        .collect()
}

/// Render seconds as `1d 2h 3m 4s`, dropping leading zero units.
pub fn format_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let parts = [(days, "d"), (hours, "h"), (minutes, "m")];
    let mut out: Vec<String> = parts
        .iter()
        .skip_while(|(n, _)| *n == 0)
        .map(|(n, unit)| format!("{}{}", n, unit))
        .collect();
    out.push(format!("{}s", seconds));

    out.join(" ")
}

/// Render a page of raw trips as an aligned table.
///
/// Rows are numbered by their position in the filtered dataset, starting
/// at `offset`.
pub fn render_trips(trips: &[Trip], offset: usize, with_demographics: bool) -> String {
    let mut headers = vec![
        "",
        "Start Time",
        "End Time",
        "Trip Duration",
        "Start Station",
        "End Station",
        "User Type",
    ];
    if with_demographics {
        headers.extend(["Gender", "Birth Year"]);
    }
    headers.extend(["month", "day"]);

    let missing = || "-".to_string();
    let rows: Vec<Vec<String>> = trips
        .iter()
        .enumerate()
        .map(|(i, trip)| {
            let mut row = vec![
                (offset + i).to_string(),
                trip.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                trip.end_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                trip.duration_secs.to_string(),
                trip.start_station.clone(),
                trip.end_station.clone(),
                trip.user_type.clone().unwrap_or_else(missing),
            ];
            if with_demographics {
                let profile = trip.demographics.as_ref();
                row.push(
                    profile
                        .and_then(|p| p.gender.clone())
                        .unwrap_or_else(missing),
                );
                row.push(
                    profile
                        .and_then(|p| p.birth_year)
                        .map_or_else(missing, |y| y.to_string()),
                );
            }
            row.push(trip.month.number().to_string());
            row.push(trip.day.index().to_string());
            row
        })
        .collect();

    render_table(&headers, &rows)
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut table = line(headers.to_vec());
    for row in rows {
        table.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    table
}

/// Compute every statistics group for a dataset.
pub fn build_report(dataset: &Dataset, selection: &FilterSelection) -> Report {
    Report {
        metadata: ReportMetadata {
            selection: selection.clone(),
            trip_count: dataset.len(),
            has_demographics: dataset.has_demographics(),
            generated_at: Utc::now(),
        },
        time: time_stats(dataset).ok(),
        stations: station_stats(dataset).ok(),
        duration: duration_stats(dataset).ok(),
        users: user_stats(dataset),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
