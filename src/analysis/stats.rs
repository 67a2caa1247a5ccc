//! Descriptive statistics over a filtered dataset.
//!
//! Each function reduces a [`Dataset`] to one group of statistics. Modes
//! resolve ties to the value that appears first in the dataset.

use crate::analysis::aggregator::{mode_of, FrequencyTable};
use crate::error::{BikeshareError, Result};
use crate::models::{Dataset, DayOfWeek, Month};
use serde::Serialize;

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub most_common_month: Month,
    pub most_common_day: DayOfWeek,
    /// Hour of day, 0-23.
    pub most_common_hour: u32,
}

/// An ordered start → end station pair and how often it was ridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
    pub count: usize,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub most_common_start: String,
    pub most_common_end: String,
    pub most_common_trip: StationPair,
}

/// Total and average trip duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_seconds: u64,
    pub mean_seconds: f64,
    pub trip_count: usize,
}

/// Gender and birth year statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemographicStats {
    pub gender_counts: FrequencyTable<String>,
    pub earliest_year: Option<i32>,
    pub most_recent_year: Option<i32>,
    pub most_common_year: Option<i32>,
}

/// Rider statistics. `demographics` is set exactly when the dataset has them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_types: FrequencyTable<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<DemographicStats>,
}

/// Most common month, day of week and start hour.
pub fn time_stats(dataset: &Dataset) -> Result<TimeStats> {
    let trips = dataset.trips();

    let most_common_month =
        mode_of(trips.iter().map(|t| t.month)).ok_or(BikeshareError::EmptyDataset)?;
    let most_common_day =
        mode_of(trips.iter().map(|t| t.day)).ok_or(BikeshareError::EmptyDataset)?;
    let most_common_hour =
        mode_of(trips.iter().map(|t| t.start_hour())).ok_or(BikeshareError::EmptyDataset)?;

    Ok(TimeStats {
        most_common_month,
        most_common_day,
        most_common_hour,
    })
}

/// Most common start station, end station and start → end pair.
pub fn station_stats(dataset: &Dataset) -> Result<StationStats> {
    let trips = dataset.trips();

    let most_common_start = mode_of(trips.iter().map(|t| t.start_station.as_str()))
        .ok_or(BikeshareError::EmptyDataset)?;
    let most_common_end = mode_of(trips.iter().map(|t| t.end_station.as_str()))
        .ok_or(BikeshareError::EmptyDataset)?;

    let pairs: FrequencyTable<(&str, &str)> = trips
        .iter()
        .map(|t| (t.start_station.as_str(), t.end_station.as_str()))
        .collect();
    let (&(start, end), count) = pairs.mode().ok_or(BikeshareError::EmptyDataset)?;

    Ok(StationStats {
        most_common_start: most_common_start.to_string(),
        most_common_end: most_common_end.to_string(),
        most_common_trip: StationPair {
            start: start.to_string(),
            end: end.to_string(),
            count,
        },
    })
}

/// Total and mean trip duration in seconds.
pub fn duration_stats(dataset: &Dataset) -> Result<DurationStats> {
    if dataset.is_empty() {
        return Err(BikeshareError::EmptyDataset);
    }

    let trip_count = dataset.len();
    let total_seconds = dataset
        .trips()
        .iter()
        .try_fold(0u64, |total, t| total.checked_add(t.duration_secs))
        .ok_or(BikeshareError::DurationOverflow { trips: trip_count })?;

    Ok(DurationStats {
        total_seconds,
        mean_seconds: total_seconds as f64 / trip_count as f64,
        trip_count,
    })
}

/// User type counts, plus gender and birth year for demographic datasets.
pub fn user_stats(dataset: &Dataset) -> UserStats {
    let trips = dataset.trips();

    let user_types = trips.iter().filter_map(|t| t.user_type.clone()).collect();

    let demographics = dataset.has_demographics().then(|| {
        let profiles = || trips.iter().filter_map(|t| t.demographics.as_ref());
        let years = || profiles().filter_map(|p| p.birth_year);

        DemographicStats {
            gender_counts: profiles().filter_map(|p| p.gender.clone()).collect(),
            earliest_year: years().min(),
            most_recent_year: years().max(),
            most_common_year: mode_of(years()),
        }
    });

    UserStats {
        user_types,
        demographics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixture_loader;
    use crate::models::{Demographics, Schema, Trip};
    use chrono::NaiveDateTime;

    fn trip(start: &str, from: &str, to: &str, duration_secs: u64) -> Trip {
        let start_time = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").unwrap();
        Trip {
            start_time,
            end_time: start_time + chrono::Duration::seconds(duration_secs as i64),
            duration_secs,
            start_station: from.to_string(),
            end_station: to.to_string(),
            user_type: Some("Subscriber".to_string()),
            month: Month::of(&start_time),
            day: DayOfWeek::of(&start_time),
            demographics: None,
        }
    }

    fn basic(trips: Vec<Trip>) -> Dataset {
        Dataset::new("washington", Schema::Basic, trips)
    }

    #[test]
    fn test_most_common_month() {
        // months 1, 1, 2, 3
        let dataset = basic(vec![
            trip("2017-01-02 08:00:00", "A", "B", 60),
            trip("2017-01-10 09:00:00", "A", "B", 60),
            trip("2017-02-01 09:00:00", "A", "B", 60),
            trip("2017-03-01 10:00:00", "A", "B", 60),
        ]);

        let stats = time_stats(&dataset).unwrap();
        assert_eq!(stats.most_common_month, Month::January);
        assert_eq!(stats.most_common_month.name(), "january");
        assert_eq!(stats.most_common_hour, 9);
    }

    #[test]
    fn test_most_common_day() {
        // days 0, 0, 1: two Mondays and a Tuesday
        let dataset = basic(vec![
            trip("2017-01-02 08:00:00", "A", "B", 60),
            trip("2017-01-09 08:00:00", "A", "B", 60),
            trip("2017-01-03 08:00:00", "A", "B", 60),
        ]);

        let stats = time_stats(&dataset).unwrap();
        assert_eq!(stats.most_common_day, DayOfWeek::Monday);
        assert_eq!(stats.most_common_day.name(), "monday");
    }

    #[test]
    fn test_most_common_pair() {
        let dataset = basic(vec![
            trip("2017-01-02 08:00:00", "A", "B", 60),
            trip("2017-01-02 09:00:00", "A", "B", 60),
            trip("2017-01-02 10:00:00", "A", "C", 60),
        ]);

        let stats = station_stats(&dataset).unwrap();
        assert_eq!(stats.most_common_start, "A");
        assert_eq!(stats.most_common_end, "B");
        assert_eq!(
            stats.most_common_trip,
            StationPair {
                start: "A".to_string(),
                end: "B".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn test_pair_is_ordered() {
        let dataset = basic(vec![
            trip("2017-01-02 08:00:00", "A", "B", 60),
            trip("2017-01-02 09:00:00", "B", "A", 60),
            trip("2017-01-02 10:00:00", "B", "A", 60),
        ]);

        let stats = station_stats(&dataset).unwrap();
        assert_eq!(stats.most_common_trip.start, "B");
        assert_eq!(stats.most_common_trip.end, "A");
        assert_eq!(stats.most_common_trip.count, 2);
    }

    #[test]
    fn test_duration_total_and_mean() {
        let dataset = basic(vec![
            trip("2017-01-02 08:00:00", "A", "B", 100),
            trip("2017-01-02 09:00:00", "A", "B", 200),
            trip("2017-01-02 10:00:00", "A", "B", 300),
        ]);

        let stats = duration_stats(&dataset).unwrap();
        assert_eq!(stats.total_seconds, 600);
        assert_eq!(stats.mean_seconds, 200.0);
        assert_eq!(stats.trip_count, 3);
    }

    #[test]
    fn test_duration_total_overflow_is_an_error() {
        let mut trips = vec![
            trip("2017-01-02 08:00:00", "A", "B", 0),
            trip("2017-01-02 09:00:00", "A", "B", 0),
        ];
        for t in &mut trips {
            t.duration_secs = u64::MAX / 2 + 1;
        }

        assert!(matches!(
            duration_stats(&basic(trips)),
            Err(BikeshareError::DurationOverflow { trips: 2 })
        ));
    }

    #[test]
    fn test_empty_dataset_is_reported() {
        let dataset = basic(Vec::new());

        assert!(matches!(
            duration_stats(&dataset),
            Err(BikeshareError::EmptyDataset)
        ));
        assert!(matches!(
            time_stats(&dataset),
            Err(BikeshareError::EmptyDataset)
        ));
        assert!(matches!(
            station_stats(&dataset),
            Err(BikeshareError::EmptyDataset)
        ));

        let users = user_stats(&dataset);
        assert!(users.user_types.is_empty());
        assert!(users.demographics.is_none());
    }

    #[test]
    fn test_user_stats_without_demographics() {
        let mut customer = trip("2017-01-02 08:00:00", "A", "B", 60);
        customer.user_type = Some("Customer".to_string());
        let mut unknown = trip("2017-01-02 09:00:00", "A", "B", 60);
        unknown.user_type = None;
        let dataset = basic(vec![
            trip("2017-01-02 07:00:00", "A", "B", 60),
            customer,
            unknown,
        ]);

        let stats = user_stats(&dataset);
        assert!(stats.demographics.is_none());
        assert_eq!(stats.user_types.count(&"Subscriber".to_string()), 1);
        assert_eq!(stats.user_types.count(&"Customer".to_string()), 1);
        assert_eq!(stats.user_types.total(), 2);
    }

    #[test]
    fn test_user_stats_with_demographics() {
        let profiled = |gender: Option<&str>, year: Option<i32>| {
            let mut t = trip("2017-01-02 08:00:00", "A", "B", 60);
            t.demographics = Some(Demographics {
                gender: gender.map(String::from),
                birth_year: year,
            });
            t
        };
        let dataset = Dataset::new(
            "chicago",
            Schema::WithDemographics,
            vec![
                profiled(Some("Male"), Some(1990)),
                profiled(Some("Female"), Some(1975)),
                profiled(None, None),
                profiled(Some("Male"), Some(1990)),
                profiled(Some("Male"), Some(2001)),
            ],
        );

        let demographics = user_stats(&dataset).demographics.unwrap();
        assert_eq!(demographics.gender_counts.count(&"Male".to_string()), 3);
        assert_eq!(demographics.gender_counts.count(&"Female".to_string()), 1);
        assert_eq!(demographics.earliest_year, Some(1975));
        assert_eq!(demographics.most_recent_year, Some(2001));
        assert_eq!(demographics.most_common_year, Some(1990));
    }

    #[test]
    fn test_demographics_present_even_without_years() {
        let mut t = trip("2017-01-02 08:00:00", "A", "B", 60);
        t.demographics = Some(Demographics::default());
        let dataset = Dataset::new("chicago", Schema::WithDemographics, vec![t]);

        let demographics = user_stats(&dataset).demographics.unwrap();
        assert!(demographics.gender_counts.is_empty());
        assert_eq!(demographics.earliest_year, None);
        assert_eq!(demographics.most_common_year, None);
    }

    #[test]
    fn test_fixture_city_statistics() {
        let dataset = fixture_loader().load_named("chicago", "all", "all").unwrap();

        let time = time_stats(&dataset).unwrap();
        assert_eq!(time.most_common_month, Month::January);
        assert_eq!(time.most_common_day, DayOfWeek::Monday);
        assert_eq!(time.most_common_hour, 8);

        let stations = station_stats(&dataset).unwrap();
        assert_eq!(stations.most_common_start, "Clark St");
        assert_eq!(stations.most_common_end, "Canal St");
        assert_eq!(stations.most_common_trip.count, 3);

        let duration = duration_stats(&dataset).unwrap();
        assert_eq!(duration.total_seconds, 7800);
        assert_eq!(duration.mean_seconds, 975.0);

        let users = user_stats(&dataset);
        let sorted = users.user_types.sorted();
        assert_eq!(sorted[0], (&"Subscriber".to_string(), 5));
        let demographics = users.demographics.unwrap();
        assert_eq!(demographics.gender_counts.count(&"Male".to_string()), 4);
        assert_eq!(demographics.earliest_year, Some(1975));
        assert_eq!(demographics.most_recent_year, Some(2000));
        assert_eq!(demographics.most_common_year, Some(1985));
    }

    #[test]
    fn test_demographics_follow_city_capability() {
        let loader = fixture_loader();
        for city in ["chicago", "new york city"] {
            let dataset = loader.load_named(city, "all", "all").unwrap();
            assert!(user_stats(&dataset).demographics.is_some(), "{city}");
        }
        let washington = loader.load_named("washington", "all", "all").unwrap();
        assert!(user_stats(&washington).demographics.is_none());
    }

    #[test]
    fn test_unfiltered_pipeline_is_repeatable() {
        let loader = fixture_loader();
        let run = || {
            let dataset = loader.load_named("new york city", "all", "all").unwrap();
            (
                time_stats(&dataset).unwrap(),
                station_stats(&dataset).unwrap(),
                duration_stats(&dataset).unwrap(),
                user_stats(&dataset),
            )
        };
        assert_eq!(run(), run());
    }
}
