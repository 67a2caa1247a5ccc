//! Interactive analysis session.
//!
//! One cycle collects a filter selection, loads the matching trips, prints
//! the four statistics groups, offers raw pages, and asks to restart.

pub mod pager;
pub mod prompt;

use crate::analysis::{duration_stats, station_stats, time_stats, user_stats};
use crate::config::{DisplayConfig, OutputFormat};
use crate::error::BikeshareError;
use crate::loader::DatasetLoader;
use crate::models::{Dataset, DayFilter, FilterSelection, MonthFilter};
use crate::report::{self, DURATION_TITLE, STATION_TITLE, TIME_TITLE, USER_TITLE};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use pager::view_raw_data;
pub use prompt::{list_choices, validate, Prompter};

/// Display settings for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub page_size: usize,
    pub show_timing: bool,
    pub format: OutputFormat,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for SessionOptions {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            show_timing: config.show_timing,
            format: config.format,
        }
    }
}

/// Drives analysis cycles over a pair of streams.
pub struct Session<R, W> {
    loader: DatasetLoader,
    options: SessionOptions,
    prompter: Prompter<R, W>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(loader: DatasetLoader, options: SessionOptions, input: R, output: W) -> Self {
        Self {
            loader,
            options,
            prompter: Prompter::new(input, output),
        }
    }

    /// Run cycles until the user declines to restart or input ends.
    ///
    /// Returns the number of completed cycles. Load failures end the session
    /// with an error.
    pub fn run(&mut self) -> Result<usize> {
        let mut cycles = 0;

        loop {
            let Some(selection) = self.collect_filters()? else {
                info!("Input closed, ending session");
                break;
            };

            self.run_cycle(&selection)?;
            cycles += 1;

            if !self
                .prompter
                .confirm("\nWould you like to restart? Enter yes or no.")?
            {
                break;
            }
        }

        Ok(cycles)
    }

    /// Ask for city, month and day. `None` if input ends first.
    fn collect_filters(&mut self) -> Result<Option<FilterSelection>> {
        self.prompter
            .say("Hello! Let's explore some US bikeshare data!\n")?;

        let sources = self.loader.sources();
        let cities = sources.names();
        let city_question = format!(
            "Please enter one of following cities : {}",
            cities.join(", ")
        );
        let Some(city) = self.prompter.choose(&city_question, &cities, "city")? else {
            return Ok(None);
        };
        let city = city.to_string();

        let months = MonthFilter::choices();
        let month_question = format!(
            "Please enter any of the following months : {}",
            list_choices(&months)
        );
        let Some(month) = self.prompter.choose(&month_question, &months, "month")? else {
            return Ok(None);
        };

        let days = DayFilter::choices();
        let day_question = format!(
            "Please enter any of the following days : {}",
            list_choices(&days)
        );
        let Some(day) = self.prompter.choose(&day_question, &days, "day")? else {
            return Ok(None);
        };

        self.prompter.say(&format!("{}\n", report::rule()))?;

        let selection = FilterSelection::new(city, month, day);
        debug!("Selected {}", selection);
        Ok(Some(selection))
    }

    fn run_cycle(&mut self, selection: &FilterSelection) -> Result<()> {
        let dataset = self.loader.load(selection)?;
        info!("{} trips match {}", dataset.len(), selection);

        if dataset.is_empty() {
            warn!("No trips match {}", selection);
        }

        match self.options.format {
            OutputFormat::Text => self.print_text_stats(&dataset)?,
            OutputFormat::Json => {
                let report = report::build_report(&dataset, selection);
                let json = report::generate_json_report(&report)?;
                self.prompter.say(&format!("{}\n", json))?;
            }
        }

        view_raw_data(&mut self.prompter, &dataset, self.options.page_size)?;
        Ok(())
    }

    fn print_text_stats(&mut self, dataset: &Dataset) -> Result<()> {
        let (time, elapsed) = timed(|| time_stats(dataset));
        let body = body_or_error(time.as_ref().map(report::render_time_stats));
        self.print_section(TIME_TITLE, &body, elapsed)?;

        let (stations, elapsed) = timed(|| station_stats(dataset));
        let body = body_or_error(stations.as_ref().map(report::render_station_stats));
        self.print_section(STATION_TITLE, &body, elapsed)?;

        let (duration, elapsed) = timed(|| duration_stats(dataset));
        let body = body_or_error(duration.as_ref().map(report::render_duration_stats));
        self.print_section(DURATION_TITLE, &body, elapsed)?;

        let (users, elapsed) = timed(|| user_stats(dataset));
        self.print_section(USER_TITLE, &report::render_user_stats(&users), elapsed)?;

        Ok(())
    }

    fn print_section(&mut self, title: &str, body: &str, elapsed: Duration) -> Result<()> {
        let elapsed = self.options.show_timing.then_some(elapsed);
        self.prompter
            .say(&report::render_section(title, body, elapsed))?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.prompter.into_output()
    }
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

fn body_or_error(result: std::result::Result<String, &BikeshareError>) -> String {
    result.unwrap_or_else(|err| {
        debug!("Statistics skipped: {}", err);
        report::render_error(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixture_loader;
    use crate::loader::{CitySource, CitySources};
    use crate::models::Schema;
    use std::io::Cursor;

    fn session(input: &str, options: SessionOptions) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        Session::new(
            fixture_loader(),
            options,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn run(input: &str) -> (usize, String) {
        let mut s = session(input, SessionOptions::default());
        let cycles = s.run().unwrap();
        (cycles, String::from_utf8(s.into_output()).unwrap())
    }

    #[test]
    fn test_single_cycle_prints_every_section() {
        let (cycles, output) = run("chicago\njanuary\nall\nno\nno\n");

        assert_eq!(cycles, 1);
        assert!(output.contains("Hello! Let's explore some US bikeshare data!"));
        assert!(output.contains(
            "Please enter one of following cities : chicago, new york city, washington"
        ));
        assert!(output.contains(TIME_TITLE));
        assert!(output.contains(STATION_TITLE));
        assert!(output.contains(DURATION_TITLE));
        assert!(output.contains(USER_TITLE));
        assert!(output.contains("Most Common Month: january"));
        assert!(output.contains("Total Trip Duration: 2400 seconds"));
        assert!(output.contains("Gender Counts"));
        assert_eq!(output.matches("This took").count(), 4);
        assert!(output.contains("Would you like to restart?"));
    }

    #[test]
    fn test_invalid_answers_are_reprompted() {
        let (cycles, output) = run("boston\nChicago\nthermidor\nMarch\nfunday\nwednesday\nno\nno\n");

        assert_eq!(cycles, 1);
        assert!(output.contains("Please enter a valid city"));
        assert!(output.contains("Please enter a valid month"));
        assert!(output.contains("Please enter a valid day"));
        assert!(output.contains("Most Common Day: wednesday"));
    }

    #[test]
    fn test_basic_city_still_reports_timing() {
        let (_, output) = run("washington\nall\nall\nno\nno\n");

        assert!(!output.contains("Gender Counts"));
        assert_eq!(output.matches("This took").count(), 4);
    }

    #[test]
    fn test_restart_runs_another_cycle() {
        let (cycles, output) = run("washington\nall\nall\nno\nyes\nchicago\nall\nall\nno\nno\n");

        assert_eq!(cycles, 2);
        assert_eq!(output.matches("Hello! Let's explore").count(), 2);
    }

    #[test]
    fn test_raw_data_pages_within_cycle() {
        let (_, output) = run("washington\nall\nall\nyes\nno\n");

        assert!(output.contains("Jefferson Memorial"));
        assert!(output.contains("No more trip data to display."));
    }

    #[test]
    fn test_empty_selection_reports_instead_of_failing() {
        let (cycles, output) = run("chicago\njune\ntuesday\nno\n");

        assert_eq!(cycles, 1);
        assert_eq!(output.matches("No trips match the selected filters").count(), 3);
        assert!(output.contains("User Type Counts"));
        assert!(!output.contains("Would you like to view"));
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let (cycles, _) = run("");
        assert_eq!(cycles, 0);

        let (cycles, _) = run("chicago\nall\n");
        assert_eq!(cycles, 0);
    }

    #[test]
    fn test_timing_can_be_disabled() {
        let options = SessionOptions {
            show_timing: false,
            ..SessionOptions::default()
        };
        let mut s = session("chicago\nall\nall\nno\nno\n", options);
        s.run().unwrap();
        let output = String::from_utf8(s.into_output()).unwrap();

        assert!(!output.contains("This took"));
    }

    #[test]
    fn test_json_output() {
        let options = SessionOptions {
            format: OutputFormat::Json,
            ..SessionOptions::default()
        };
        let mut s = session("new york city\nall\nfriday\nno\nno\n", options);
        s.run().unwrap();
        let output = String::from_utf8(s.into_output()).unwrap();

        assert!(output.contains("\"trip_count\": 1"));
        assert!(output.contains("\"city\": \"new york city\""));
        assert!(!output.contains(TIME_TITLE));
    }

    #[test]
    fn test_missing_source_aborts_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let loader = DatasetLoader::new(CitySources::new(
            vec![CitySource::new(
                "chicago",
                dir.path().join("chicago.csv"),
                Schema::WithDemographics,
            )],
            "%Y-%m-%d %H:%M:%S",
        ));
        let mut s = Session::new(
            loader,
            SessionOptions::default(),
            Cursor::new(b"chicago\nall\nall\n".to_vec()),
            Vec::new(),
        );

        let err = s.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BikeshareError>(),
            Some(BikeshareError::DataUnavailable { .. })
        ));
    }
}
