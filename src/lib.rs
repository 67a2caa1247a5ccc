//! # bikeshare-explorer
//!
//! Load US bikeshare trip records for a city, filter them by month and day
//! of week, and summarise them.
//!
//! ## Pipeline
//!
//! ```text
//!  chicago.csv / new_york_city.csv / washington.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse rows → Trip, derive month/day, apply filters
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset  │  Vec<Trip> + schema (with or without demographics)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ analysis │  time / station / duration / user statistics
//!   └──────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use bikeshare_explorer::analysis::{duration_stats, time_stats};
//! use bikeshare_explorer::config::Config;
//! use bikeshare_explorer::loader::DatasetLoader;
//!
//! let loader = DatasetLoader::new(Config::default().city_sources());
//! let dataset = loader.load_named("chicago", "june", "all")?;
//!
//! let time = time_stats(&dataset)?;
//! println!("busiest hour: {}", time.most_common_hour);
//! println!("total seconds: {}", duration_stats(&dataset)?.total_seconds);
//! # Ok::<(), bikeshare_explorer::BikeshareError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
pub mod session;

pub use error::{BikeshareError, Result};
