//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.bikeshare.toml` files.

use crate::loader::{CitySource, CitySources};
use crate::models::Schema;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".bikeshare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Output settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Show a spinner while a city file is read.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            show_progress: true,
        }
    }
}

/// Where the city files live and how to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory the city files are resolved against.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// `chrono` format of the start and end time columns.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Supported cities, in prompt order.
    #[serde(default = "default_cities")]
    pub cities: Vec<CityConfig>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            timestamp_format: default_timestamp_format(),
            cities: default_cities(),
        }
    }
}

/// One supported city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Name the user types at the city prompt.
    pub name: String,

    /// CSV file, relative to `data.dir` unless absolute.
    pub file: PathBuf,

    /// Whether the file carries gender and birth year columns.
    #[serde(default = "default_true")]
    pub demographics: bool,
}

impl CityConfig {
    fn new(name: &str, file: &str, demographics: bool) -> Self {
        Self {
            name: name.to_string(),
            file: PathBuf::from(file),
            demographics,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S%.f".to_string()
}

fn default_cities() -> Vec<CityConfig> {
    vec![
        CityConfig::new("chicago", "chicago.csv", true),
        CityConfig::new("new york city", "new_york_city.csv", true),
        CityConfig::new("washington", "washington.csv", false),
    ]
}

/// Output and pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Trips shown per raw-data page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Print how long each statistics section took.
    #[serde(default = "default_true")]
    pub show_timing: bool,

    /// Console output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            show_timing: true,
            format: OutputFormat::default(),
        }
    }
}

/// Output format for statistics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable sections (default)
    #[default]
    Text,
    /// One JSON document per analysis cycle
    Json,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path. Not validated until CLI overrides are merged.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check settings that serde defaults cannot guard.
    pub fn validate(&self) -> Result<()> {
        if self.data.cities.is_empty() {
            bail!("At least one city must be configured");
        }
        if self.display.page_size == 0 {
            bail!("Page size must be at least 1");
        }
        for (i, city) in self.data.cities.iter().enumerate() {
            if city.name.trim().is_empty() {
                bail!("City #{} has an empty name", i + 1);
            }
            let name = city.name.trim().to_lowercase();
            if self.data.cities[..i]
                .iter()
                .any(|other| other.name.trim().to_lowercase() == name)
            {
                bail!("City '{}' is configured more than once", name);
            }
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }

        if let Some(page_size) = args.page_size {
            self.display.page_size = page_size;
        }

        if let Some(format) = args.format {
            self.display.format = format;
        }

        // Flags always override
        if args.no_timing {
            self.display.show_timing = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.show_progress = false;
        }
    }

    /// City sources for the loader, with paths resolved against `data.dir`.
    pub fn city_sources(&self) -> CitySources {
        let cities = self
            .data
            .cities
            .iter()
            .map(|city| {
                let schema = if city.demographics {
                    Schema::WithDemographics
                } else {
                    Schema::Basic
                };
                CitySource::new(&city.name, self.data.dir.join(&city.file), schema)
            })
            .collect();

        CitySources::new(cities, self.data.timestamp_format.clone())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
