//! Bikeshare Explorer - interactive statistics for US bikeshare trips
//!
//! A CLI tool that loads a city's trip records, filters them by month and
//! day of week, and prints travel, station, duration and rider statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, bad config, or a city file that cannot be read

use anyhow::{Context, Result};
use bikeshare_explorer::cli::Args;
use bikeshare_explorer::config::{Config, DEFAULT_CONFIG_FILE};
use bikeshare_explorer::loader::{DatasetLoader, LoadOptions};
use bikeshare_explorer::session::{Session, SessionOptions};
use std::io;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("Bikeshare Explorer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_session(&config) {
        Ok(cycles) => {
            debug!("Session finished after {} cycles", cycles);
            Ok(())
        }
        Err(e) => {
            error!("Session failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .bikeshare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the data directory, cities, and page size.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so they never interleave with prompts on stdout.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("Warning: ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Run the interactive session on stdin/stdout. Returns completed cycles.
fn run_session(config: &Config) -> Result<usize> {
    if !config.data.dir.is_dir() {
        warn!(
            "Data directory {} does not exist",
            config.data.dir.display()
        );
    }

    let loader = DatasetLoader::new(config.city_sources()).with_options(LoadOptions {
        show_progress: config.general.show_progress,
    });
    let options = SessionOptions::from(&config.display);

    let stdin = io::stdin();
    let mut session = Session::new(loader, options, stdin.lock(), io::stdout());
    session.run()
}
