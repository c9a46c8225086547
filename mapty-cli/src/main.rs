use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use std::path::PathBuf;

use mapty::config::Config;
use mapty::geo::Coords;
use mapty::logging::{LogTarget, init_logger, parse_level};
use mapty::session::FormValues;
use mapty::workout::WorkoutType;

mod app;
mod headless;
mod map_view;

#[derive(Parser, Debug)]
#[command(version, about = "Mapty - Workout Map Tracker CLI", long_about = None)]
struct Args {
    /// Workout store file (overrides MAPTY_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// off, error, warn, info, debug or trace (overrides MAPTY_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Activity {
    Running,
    Cycling,
}

impl From<Activity> for WorkoutType {
    fn from(a: Activity) -> Self {
        match a {
            Activity::Running => WorkoutType::Running,
            Activity::Cycling => WorkoutType::Cycling,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive map session
    Interactive {
        /// Your position as `lat,lng` (overrides MAPTY_HOME)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coords>,
    },
    /// Record a workout at a position
    Add {
        activity: Activity,
        /// Where it happened, as `lat,lng`
        #[arg(long, allow_hyphen_values = true)]
        at: Coords,
        /// Kilometres
        #[arg(long, allow_hyphen_values = true)]
        distance: String,
        /// Minutes
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
        /// Steps per minute (running)
        #[arg(long, allow_hyphen_values = true, default_value = "")]
        cadence: String,
        /// Metres gained, negative for a descent (cycling)
        #[arg(long, allow_hyphen_values = true, default_value = "")]
        elevation: String,
    },
    /// List recorded workouts
    List {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Delete every recorded workout
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(level) = args.log_level {
        config.log_level =
            parse_level(&level).ok_or_else(|| anyhow!("Unknown log level: {}", level))?;
    }

    match args.command {
        Commands::Interactive { at } => {
            if at.is_some() {
                config.home = at;
            }
            init_logger(config.log_level, LogTarget::File(config.log_file.clone()))?;

            let terminal = ratatui::init();
            let result = app::run(terminal, &config).await;
            ratatui::restore();
            result
        }
        Commands::Add {
            activity,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            init_logger(config.log_level, LogTarget::Stderr)?;
            let values = FormValues {
                workout_type: activity.into(),
                distance,
                duration,
                cadence,
                elevation,
            };
            headless::add(&config, values, at).await
        }
        Commands::List { verbose } => {
            init_logger(config.log_level, LogTarget::Stderr)?;
            headless::list(&config, verbose)
        }
        Commands::Reset => {
            init_logger(config.log_level, LogTarget::Stderr)?;
            headless::reset(&config)
        }
    }
}
