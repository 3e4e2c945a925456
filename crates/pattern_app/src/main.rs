//! # pattern_app
//!
//! Headless demo of the pattern ECS runtime. Builds a walled arena full of
//! bouncing balls and drives it with a fixed-rate tick loop.
//!
//! ## Startup Sequence
//!
//! 1. Load the config file, if one was given, and apply command-line
//!    overrides.
//! 2. Build the demo systems and hand them to the scheduler.
//! 3. Start the systems, tick until the tick limit, stop the systems.

mod bounce;
mod config;
mod tick;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pattern_system::SystemScheduler;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use tick::{TickConfig, TickLoop};

#[derive(Debug, Parser)]
#[command(name = "pattern_app", about = "Headless bouncing-balls demo for the pattern ECS runtime")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (0 = unlimited)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Target ticks per second
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Number of balls to spawn
    #[arg(short, long)]
    balls: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(ticks) = self.ticks {
            config.max_ticks = ticks;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate = tick_rate;
        }
        if let Some(balls) = self.balls {
            config.ball_count = balls;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pattern_app=info".parse()?))
        .init();

    let config = Args::parse().into_config()?;
    info!(?config, "pattern demo starting");

    let scheduler = SystemScheduler::new(bounce::systems(&config));
    let mut tick_loop = TickLoop::new(TickConfig::from(&config), scheduler);
    tick_loop.run()?;

    info!(
        ticks = tick_loop.tick_id(),
        entities = tick_loop.store().len(),
        "pattern demo shut down"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["pattern_app", "--ticks", "7", "--balls", "2"]);
        let config = args.into_config().unwrap();
        assert_eq!(config.max_ticks, 7);
        assert_eq!(config.ball_count, 2);
        assert_eq!(config.tick_rate, AppConfig::default().tick_rate);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["pattern_app", "--tick-rate", "0"]);
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_tiny_tick_rate_override_rejected() {
        let args = Args::parse_from(["pattern_app", "--tick-rate", "1e-30"]);
        assert!(args.into_config().is_err());
    }
}
