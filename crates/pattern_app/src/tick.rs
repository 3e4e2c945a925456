//! Fixed-rate tick loop.
//!
//! Each tick runs every updating system once, then purges the delete buffer,
//! so entities queued during a tick disappear before the next one starts.
//! Systems are started once before the first tick and stopped once after the
//! last.

use std::time::{Duration, Instant};

use anyhow::Context;
use pattern_store::EntityStore;
use pattern_system::SystemScheduler;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

impl From<&AppConfig> for TickConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            tick_rate: config.tick_rate,
            max_ticks: config.max_ticks,
        }
    }
}

/// Owns the world and drives the systems.
#[derive(Debug)]
pub struct TickLoop {
    /// Ticks completed so far.
    tick_id: u64,
    config: TickConfig,
    store: EntityStore,
    scheduler: SystemScheduler,
}

impl TickLoop {
    /// Creates a loop over an empty store. Nothing runs until
    /// [`TickLoop::start`] or [`TickLoop::run`].
    #[must_use]
    pub fn new(config: TickConfig, scheduler: SystemScheduler) -> Self {
        Self {
            tick_id: 0,
            config,
            store: EntityStore::new(),
            scheduler,
        }
    }

    /// Number of ticks completed so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The world the systems operate on.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Runs every system's `start` hook.
    ///
    /// # Errors
    ///
    /// The first failing system.
    pub fn start(&mut self) -> anyhow::Result<()> {
        self.scheduler.start_systems(&mut self.store)
    }

    /// Runs a single tick: one update pass, then the deferred deletions.
    ///
    /// # Errors
    ///
    /// The first failing system, or a queued entity that could not be
    /// removed.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        self.tick_id += 1;

        self.scheduler
            .update_systems(&mut self.store)
            .with_context(|| format!("tick {} failed", self.tick_id))?;
        let purged = self
            .store
            .delete_buffer_purge()
            .with_context(|| format!("purge after tick {} failed", self.tick_id))?;

        debug!(
            tick_id = self.tick_id,
            purged,
            entities = self.store.len(),
            "tick complete"
        );
        Ok(())
    }

    /// Runs every system's `stop` hook.
    ///
    /// # Errors
    ///
    /// The first failing system.
    pub fn stop(&mut self) -> anyhow::Result<()> {
        self.scheduler.stop_systems(&mut self.store)
    }

    /// Starts the systems, runs ticks for the configured count (or forever),
    /// then stops them.
    ///
    /// Sleeps out the rest of each tick's budget and warns about ticks that
    /// run over it.
    ///
    /// # Errors
    ///
    /// A tick rate with no representable tick duration, or the first error
    /// from starting, ticking or stopping. Systems are not stopped when a
    /// tick fails.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let tick_duration = Duration::try_from_secs_f64(1.0 / self.config.tick_rate)
            .with_context(|| format!("invalid tick rate {}", self.config.tick_rate))?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        self.start()?;
        loop {
            let start = Instant::now();

            self.tick()?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        self.stop()
    }
}
