//! # pattern_system
//!
//! Systems and the scheduler that drives them.
//!
//! A [`System`] is a unit of per-tick logic with up to three lifecycle hooks:
//! `start` (once, before the first tick), `update` (once per tick) and `stop`
//! (once, at shutdown). Each system declares which hooks it takes part in
//! through [`Capabilities`]; the [`SystemScheduler`] reads that once and
//! afterwards only calls the hooks a system asked for, always in
//! registration order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pattern_store::EntityStore;
//! use pattern_system::{Capabilities, System, SystemScheduler};
//!
//! struct Gravity;
//!
//! impl System for Gravity {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::UPDATE
//!     }
//!
//!     fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
//!         // query the store and mutate entities
//!         Ok(())
//!     }
//! }
//!
//! let mut store = EntityStore::new();
//! let mut scheduler = SystemScheduler::new(vec![Box::new(Gravity)]);
//! scheduler.start_systems(&mut store)?;
//! scheduler.update_systems(&mut store)?;
//! scheduler.stop_systems(&mut store)?;
//! ```

#![warn(missing_docs)]

pub mod scheduler;
pub mod system;

pub use scheduler::{Phase, SystemScheduler};
pub use system::{Capabilities, System};
