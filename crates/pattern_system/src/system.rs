//! The [`System`] trait and its capability markers.

use pattern_store::EntityStore;

/// Which lifecycle hooks a system takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    /// Called once before the first tick.
    pub start: bool,
    /// Called once per tick.
    pub update: bool,
    /// Called once after the last tick.
    pub stop: bool,
}

impl Capabilities {
    /// Takes part in no phase.
    pub const NONE: Self = Self {
        start: false,
        update: false,
        stop: false,
    };

    /// Takes part in every phase.
    pub const ALL: Self = Self {
        start: true,
        update: true,
        stop: true,
    };

    /// Start phase only.
    pub const START: Self = Self::NONE.with_start();

    /// Update phase only.
    pub const UPDATE: Self = Self::NONE.with_update();

    /// Stop phase only.
    pub const STOP: Self = Self::NONE.with_stop();

    /// Adds the start phase.
    #[must_use]
    pub const fn with_start(mut self) -> Self {
        self.start = true;
        self
    }

    /// Adds the update phase.
    #[must_use]
    pub const fn with_update(mut self) -> Self {
        self.update = true;
        self
    }

    /// Adds the stop phase.
    #[must_use]
    pub const fn with_stop(mut self) -> Self {
        self.stop = true;
        self
    }
}

/// A unit of simulation logic.
///
/// Systems are stateful: any state they need between ticks lives in the
/// implementing struct. The store is lent for the duration of each hook.
pub trait System {
    /// Name used in logs and error context.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The hooks this system takes part in.
    ///
    /// Read once, when the system is handed to a
    /// [`SystemScheduler`](crate::SystemScheduler). Hooks outside this set
    /// are never called, even if implemented.
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    /// Called once before the first tick.
    fn start(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        let _ = store;
        Ok(())
    }

    /// Called once per tick.
    fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        let _ = store;
        Ok(())
    }

    /// Called once at shutdown.
    fn stop(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        let _ = store;
        Ok(())
    }
}
