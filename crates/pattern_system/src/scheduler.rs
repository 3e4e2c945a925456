//! Ordered lifecycle scheduler.
//!
//! [`SystemScheduler`] keeps the systems in registration order and, for each
//! lifecycle phase, the ordered subset of systems that take part in it. A
//! pass over a phase calls the matching hook of every system in that subset,
//! in order, and stops at the first error.

use std::fmt;

use anyhow::Context;
use pattern_store::EntityStore;
use tracing::{debug, debug_span};

use crate::system::System;

/// A lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Once, before the first tick.
    Start,
    /// Once per tick.
    Update,
    /// Once, after the last tick.
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Update => "update",
            Self::Stop => "stop",
        })
    }
}

/// Runs systems' lifecycle hooks in registration order.
///
/// The scheduler holds no simulation state of its own; passes can be
/// repeated freely (e.g. a second `start_systems` after a `stop_systems`).
pub struct SystemScheduler {
    systems: Vec<Box<dyn System>>,
    /// Indices into `systems`, per phase, in registration order.
    with_start: Vec<usize>,
    with_update: Vec<usize>,
    with_stop: Vec<usize>,
}

impl SystemScheduler {
    /// Creates a scheduler over `systems`, in the order given.
    ///
    /// Each system's capabilities are read here, once.
    #[must_use]
    pub fn new(systems: Vec<Box<dyn System>>) -> Self {
        let mut with_start = Vec::new();
        let mut with_update = Vec::new();
        let mut with_stop = Vec::new();

        for (index, system) in systems.iter().enumerate() {
            let capabilities = system.capabilities();
            if capabilities.start {
                with_start.push(index);
            }
            if capabilities.update {
                with_update.push(index);
            }
            if capabilities.stop {
                with_stop.push(index);
            }
        }

        debug!(
            systems = systems.len(),
            start = with_start.len(),
            update = with_update.len(),
            stop = with_stop.len(),
            "built system scheduler"
        );

        Self {
            systems,
            with_start,
            with_update,
            with_stop,
        }
    }

    /// Calls `start` on every system that declared it.
    ///
    /// # Errors
    ///
    /// The first hook error, with the failing system's name as context.
    /// Systems after it are not started.
    pub fn start_systems(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        self.run_phase(Phase::Start, store)
    }

    /// Calls `update` on every system that declared it. Meant to be called
    /// once per tick.
    ///
    /// # Errors
    ///
    /// The first hook error, with the failing system's name as context.
    pub fn update_systems(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        self.run_phase(Phase::Update, store)
    }

    /// Calls `stop` on every system that declared it.
    ///
    /// # Errors
    ///
    /// The first hook error, with the failing system's name as context.
    pub fn stop_systems(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        self.run_phase(Phase::Stop, store)
    }

    fn run_phase(&mut self, phase: Phase, store: &mut EntityStore) -> anyhow::Result<()> {
        let indices = match phase {
            Phase::Start => &self.with_start,
            Phase::Update => &self.with_update,
            Phase::Stop => &self.with_stop,
        };

        for &index in indices {
            let system = &mut self.systems[index];
            let span = debug_span!("system", name = system.name(), %phase);
            let _enter = span.enter();

            let result = match phase {
                Phase::Start => system.start(store),
                Phase::Update => system.update(store),
                Phase::Stop => system.stop(store),
            };
            result.with_context(|| format!("system `{}` failed during {phase}", system.name()))?;
        }
        Ok(())
    }

    /// The systems taking part in `phase`, in order.
    pub fn participants(&self, phase: Phase) -> impl Iterator<Item = &str> + '_ {
        let indices = match phase {
            Phase::Start => &self.with_start,
            Phase::Update => &self.with_update,
            Phase::Stop => &self.with_stop,
        };
        indices.iter().map(|&index| self.systems[index].name())
    }

    /// All system names in registration order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.systems.iter().map(|system| system.name())
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl fmt::Debug for SystemScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemScheduler")
            .field("systems", &self.system_names().collect::<Vec<_>>())
            .field("with_start", &self.with_start)
            .field("with_update", &self.with_update)
            .field("with_stop", &self.with_stop)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pattern_component::{define_component, entity_type};

    use super::*;
    use crate::system::Capabilities;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook call into a shared log.
    struct Recorder {
        name: &'static str,
        capabilities: Capabilities,
        log: Log,
        fail_on: Option<Phase>,
    }

    impl Recorder {
        fn boxed(name: &'static str, capabilities: Capabilities, log: &Log) -> Box<dyn System> {
            Box::new(Self {
                name,
                capabilities,
                log: Rc::clone(log),
                fail_on: None,
            })
        }

        fn record(&self, phase: Phase) -> anyhow::Result<()> {
            self.log.borrow_mut().push(format!("{}:{phase}", self.name));
            if self.fail_on == Some(phase) {
                anyhow::bail!("{} refused to {phase}", self.name);
            }
            Ok(())
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn start(&mut self, _store: &mut EntityStore) -> anyhow::Result<()> {
            self.record(Phase::Start)
        }

        fn update(&mut self, _store: &mut EntityStore) -> anyhow::Result<()> {
            self.record(Phase::Update)
        }

        fn stop(&mut self, _store: &mut EntityStore) -> anyhow::Result<()> {
            self.record(Phase::Stop)
        }
    }

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_only_updating_system_is_updated() {
        let log = new_log();
        let mut scheduler = SystemScheduler::new(vec![
            Recorder::boxed("first", Capabilities::START, &log),
            Recorder::boxed("second", Capabilities::UPDATE, &log),
            Recorder::boxed("third", Capabilities::STOP, &log),
        ]);
        let mut store = EntityStore::new();

        scheduler.update_systems(&mut store).unwrap();
        assert_eq!(*log.borrow(), vec!["second:update"]);
    }

    #[test]
    fn test_phases_follow_registration_order() {
        let log = new_log();
        let mut scheduler = SystemScheduler::new(vec![
            Recorder::boxed("a", Capabilities::ALL, &log),
            Recorder::boxed("b", Capabilities::START.with_stop(), &log),
            Recorder::boxed("c", Capabilities::ALL, &log),
        ]);
        let mut store = EntityStore::new();

        scheduler.start_systems(&mut store).unwrap();
        scheduler.update_systems(&mut store).unwrap();
        scheduler.stop_systems(&mut store).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "a:start", "b:start", "c:start", "a:update", "c:update", "a:stop", "b:stop",
                "c:stop",
            ]
        );
    }

    #[test]
    fn test_failure_stops_the_pass() {
        let log = new_log();
        let failing: Box<dyn System> = Box::new(Recorder {
            name: "broken",
            capabilities: Capabilities::ALL,
            log: Rc::clone(&log),
            fail_on: Some(Phase::Update),
        });
        let mut scheduler = SystemScheduler::new(vec![
            Recorder::boxed("before", Capabilities::UPDATE, &log),
            failing,
            Recorder::boxed("after", Capabilities::UPDATE, &log),
        ]);
        let mut store = EntityStore::new();

        let err = scheduler.update_systems(&mut store).unwrap_err();
        assert_eq!(err.to_string(), "system `broken` failed during update");
        assert_eq!(err.root_cause().to_string(), "broken refused to update");
        assert_eq!(*log.borrow(), vec!["before:update", "broken:update"]);
    }

    #[test]
    fn test_participants_and_names() {
        let log = new_log();
        let scheduler = SystemScheduler::new(vec![
            Recorder::boxed("init", Capabilities::START, &log),
            Recorder::boxed("move", Capabilities::UPDATE, &log),
            Recorder::boxed("idle", Capabilities::NONE, &log),
        ]);

        assert_eq!(scheduler.len(), 3);
        assert_eq!(
            scheduler.system_names().collect::<Vec<_>>(),
            vec!["init", "move", "idle"]
        );
        assert_eq!(scheduler.participants(Phase::Start).collect::<Vec<_>>(), vec!["init"]);
        assert_eq!(scheduler.participants(Phase::Update).collect::<Vec<_>>(), vec!["move"]);
        assert_eq!(scheduler.participants(Phase::Stop).count(), 0);
    }

    #[test]
    fn test_empty_scheduler_passes_are_noops() {
        let mut scheduler = SystemScheduler::new(Vec::new());
        let mut store = EntityStore::new();
        assert!(scheduler.is_empty());
        scheduler.start_systems(&mut store).unwrap();
        scheduler.update_systems(&mut store).unwrap();
        scheduler.stop_systems(&mut store).unwrap();
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Counter(u32);

    define_component!(Counter);

    struct Tally {
        counter: Counter,
    }

    entity_type!(Tally { counter: Counter });

    /// Counts up every tick and retires tallies that reach three.
    struct CountUp;

    impl System for CountUp {
        fn capabilities(&self) -> Capabilities {
            Capabilities::START.with_update()
        }

        fn start(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
            store.add(Tally {
                counter: Counter(0),
            });
            store.add(Tally {
                counter: Counter(1),
            });
            Ok(())
        }

        fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
            for cell in store.get_by_class::<Tally>()? {
                let mut tally = cell.borrow_mut();
                tally.counter.0 += 1;
                if tally.counter.0 >= 3 {
                    store.delete_buffer_add(cell.entity());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_systems_drive_the_store() {
        let mut scheduler = SystemScheduler::new(vec![Box::new(CountUp)]);
        let mut store = EntityStore::new();

        scheduler.start_systems(&mut store).unwrap();
        scheduler.update_systems(&mut store).unwrap();
        assert_eq!(store.delete_buffer_purge().unwrap(), 0);
        scheduler.update_systems(&mut store).unwrap();
        assert_eq!(store.delete_buffer_purge().unwrap(), 1);
        assert_eq!(store.count::<Tally>().unwrap(), 1);
    }
}
