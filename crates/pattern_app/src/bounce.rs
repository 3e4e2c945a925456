//! Headless demo world: balls bouncing inside a walled arena.
//!
//! Every bounce leaves a short-lived [`BounceEvent`], which the spark system
//! turns into a burst of [`Spark`]s. Sparks age each tick and are queued for
//! deletion when their lifetime runs out, so the world exercises every store
//! operation: typed and component queries, in-place edits, spawning, direct
//! registration of prototypes and deferred deletion.

use glam::Vec2;
use pattern_component::{ConstructionError, ensure_in_domain};
use pattern_store::{EntityStore, define_component, entity_type};
use pattern_system::{Capabilities, System};
use tracing::{debug, info};

use crate::config::AppConfig;

// -- components --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Units per second.
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    pub remaining_ticks: u32,
}

/// Which arena wall something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub side: Side,
}

define_component!(Position, Motion, Lifetime, Tag);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// Builds a side from its wire index (0..=3).
    ///
    /// # Errors
    ///
    /// [`ConstructionError::OutOfDomain`] for any other index.
    pub fn from_index(index: u8) -> Result<Self, ConstructionError> {
        let index = ensure_in_domain("Tag", "side", index, &[0, 1, 2, 3])?;
        Ok(Self::ALL[usize::from(index)])
    }

    /// Unit vector pointing from this wall into the arena.
    #[must_use]
    pub fn normal(self) -> Vec2 {
        match self {
            Self::Left => Vec2::X,
            Self::Right => Vec2::NEG_X,
            Self::Top => Vec2::Y,
            Self::Bottom => Vec2::NEG_Y,
        }
    }

    /// Clamps `position` to the wall at `wall` and turns `velocity` back into
    /// the arena. Returns `true` if the wall was crossed.
    pub fn reflect(self, wall: Vec2, position: &mut Vec2, velocity: &mut Vec2) -> bool {
        match self {
            Self::Left if position.x < wall.x => {
                position.x = wall.x;
                velocity.x = velocity.x.abs();
            }
            Self::Right if position.x > wall.x => {
                position.x = wall.x;
                velocity.x = -velocity.x.abs();
            }
            Self::Top if position.y < wall.y => {
                position.y = wall.y;
                velocity.y = velocity.y.abs();
            }
            Self::Bottom if position.y > wall.y => {
                position.y = wall.y;
                velocity.y = -velocity.y.abs();
            }
            _ => return false,
        }
        true
    }
}

// -- entity types --------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub position: Position,
    pub motion: Motion,
}

entity_type!(Ball {
    position: Position,
    motion: Motion,
});

impl Ball {
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: Position(position),
            motion: Motion { velocity },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub position: Position,
    pub tag: Tag,
}

entity_type!(Wall {
    position: Position,
    tag: Tag,
});

impl Wall {
    /// The wall on `side` of a `width` x `height` arena anchored at the origin.
    #[must_use]
    pub fn new(side: Side, width: f32, height: f32) -> Self {
        let position = match side {
            Side::Left => Vec2::new(0.0, height / 2.0),
            Side::Right => Vec2::new(width, height / 2.0),
            Side::Top => Vec2::new(width / 2.0, 0.0),
            Side::Bottom => Vec2::new(width / 2.0, height),
        };
        Self {
            position: Position(position),
            tag: Tag { side },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub position: Position,
    pub motion: Motion,
    pub lifetime: Lifetime,
}

entity_type!(Spark {
    position: Position,
    motion: Motion,
    lifetime: Lifetime,
});

impl Spark {
    const SPEED: f32 = 40.0;
    const SPREAD: [f32; 3] = [-0.5, 0.0, 0.5];

    /// Three sparks fanning out from `origin` into the arena.
    pub fn burst(origin: Vec2, side: Side, lifetime_ticks: u32) -> impl Iterator<Item = Self> {
        let normal = side.normal();
        Self::SPREAD.into_iter().map(move |angle| Self {
            position: Position(origin),
            motion: Motion {
                velocity: Vec2::from_angle(angle).rotate(normal) * Self::SPEED,
            },
            lifetime: Lifetime {
                remaining_ticks: lifetime_ticks,
            },
        })
    }
}

/// A ball hit a wall this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BounceEvent {
    pub position: Position,
    pub tag: Tag,
}

entity_type!(BounceEvent {
    position: Position,
    tag: Tag,
});

// -- systems -------------------------------------------------------------------

/// The demo systems, in tick order.
#[must_use]
pub fn systems(config: &AppConfig) -> Vec<Box<dyn System>> {
    vec![
        Box::new(SysInit::new(config)),
        Box::new(SysMovement::new(1.0 / config.tick_rate as f32)),
        Box::new(SysBounce),
        Box::new(SysSparks::new(config.spark_lifetime_ticks)),
        Box::new(SysStats::default()),
    ]
}

/// Builds the arena and the initial balls.
#[derive(Debug)]
pub struct SysInit {
    width: f32,
    height: f32,
    ball_count: usize,
}

impl SysInit {
    const BALL_SPEED: f32 = 90.0;
    /// Radians between consecutive launch directions.
    const GOLDEN_ANGLE: f32 = 2.399_963;

    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            width: config.arena_width,
            height: config.arena_height,
            ball_count: config.ball_count,
        }
    }

    fn ball(&self, index: usize) -> Ball {
        let center = Vec2::new(self.width, self.height) / 2.0;
        let offset = Vec2::new((index % 4) as f32, (index / 4 % 4) as f32) * 4.0;
        let angle = index as f32 * Self::GOLDEN_ANGLE + 0.3;
        Ball::new(center + offset, Vec2::from_angle(angle) * Self::BALL_SPEED)
    }
}

impl System for SysInit {
    fn name(&self) -> &str {
        "init"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::START
    }

    fn start(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        store.init(BounceEvent {
            position: Position(Vec2::ZERO),
            tag: Tag { side: Side::Left },
        });
        store.init_batch(Spark::burst(Vec2::ZERO, Side::Left, 1).take(1));

        for index in 0..4 {
            let side = Side::from_index(index)?;
            store.add(Wall::new(side, self.width, self.height));
        }
        store.add_batch((0..self.ball_count).map(|index| self.ball(index)));

        info!(
            balls = self.ball_count,
            width = self.width,
            height = self.height,
            "arena ready"
        );
        Ok(())
    }
}

/// Integrates velocity into position for everything that moves.
#[derive(Debug)]
pub struct SysMovement {
    dt: f32,
}

impl SysMovement {
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

impl System for SysMovement {
    fn name(&self) -> &str {
        "movement"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        for cell in store.get_with_component::<(Position, Motion)>() {
            let mut entity = cell.borrow_mut();
            let Some(&Motion { velocity }) = entity.component::<Motion>() else {
                continue;
            };
            if let Some(Position(position)) = entity.component_mut::<Position>() {
                *position += velocity * self.dt;
            }
        }
        Ok(())
    }
}

/// Keeps balls inside the arena and records each bounce.
#[derive(Debug)]
pub struct SysBounce;

impl System for SysBounce {
    fn name(&self) -> &str {
        "bounce"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        let walls: Vec<(Side, Vec2)> = store
            .get_by_class::<Wall>()?
            .map(|cell| {
                let wall = cell.borrow();
                (wall.tag.side, wall.position.0)
            })
            .collect();

        let mut events = Vec::new();
        for cell in store.get_by_class::<Ball>()? {
            let mut ball = cell.borrow_mut();
            let Ball { position, motion } = &mut *ball;
            for &(side, wall) in &walls {
                if side.reflect(wall, &mut position.0, &mut motion.velocity) {
                    events.push(BounceEvent {
                        position: *position,
                        tag: Tag { side },
                    });
                }
            }
        }

        if !events.is_empty() {
            debug!(bounces = events.len(), "balls bounced");
        }
        store.add_batch(events);
        Ok(())
    }
}

/// Turns bounce events into sparks and retires sparks whose time is up.
#[derive(Debug)]
pub struct SysSparks {
    lifetime_ticks: u32,
}

impl SysSparks {
    #[must_use]
    pub fn new(lifetime_ticks: u32) -> Self {
        Self { lifetime_ticks }
    }
}

impl System for SysSparks {
    fn name(&self) -> &str {
        "sparks"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        for cell in store.get_with_component::<(Lifetime,)>() {
            let Some(mut lifetime) = cell.component_mut::<Lifetime>() else {
                continue;
            };
            lifetime.remaining_ticks = lifetime.remaining_ticks.saturating_sub(1);
            if lifetime.remaining_ticks == 0 {
                store.delete_buffer_add(cell.entity());
            }
        }

        let mut bursts = Vec::new();
        for cell in store.get_by_class::<BounceEvent>()? {
            let event = cell.borrow();
            bursts.push((event.position.0, event.tag.side));
            store.delete_buffer_add(cell.entity());
        }
        for (origin, side) in bursts {
            store.add_batch(Spark::burst(origin, side, self.lifetime_ticks));
        }
        Ok(())
    }
}

/// Tallies bounces and reports the world at start and stop.
#[derive(Debug, Default)]
pub struct SysStats {
    ticks: u64,
    bounces: usize,
    peak_sparks: usize,
}

impl System for SysStats {
    fn name(&self) -> &str {
        "stats"
    }

    fn start(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        *self = Self::default();
        info!(
            entities = store.len(),
            types = store.entity_kinds().count(),
            "simulation starting"
        );
        Ok(())
    }

    fn update(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        // Events are already queued for deletion but stay visible until the
        // end-of-tick purge.
        self.ticks += 1;
        self.bounces += store.count::<BounceEvent>()?;
        self.peak_sparks = self.peak_sparks.max(store.count::<Spark>()?);
        Ok(())
    }

    fn stop(&mut self, store: &mut EntityStore) -> anyhow::Result<()> {
        info!(
            ticks = self.ticks,
            bounces = self.bounces,
            peak_sparks = self.peak_sparks,
            balls = store.count::<Ball>()?,
            sparks = store.count::<Spark>()?,
            "simulation stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pattern_store::{Component, EntityType};
    use pattern_system::SystemScheduler;

    use super::*;

    #[test]
    fn test_side_from_index() {
        assert_eq!(Side::from_index(0), Ok(Side::Left));
        assert_eq!(Side::from_index(3), Ok(Side::Bottom));
        let err = Side::from_index(4).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::OutOfDomain {
                component: "Tag",
                field: "side",
                value: "4".to_string(),
            }
        );
    }

    #[test]
    fn test_reflect_only_when_crossed() {
        let wall = Vec2::new(0.0, 50.0);
        let mut position = Vec2::new(1.0, 10.0);
        let mut velocity = Vec2::new(-3.0, 1.0);
        assert!(!Side::Left.reflect(wall, &mut position, &mut velocity));

        position.x = -2.0;
        assert!(Side::Left.reflect(wall, &mut position, &mut velocity));
        assert_eq!(position, Vec2::new(0.0, 10.0));
        assert_eq!(velocity, Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_declared_components() {
        let names: Vec<_> = Spark::declared_components()
            .iter()
            .map(|meta| meta.name)
            .collect();
        assert_eq!(names, vec!["Lifetime", "Motion", "Position"]);
        assert_eq!(Tag::type_name(), "Tag");
    }

    #[test]
    fn test_burst_points_into_the_arena() {
        let sparks: Vec<_> = Spark::burst(Vec2::ZERO, Side::Left, 5).collect();
        assert_eq!(sparks.len(), 3);
        assert!(sparks.iter().all(|spark| spark.motion.velocity.x > 0.0));
        assert!(sparks.iter().all(|spark| spark.lifetime.remaining_ticks == 5));
    }

    #[test]
    fn test_init_builds_arena() {
        let config = AppConfig {
            ball_count: 5,
            ..AppConfig::default()
        };
        let mut store = EntityStore::new();
        SysInit::new(&config).start(&mut store).unwrap();

        assert_eq!(store.count::<Wall>().unwrap(), 4);
        assert_eq!(store.count::<Ball>().unwrap(), 5);
        assert_eq!(store.count::<Spark>().unwrap(), 0);
        assert_eq!(store.count::<BounceEvent>().unwrap(), 0);
    }

    /// A 100x100 arena with one ball drifting left at one unit per tick.
    fn left_wall_world() -> (EntityStore, SystemScheduler) {
        let mut store = EntityStore::new();
        store.init(BounceEvent {
            position: Position(Vec2::ZERO),
            tag: Tag { side: Side::Left },
        });
        store.init_batch(Spark::burst(Vec2::ZERO, Side::Left, 1));
        for side in Side::ALL {
            store.add(Wall::new(side, 100.0, 100.0));
        }
        store.add(Ball::new(Vec2::new(5.5, 50.0), Vec2::new(-2.0, 0.0)));

        let scheduler = SystemScheduler::new(vec![
            Box::new(SysMovement::new(0.5)),
            Box::new(SysBounce),
            Box::new(SysSparks::new(3)),
        ]);
        (store, scheduler)
    }

    fn tick(store: &mut EntityStore, scheduler: &mut SystemScheduler) {
        scheduler.update_systems(store).unwrap();
        store.delete_buffer_purge().unwrap();
    }

    #[test]
    fn test_bounce_spawns_sparks_that_expire() {
        let (mut store, mut scheduler) = left_wall_world();

        for _ in 0..5 {
            tick(&mut store, &mut scheduler);
        }
        assert_eq!(store.count::<Spark>().unwrap(), 0);

        // Tick 6 crosses the wall: the event is consumed and purged, sparks remain.
        tick(&mut store, &mut scheduler);
        assert_eq!(store.count::<BounceEvent>().unwrap(), 0);
        assert_eq!(store.count::<Spark>().unwrap(), 3);
        let ball = store.get_by_class::<Ball>().unwrap().next().unwrap();
        assert_eq!(ball.borrow().position.0.x, 0.0);
        assert!(ball.borrow().motion.velocity.x > 0.0);

        tick(&mut store, &mut scheduler);
        tick(&mut store, &mut scheduler);
        assert_eq!(store.count::<Spark>().unwrap(), 3);
        tick(&mut store, &mut scheduler);
        assert_eq!(store.count::<Spark>().unwrap(), 0);
        assert_eq!(store.count::<Ball>().unwrap(), 1);
    }

    #[test]
    fn test_stats_sees_events_before_purge() {
        let (mut store, _) = left_wall_world();
        let mut stats = SysStats::default();
        store.add(BounceEvent {
            position: Position(Vec2::ZERO),
            tag: Tag { side: Side::Top },
        });
        for cell in store.get_by_class::<BounceEvent>().unwrap() {
            store.delete_buffer_add(cell.entity());
        }

        stats.update(&mut store).unwrap();
        store.delete_buffer_purge().unwrap();
        stats.update(&mut store).unwrap();
        assert_eq!(stats.bounces, 1);
        assert_eq!(stats.ticks, 2);
    }
}
