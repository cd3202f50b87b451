//! Timed gameplay modifiers
//!
//! Each power-up is a static [`PowerUpDef`] whose [`Effect`] knows how to
//! apply itself to the world and how to undo that. Ship resizes are the
//! exception: the manager keeps the unscaled width and recomputes the ship
//! from every active factor, so overlapping resizes unwind in any order.
//! The manager keeps a table of active timed power-ups and expires them
//! against the injected clock. Instant power-ups apply once and are never
//! tracked.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::field::AsteroidField;
use super::state::Drone;
use super::world::World;
use crate::clock::{Clock, Millis};
use crate::tuning::Tuning;

/// Boolean drone modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneFlag {
    Piercing,
    Sticky,
    Warp,
}

/// What a power-up does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Scale ship width about its center
    ShipScale { factor: f32 },
    /// Set a flag on every live drone
    DroneFlag(DroneFlag),
    /// Multiply the session score multiplier
    ScoreMultiply { factor: f32 },
    /// Add lives (instant)
    ExtraLives { delta: u32 },
    /// Launch an extra drone (instant)
    SpawnDrone,
    /// Take hp off every live destructible asteroid without killing any (instant)
    WeakenField { delta: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpDuration {
    Instant,
    Timed(Millis),
    /// Until reverted explicitly or the run is cleared
    Permanent,
}

/// What reactivating an already-active power-up does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPolicy {
    /// Restart the clock only
    Refresh,
    /// Apply the effect again on top and restart the clock
    Compound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpDef {
    pub id: &'static str,
    pub label: &'static str,
    pub duration: PowerUpDuration,
    pub effect: Effect,
    pub stacking: StackPolicy,
}

/// Built-in power-ups
pub const CATALOG: &[PowerUpDef] = &[
    PowerUpDef {
        id: "wide",
        label: "Wide Ship",
        duration: PowerUpDuration::Timed(10_000),
        effect: Effect::ShipScale { factor: 1.5 },
        stacking: StackPolicy::Compound,
    },
    PowerUpDef {
        id: "narrow",
        label: "Narrow Ship",
        duration: PowerUpDuration::Timed(8_000),
        effect: Effect::ShipScale { factor: 0.75 },
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "pierce",
        label: "Piercing Drones",
        duration: PowerUpDuration::Timed(8_000),
        effect: Effect::DroneFlag(DroneFlag::Piercing),
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "sticky",
        label: "Sticky Ship",
        duration: PowerUpDuration::Timed(12_000),
        effect: Effect::DroneFlag(DroneFlag::Sticky),
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "warp",
        label: "Warp Walls",
        duration: PowerUpDuration::Permanent,
        effect: Effect::DroneFlag(DroneFlag::Warp),
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "double",
        label: "Double Points",
        duration: PowerUpDuration::Timed(15_000),
        effect: Effect::ScoreMultiply { factor: 2.0 },
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "life",
        label: "Extra Life",
        duration: PowerUpDuration::Instant,
        effect: Effect::ExtraLives { delta: 1 },
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "multi",
        label: "Multi Drone",
        duration: PowerUpDuration::Instant,
        effect: Effect::SpawnDrone,
        stacking: StackPolicy::Refresh,
    },
    PowerUpDef {
        id: "quake",
        label: "Quake",
        duration: PowerUpDuration::Instant,
        effect: Effect::WeakenField { delta: 1 },
        stacking: StackPolicy::Refresh,
    },
];

pub fn find_def(id: &str) -> Option<&'static PowerUpDef> {
    CATALOG.iter().find(|def| def.id == id)
}

impl Effect {
    pub fn is_drone_flag(&self) -> bool {
        matches!(self, Effect::DroneFlag(_))
    }

    /// Apply to the world directly. Ship width is owned by the manager.
    fn apply<F: AsteroidField>(&self, world: &mut World<F>, tuning: &Tuning) {
        match *self {
            Effect::ShipScale { .. } => {}
            Effect::DroneFlag(flag) => {
                for drone in world.drones.iter_mut() {
                    set_flag(drone, flag, true);
                }
            }
            Effect::ScoreMultiply { factor } => {
                world.session.score_multiplier *= factor;
            }
            Effect::ExtraLives { delta } => {
                world.session.gain_lives(delta);
            }
            Effect::SpawnDrone => {
                world
                    .drones
                    .spawn_clone(&world.ship, tuning.drone_spawn_spread, &mut world.rng);
            }
            Effect::WeakenField { delta } => {
                for asteroid in world.field.grid_mut().iter_mut().filter(|a| a.counts_for_clear()) {
                    asteroid.hp = (asteroid.hp - delta).max(1);
                }
            }
        }
    }

    fn revert<F: AsteroidField>(&self, world: &mut World<F>) {
        match *self {
            Effect::DroneFlag(flag) => {
                for drone in world.drones.iter_mut() {
                    set_flag(drone, flag, false);
                }
            }
            Effect::ScoreMultiply { factor } => {
                world.session.score_multiplier = (world.session.score_multiplier / factor).max(1.0);
            }
            _ => {}
        }
    }
}

fn set_flag(drone: &mut Drone, flag: DroneFlag, value: bool) {
    match flag {
        DroneFlag::Piercing => drone.piercing = value,
        DroneFlag::Sticky => drone.sticky = value,
        DroneFlag::Warp => drone.warp = value,
    }
}

#[derive(Debug, Clone, Copy)]
struct Activation {
    start: Millis,
    def: &'static PowerUpDef,
    /// Times the effect is applied (above 1 only for compounding power-ups)
    stacks: u32,
}

/// Time left on an active power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Millis(Millis),
    Forever,
}

/// HUD view of one active power-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePowerUp {
    pub id: &'static str,
    pub label: &'static str,
    pub remaining: Remaining,
}

pub struct PowerUpManager {
    active: BTreeMap<&'static str, Activation>,
    /// Ship width before any resize power-up; set while one is active
    ship_base: Option<f32>,
    clock: Rc<dyn Clock>,
    tuning: Tuning,
}

impl PowerUpManager {
    pub fn new(tuning: Tuning, clock: Rc<dyn Clock>) -> Self {
        Self {
            active: BTreeMap::new(),
            ship_base: None,
            clock,
            tuning,
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Activate a power-up by id. Unknown ids are ignored and return false.
    pub fn activate<F: AsteroidField>(&mut self, id: &str, world: &mut World<F>) -> bool {
        let Some(def) = find_def(id) else {
            return false;
        };
        let now = self.clock.now();

        if def.duration == PowerUpDuration::Instant {
            def.effect.apply(world, &self.tuning);
            log::debug!("Power-up {} applied", def.id);
            return true;
        }

        if let Some(activation) = self.active.get_mut(def.id) {
            activation.start = now;
            if def.stacking == StackPolicy::Compound {
                activation.stacks += 1;
                self.apply(def, world);
            }
            log::debug!("Power-up {} refreshed ({:?})", def.id, def.stacking);
            return true;
        }

        self.active.insert(
            def.id,
            Activation {
                start: now,
                def,
                stacks: 1,
            },
        );
        self.apply(def, world);
        log::debug!("Power-up {} activated", def.id);
        true
    }

    fn apply<F: AsteroidField>(&mut self, def: &'static PowerUpDef, world: &mut World<F>) {
        match def.effect {
            Effect::ShipScale { .. } => {
                self.ship_base.get_or_insert(world.ship.width);
                self.resize_ship(world);
            }
            effect => effect.apply(world, &self.tuning),
        }
    }

    /// Ship width = base width times every active scale factor, applied in
    /// id order. With no resize active the base comes back exactly.
    fn resize_ship<F: AsteroidField>(&mut self, world: &mut World<F>) {
        let Some(base) = self.ship_base else {
            return;
        };
        let mut width = base;
        let mut scaled = false;
        for activation in self.active.values() {
            if let Effect::ShipScale { factor } = activation.def.effect {
                for _ in 0..activation.stacks {
                    width *= factor;
                }
                scaled = true;
            }
        }
        if !scaled {
            self.ship_base = None;
        }
        world.ship.set_width_centered(width);
        world.drones.follow_ship(&world.ship);
    }

    /// Revert and drop every power-up whose time is up. Returns their ids.
    pub fn update<F: AsteroidField>(&mut self, world: &mut World<F>) -> Vec<&'static str> {
        let now = self.clock.now();
        let expired: Vec<&'static str> = self
            .active
            .values()
            .filter(|a| match a.def.duration {
                PowerUpDuration::Timed(duration) => now.saturating_sub(a.start) >= duration,
                _ => false,
            })
            .map(|a| a.def.id)
            .collect();

        for id in &expired {
            self.deactivate(id, world);
            log::debug!("Power-up {id} expired");
        }
        expired
    }

    /// Revert one active power-up now; false if it wasn't active
    pub fn deactivate<F: AsteroidField>(&mut self, id: &str, world: &mut World<F>) -> bool {
        match self.active.remove(id) {
            Some(activation) => {
                match activation.def.effect {
                    Effect::ShipScale { .. } => self.resize_ship(world),
                    effect => {
                        for _ in 0..activation.stacks {
                            effect.revert(world);
                        }
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Revert every active drone-flag power-up (the drones they set are gone)
    pub fn deactivate_drone_flags<F: AsteroidField>(&mut self, world: &mut World<F>) {
        let ids: Vec<&'static str> = self
            .active
            .values()
            .filter(|a| a.def.effect.is_drone_flag())
            .map(|a| a.def.id)
            .collect();
        for id in ids {
            self.deactivate(id, world);
        }
    }

    /// Revert everything (end of run)
    pub fn clear<F: AsteroidField>(&mut self, world: &mut World<F>) {
        let ids: Vec<&'static str> = self.active.keys().copied().collect();
        for id in ids {
            self.deactivate(id, world);
        }
    }

    /// Remaining time per active power-up, in id order
    pub fn get_active(&self) -> Vec<ActivePowerUp> {
        let now = self.clock.now();
        self.active
            .values()
            .map(|a| ActivePowerUp {
                id: a.def.id,
                label: a.def.label,
                remaining: match a.def.duration {
                    PowerUpDuration::Timed(duration) => {
                        Remaining::Millis(duration.saturating_sub(now.saturating_sub(a.start)))
                    }
                    _ => Remaining::Forever,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sim::field::GridField;
    use crate::sim::state::{MaterialKey, SizeClass};
    use glam::Vec2;
    use proptest::prelude::*;

    fn setup() -> (Rc<ManualClock>, PowerUpManager, World<GridField>) {
        let tuning = Tuning::default();
        let clock = Rc::new(ManualClock::new(1_000));
        let manager = PowerUpManager::new(tuning.clone(), clock.clone());
        let mut world = World::new(&tuning, GridField::new(tuning.asteroid_hp), 9);
        world.session.start(Some(1), 1_000);
        (clock, manager, world)
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (_, mut manager, mut world) = setup();
        assert!(!manager.activate("nope", &mut world));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_instant_never_tracked() {
        let (_, mut manager, mut world) = setup();
        world.session.lose_life();
        assert!(manager.activate("life", &mut world));
        assert_eq!(world.session.lives, 3);
        assert!(manager.is_empty());

        // Capped at max lives
        manager.activate("life", &mut world);
        assert_eq!(world.session.lives, 3);
    }

    #[test]
    fn test_spawn_drone_clones_first() {
        let (_, mut manager, mut world) = setup();
        world.drones.as_mut_slice()[0].sticky = true;
        manager.activate("multi", &mut world);
        assert_eq!(world.drones.len(), 2);
        let spawned = world.drones.iter().nth(1).unwrap();
        assert!(spawned.launched);
        assert!(spawned.sticky);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_weaken_never_destroys() {
        let (_, mut manager, mut world) = setup();
        world.field.spawn(Vec2::ZERO, Vec2::new(20.0, 20.0), SizeClass::Large, MaterialKey::Rock);
        world.field.spawn(Vec2::new(30.0, 0.0), Vec2::new(20.0, 20.0), SizeClass::Small, MaterialKey::Rock);
        manager.activate("quake", &mut world);
        manager.activate("quake", &mut world);
        manager.activate("quake", &mut world);
        let grid = world.field.grid();
        assert_eq!(grid[0].hp, 1);
        assert_eq!(grid[1].hp, 1);
        assert!(grid.iter().all(|a| a.alive));
    }

    #[test]
    fn test_ship_scale_round_trip() {
        let (clock, mut manager, mut world) = setup();
        let original = world.ship.width;
        let center = world.ship.center_x();
        manager.activate("wide", &mut world);
        assert_eq!(world.ship.width, original * 1.5);
        assert_eq!(world.ship.center_x(), center);
        // Attached drone recentered with the ship
        assert_eq!(world.drones.first().unwrap().pos.x, center);

        clock.advance(9_999);
        assert!(manager.update(&mut world).is_empty());
        clock.advance(1);
        assert_eq!(manager.update(&mut world), vec!["wide"]);
        assert_eq!(world.ship.width, original);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_ship_scale_compounds_and_reverts_to_original() {
        let (clock, mut manager, mut world) = setup();
        let original = world.ship.width;
        manager.activate("wide", &mut world);
        clock.advance(6_000);
        manager.activate("wide", &mut world);
        assert_eq!(world.ship.width, original * 1.5 * 1.5);

        // Clock restarted by the second activation
        clock.advance(6_000);
        assert!(manager.update(&mut world).is_empty());
        clock.advance(4_000);
        manager.update(&mut world);
        assert_eq!(world.ship.width, original);
    }

    #[test]
    fn test_overlapping_resizes_unwind_in_any_order() {
        let (clock, mut manager, mut world) = setup();
        let original = world.ship.width;
        manager.activate("wide", &mut world);
        clock.advance(6_000);
        manager.activate("narrow", &mut world);
        assert!((world.ship.width - original * 1.5 * 0.75).abs() < 1e-3);

        // Wide runs out first; the ship must still be narrow
        clock.advance(4_000);
        assert_eq!(manager.update(&mut world), vec!["wide"]);
        assert!(manager.is_active("narrow"));
        assert_eq!(world.ship.width, original * 0.75);

        clock.advance(4_000);
        assert_eq!(manager.update(&mut world), vec!["narrow"]);
        assert!(manager.is_empty());
        assert_eq!(world.ship.width, original);
    }

    #[test]
    fn test_narrow_expiring_first_leaves_wide() {
        let (clock, mut manager, mut world) = setup();
        let original = world.ship.width;
        manager.activate("narrow", &mut world);
        clock.advance(1_000);
        manager.activate("wide", &mut world);

        clock.advance(7_000);
        assert_eq!(manager.update(&mut world), vec!["narrow"]);
        assert_eq!(world.ship.width, original * 1.5);

        clock.advance(3_000);
        assert_eq!(manager.update(&mut world), vec!["wide"]);
        assert_eq!(world.ship.width, original);
    }

    #[test]
    fn test_refresh_does_not_reapply() {
        let (clock, mut manager, mut world) = setup();
        manager.activate("double", &mut world);
        clock.advance(10_000);
        manager.activate("double", &mut world);
        assert_eq!(world.session.score_multiplier, 2.0);
        let active = manager.get_active();
        assert_eq!(active[0].remaining, Remaining::Millis(15_000));

        clock.advance(15_000);
        manager.update(&mut world);
        assert_eq!(world.session.score_multiplier, 1.0);
    }

    #[test]
    fn test_score_multiplier_revert_floors_at_one() {
        let (clock, mut manager, mut world) = setup();
        manager.activate("double", &mut world);
        world.session.score_multiplier = 1.5;
        clock.advance(15_000);
        manager.update(&mut world);
        assert_eq!(world.session.score_multiplier, 1.0);
    }

    #[test]
    fn test_drone_flag_covers_every_drone() {
        let (clock, mut manager, mut world) = setup();
        manager.activate("multi", &mut world);
        manager.activate("pierce", &mut world);
        assert!(world.drones.iter().all(|d| d.piercing));
        clock.advance(8_000);
        manager.update(&mut world);
        assert!(world.drones.iter().all(|d| !d.piercing));
    }

    #[test]
    fn test_permanent_never_expires() {
        let (clock, mut manager, mut world) = setup();
        manager.activate("warp", &mut world);
        clock.advance(10_000_000);
        assert!(manager.update(&mut world).is_empty());
        assert_eq!(manager.get_active()[0].remaining, Remaining::Forever);
        assert!(world.drones.first().unwrap().warp);

        manager.clear(&mut world);
        assert!(manager.is_empty());
        assert!(!world.drones.first().unwrap().warp);
    }

    #[test]
    fn test_get_active_remaining() {
        let (clock, mut manager, mut world) = setup();
        manager.activate("pierce", &mut world);
        manager.activate("sticky", &mut world);
        clock.advance(3_000);
        let active = manager.get_active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, "pierce");
        assert_eq!(active[0].remaining, Remaining::Millis(5_000));
        assert_eq!(active[1].remaining, Remaining::Millis(9_000));
    }

    #[test]
    fn test_deactivate_twice_is_noop() {
        let (_, mut manager, mut world) = setup();
        manager.activate("narrow", &mut world);
        let narrowed = world.ship.width;
        assert!(manager.deactivate("narrow", &mut world));
        let restored = world.ship.width;
        assert!(restored > narrowed);
        assert!(!manager.deactivate("narrow", &mut world));
        assert_eq!(world.ship.width, restored);
    }

    #[test]
    fn test_deactivate_drone_flags_only() {
        let (_, mut manager, mut world) = setup();
        manager.activate("warp", &mut world);
        manager.activate("sticky", &mut world);
        manager.activate("double", &mut world);
        manager.deactivate_drone_flags(&mut world);
        assert!(!manager.is_active("warp"));
        assert!(!manager.is_active("sticky"));
        assert!(manager.is_active("double"));
    }

    proptest! {
        #[test]
        fn prop_ship_width_round_trips(width in 20.0f32..300.0, x in 0.0f32..500.0, hold in 0u64..9_000) {
            let (clock, mut manager, mut world) = setup();
            world.ship.width = width;
            world.ship.pos.x = x;
            manager.activate("narrow", &mut world);
            clock.advance(hold);
            manager.update(&mut world);
            manager.deactivate("narrow", &mut world);
            prop_assert_eq!(world.ship.width.to_bits(), width.to_bits());
        }

        #[test]
        fn prop_staggered_resizes_restore_width(
            width in 20.0f32..300.0,
            gap in 0u64..12_000,
            narrow_first in any::<bool>(),
        ) {
            let (clock, mut manager, mut world) = setup();
            world.ship.width = width;
            let (first, second) = if narrow_first { ("narrow", "wide") } else { ("wide", "narrow") };
            manager.activate(first, &mut world);
            clock.advance(gap);
            manager.update(&mut world);
            manager.activate(second, &mut world);
            clock.advance(20_000);
            manager.update(&mut world);
            prop_assert!(manager.is_empty());
            prop_assert_eq!(world.ship.width.to_bits(), width.to_bits());
        }
    }
}
