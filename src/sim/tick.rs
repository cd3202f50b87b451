//! Per-frame collision handling
//!
//! [`CollisionHandler::frame`] runs once per simulation frame, in a fixed
//! order:
//! 1. each drone against the ship, then against the field
//! 2. capsule pickups
//! 3. power-up expiry
//! 4. lost drones
//! 5. the win check (held back while the clear-the-field slow motion runs)
//!
//! Resolver events are turned into combo bookkeeping, effect sink calls,
//! drops and intensity notifications here.

use std::rc::Rc;

use super::collision::{
    CollisionEvent, is_drone_lost, resolve_asteroid_contact, resolve_capsule_contact, resolve_ship_contact,
    resolve_win_condition,
};
use super::field::AsteroidField;
use super::powerup::{ActivePowerUp, PowerUpManager};
use super::world::World;
use crate::clock::{Clock, Millis};
use crate::intensity::{GameEvent, IntensityDirector};
use crate::ports::{DropSystem, EffectSink, NoDrops, NoopEffectSink};
use crate::scoreboard::RunSummary;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Debris particles per fragmenting asteroid
const DEBRIS_COUNT: u32 = 8;

/// What one frame did
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Resolver events in the order they happened
    pub events: Vec<CollisionEvent>,
    /// Power-ups that ran out this frame
    pub expired: Vec<&'static str>,
    /// Lives lost this frame
    pub lives_lost: u32,
    pub game_over: bool,
    /// Set on the frame the level is won
    pub summary: Option<RunSummary>,
}

pub struct CollisionHandler {
    tuning: Tuning,
    clock: Rc<dyn Clock>,
    powerups: PowerUpManager,
    director: IntensityDirector,
    effects: Box<dyn EffectSink>,
    drops: Box<dyn DropSystem>,
    shake_scale: f32,
    combo_fade_until: Option<Millis>,
    slow_motion_until: Option<Millis>,
}

impl CollisionHandler {
    /// Handler with silent effects, no drops and feedback switched off
    pub fn new(tuning: Tuning, clock: Rc<dyn Clock>) -> Self {
        Self {
            powerups: PowerUpManager::new(tuning.clone(), clock.clone()),
            director: IntensityDirector::disabled(clock.clone(), tuning.combo_decay_ms),
            effects: Box::new(NoopEffectSink),
            drops: Box::new(NoDrops),
            shake_scale: 1.0,
            combo_fade_until: None,
            slow_motion_until: None,
            tuning,
            clock,
        }
    }

    pub fn with_director(mut self, director: IntensityDirector) -> Self {
        self.director = director;
        self
    }

    pub fn with_effects(mut self, effects: Box<dyn EffectSink>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_drops(mut self, drops: Box<dyn DropSystem>) -> Self {
        self.drops = drops;
        self
    }

    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.shake_scale = settings.effective_shake_scale();
        self
    }

    pub fn director(&self) -> &IntensityDirector {
        &self.director
    }

    pub fn powerups(&self) -> &PowerUpManager {
        &self.powerups
    }

    pub fn active_power_ups(&self) -> Vec<ActivePowerUp> {
        self.powerups.get_active()
    }

    /// Reset the run state and enter play
    pub fn start_level<F: AsteroidField>(&mut self, world: &mut World<F>, level_id: Option<u32>) {
        self.powerups.clear(world);
        world.session.start(level_id, self.clock.now());
        world.capsules.clear();
        world.drones.reset(&world.ship);
        self.combo_fade_until = None;
        self.slow_motion_until = None;
        self.director.notify(GameEvent::LevelStart {
            lives: world.session.lives,
        });
    }

    /// Release every attached drone; returns how many launched
    pub fn launch<F: AsteroidField>(&mut self, world: &mut World<F>) -> usize {
        if !world.session.is_playing() {
            return 0;
        }
        let launched = world.drones.launch_all();
        if launched > 0 {
            self.director.notify(GameEvent::Launch);
        }
        launched
    }

    pub fn pause<F: AsteroidField>(&mut self, world: &mut World<F>) -> bool {
        let paused = world.session.pause();
        if paused {
            self.director.notify(GameEvent::Pause);
        }
        paused
    }

    pub fn resume<F: AsteroidField>(&mut self, world: &mut World<F>) -> bool {
        let resumed = world.session.resume();
        if resumed {
            self.director.notify(GameEvent::Resume);
        }
        resumed
    }

    /// Simulation speed factor; below 1 while the clear-the-field slow motion runs
    pub fn time_scale(&self) -> f32 {
        if self.slow_motion_active(self.clock.now()) {
            self.tuning.slow_motion_scale
        } else {
            1.0
        }
    }

    /// Whether the combo counter should still be on screen
    pub fn combo_visible(&self) -> bool {
        self.combo_fade_until.is_some_and(|until| self.clock.now() < until)
    }

    fn slow_motion_active(&self, now: Millis) -> bool {
        self.slow_motion_until.is_some_and(|until| now < until)
    }

    /// Run one frame of collision handling
    pub fn frame<F: AsteroidField>(&mut self, world: &mut World<F>) -> FrameReport {
        let mut report = FrameReport::default();
        if !world.session.is_playing() {
            return report;
        }
        let now = self.clock.now();

        // --- DRONES ---
        for index in 0..world.drones.len() {
            let (ship_event, hits) = {
                let drone = &mut world.drones.as_mut_slice()[index];
                let ship_event = resolve_ship_contact(drone, &world.ship);
                let hits = resolve_asteroid_contact(drone, &mut world.field, &mut world.session, &self.tuning);
                (ship_event, hits)
            };

            if let Some(event) = ship_event {
                // A bounce ends the chain; a sticky catch keeps it going
                if matches!(event, CollisionEvent::Bounce { .. }) {
                    world.session.combo = 0;
                    self.director.notify(GameEvent::Bounce);
                }
                report.events.push(event);
            }

            for event in hits {
                self.handle_asteroid_event(&event, world, now);
                report.events.push(event);
            }
        }

        // Let the last destruction play out before the win
        if world.field.remaining() == 0 && self.slow_motion_until.is_none() {
            self.slow_motion_until = Some(now + self.tuning.slow_motion_ms);
            log::debug!("Field cleared, slow motion for {}ms", self.tuning.slow_motion_ms);
        }

        // --- CAPSULES ---
        for event in resolve_capsule_contact(&mut world.capsules, &world.ship) {
            if let CollisionEvent::Collected { power_up, .. } = event {
                self.powerups.activate(power_up, world);
                self.director.notify(GameEvent::PowerUpCollected {
                    any_active: !self.powerups.is_empty(),
                    lives: world.session.lives,
                });
            }
            report.events.push(event);
        }
        world.capsules.retain(|c| c.alive);

        // --- POWER-UP EXPIRY ---
        let had_active = !self.powerups.is_empty();
        report.expired = self.powerups.update(world);
        self.note_power_ups_gone(had_active);

        // --- LOST DRONES ---
        let bottom = world.bounds.y;
        let lost: Vec<u32> = world
            .drones
            .iter()
            .filter(|d| is_drone_lost(d, bottom))
            .map(|d| d.id)
            .collect();
        for id in lost {
            if world.drones.len() > 1 {
                world.drones.remove(id);
                continue;
            }

            let lives = world.session.lose_life();
            world.session.combo = 0;
            report.lives_lost += 1;
            self.director.notify(GameEvent::LifeLost { lives });

            let had_active = !self.powerups.is_empty();
            if lives == 0 {
                world.session.game_over();
                self.powerups.clear(world);
                self.note_power_ups_gone(had_active);
                self.director.notify(GameEvent::GameOver);
                report.game_over = true;
                break;
            }
            world.drones.reset_onto(id, &world.ship);
            self.powerups.deactivate_drone_flags(world);
            self.note_power_ups_gone(had_active);
        }

        // --- WIN ---
        let win = if self.slow_motion_active(now) {
            None
        } else {
            resolve_win_condition(&world.field, &mut world.session)
        };
        if let Some(event) = win {
            let had_active = !self.powerups.is_empty();
            self.powerups.clear(world);
            self.note_power_ups_gone(had_active);
            report.summary = Some(RunSummary::from_session(
                &world.session,
                now,
                self.tuning.par_time_secs,
            ));
            self.director.notify(GameEvent::Win);
            report.events.push(event);
        }

        self.director.tick();
        report
    }

    /// Drop the director's power-up floor once nothing is left active
    fn note_power_ups_gone(&mut self, had_active: bool) {
        if had_active && self.powerups.is_empty() {
            self.director.notify(GameEvent::PowerUpsExpired);
        }
    }

    fn handle_asteroid_event<F: AsteroidField>(&mut self, event: &CollisionEvent, world: &mut World<F>, now: Millis) {
        match event {
            CollisionEvent::AsteroidDamage { at, material, .. } => {
                self.effects.spawn_explosion(*at, material.color());
            }
            CollisionEvent::AsteroidHit(destruction) | CollisionEvent::AsteroidFragment(destruction) => {
                let color = destruction.material.color();
                self.effects.spawn_explosion(destruction.at, color);

                world.session.combo += 1;
                if world.session.combo >= 2 {
                    self.combo_fade_until = Some(now + self.tuning.combo_fade_ms);
                }

                let shake = self.tuning.shake.get(destruction.size) * self.shake_scale;
                if shake > 0.0 {
                    self.effects.trigger_shake(shake);
                }
                if !destruction.children.is_empty() {
                    self.effects.spawn_debris(destruction.at, color, DEBRIS_COUNT);
                }

                if let Some(power_up) = self.drops.decide_drop(destruction.material, destruction.size) {
                    world.spawn_capsule(power_up, destruction.at, &self.tuning);
                }

                self.director.notify(GameEvent::AsteroidDestroyed {
                    remaining_ratio: world.field.remaining_ratio(),
                });
            }
            _ => {}
        }
    }
}
