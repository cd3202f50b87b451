//! Everything one run mutates, passed explicitly to the frame handler

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::drones::DroneManager;
use super::field::AsteroidField;
use super::session::Session;
use super::state::{Capsule, Ship};
use crate::tuning::Tuning;

pub struct World<F: AsteroidField> {
    pub session: Session,
    pub ship: Ship,
    pub drones: DroneManager,
    pub capsules: Vec<Capsule>,
    pub field: F,
    /// Seeded RNG; the only randomness gameplay may use
    pub rng: Pcg32,
    /// Playfield size (width, height)
    pub bounds: Vec2,
    next_capsule_id: u32,
}

impl<F: AsteroidField> World<F> {
    pub fn new(tuning: &Tuning, field: F, seed: u64) -> Self {
        let bounds = Vec2::new(tuning.field_width, tuning.field_height);
        let ship = Ship::new(
            Vec2::new(
                (bounds.x - tuning.ship_width) / 2.0,
                bounds.y - tuning.ship_margin - tuning.ship_height,
            ),
            tuning.ship_width,
            tuning.ship_height,
        );
        let mut drones = DroneManager::new(tuning.drone_radius, tuning.drone_speed);
        drones.spawn_attached(&ship);

        Self {
            session: Session::new(tuning.max_lives),
            ship,
            drones,
            capsules: Vec::new(),
            field,
            rng: Pcg32::seed_from_u64(seed),
            bounds,
            next_capsule_id: 1,
        }
    }

    /// Drop a capsule at `at`
    pub fn spawn_capsule(&mut self, power_up: &'static str, at: Vec2, tuning: &Tuning) -> u32 {
        let id = self.next_capsule_id;
        self.next_capsule_id += 1;
        self.capsules.push(Capsule {
            id,
            pos: at,
            vel: Vec2::new(0.0, tuning.capsule_fall_speed),
            radius: tuning.capsule_radius,
            power_up,
            alive: true,
        });
        id
    }

    /// Move drones and capsules by `dt` seconds. Attached drones ride the ship.
    pub fn advance(&mut self, dt: f32) {
        let bounds = self.bounds;
        for drone in self.drones.iter_mut() {
            drone.advance(dt, bounds);
        }
        self.drones.follow_ship(&self.ship);
        for capsule in &mut self.capsules {
            capsule.fall(dt, bounds.y);
        }
        self.capsules.retain(|c| c.alive);
    }

    /// Slide the ship so its center is at `x`
    pub fn steer(&mut self, x: f32) {
        self.ship.move_to(x, self.bounds.x);
        self.drones.follow_ship(&self.ship);
    }
}
