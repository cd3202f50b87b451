//! Drone lifecycle
//!
//! Owns the drone list and hands out IDs. Knows nothing about scoring.

use glam::Vec2;
use rand::Rng;

use super::state::{Drone, Ship};

#[derive(Debug, Clone)]
pub struct DroneManager {
    drones: Vec<Drone>,
    next_id: u32,
    radius: f32,
    speed: f32,
}

impl DroneManager {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            drones: Vec::new(),
            next_id: 1,
            radius,
            speed,
        }
    }

    fn next_drone_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drone> {
        self.drones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Drone> {
        self.drones.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Drone] {
        &mut self.drones
    }

    pub fn first(&self) -> Option<&Drone> {
        self.drones.first()
    }

    pub fn get(&self, id: u32) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id == id)
    }

    /// Spawn a drone resting on the ship's center
    pub fn spawn_attached(&mut self, ship: &Ship) -> u32 {
        let id = self.next_drone_id();
        let mut drone = Drone::new(id, self.radius, self.speed);
        drone.follow(ship);
        self.drones.push(drone);
        id
    }

    /// Spawn an extra drone that copies the first drone's flags and launches
    /// upward within `spread` radians of vertical
    pub fn spawn_clone(&mut self, ship: &Ship, spread: f32, rng: &mut impl Rng) -> u32 {
        let id = self.next_drone_id();
        let mut drone = Drone::new(id, self.radius, self.speed);
        match self.drones.first() {
            Some(template) => {
                drone.piercing = template.piercing;
                drone.sticky = template.sticky;
                drone.warp = template.warp;
                drone.pos = template.pos;
            }
            None => drone.follow(ship),
        }

        let angle = if spread > 0.0 {
            rng.random_range(-spread..spread)
        } else {
            0.0
        };
        drone.launched = true;
        drone.vel = Vec2::new(angle.sin(), -angle.cos()) * drone.speed;
        self.drones.push(drone);
        id
    }

    /// Remove a drone; returns false if no such drone exists
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.drones.len();
        self.drones.retain(|d| d.id != id);
        self.drones.len() != before
    }

    /// Put a drone back on the ship, unlaunched and without power-up flags
    pub fn reset_onto(&mut self, id: u32, ship: &Ship) {
        if let Some(drone) = self.drones.iter_mut().find(|d| d.id == id) {
            drone.launched = false;
            drone.vel = Vec2::ZERO;
            drone.attach_offset = 0.0;
            drone.clear_flags();
            drone.follow(ship);
        }
    }

    /// Launch every attached drone; returns how many left the ship
    pub fn launch_all(&mut self) -> usize {
        let mut launched = 0;
        for drone in self.drones.iter_mut().filter(|d| !d.launched) {
            drone.launch();
            launched += 1;
        }
        launched
    }

    /// Keep attached drones glued to the ship
    pub fn follow_ship(&mut self, ship: &Ship) {
        for drone in &mut self.drones {
            drone.follow(ship);
        }
    }

    /// Start a level with exactly one attached drone
    pub fn reset(&mut self, ship: &Ship) {
        self.drones.clear();
        self.spawn_attached(ship);
    }
}
