//! Outbound collaborators of the frame handler
//!
//! Visual effect sinks and the drop decision. Both are fire-and-forget from
//! the handler's point of view.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::state::{MaterialKey, SizeClass};

/// Particle and camera effects
pub trait EffectSink {
    fn spawn_explosion(&mut self, at: Vec2, color: u32);
    fn trigger_shake(&mut self, amount: f32);
    fn spawn_debris(&mut self, at: Vec2, color: u32, count: u32);
}

#[derive(Debug, Default)]
pub struct NoopEffectSink;

impl EffectSink for NoopEffectSink {
    fn spawn_explosion(&mut self, _at: Vec2, _color: u32) {}
    fn trigger_shake(&mut self, _amount: f32) {}
    fn spawn_debris(&mut self, _at: Vec2, _color: u32, _count: u32) {}
}

/// Decides whether a destroyed asteroid drops a power-up capsule
pub trait DropSystem {
    /// Consulted once per destruction
    fn decide_drop(&mut self, material: MaterialKey, size: SizeClass) -> Option<&'static str>;
}

#[derive(Debug, Default)]
pub struct NoDrops;

impl DropSystem for NoDrops {
    fn decide_drop(&mut self, _material: MaterialKey, _size: SizeClass) -> Option<&'static str> {
        None
    }
}

/// Default weighted drop table
pub const DEFAULT_DROP_TABLE: &[(&str, u32)] = &[
    ("wide", 20),
    ("narrow", 8),
    ("pierce", 12),
    ("sticky", 12),
    ("warp", 6),
    ("double", 12),
    ("life", 4),
    ("multi", 14),
    ("quake", 6),
];

/// Seeded random drops: a per-size chance, then a weighted pick
#[derive(Debug, Clone)]
pub struct RandomDrops {
    rng: Pcg32,
    /// Drop chance for small, medium, large
    chance: [f32; 3],
    table: Vec<(&'static str, u32)>,
}

impl RandomDrops {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            chance: [0.08, 0.15, 0.25],
            table: DEFAULT_DROP_TABLE.to_vec(),
        }
    }

    pub fn with_chance(mut self, small: f32, medium: f32, large: f32) -> Self {
        self.chance = [small, medium, large].map(|c| c.clamp(0.0, 1.0));
        self
    }

    pub fn with_table(mut self, table: Vec<(&'static str, u32)>) -> Self {
        self.table = table;
        self
    }

    fn chance_for(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Small => self.chance[0],
            SizeClass::Medium => self.chance[1],
            SizeClass::Large => self.chance[2],
        }
    }

    fn pick(&mut self) -> Option<&'static str> {
        let total: u32 = self.table.iter().map(|(_, w)| w).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.rng.random_range(0..total);
        for &(id, weight) in &self.table {
            if roll < weight {
                return Some(id);
            }
            roll -= weight;
        }
        None
    }
}

impl DropSystem for RandomDrops {
    fn decide_drop(&mut self, material: MaterialKey, size: SizeClass) -> Option<&'static str> {
        if !material.is_destructible() {
            return None;
        }
        let chance = self.chance_for(size);
        if chance <= 0.0 || self.rng.random::<f32>() >= chance {
            return None;
        }
        self.pick()
    }
}
