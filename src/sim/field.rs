//! Asteroid field collaborator
//!
//! The collision rules only need an ordered, mutable grid of asteroids, a
//! live count, and a way to break an asteroid apart. [`GridField`] is the
//! in-crate implementation; procedural layout is left to whoever builds it.

use glam::Vec2;

use super::state::{Asteroid, MaterialKey, SizeClass};
use crate::tuning::PerSize;

pub trait AsteroidField {
    /// All asteroids, dead ones included, in stable order
    fn grid(&self) -> &[Asteroid];

    fn grid_mut(&mut self) -> &mut [Asteroid];

    /// Live destructible asteroids
    fn remaining(&self) -> usize;

    /// Destructible asteroids ever placed (initial layout plus fragments)
    fn total(&self) -> usize;

    /// Kill the asteroid at `index` and append any fragments to the grid.
    /// Returns copies of the appended fragments.
    fn fragment(&mut self, index: usize, hit: Vec2) -> Vec<Asteroid>;

    /// Remaining fraction in `[0, 1]`
    fn remaining_ratio(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.remaining() as f32 / total as f32).clamp(0.0, 1.0)
        }
    }
}

/// Flat asteroid grid with size-step fragmentation
#[derive(Debug, Clone)]
pub struct GridField {
    grid: Vec<Asteroid>,
    total: usize,
    hp: PerSize<i32>,
    next_id: u32,
}

impl GridField {
    pub fn new(hp: PerSize<i32>) -> Self {
        Self {
            grid: Vec::new(),
            total: 0,
            hp,
            next_id: 1,
        }
    }

    pub fn with_asteroids(hp: PerSize<i32>, asteroids: impl IntoIterator<Item = Asteroid>) -> Self {
        let mut field = Self::new(hp);
        for asteroid in asteroids {
            field.push(asteroid);
        }
        field
    }

    /// Allocate an asteroid ID
    pub fn next_asteroid_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, asteroid: Asteroid) {
        if asteroid.counts_for_clear() {
            self.total += 1;
        }
        self.next_id = self.next_id.max(asteroid.id + 1);
        self.grid.push(asteroid);
    }

    /// Spawn a full-hp asteroid with a fresh ID
    pub fn spawn(&mut self, pos: Vec2, size: Vec2, size_class: SizeClass, material: MaterialKey) -> u32 {
        let id = self.next_asteroid_id();
        let hp = self.hp.get(size_class);
        self.push(Asteroid::new(id, pos, size, size_class, material, hp));
        id
    }

    /// Drop dead asteroids (between levels; never during a scan)
    pub fn compact(&mut self) {
        self.grid.retain(|a| a.alive);
    }
}

impl AsteroidField for GridField {
    fn grid(&self) -> &[Asteroid] {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut [Asteroid] {
        &mut self.grid
    }

    fn remaining(&self) -> usize {
        self.grid.iter().filter(|a| a.counts_for_clear()).count()
    }

    fn total(&self) -> usize {
        self.total
    }

    fn fragment(&mut self, index: usize, hit: Vec2) -> Vec<Asteroid> {
        let Some(parent) = self.grid.get_mut(index) else {
            return Vec::new();
        };
        parent.alive = false;
        let parent = parent.clone();

        let Some(child_class) = parent.size_class.smaller() else {
            return Vec::new();
        };

        // Split along the longer axis; the half nearer the hit point goes first
        let split_x = parent.size.x >= parent.size.y;
        let half = if split_x {
            Vec2::new(parent.size.x / 2.0, parent.size.y)
        } else {
            Vec2::new(parent.size.x, parent.size.y / 2.0)
        };
        let offset = if split_x { Vec2::new(half.x, 0.0) } else { Vec2::new(0.0, half.y) };
        let mut origins = [parent.pos, parent.pos + offset];
        let hit_in_second = if split_x {
            hit.x > parent.pos.x + half.x
        } else {
            hit.y > parent.pos.y + half.y
        };
        if hit_in_second {
            origins.swap(0, 1);
        }

        let hp = self.hp.get(child_class);
        let children: Vec<Asteroid> = origins
            .iter()
            .map(|&origin| {
                let id = self.next_asteroid_id();
                Asteroid::new(id, origin, half, child_class, parent.material, hp)
            })
            .collect();

        for child in &children {
            self.push(child.clone());
        }
        children
    }
}
