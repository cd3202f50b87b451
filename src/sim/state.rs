//! Entities the per-frame rules operate on
//!
//! Screen coordinates: origin top-left, y grows downward. Rectangles store
//! their top-left corner in `pos`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Size one fragmentation step down, if any
    pub fn smaller(self) -> Option<Self> {
        match self {
            SizeClass::Large => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Small),
            SizeClass::Small => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

/// Asteroid material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialKey {
    #[default]
    Rock,
    Ice,
    Iron,
    Crystal,
    /// Cannot be destroyed, doesn't count for the field clear
    Obsidian,
}

impl MaterialKey {
    pub fn points_mult(&self) -> f32 {
        match self {
            MaterialKey::Rock => 1.0,
            MaterialKey::Ice => 1.2,
            MaterialKey::Iron => 1.5,
            MaterialKey::Crystal => 2.0,
            MaterialKey::Obsidian => 0.0,
        }
    }

    /// Explosion color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            MaterialKey::Rock => 0x8B7D6B,
            MaterialKey::Ice => 0x9FE7FF,
            MaterialKey::Iron => 0xB0B4BA,
            MaterialKey::Crystal => 0xD98CFF,
            MaterialKey::Obsidian => 0x2A2235,
        }
    }

    pub fn is_destructible(&self) -> bool {
        *self != MaterialKey::Obsidian
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Nominal speed, used to remap velocity off the ship
    pub speed: f32,
    /// False while attached to the ship
    pub launched: bool,
    /// Passes through asteroids without reflecting
    pub piercing: bool,
    /// Attaches to the ship instead of bouncing
    pub sticky: bool,
    /// Wraps around the side walls instead of reflecting
    pub warp: bool,
    /// Horizontal offset from the ship's center while attached
    pub attach_offset: f32,
}

impl Drone {
    pub fn new(id: u32, radius: f32, speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            speed,
            launched: false,
            piercing: false,
            sticky: false,
            warp: false,
            attach_offset: 0.0,
        }
    }

    pub fn clear_flags(&mut self) {
        self.piercing = false;
        self.sticky = false;
        self.warp = false;
    }

    /// Place an attached drone on top of the ship at its offset
    pub fn follow(&mut self, ship: &Ship) {
        if !self.launched {
            self.pos = Vec2::new(ship.center_x() + self.attach_offset, ship.top() - self.radius);
        }
    }

    /// Release an attached drone straight up
    pub fn launch(&mut self) {
        if !self.launched {
            self.launched = true;
            self.vel = Vec2::new(0.0, -self.speed);
        }
    }

    /// Move a launched drone, reflecting off (or wrapping through) the walls.
    /// The bottom edge is open: losing the drone is the collision rules' call.
    pub fn advance(&mut self, dt: f32, bounds: Vec2) {
        if !self.launched {
            return;
        }
        self.pos += self.vel * dt;

        if self.warp {
            if self.pos.x < 0.0 {
                self.pos.x += bounds.x;
            } else if self.pos.x > bounds.x {
                self.pos.x -= bounds.x;
            }
        } else if self.pos.x - self.radius < 0.0 {
            self.pos.x = self.radius;
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x + self.radius > bounds.x {
            self.pos.x = bounds.x - self.radius;
            self.vel.x = -self.vel.x.abs();
        }

        if self.pos.y - self.radius < 0.0 {
            self.pos.y = self.radius;
            self.vel.y = self.vel.y.abs();
        }
    }
}

/// The player's launcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Ship {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self { pos, width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    /// Change width keeping the center fixed
    pub fn set_width_centered(&mut self, width: f32) {
        let center = self.center_x();
        self.width = width;
        self.pos.x = center - width / 2.0;
    }

    /// Move so the center sits at `x`, kept inside `[0, field_width]`
    pub fn move_to(&mut self, x: f32, field_width: f32) {
        let max_left = (field_width - self.width).max(0.0);
        self.pos.x = (x - self.width / 2.0).clamp(0.0, max_left);
    }
}

/// An obstacle in the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub destructible: bool,
    /// Meaningless for indestructible asteroids, which are never damaged
    pub hp: i32,
    pub max_hp: i32,
    pub size_class: SizeClass,
    pub material: MaterialKey,
}

impl Asteroid {
    pub fn new(id: u32, pos: Vec2, size: Vec2, size_class: SizeClass, material: MaterialKey, hp: i32) -> Self {
        Self {
            id,
            pos,
            size,
            alive: true,
            destructible: material.is_destructible(),
            hp,
            max_hp: hp,
            size_class,
            material,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Returns true if this asteroid must be destroyed to clear the field
    pub fn counts_for_clear(&self) -> bool {
        self.alive && self.destructible
    }
}

/// A falling pickup that activates a power-up when caught
#[derive(Debug, Clone, Serialize)]
pub struct Capsule {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub power_up: &'static str,
    pub alive: bool,
}

impl Capsule {
    pub fn fall(&mut self, dt: f32, field_height: f32) {
        self.pos += self.vel * dt;
        if self.pos.y - self.radius > field_height {
            self.alive = false;
        }
    }
}
