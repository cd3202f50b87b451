//! Collision rules
//!
//! Pure contact tests between drones, the ship, asteroids and capsules.
//! Each resolver mutates only the entities it touches (and the session's
//! score/phase) and reports what happened as [`CollisionEvent`]s. Timers,
//! combos and presentation are the frame handler's business.
//!
//! All overlap tests are strict: shapes that exactly touch do not collide.

use glam::Vec2;

use super::field::AsteroidField;
use super::session::Session;
use super::state::{Asteroid, Capsule, Drone, MaterialKey, Ship, SizeClass};
use crate::tuning::Tuning;

/// An asteroid destroyed by a drone
#[derive(Debug, Clone)]
pub struct Destruction {
    pub asteroid: u32,
    /// Drone position at impact
    pub at: Vec2,
    /// Points already added to the session score
    pub points: u64,
    pub material: MaterialKey,
    pub size: SizeClass,
    /// Fragments appended to the field
    pub children: Vec<Asteroid>,
}

/// Outcome of a contact test
#[derive(Debug, Clone)]
pub enum CollisionEvent {
    /// Drone reflected off the ship or an indestructible asteroid
    Bounce { at: Vec2 },
    /// Sticky drone attached to the ship
    Sticky { offset: f32 },
    /// Asteroid took damage but survived (no score)
    AsteroidDamage {
        asteroid: u32,
        at: Vec2,
        hp: i32,
        material: MaterialKey,
        size: SizeClass,
    },
    /// Asteroid destroyed without fragments
    AsteroidHit(Destruction),
    /// Asteroid destroyed and split into fragments
    AsteroidFragment(Destruction),
    /// Capsule caught by the ship
    Collected { power_up: &'static str, at: Vec2 },
    /// Field cleared
    Win,
}

impl CollisionEvent {
    pub fn destruction(&self) -> Option<&Destruction> {
        match self {
            CollisionEvent::AsteroidHit(d) | CollisionEvent::AsteroidFragment(d) => Some(d),
            _ => None,
        }
    }
}

/// Axis-aligned overlap between a drone's bounding box and a rectangle
#[inline]
fn drone_overlaps(drone: &Drone, pos: Vec2, size: Vec2) -> bool {
    drone.pos.x + drone.radius > pos.x
        && drone.pos.x - drone.radius < pos.x + size.x
        && drone.pos.y + drone.radius > pos.y
        && drone.pos.y - drone.radius < pos.y + size.y
}

/// Reflect along the axis of least penetration
fn reflect_off(drone: &mut Drone, pos: Vec2, size: Vec2) {
    let overlap_x = (drone.pos.x + drone.radius).min(pos.x + size.x) - (drone.pos.x - drone.radius).max(pos.x);
    let overlap_y = (drone.pos.y + drone.radius).min(pos.y + size.y) - (drone.pos.y - drone.radius).max(pos.y);
    if overlap_x < overlap_y {
        drone.vel.x = -drone.vel.x;
    } else {
        drone.vel.y = -drone.vel.y;
    }
}

/// Points for destroying an asteroid at the given multipliers
pub fn destruction_points(
    tuning: &Tuning,
    size: SizeClass,
    material: MaterialKey,
    score_multiplier: f32,
    combo: u32,
) -> u64 {
    let base = tuning.base_points.get(size) as f64;
    let combo_mult = tuning.combo_multiplier(combo) as f64;
    (base * material.points_mult() as f64 * score_multiplier as f64 * combo_mult).round() as u64
}

/// Drone against the ship. Only a descending drone can hit it.
pub fn resolve_ship_contact(drone: &mut Drone, ship: &Ship) -> Option<CollisionEvent> {
    if !drone.launched || drone.vel.y <= 0.0 {
        return None;
    }
    if !drone_overlaps(drone, ship.pos, Vec2::new(ship.width, ship.height)) {
        return None;
    }

    drone.pos.y = ship.top() - drone.radius;

    if drone.sticky {
        drone.launched = false;
        drone.vel = Vec2::ZERO;
        drone.attach_offset = drone.pos.x - ship.center_x();
        return Some(CollisionEvent::Sticky {
            offset: drone.attach_offset,
        });
    }

    // Strike position across the ship: 0 = left edge, 1 = right edge
    let hit = ((drone.pos.x - ship.left()) / ship.width).clamp(0.0, 1.0);
    drone.vel.x = drone.speed * (hit - 0.5) * 2.0;
    drone.vel.y = -drone.vel.y.abs();
    Some(CollisionEvent::Bounce { at: drone.pos })
}

/// Drone against the asteroid field.
///
/// Scans a snapshot of the live asteroid indices, so fragments appended
/// mid-scan are not visited this frame. A regular drone stops at its first
/// contact; a piercing drone resolves every asteroid it overlaps. Every
/// destruction in one scan is scored at the combo value the scan started
/// with. A drone parked on the ship touches nothing.
pub fn resolve_asteroid_contact<F: AsteroidField + ?Sized>(
    drone: &mut Drone,
    field: &mut F,
    session: &mut Session,
    tuning: &Tuning,
) -> Vec<CollisionEvent> {
    let mut events = Vec::new();
    if !drone.launched {
        return events;
    }
    let combo = session.combo;

    let snapshot: Vec<usize> = field
        .grid()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.alive)
        .map(|(i, _)| i)
        .collect();

    for index in snapshot {
        let asteroid = &field.grid()[index];
        if !asteroid.alive || !drone_overlaps(drone, asteroid.pos, asteroid.size) {
            continue;
        }

        if !asteroid.destructible {
            if !drone.piercing {
                let (pos, size) = (asteroid.pos, asteroid.size);
                reflect_off(drone, pos, size);
                events.push(CollisionEvent::Bounce { at: drone.pos });
                return events;
            }
            events.push(CollisionEvent::Bounce { at: drone.pos });
            continue;
        }

        if !drone.piercing {
            drone.vel.y = -drone.vel.y;
        }

        let asteroid = &mut field.grid_mut()[index];
        asteroid.hp -= 1;
        let (id, hp, material, size) = (asteroid.id, asteroid.hp, asteroid.material, asteroid.size_class);

        if hp > 0 {
            events.push(CollisionEvent::AsteroidDamage {
                asteroid: id,
                at: drone.pos,
                hp,
                material,
                size,
            });
        } else {
            let children = field.fragment(index, drone.pos);
            field.grid_mut()[index].alive = false;

            let points = destruction_points(tuning, size, material, session.score_multiplier, combo);
            session.score += points;

            let destruction = Destruction {
                asteroid: id,
                at: drone.pos,
                points,
                material,
                size,
                children,
            };
            events.push(if destruction.children.is_empty() {
                CollisionEvent::AsteroidHit(destruction)
            } else {
                CollisionEvent::AsteroidFragment(destruction)
            });
        }

        if !drone.piercing {
            return events;
        }
    }

    events
}

/// True once a launched drone has fallen a full radius past the bottom edge
pub fn is_drone_lost(drone: &Drone, boundary_height: f32) -> bool {
    drone.launched && drone.pos.y - boundary_height > drone.radius
}

/// Capsules against the ship (circle vs rectangle)
pub fn resolve_capsule_contact(capsules: &mut [Capsule], ship: &Ship) -> Vec<CollisionEvent> {
    let mut events = Vec::new();
    for capsule in capsules.iter_mut().filter(|c| c.alive) {
        let closest = Vec2::new(
            capsule.pos.x.clamp(ship.left(), ship.right()),
            capsule.pos.y.clamp(ship.top(), ship.bottom()),
        );
        if capsule.pos.distance_squared(closest) < capsule.radius * capsule.radius {
            capsule.alive = false;
            events.push(CollisionEvent::Collected {
                power_up: capsule.power_up,
                at: capsule.pos,
            });
        }
    }
    events
}

/// Win once no destructible asteroid is left. A won session reports nothing.
pub fn resolve_win_condition<F: AsteroidField + ?Sized>(field: &F, session: &mut Session) -> Option<CollisionEvent> {
    if field.remaining() == 0 && session.win() {
        Some(CollisionEvent::Win)
    } else {
        None
    }
}
