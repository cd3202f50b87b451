//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must stay deterministic:
//! - Time only from the injected clock
//! - Seeded RNG only
//! - Stable iteration order (grid order for asteroids, id order for power-ups)
//! - No rendering or platform dependencies

pub mod collision;
pub mod drones;
pub mod field;
pub mod powerup;
pub mod session;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{
    CollisionEvent, Destruction, destruction_points, is_drone_lost, resolve_asteroid_contact,
    resolve_capsule_contact, resolve_ship_contact, resolve_win_condition,
};
pub use drones::DroneManager;
pub use field::{AsteroidField, GridField};
pub use powerup::{
    ActivePowerUp, CATALOG, DroneFlag, Effect, PowerUpDef, PowerUpDuration, PowerUpManager, Remaining,
    StackPolicy, find_def,
};
pub use session::{GamePhase, Session};
pub use state::{Asteroid, Capsule, Drone, MaterialKey, Ship, SizeClass};
pub use tick::{CollisionHandler, FrameReport};
pub use world::World;
