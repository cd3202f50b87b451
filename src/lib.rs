//! Drone Breaker - collision, power-up and intensity core of an arcade game
//!
//! Core modules:
//! - `sim`: Deterministic per-frame rules (collisions, session, drones, power-ups)
//! - `intensity`: Derives a 0-4 intensity level for music/visual presentation
//! - `ports`: Collaborator contracts (effect sinks, drop system)
//! - `clock`: Injected time source
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod clock;
pub mod error;
pub mod intensity;
pub mod ports;
pub mod scoreboard;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use error::ConfigError;
pub use intensity::IntensityDirector;
pub use scoreboard::{RunSummary, Scoreboard};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Lives at the start of a fresh run
    pub const MAX_LIVES: u32 = 3;

    /// Drone defaults
    pub const DRONE_RADIUS: f32 = 6.0;
    pub const DRONE_SPEED: f32 = 360.0;
    /// Half-angle (radians) of the cone a spawned drone launches into
    pub const DRONE_SPAWN_SPREAD: f32 = 0.5;

    /// Ship defaults
    pub const SHIP_WIDTH: f32 = 100.0;
    pub const SHIP_HEIGHT: f32 = 14.0;
    /// Gap between ship bottom and the field's lower edge
    pub const SHIP_MARGIN: f32 = 30.0;

    /// Base points per asteroid size
    pub const POINTS_SMALL: u32 = 10;
    pub const POINTS_MEDIUM: u32 = 25;
    pub const POINTS_LARGE: u32 = 50;

    /// Hit points for freshly spawned asteroids
    pub const HP_SMALL: i32 = 1;
    pub const HP_MEDIUM: i32 = 2;
    pub const HP_LARGE: i32 = 3;

    /// Screen shake per destroyed asteroid size
    pub const SHAKE_SMALL: f32 = 2.0;
    pub const SHAKE_MEDIUM: f32 = 4.0;
    pub const SHAKE_LARGE: f32 = 7.0;

    /// Every N combo steps adds one to the score multiplier
    pub const COMBO_STEP: u32 = 5;
    /// How long the combo counter stays on screen after a destruction (ms)
    pub const COMBO_FADE_MS: u64 = 1500;
    /// Slow-motion window after the last asteroid falls (ms)
    pub const SLOW_MOTION_MS: u64 = 800;
    pub const SLOW_MOTION_SCALE: f32 = 0.25;
    /// Intensity combo decays by one after this long without a destruction (ms)
    pub const COMBO_DECAY_MS: u64 = 3000;

    /// Capsule defaults
    pub const CAPSULE_RADIUS: f32 = 10.0;
    pub const CAPSULE_FALL_SPEED: f32 = 120.0;

    /// Level completion time for a three star rating (seconds)
    pub const PAR_TIME_SECS: f64 = 90.0;
}
