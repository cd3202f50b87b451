//! Drone Breaker headless demo
//!
//! Plays one level with a simple autopilot on a fixed 60 Hz step and prints
//! the scoreboard as JSON.
//!
//! Usage: `drone-breaker [tuning.json] [settings.json]`

use std::rc::Rc;

use glam::Vec2;

use drone_breaker::consts::SIM_DT;
use drone_breaker::intensity::{IntensityDirector, MusicPort, SmoothedEffects};
use drone_breaker::ports::{EffectSink, RandomDrops};
use drone_breaker::sim::{AsteroidField, CollisionHandler, GridField, MaterialKey, SizeClass, World};
use drone_breaker::{Clock, ConfigError, ManualClock, Scoreboard, Settings, Tuning};

/// Give up after five simulated minutes
const MAX_FRAMES: u64 = 60 * 60 * 5;
const SEED: u64 = 0xD20E;

/// Music port that only logs
struct LogMusic;

impl MusicPort for LogMusic {
    fn set_intensity(&mut self, _level: u8) {}

    fn request_section_change(&mut self) {
        log::debug!("Music section change requested");
    }

    fn set_volume(&mut self, music: f32, sfx: f32) {
        log::info!("Mixer: music {music:.2}, sfx {sfx:.2}");
    }

    fn on_win(&mut self) {
        log::debug!("Music: victory sting");
    }

    fn on_game_over(&mut self) {
        log::debug!("Music: game over sting");
    }
}

/// Counts effect requests
#[derive(Default)]
struct TallySink {
    explosions: u32,
    shakes: u32,
    debris: u32,
}

impl EffectSink for TallySink {
    fn spawn_explosion(&mut self, _at: Vec2, _color: u32) {
        self.explosions += 1;
    }
    fn trigger_shake(&mut self, _amount: f32) {
        self.shakes += 1;
    }
    fn spawn_debris(&mut self, _at: Vec2, _color: u32, count: u32) {
        self.debris += count;
    }
}

impl Drop for TallySink {
    fn drop(&mut self) {
        log::info!(
            "Effects: {} explosions, {} shakes, {} debris",
            self.explosions,
            self.shakes,
            self.debris
        );
    }
}

/// Rows of asteroids, toughest at the top, with two obsidian pillars
fn build_field(tuning: &Tuning) -> GridField {
    const COLS: usize = 10;
    const CELL: Vec2 = Vec2::new(64.0, 22.0);
    const GAP: f32 = 8.0;
    let rows = [
        (SizeClass::Large, MaterialKey::Iron),
        (SizeClass::Medium, MaterialKey::Crystal),
        (SizeClass::Medium, MaterialKey::Ice),
        (SizeClass::Small, MaterialKey::Rock),
        (SizeClass::Small, MaterialKey::Rock),
    ];

    let mut field = GridField::new(tuning.asteroid_hp);
    let origin = Vec2::new((tuning.field_width - COLS as f32 * (CELL.x + GAP) + GAP) / 2.0, 60.0);
    for (row, (size, material)) in rows.iter().enumerate() {
        for col in 0..COLS {
            let pos = origin + Vec2::new(col as f32 * (CELL.x + GAP), row as f32 * (CELL.y + GAP));
            field.spawn(pos, CELL, *size, *material);
        }
    }
    let pillar_y = origin.y + rows.len() as f32 * (CELL.y + GAP) + 40.0;
    field.spawn(Vec2::new(120.0, pillar_y), CELL, SizeClass::Medium, MaterialKey::Obsidian);
    field.spawn(
        Vec2::new(tuning.field_width - 120.0 - CELL.x, pillar_y),
        CELL,
        SizeClass::Medium,
        MaterialKey::Obsidian,
    );
    field
}

/// Track the lowest falling drone, offsetting a little to vary the angle
fn autopilot<F: AsteroidField>(world: &mut World<F>, frame: u64) {
    let target = world
        .drones
        .iter()
        .filter(|d| d.launched && d.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|d| d.pos.x)
        .or_else(|| world.capsules.first().map(|c| c.pos.x));
    if let Some(x) = target {
        let wobble = ((frame / 90) % 5) as f32 * 8.0 - 16.0;
        world.steer(x + wobble);
    }
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();
    log::info!("Drone Breaker (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };
    tuning.validate()?;
    let settings = match args.next() {
        Some(path) => Settings::load(&path),
        None => Settings::default(),
    };

    let clock = Rc::new(ManualClock::new(0));
    let director = IntensityDirector::from_settings(
        &settings,
        clock.clone(),
        tuning.combo_decay_ms,
        Box::new(LogMusic),
        Box::new(SmoothedEffects::default()),
    );
    let mut handler = CollisionHandler::new(tuning.clone(), clock.clone())
        .with_director(director)
        .with_effects(Box::new(TallySink::default()))
        .with_drops(Box::new(RandomDrops::new(SEED)))
        .with_settings(&settings);

    let mut world = World::new(&tuning, build_field(&tuning), SEED);
    let mut scoreboard = Scoreboard::new();
    handler.start_level(&mut world, Some(1));

    let mut sim_ms = 0.0f64;
    for frame in 0..MAX_FRAMES {
        let dt = SIM_DT * handler.time_scale();
        sim_ms += f64::from(SIM_DT) * 1000.0;
        clock.set(sim_ms as u64);

        autopilot(&mut world, frame);
        handler.launch(&mut world);
        world.advance(dt);

        let report = handler.frame(&mut world);
        for id in &report.expired {
            log::debug!("{id} wore off");
        }
        if let Some(summary) = report.summary {
            log::info!(
                "Level cleared in {:.1}s with {} lives left ({} stars)",
                summary.elapsed_secs,
                summary.lives_left,
                summary.stars
            );
            scoreboard.add(summary);
            break;
        }
        if report.game_over {
            log::info!("Out of lives after {:.1}s", world.session.elapsed_time(clock.now()));
            break;
        }
    }

    log::info!(
        "Final score {} at intensity {}, {} of {} asteroids left",
        world.session.score,
        handler.director().intensity(),
        world.field.remaining(),
        world.field.total()
    );
    println!("{}", scoreboard.to_json()?);
    Ok(())
}
