//! Gameplay intensity director
//!
//! Folds gameplay events into a 0-4 intensity level and pushes it to two
//! presentation ports (music and visual effects). The director never reads
//! anything back from the ports.
//!
//! Level derivation:
//! - base from the remaining asteroid ratio (`>0.8 -> 0`, `>0.5 -> 1`,
//!   `>0.3 -> 2`, `>0.1 -> 3`, else 4)
//! - combo adds 1 at 3+ and 2 at 6+
//! - an active power-up floors the level at 2, the last life floors it at 3

use std::rc::Rc;

use crate::clock::{Clock, Millis};
use crate::settings::Settings;

pub const MAX_INTENSITY: u8 = 4;

/// Music presentation port
pub trait MusicPort {
    /// Called on every recomputation, changed or not
    fn set_intensity(&mut self, level: u8);
    /// Called once per level change
    fn request_section_change(&mut self);

    /// Mixer levels, both in `[0, 1]`
    fn set_volume(&mut self, _music: f32, _sfx: f32) {}

    fn on_bounce(&mut self) {}
    fn on_asteroid_hit(&mut self) {}
    fn on_combo(&mut self, _combo: u32) {}
    fn on_power_up(&mut self) {}
    fn on_lose_life(&mut self) {}
    fn on_launch(&mut self) {}
    fn on_pause(&mut self) {}
    fn on_resume(&mut self) {}
    fn on_win(&mut self) {}
    fn on_game_over(&mut self) {}
}

/// Visual effects presentation port
pub trait EffectsPort {
    fn set_intensity(&mut self, level: u8);
    /// Advance one frame
    fn update(&mut self);
    fn effects(&self) -> VisualProfile;
}

/// Background effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualProfile {
    pub bloom: f32,
    pub star_speed: f32,
    pub pulse: f32,
}

impl VisualProfile {
    pub fn for_level(level: u8) -> Self {
        let level = level.min(MAX_INTENSITY) as f32;
        Self {
            bloom: 0.2 + 0.2 * level,
            star_speed: 1.0 + 0.5 * level,
            pulse: level / MAX_INTENSITY as f32,
        }
    }
}

#[derive(Debug, Default)]
pub struct NoopMusic;

impl MusicPort for NoopMusic {
    fn set_intensity(&mut self, _level: u8) {}
    fn request_section_change(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NoopEffects;

impl EffectsPort for NoopEffects {
    fn set_intensity(&mut self, _level: u8) {}
    fn update(&mut self) {}
    fn effects(&self) -> VisualProfile {
        VisualProfile::default()
    }
}

/// Eases the visual profile toward the current level's target
#[derive(Debug, Clone)]
pub struct SmoothedEffects {
    current: VisualProfile,
    target: VisualProfile,
    /// Fraction of the remaining gap closed per update
    rate: f32,
}

impl SmoothedEffects {
    pub fn new(rate: f32) -> Self {
        let base = VisualProfile::for_level(0);
        Self {
            current: base,
            target: base,
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for SmoothedEffects {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl EffectsPort for SmoothedEffects {
    fn set_intensity(&mut self, level: u8) {
        self.target = VisualProfile::for_level(level);
    }

    fn update(&mut self) {
        let ease = |from: f32, to: f32| from + (to - from) * self.rate;
        self.current = VisualProfile {
            bloom: ease(self.current.bloom, self.target.bloom),
            star_speed: ease(self.current.star_speed, self.target.star_speed),
            pulse: ease(self.current.pulse, self.target.pulse),
        };
    }

    fn effects(&self) -> VisualProfile {
        self.current
    }
}

/// Gameplay facts the director cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    LevelStart { lives: u32 },
    Launch,
    Bounce,
    AsteroidDestroyed { remaining_ratio: f32 },
    /// `lives` is the count after the pickup applied
    PowerUpCollected { any_active: bool, lives: u32 },
    PowerUpsExpired,
    LifeLost { lives: u32 },
    Pause,
    Resume,
    Win,
    GameOver,
}

/// Inputs and output of the level derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityState {
    pub intensity: u8,
    pub combo: u32,
    pub remaining_ratio: f32,
    pub power_up_active: bool,
    pub last_life: bool,
}

impl Default for IntensityState {
    fn default() -> Self {
        Self {
            intensity: 0,
            combo: 0,
            remaining_ratio: 1.0,
            power_up_active: false,
            last_life: false,
        }
    }
}

/// Level for the given inputs
pub fn compute_level(remaining_ratio: f32, combo: u32, power_up_active: bool, last_life: bool) -> u8 {
    let mut level: u8 = if remaining_ratio > 0.8 {
        0
    } else if remaining_ratio > 0.5 {
        1
    } else if remaining_ratio > 0.3 {
        2
    } else if remaining_ratio > 0.1 {
        3
    } else {
        4
    };

    if combo >= 6 {
        level += 2;
    } else if combo >= 3 {
        level += 1;
    }
    if power_up_active {
        level = level.max(2);
    }
    if last_life {
        level = level.max(3);
    }
    level.min(MAX_INTENSITY)
}

pub struct IntensityDirector {
    state: IntensityState,
    last_score_at: Millis,
    decay_ms: Millis,
    clock: Rc<dyn Clock>,
    music: Box<dyn MusicPort>,
    effects: Box<dyn EffectsPort>,
}

impl IntensityDirector {
    pub fn new(
        clock: Rc<dyn Clock>,
        decay_ms: Millis,
        music: Box<dyn MusicPort>,
        effects: Box<dyn EffectsPort>,
    ) -> Self {
        let last_score_at = clock.now();
        Self {
            state: IntensityState::default(),
            last_score_at,
            decay_ms,
            clock,
            music,
            effects,
        }
    }

    /// Director with feedback switched off
    pub fn disabled(clock: Rc<dyn Clock>, decay_ms: Millis) -> Self {
        Self::new(clock, decay_ms, Box::new(NoopMusic), Box::new(NoopEffects))
    }

    /// Director honouring the player's settings: the given ports when
    /// feedback is on (with the mixer levels pushed to the music port),
    /// no-op ports otherwise
    pub fn from_settings(
        settings: &Settings,
        clock: Rc<dyn Clock>,
        decay_ms: Millis,
        mut music: Box<dyn MusicPort>,
        effects: Box<dyn EffectsPort>,
    ) -> Self {
        if !settings.intensity_feedback {
            return Self::disabled(clock, decay_ms);
        }
        music.set_volume(settings.music_volume, settings.sfx_volume);
        Self::new(clock, decay_ms, music, effects)
    }

    pub fn state(&self) -> &IntensityState {
        &self.state
    }

    pub fn intensity(&self) -> u8 {
        self.state.intensity
    }

    pub fn effects(&self) -> VisualProfile {
        self.effects.effects()
    }

    pub fn notify(&mut self, event: GameEvent) {
        let now = self.clock.now();
        match event {
            GameEvent::LevelStart { lives } => {
                self.state.combo = 0;
                self.state.remaining_ratio = 1.0;
                self.state.power_up_active = false;
                self.state.last_life = lives <= 1;
                self.last_score_at = now;
            }
            GameEvent::Launch => self.music.on_launch(),
            GameEvent::Bounce => {
                self.state.combo = 0;
                self.music.on_bounce();
            }
            GameEvent::AsteroidDestroyed { remaining_ratio } => {
                self.state.combo += 1;
                self.state.remaining_ratio = remaining_ratio.clamp(0.0, 1.0);
                self.last_score_at = now;
                self.music.on_asteroid_hit();
                if self.state.combo >= 2 {
                    self.music.on_combo(self.state.combo);
                }
            }
            GameEvent::PowerUpCollected { any_active, lives } => {
                self.state.power_up_active = any_active;
                self.state.last_life = lives <= 1;
                self.music.on_power_up();
            }
            GameEvent::PowerUpsExpired => self.state.power_up_active = false,
            GameEvent::LifeLost { lives } => {
                self.state.combo = 0;
                self.state.last_life = lives <= 1;
                self.music.on_lose_life();
            }
            GameEvent::Pause => self.music.on_pause(),
            GameEvent::Resume => self.music.on_resume(),
            GameEvent::Win => self.music.on_win(),
            GameEvent::GameOver => self.music.on_game_over(),
        }
        self.recompute();
    }

    /// Per-frame tick: decays the combo after a quiet interval and advances
    /// the effects port
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if self.state.combo > 0 && now.saturating_sub(self.last_score_at) >= self.decay_ms {
            self.state.combo -= 1;
            self.last_score_at = now;
            self.recompute();
        }
        self.effects.update();
    }

    fn recompute(&mut self) {
        let s = &self.state;
        let level = compute_level(s.remaining_ratio, s.combo, s.power_up_active, s.last_life);
        if level != self.state.intensity {
            log::debug!("Intensity {} -> {}", self.state.intensity, level);
            self.state.intensity = level;
            self.music.request_section_change();
        }
        self.music.set_intensity(level);
        self.effects.set_intensity(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Volume(f32, f32),
        Level(u8),
        Section,
        Hook(&'static str),
        Combo(u32),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Call>>>);

    impl Recorder {
        fn take(&self) -> Vec<Call> {
            self.0.borrow_mut().drain(..).collect()
        }
    }

    impl MusicPort for Recorder {
        fn set_intensity(&mut self, level: u8) {
            self.0.borrow_mut().push(Call::Level(level));
        }
        fn request_section_change(&mut self) {
            self.0.borrow_mut().push(Call::Section);
        }
        fn set_volume(&mut self, music: f32, sfx: f32) {
            self.0.borrow_mut().push(Call::Volume(music, sfx));
        }
        fn on_bounce(&mut self) {
            self.0.borrow_mut().push(Call::Hook("bounce"));
        }
        fn on_asteroid_hit(&mut self) {
            self.0.borrow_mut().push(Call::Hook("hit"));
        }
        fn on_combo(&mut self, combo: u32) {
            self.0.borrow_mut().push(Call::Combo(combo));
        }
        fn on_lose_life(&mut self) {
            self.0.borrow_mut().push(Call::Hook("lose_life"));
        }
    }

    fn director() -> (Rc<ManualClock>, Recorder, IntensityDirector) {
        let clock = Rc::new(ManualClock::new(0));
        let music = Recorder::default();
        let director = IntensityDirector::new(clock.clone(), 3_000, Box::new(music.clone()), Box::new(SmoothedEffects::default()));
        (clock, music, director)
    }

    #[test]
    fn test_base_levels_from_ratio() {
        assert_eq!(compute_level(1.0, 0, false, false), 0);
        assert_eq!(compute_level(0.81, 0, false, false), 0);
        assert_eq!(compute_level(0.80, 0, false, false), 1);
        assert_eq!(compute_level(0.50, 0, false, false), 2);
        assert_eq!(compute_level(0.30, 0, false, false), 3);
        assert_eq!(compute_level(0.10, 0, false, false), 4);
        assert_eq!(compute_level(0.0, 0, false, false), 4);
    }

    #[test]
    fn test_combo_is_additive() {
        assert_eq!(compute_level(0.9, 3, false, false), 1);
        assert_eq!(compute_level(0.9, 6, false, false), 2);
        assert_eq!(compute_level(0.6, 6, false, false), 3);
        assert_eq!(compute_level(0.2, 6, false, false), 4);
    }

    #[test]
    fn test_floors() {
        assert_eq!(compute_level(1.0, 0, true, false), 2);
        assert_eq!(compute_level(1.0, 0, false, true), 3);
        assert_eq!(compute_level(1.0, 0, true, true), 3);
        assert_eq!(compute_level(0.6, 3, true, false), 2);
    }

    #[test]
    fn test_section_change_only_on_level_change() {
        let (_, music, mut director) = director();
        director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.9 });
        assert_eq!(music.take(), vec![Call::Hook("hit"), Call::Level(0)]);

        director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.75 });
        assert_eq!(
            music.take(),
            vec![Call::Hook("hit"), Call::Combo(2), Call::Section, Call::Level(1)]
        );
        assert_eq!(director.intensity(), 1);
    }

    #[test]
    fn test_bounce_resets_combo() {
        let (_, music, mut director) = director();
        for _ in 0..3 {
            director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.9 });
        }
        assert_eq!(director.intensity(), 1);
        music.take();
        director.notify(GameEvent::Bounce);
        assert_eq!(director.state().combo, 0);
        assert_eq!(music.take(), vec![Call::Hook("bounce"), Call::Section, Call::Level(0)]);
    }

    #[test]
    fn test_combo_decays_after_quiet_interval() {
        let (clock, _, mut director) = director();
        for _ in 0..3 {
            director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.9 });
        }
        clock.advance(2_999);
        director.tick();
        assert_eq!(director.state().combo, 3);
        clock.advance(1);
        director.tick();
        assert_eq!(director.state().combo, 2);
        assert_eq!(director.intensity(), 0);

        // Next step needs another full interval
        clock.advance(1_500);
        director.tick();
        assert_eq!(director.state().combo, 2);
        clock.advance(1_500);
        director.tick();
        assert_eq!(director.state().combo, 1);
    }

    #[test]
    fn test_scoring_postpones_decay() {
        let (clock, _, mut director) = director();
        director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.9 });
        clock.advance(2_000);
        director.notify(GameEvent::AsteroidDestroyed { remaining_ratio: 0.9 });
        clock.advance(2_000);
        director.tick();
        assert_eq!(director.state().combo, 2);
    }

    #[test]
    fn test_last_life_floor_and_release() {
        let (_, music, mut director) = director();
        director.notify(GameEvent::LifeLost { lives: 1 });
        assert_eq!(director.intensity(), 3);
        assert_eq!(music.take(), vec![Call::Hook("lose_life"), Call::Section, Call::Level(3)]);

        director.notify(GameEvent::LevelStart { lives: 3 });
        assert_eq!(director.intensity(), 0);
    }

    #[test]
    fn test_power_up_floor_until_expired() {
        let (_, _, mut director) = director();
        director.notify(GameEvent::PowerUpCollected { any_active: true, lives: 3 });
        assert_eq!(director.intensity(), 2);
        director.notify(GameEvent::PowerUpsExpired);
        assert_eq!(director.intensity(), 0);

        // Instant power-ups leave nothing active
        director.notify(GameEvent::PowerUpCollected { any_active: false, lives: 3 });
        assert_eq!(director.intensity(), 0);
    }

    #[test]
    fn test_extra_life_pickup_lifts_last_life_floor() {
        let (_, _, mut director) = director();
        director.notify(GameEvent::LifeLost { lives: 1 });
        assert!(director.state().last_life);
        assert_eq!(director.intensity(), 3);

        director.notify(GameEvent::PowerUpCollected { any_active: false, lives: 2 });
        assert!(!director.state().last_life);
        assert_eq!(director.intensity(), 0);
    }

    #[test]
    fn test_from_settings_routes_volumes() {
        let clock = Rc::new(ManualClock::new(0));
        let music = Recorder::default();
        let settings = Settings {
            music_volume: 0.4,
            sfx_volume: 0.9,
            ..Settings::default()
        };
        let mut director = IntensityDirector::from_settings(
            &settings,
            clock,
            3_000,
            Box::new(music.clone()),
            Box::new(NoopEffects),
        );
        assert_eq!(music.take(), vec![Call::Volume(0.4, 0.9)]);
        director.notify(GameEvent::LifeLost { lives: 1 });
        assert!(music.take().contains(&Call::Level(3)));
    }

    #[test]
    fn test_from_settings_without_feedback_is_silent() {
        let clock = Rc::new(ManualClock::new(0));
        let music = Recorder::default();
        let settings = Settings {
            intensity_feedback: false,
            ..Settings::default()
        };
        let mut director = IntensityDirector::from_settings(
            &settings,
            clock,
            3_000,
            Box::new(music.clone()),
            Box::new(SmoothedEffects::default()),
        );
        director.notify(GameEvent::LifeLost { lives: 1 });
        assert_eq!(director.intensity(), 3);
        assert!(music.take().is_empty());
    }

    #[test]
    fn test_smoothed_effects_ease_toward_target() {
        let mut effects = SmoothedEffects::new(0.5);
        effects.set_intensity(4);
        let start = effects.effects().bloom;
        effects.update();
        let mid = effects.effects().bloom;
        assert!(mid > start && mid < VisualProfile::for_level(4).bloom);
        for _ in 0..60 {
            effects.update();
        }
        assert!((effects.effects().bloom - VisualProfile::for_level(4).bloom).abs() < 1e-3);
    }

    #[test]
    fn test_disabled_director_still_tracks_level() {
        let clock = Rc::new(ManualClock::new(0));
        let mut director = IntensityDirector::disabled(clock, 3_000);
        director.notify(GameEvent::LifeLost { lives: 0 });
        assert_eq!(director.intensity(), 3);
        assert_eq!(director.effects(), VisualProfile::default());
    }

    proptest! {
        #[test]
        fn prop_level_in_range(ratio in 0.0f32..=1.0, combo in 0u32..50, power in any::<bool>(), last in any::<bool>()) {
            prop_assert!(compute_level(ratio, combo, power, last) <= MAX_INTENSITY);
        }

        #[test]
        fn prop_last_life_floor(ratio in 0.0f32..=1.0, combo in 0u32..50, power in any::<bool>()) {
            prop_assert!(compute_level(ratio, combo, power, true) >= 3);
        }
    }
}
