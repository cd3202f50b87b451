//! Session state machine
//!
//! `Menu -> WorldMap -> Playing <-> Paused`, `Playing -> GameOver`,
//! `Playing -> Won -> Stats -> WorldMap`. Guards make every transition a
//! no-op from the wrong source state.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Menu,
    WorldMap,
    /// Active gameplay
    Playing,
    Paused,
    /// Run ended with no lives left
    GameOver,
    /// Field cleared
    Won,
    /// Post-level results screen
    Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    pub lives: u32,
    pub max_lives: u32,
    pub score: u64,
    /// Session-wide score multiplier, never below 1
    pub score_multiplier: f32,
    /// Consecutive destructions since the last bounce or life loss
    pub combo: u32,
    pub level_id: Option<u32>,
    pub level_start: Millis,
}

impl Session {
    pub fn new(max_lives: u32) -> Self {
        Self {
            phase: GamePhase::Menu,
            lives: max_lives,
            max_lives,
            score: 0,
            score_multiplier: 1.0,
            combo: 0,
            level_id: None,
            level_start: 0,
        }
    }

    /// Begin a level. Lives carry over between levels unless the last run
    /// used them all up.
    pub fn start(&mut self, level_id: Option<u32>, now: Millis) {
        self.score = 0;
        self.combo = 0;
        self.score_multiplier = 1.0;
        if self.lives == 0 {
            self.lives = self.max_lives;
        }
        if level_id.is_some() {
            self.level_id = level_id;
        }
        self.level_start = now;
        self.phase = GamePhase::Playing;
        log::info!(
            "Level {:?} started with {} lives",
            self.level_id,
            self.lives
        );
    }

    pub fn pause(&mut self) -> bool {
        self.transition(GamePhase::Playing, GamePhase::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(GamePhase::Paused, GamePhase::Playing)
    }

    /// Lose a life (floored at 0) and return what is left. Ending the run is
    /// the caller's decision.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Add lives, capped at the maximum
    pub fn gain_lives(&mut self, delta: u32) {
        self.lives = (self.lives + delta).min(self.max_lives);
    }

    pub fn game_over(&mut self) -> bool {
        let changed = self.transition(GamePhase::Playing, GamePhase::GameOver);
        if changed {
            log::info!("Game over with score {}", self.score);
        }
        changed
    }

    pub fn win(&mut self) -> bool {
        let changed = self.transition(GamePhase::Playing, GamePhase::Won);
        if changed {
            log::info!("Level {:?} cleared with score {}", self.level_id, self.score);
        }
        changed
    }

    pub fn show_stats(&mut self) -> bool {
        self.transition(GamePhase::Won, GamePhase::Stats)
    }

    pub fn open_world_map(&mut self) -> bool {
        match self.phase {
            GamePhase::Menu | GamePhase::Stats | GamePhase::GameOver => {
                self.phase = GamePhase::WorldMap;
                true
            }
            _ => false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Seconds since the level started
    pub fn elapsed_time(&self, now: Millis) -> f64 {
        now.saturating_sub(self.level_start) as f64 / 1000.0
    }

    fn transition(&mut self, from: GamePhase, to: GamePhase) -> bool {
        if self.phase != from {
            return false;
        }
        self.phase = to;
        true
    }
}
