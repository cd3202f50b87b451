//! Run summaries and the best-runs leaderboard
//!
//! Serialisable so an external persistence layer can store it as JSON.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::sim::session::Session;

/// Maximum number of runs to keep
pub const MAX_ENTRIES: usize = 10;

/// Outcome of a won level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub level_id: Option<u32>,
    pub score: u64,
    /// Seconds from level start to the win
    pub elapsed_secs: f64,
    pub lives_left: u32,
    /// 1-3
    pub stars: u8,
}

impl RunSummary {
    pub fn from_session(session: &Session, now: Millis, par_secs: f64) -> Self {
        let elapsed_secs = session.elapsed_time(now);
        Self {
            level_id: session.level_id,
            score: session.score,
            elapsed_secs,
            lives_left: session.lives,
            stars: star_rating(elapsed_secs, par_secs),
        }
    }
}

/// 3 stars within par, 2 within twice par, otherwise 1
pub fn star_rating(elapsed_secs: f64, par_secs: f64) -> u8 {
    if elapsed_secs <= par_secs {
        3
    } else if elapsed_secs <= par_secs * 2.0 {
        2
    } else {
        1
    }
}

/// Best runs, sorted by score descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<RunSummary>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns its rank or None if it didn't qualify
    pub fn add(&mut self, run: RunSummary) -> Option<usize> {
        let rank = self.potential_rank(run.score)?;
        self.entries.insert(rank - 1, run);
        self.entries.truncate(MAX_ENTRIES);
        log::info!("New scoreboard entry at rank {}", rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Best run for one level
    pub fn best_for_level(&self, level_id: u32) -> Option<&RunSummary> {
        self.entries.iter().find(|e| e.level_id == Some(level_id))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
