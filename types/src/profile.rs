use serde::{Deserialize, Serialize};

use crate::SessionOutcome;

/// Health assigned to a freshly spawned profile.
pub const SPAWN_HEALTH: u32 = 100;

/// The caller's on-ledger player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub owner: String,
    pub experience: u32,
    pub health: u32,
    pub coins: u64,
    /// Days since the Unix epoch.
    pub creation_day: u64,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub best_level: u8,
    pub last_score: u64,
}

impl PlayerProfile {
    /// The record `spawn_player` creates: full health, every counter zeroed.
    #[must_use]
    pub fn spawned(owner: impl Into<String>, creation_day: u64) -> Self {
        Self {
            owner: owner.into(),
            experience: 0,
            health: SPAWN_HEALTH,
            coins: 0,
            creation_day,
            games_played: 0,
            wins: 0,
            losses: 0,
            best_level: 0,
            last_score: 0,
        }
    }

    /// Fold a settled outcome into the stats the ledger tracks.
    pub fn record_outcome(&mut self, outcome: &SessionOutcome) {
        self.games_played = self.games_played.saturating_add(1);
        if outcome.won {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        self.best_level = self.best_level.max(outcome.level);
        self.last_score = outcome.score;
    }

    #[must_use]
    pub fn win_rate_percent(&self) -> u32 {
        if self.games_played == 0 {
            return 0;
        }
        ((u64::from(self.wins) * 100 + u64::from(self.games_played) / 2)
            / u64::from(self.games_played)) as u32
    }
}
