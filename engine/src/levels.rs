//! The difficulty curve: grid size, path length and reveal pacing per level.

use std::time::Duration;

use pathmem_types::Grid;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub grid_size: usize,
    pub path_length: usize,
    /// Time each path cell stays highlighted during the reveal.
    pub reveal_interval: Duration,
}

impl LevelConfig {
    #[must_use]
    pub const fn new(grid_size: usize, path_length: usize, reveal_ms: u64) -> Self {
        Self {
            grid_size,
            path_length,
            reveal_interval: Duration::from_millis(reveal_ms),
        }
    }

    #[must_use]
    pub const fn grid(&self) -> Grid {
        Grid::new(self.grid_size)
    }
}

pub const STANDARD_LEVELS: [LevelConfig; 15] = [
    LevelConfig::new(3, 3, 2000),
    LevelConfig::new(3, 4, 2000),
    LevelConfig::new(4, 4, 2000),
    LevelConfig::new(4, 5, 1800),
    LevelConfig::new(4, 6, 1800),
    LevelConfig::new(5, 6, 1800),
    LevelConfig::new(5, 7, 1600),
    LevelConfig::new(5, 8, 1600),
    LevelConfig::new(6, 8, 1500),
    LevelConfig::new(6, 9, 1500),
    LevelConfig::new(6, 10, 1400),
    LevelConfig::new(7, 10, 1400),
    LevelConfig::new(7, 11, 1300),
    LevelConfig::new(7, 12, 1300),
    LevelConfig::new(8, 12, 1200),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelTableError {
    #[error("level table is empty")]
    Empty,
    #[error("level table has {0} entries; levels are numbered with a u8")]
    TooLong(usize),
    #[error("level {level}: {reason}")]
    InvalidEntry { level: usize, reason: &'static str },
    #[error("level {level} is easier than the level before it")]
    NotMonotonic { level: usize },
}

/// Ordered level table, looked up by 1-based level number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgression {
    levels: Vec<LevelConfig>,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::standard()
    }
}

impl LevelProgression {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            levels: STANDARD_LEVELS.to_vec(),
        }
    }

    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, LevelTableError> {
        Self::validate(&levels)?;
        Ok(Self { levels })
    }

    /// Check entry bounds and that difficulty never decreases.
    pub fn validate(levels: &[LevelConfig]) -> Result<(), LevelTableError> {
        if levels.is_empty() {
            return Err(LevelTableError::Empty);
        }
        if levels.len() > usize::from(u8::MAX) {
            return Err(LevelTableError::TooLong(levels.len()));
        }
        for (i, entry) in levels.iter().enumerate() {
            let level = i + 1;
            if entry.grid_size < 3 {
                return Err(LevelTableError::InvalidEntry {
                    level,
                    reason: "grid size must be at least 3",
                });
            }
            if entry.path_length < entry.grid_size {
                return Err(LevelTableError::InvalidEntry {
                    level,
                    reason: "path length must be at least the grid size",
                });
            }
            if entry.path_length > entry.grid().cell_count() {
                return Err(LevelTableError::InvalidEntry {
                    level,
                    reason: "path length exceeds the number of cells",
                });
            }
            if entry.reveal_interval.is_zero() {
                return Err(LevelTableError::InvalidEntry {
                    level,
                    reason: "reveal interval must be positive",
                });
            }
        }
        for (i, pair) in levels.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if next.grid_size < prev.grid_size
                || next.path_length < prev.path_length
                || next.reveal_interval > prev.reveal_interval
            {
                return Err(LevelTableError::NotMonotonic { level: i + 2 });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, level: u8) -> Option<&LevelConfig> {
        let index = usize::from(level).checked_sub(1)?;
        self.levels.get(index)
    }

    /// Like [`get`](Self::get), but levels past the end use the hardest entry.
    #[must_use]
    pub fn clamped(&self, level: u8) -> &LevelConfig {
        let index = usize::from(level.max(1)) - 1;
        &self.levels[index.min(self.levels.len() - 1)]
    }

    /// Number of levels; also the highest valid level number.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
