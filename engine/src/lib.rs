//! Puzzle engine for PathMem.
//!
//! # Architecture
//!
//! ```text
//! LevelProgression -> GameStateMachine -> PathGenerator (per level)
//!                            |
//!                            v
//!                  ResultEmitter ~~> ResultReceiver (host side)
//! ```
//!
//! The state machine is synchronous and owns its session outright. Hosts drive
//! it with [`GameCommand`]s and advance its clock with
//! [`GameStateMachine::advance`] from their frame loop; scheduled reveal and
//! input-clear tasks fire from there, never from a background task.

mod bridge;
mod game;
mod levels;
mod path;
mod schedule;

pub use bridge::{ResultEmitter, ResultReceiver, result_channel};
pub use game::{
    GameCommand, GameError, GameOverReason, GameSettings, GameSnapshot, GameStateMachine,
    LevelSummary, Phase, STARTING_LIVES,
};
pub use levels::{LevelConfig, LevelProgression, LevelTableError, STANDARD_LEVELS};
pub use path::{DEFAULT_ATTEMPT_BUDGET, PathGenerationError, PathGenerator};
