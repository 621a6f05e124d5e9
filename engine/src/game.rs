//! The puzzle's finite-state game loop.
//!
//! ```text
//! Menu <-> HowToPlay
//!  |
//!  | start
//!  v
//! Showing --(reveal done)--> PlayerTurn --(path complete)--> LevelComplete --(next)--> Showing
//!                                 |                                |
//!                                 | (out of lives)                 | (past last level)
//!                                 v                                v
//!                              GameOver <--------------------------+
//! ```
//!
//! All session data lives in one [`GameSession`] value inside the machine; the
//! pending scheduled task is stored on it, so replacing or dropping the session
//! cancels whatever was queued.

use std::time::Duration;

use pathmem_types::{Grid, GridCell, Path, SessionOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::bridge::ResultEmitter;
use crate::levels::LevelProgression;
use crate::path::{DEFAULT_ATTEMPT_BUDGET, PathGenerationError, PathGenerator};
use crate::schedule::{ScheduledTask, TaskKind};

pub const STARTING_LIVES: u8 = 3;

const CORRECT_PATH_POINTS_PER_LEVEL: u64 = 50;
const LEVEL_BONUS_PER_LEVEL: u64 = 100;
const LEVEL_BONUS_PER_LIFE: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    HowToPlay,
    Showing,
    PlayerTurn,
    LevelComplete,
    GameOver,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::HowToPlay => "how_to_play",
            Self::Showing => "showing",
            Self::PlayerTurn => "player_turn",
            Self::LevelComplete => "level_complete",
            Self::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    StartGame,
    ShowHowToPlay,
    /// Raw tile index from the host; out-of-range indices are ignored.
    ClickTile(usize),
    RestartLevel,
    NextLevel,
    ReturnToMenu,
    PlayAgain,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cannot build level {level}: {source}")]
    PathGeneration {
        level: u8,
        source: PathGenerationError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    /// How long a wrong tile stays on screen before the input is wiped.
    pub mistake_delay: Duration,
    pub path_attempt_budget: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mistake_delay: Duration::from_millis(800),
            path_attempt_budget: DEFAULT_ATTEMPT_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub level: u8,
    pub score_before_bonus: u64,
    pub bonus: u64,
    pub score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    OutOfLives,
    AllLevelsCleared,
}

/// Read-only view of the active session for hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub level: u8,
    pub score: u64,
    pub lives: u8,
    pub grid_size: usize,
    pub path_length: usize,
    pub highlighted: Option<GridCell>,
    pub input: Vec<GridCell>,
    pub input_locked: bool,
    pub summary: Option<LevelSummary>,
    pub game_over: Option<GameOverReason>,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Showing { step: usize },
    PlayerTurn,
    LevelComplete(LevelSummary),
    GameOver(GameOverReason),
}

#[derive(Debug)]
struct GameSession {
    level: u8,
    score: u64,
    lives: u8,
    grid: Grid,
    correct_path: Path,
    player_input: Vec<GridCell>,
    reveal_interval: Duration,
    stage: Stage,
    pending: Option<ScheduledTask>,
    outcome_emitted: bool,
}

impl GameSession {
    fn showing(
        level: u8,
        score: u64,
        lives: u8,
        grid: Grid,
        correct_path: Path,
        reveal_interval: Duration,
    ) -> Self {
        Self {
            level,
            score,
            lives,
            grid,
            correct_path,
            player_input: Vec::new(),
            reveal_interval,
            stage: Stage::Showing { step: 0 },
            pending: Some(ScheduledTask::new(TaskKind::RevealStep, reveal_interval)),
            outcome_emitted: false,
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Showing { .. } => Phase::Showing,
            Stage::PlayerTurn => Phase::PlayerTurn,
            Stage::LevelComplete(_) => Phase::LevelComplete,
            Stage::GameOver(_) => Phase::GameOver,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            tracing::debug!(kind = ?task.kind(), remaining = ?task.remaining(), "Cancelled scheduled task");
        }
    }

    fn outcome(&self, won: bool) -> SessionOutcome {
        SessionOutcome {
            level: self.level,
            score: self.score,
            lives_remaining: self.lives,
            won,
        }
    }

    fn reveal_next(&mut self) {
        let Stage::Showing { step } = self.stage else {
            return;
        };
        let next = step + 1;
        if next < self.correct_path.len() {
            self.stage = Stage::Showing { step: next };
            self.pending = Some(ScheduledTask::new(
                TaskKind::RevealStep,
                self.reveal_interval,
            ));
        } else {
            self.stage = Stage::PlayerTurn;
            self.player_input.clear();
            tracing::info!(level = self.level, "Reveal finished; awaiting input");
        }
    }
}

#[derive(Debug)]
enum GameState {
    Menu,
    HowToPlay,
    Active(GameSession),
}

pub struct GameStateMachine {
    levels: LevelProgression,
    generator: PathGenerator,
    settings: GameSettings,
    rng: StdRng,
    emitter: Option<ResultEmitter>,
    state: GameState,
}

impl GameStateMachine {
    #[must_use]
    pub fn new(
        levels: LevelProgression,
        settings: GameSettings,
        emitter: Option<ResultEmitter>,
    ) -> Self {
        Self {
            levels,
            generator: PathGenerator::new(settings.path_attempt_budget),
            settings,
            rng: StdRng::seed_from_u64(rand::random()),
            emitter,
            state: GameState::Menu,
        }
    }

    /// Replace the path RNG, e.g. with a seeded one for reproducible runs.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn levels(&self) -> &LevelProgression {
        &self.levels
    }

    pub fn apply(&mut self, command: GameCommand) -> Result<Phase, GameError> {
        let before = self.phase();
        let handled = match command {
            GameCommand::StartGame => self.start_game()?,
            GameCommand::ShowHowToPlay => self.show_how_to_play(),
            GameCommand::ClickTile(index) => self.click(index),
            GameCommand::RestartLevel => self.restart_level()?,
            GameCommand::NextLevel => self.next_level()?,
            GameCommand::ReturnToMenu => self.return_to_menu(),
            GameCommand::PlayAgain => self.play_again()?,
        };
        let after = self.phase();

        if !handled {
            tracing::debug!(?command, phase = before.as_str(), "Ignoring command");
        } else if before != after {
            tracing::info!(
                ?command,
                from = before.as_str(),
                to = after.as_str(),
                "Game transition"
            );
        }
        Ok(after)
    }

    /// Step the session clock, firing any scheduled tasks that become due.
    pub fn advance(&mut self, delta: Duration) {
        let mut remaining = delta;
        loop {
            let GameState::Active(session) = &mut self.state else {
                return;
            };
            let Some(task) = session.pending.as_mut() else {
                return;
            };
            let Some(overshoot) = task.advance(remaining) else {
                return;
            };
            let kind = task.kind();
            session.pending = None;
            match kind {
                TaskKind::RevealStep => session.reveal_next(),
                TaskKind::ClearInput => {
                    session.player_input.clear();
                    tracing::debug!(level = session.level, "Input cleared after mistake");
                }
            }
            remaining = overshoot;
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.state {
            GameState::Menu => Phase::Menu,
            GameState::HowToPlay => Phase::HowToPlay,
            GameState::Active(session) => session.phase(),
        }
    }

    #[must_use]
    pub fn level(&self) -> Option<u8> {
        self.session().map(|s| s.level)
    }

    #[must_use]
    pub fn score(&self) -> Option<u64> {
        self.session().map(|s| s.score)
    }

    #[must_use]
    pub fn lives(&self) -> Option<u8> {
        self.session().map(|s| s.lives)
    }

    #[must_use]
    pub fn grid_size(&self) -> Option<usize> {
        self.session().map(|s| s.grid.size())
    }

    /// The path cell currently being revealed.
    #[must_use]
    pub fn highlighted_cell(&self) -> Option<GridCell> {
        let session = self.session()?;
        match session.stage {
            Stage::Showing { step } => session.correct_path.get(step),
            _ => None,
        }
    }

    #[must_use]
    pub fn player_input(&self) -> &[GridCell] {
        self.session().map_or(&[], |s| s.player_input.as_slice())
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<GameSnapshot> {
        let session = self.session()?;
        Some(GameSnapshot {
            phase: session.phase(),
            level: session.level,
            score: session.score,
            lives: session.lives,
            grid_size: session.grid.size(),
            path_length: session.correct_path.len(),
            highlighted: self.highlighted_cell(),
            input: session.player_input.clone(),
            input_locked: session.pending.as_ref().map(ScheduledTask::kind)
                == Some(TaskKind::ClearInput),
            summary: match session.stage {
                Stage::LevelComplete(summary) => Some(summary),
                _ => None,
            },
            game_over: match session.stage {
                Stage::GameOver(reason) => Some(reason),
                _ => None,
            },
        })
    }

    fn session(&self) -> Option<&GameSession> {
        match &self.state {
            GameState::Active(session) => Some(session),
            _ => None,
        }
    }

    fn start_game(&mut self) -> Result<bool, GameError> {
        if !matches!(self.state, GameState::Menu | GameState::HowToPlay) {
            return Ok(false);
        }
        self.begin_level(1, 0, STARTING_LIVES)?;
        Ok(true)
    }

    fn show_how_to_play(&mut self) -> bool {
        if !matches!(self.state, GameState::Menu) {
            return false;
        }
        self.state = GameState::HowToPlay;
        true
    }

    fn click(&mut self, index: usize) -> bool {
        let mistake_delay = self.settings.mistake_delay;
        let GameState::Active(session) = &mut self.state else {
            return false;
        };
        // Input stays locked while a mistake is on screen.
        if !matches!(session.stage, Stage::PlayerTurn) || session.pending.is_some() {
            return false;
        }
        let Some(cell) = session.grid.cell(index) else {
            return false;
        };

        if session.correct_path.get(session.player_input.len()) == Some(cell) {
            session.player_input.push(cell);
            if session.player_input.len() == session.correct_path.len() {
                session.score += u64::from(session.level) * CORRECT_PATH_POINTS_PER_LEVEL;
                self.complete_level();
            }
            return true;
        }

        session.lives = session.lives.saturating_sub(1);
        tracing::debug!(%cell, lives = session.lives, "Wrong tile");
        if session.lives == 0 {
            self.finish(GameOverReason::OutOfLives);
        } else {
            session.pending = Some(ScheduledTask::new(TaskKind::ClearInput, mistake_delay));
        }
        true
    }

    fn restart_level(&mut self) -> Result<bool, GameError> {
        let GameState::Active(session) = &self.state else {
            return Ok(false);
        };
        let lives = if session.lives == 0 {
            STARTING_LIVES
        } else {
            session.lives
        };
        let (level, score) = (session.level, session.score);
        self.begin_level(level, score, lives)?;
        Ok(true)
    }

    fn next_level(&mut self) -> Result<bool, GameError> {
        let GameState::Active(session) = &self.state else {
            return Ok(false);
        };
        if !matches!(session.stage, Stage::LevelComplete(_)) {
            return Ok(false);
        }
        let (level, score, lives) = (session.level, session.score, session.lives);
        let next = level.saturating_add(1);
        if next == level || self.levels.get(next).is_none() {
            tracing::info!(level, "Cleared the final level");
            self.finish(GameOverReason::AllLevelsCleared);
            return Ok(true);
        }
        self.begin_level(next, score, lives)?;
        Ok(true)
    }

    fn play_again(&mut self) -> Result<bool, GameError> {
        let finished = self
            .session()
            .is_some_and(|s| matches!(s.stage, Stage::LevelComplete(_) | Stage::GameOver(_)));
        if !finished {
            return Ok(false);
        }
        self.begin_level(1, 0, STARTING_LIVES)?;
        Ok(true)
    }

    fn return_to_menu(&mut self) -> bool {
        if matches!(self.state, GameState::Menu) {
            return false;
        }
        self.teardown();
        true
    }

    /// Build a fresh session for `level` and start its reveal.
    ///
    /// On failure the previous session is discarded and the machine returns to the menu.
    fn begin_level(&mut self, level: u8, score: u64, lives: u8) -> Result<(), GameError> {
        let config = *self.levels.clamped(level);
        let grid = config.grid();

        match self
            .generator
            .generate(config.path_length, grid, &mut self.rng)
        {
            Ok(path) => {
                if let GameState::Active(previous) = &mut self.state {
                    previous.cancel_pending();
                }
                tracing::info!(
                    level,
                    grid = config.grid_size,
                    path_length = config.path_length,
                    "Starting level"
                );
                self.state = GameState::Active(GameSession::showing(
                    level,
                    score,
                    lives,
                    grid,
                    path,
                    config.reveal_interval,
                ));
                Ok(())
            }
            Err(source) => {
                tracing::error!(level, error = %source, "Path generation failed; returning to menu");
                self.teardown();
                Err(GameError::PathGeneration { level, source })
            }
        }
    }

    fn complete_level(&mut self) {
        let GameState::Active(session) = &mut self.state else {
            return;
        };
        session.cancel_pending();
        let score_before_bonus = session.score;
        let bonus = u64::from(session.level) * LEVEL_BONUS_PER_LEVEL
            + u64::from(session.lives) * LEVEL_BONUS_PER_LIFE;
        session.score += bonus;
        session.stage = Stage::LevelComplete(LevelSummary {
            level: session.level,
            score_before_bonus,
            bonus,
            score: session.score,
        });
        session.outcome_emitted = true;
        emit(self.emitter.as_ref(), session.outcome(true));
    }

    /// Enter `GameOver`, emitting a loss unless this run already reported its outcome.
    fn finish(&mut self, reason: GameOverReason) {
        let GameState::Active(session) = &mut self.state else {
            return;
        };
        session.cancel_pending();
        session.stage = Stage::GameOver(reason);
        if !session.outcome_emitted {
            session.outcome_emitted = true;
            emit(self.emitter.as_ref(), session.outcome(false));
        }
    }

    fn teardown(&mut self) {
        if let GameState::Active(session) = &mut self.state {
            session.cancel_pending();
        }
        self.state = GameState::Menu;
    }

    #[cfg(test)]
    pub(crate) fn force_path(&mut self, cells: &[usize], grid_size: usize) {
        let GameState::Active(session) = &mut self.state else {
            panic!("force_path requires an active session");
        };
        let grid = Grid::new(grid_size);
        let cells = cells.iter().copied().map(GridCell::new).collect();
        session.grid = grid;
        session.correct_path = Path::new(cells, grid).expect("forced path must be valid");
        session.player_input.clear();
        session.stage = Stage::Showing { step: 0 };
        session.pending = Some(ScheduledTask::new(
            TaskKind::RevealStep,
            session.reveal_interval,
        ));
    }
}

fn emit(emitter: Option<&ResultEmitter>, outcome: SessionOutcome) {
    match emitter {
        Some(emitter) => emitter.emit(outcome),
        None => tracing::debug!(?outcome, "No result bridge attached"),
    }
}
