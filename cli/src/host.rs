//! Plain-text host: reads commands from stdin, drives the game clock and
//! prints a frame whenever the visible state changes.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::Result;
use pathmem_engine::{GameOverReason, GameSnapshot, GameStateMachine, Phase};
use pathmem_settlement::{TransactionPipeline, TransactionRecord, TxKind, TxStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{self, HELP, HostCommand};

const TICK: Duration = Duration::from_millis(25);

const HOW_TO_PLAY: &str = "\
A path of tiles lights up one at a time. Watch it, then click the same
tiles in the same order. A wrong tile costs a life and clears your input.
Finish the path to earn points and a bonus for every life left.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub(crate) struct Host {
    game: GameStateMachine,
    pipeline: TransactionPipeline,
    shown: Option<(Phase, Option<GameSnapshot>)>,
}

impl Host {
    pub(crate) fn new(game: GameStateMachine, pipeline: TransactionPipeline) -> Self {
        Self {
            game,
            pipeline,
            shown: None,
        }
    }

    pub(crate) async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        println!("PathMem. Type 'help' for commands.");
        self.render_if_changed();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    self.game.advance(now - last_tick);
                    last_tick = now;
                    self.render_if_changed();
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if self.handle_line(&line) == Flow::Quit {
                        break;
                    }
                    self.render_if_changed();
                }
            }
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(message) => {
                println!("{message}");
                return Flow::Continue;
            }
        };

        match command {
            HostCommand::Game(command) => {
                if let Err(e) = self.game.apply(command) {
                    tracing::error!(error = %e, "Game command failed");
                    println!("{e}");
                }
            }
            HostCommand::Spawn => self.spawn_profile(),
            HostCommand::Status => {
                println!("{}", status_line(&self.pipeline.status(TxKind::Spawn)));
                println!("{}", status_line(&self.pipeline.status(TxKind::RecordResult)));
            }
            HostCommand::Profile => match self.pipeline.store().view() {
                Some(profile) => println!(
                    "{}  games {}  wins {}  losses {}  win rate {}%  best level {}  last score {}",
                    profile.owner,
                    profile.games_played,
                    profile.wins,
                    profile.losses,
                    profile.win_rate_percent(),
                    profile.best_level,
                    profile.last_score
                ),
                None => println!("No profile yet. Type 'spawn' to create one."),
            },
            HostCommand::Help => println!("{HELP}"),
            HostCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn spawn_profile(&self) {
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            match pipeline.spawn().await {
                Ok(record) => println!("{}", status_line(&record)),
                Err(e) => println!("spawn: {e}"),
            }
        });
    }

    fn render_if_changed(&mut self) {
        let current = (self.game.phase(), self.game.snapshot());
        if self.shown.as_ref() == Some(&current) {
            return;
        }
        let frame = match &current {
            (Phase::Menu, _) => "== MENU ==  start | howto | spawn | profile | quit".to_string(),
            (Phase::HowToPlay, _) => format!("{HOW_TO_PLAY}\n(start | menu)"),
            (_, Some(snapshot)) => render_snapshot(snapshot),
            (phase, None) => format!("[{}]", phase.as_str()),
        };
        println!("{frame}");
        self.shown = Some(current);
    }
}

fn render_snapshot(snapshot: &GameSnapshot) -> String {
    let mut out = format!(
        "Level {} | Score {} | Lives {} | {}",
        snapshot.level,
        snapshot.score,
        snapshot.lives,
        snapshot.phase.as_str()
    );

    if matches!(snapshot.phase, Phase::Showing | Phase::PlayerTurn) {
        let width = (snapshot.grid_size * snapshot.grid_size - 1).to_string().len();
        for row in 0..snapshot.grid_size {
            out.push('\n');
            for col in 0..snapshot.grid_size {
                let index = row * snapshot.grid_size + col;
                let is_highlighted = snapshot.highlighted.is_some_and(|c| c.index() == index);
                let is_input = snapshot.input.iter().any(|c| c.index() == index);
                let label = if is_highlighted {
                    "#".repeat(width)
                } else if is_input {
                    "*".repeat(width)
                } else if snapshot.phase == Phase::PlayerTurn {
                    format!("{index:>width$}")
                } else {
                    ".".repeat(width)
                };
                let _ = write!(out, " {label}");
            }
        }
        if snapshot.input_locked {
            out.push_str("\nWrong tile!");
        } else if snapshot.phase == Phase::PlayerTurn {
            let _ = write!(
                out,
                "\nYour turn: {}/{} tiles",
                snapshot.input.len(),
                snapshot.path_length
            );
        }
    }

    if let Some(summary) = snapshot.summary {
        let _ = write!(
            out,
            "\nLevel {} complete! {} + bonus {} = {}  (next | restart | menu)",
            summary.level, summary.score_before_bonus, summary.bonus, summary.score
        );
    }
    match snapshot.game_over {
        Some(GameOverReason::OutOfLives) => {
            let _ = write!(out, "\nGame over. Final score {}  (again | menu)", snapshot.score);
        }
        Some(GameOverReason::AllLevelsCleared) => {
            let _ = write!(
                out,
                "\nEvery level cleared! Final score {}  (again | menu)",
                snapshot.score
            );
        }
        None => {}
    }
    out
}

fn status_line(record: &TransactionRecord) -> String {
    let mut line = format!("{}: {}", record.kind.as_str(), record.status.as_str());
    if let Some(hash) = &record.hash {
        let _ = write!(line, " tx {hash}");
    }
    if record.status == TxStatus::Rejected
        && let Some(error) = &record.error
    {
        let _ = write!(line, " ({error})");
    }
    line
}
