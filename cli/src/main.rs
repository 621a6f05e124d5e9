//! `pathmem` - terminal host for the PathMem puzzle.
//!
//! # Architecture
//!
//! ```text
//! stdin --> Host --> GameStateMachine --(ResultEmitter)--> ResultReceiver
//!                                                              |
//!                                                              v
//!            HttpLedger <-- TransactionPipeline::run_bridge (spawned task)
//! ```
//!
//! The host owns the game and steps its clock every tick. Outcomes leave the
//! game through the result channel and are settled on the ledger in the
//! background; `spawn` runs in the background too, so the puzzle never waits
//! on the network.

mod command;
mod host;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pathmem_config::{PathMemConfig, ResolvedConfig, config_path};
use pathmem_engine::{GameSettings, GameStateMachine, LevelProgression, result_channel};
use pathmem_ledger::{Account, HttpLedger};
use pathmem_settlement::{PipelineSettings, ProfileStore, TransactionPipeline};

use crate::host::Host;

/// Upper bound on waiting for queued results to settle at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // No log file: stay silent rather than interleave logs with the game.
    let Some((log_path, file)) = open_log_file() else {
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    tracing::info!(path = %log_path.display(), "Logging initialized");
}

/// `~/.pathmem/logs/pathmem.log`, else `./.pathmem/logs/pathmem.log`.
fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let home_dir = config_path().and_then(|path| path.parent().map(|dir| dir.join("logs")));
    let local_dir = PathBuf::from(".pathmem").join("logs");
    open_first_log(home_dir.into_iter().chain([local_dir]))
}

/// First directory that can hold `pathmem.log` wins.
fn open_first_log(dirs: impl IntoIterator<Item = PathBuf>) -> Option<(PathBuf, fs::File)> {
    dirs.into_iter().find_map(|dir| {
        fs::create_dir_all(&dir).ok()?;
        let path = dir.join("pathmem.log");
        let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
        Some((path, file))
    })
}

fn game_settings(resolved: &ResolvedConfig) -> GameSettings {
    let defaults = GameSettings::default();
    GameSettings {
        mistake_delay: resolved.mistake_delay.unwrap_or(defaults.mistake_delay),
        path_attempt_budget: resolved
            .path_attempt_budget
            .unwrap_or(defaults.path_attempt_budget),
    }
}

fn pipeline_settings(resolved: &ResolvedConfig) -> PipelineSettings {
    let defaults = PipelineSettings::default();
    PipelineSettings {
        success_display: resolved.success_display.unwrap_or(defaults.success_display),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match PathMemConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Ignoring config: {e}");
            PathMemConfig::default()
        }
    };
    let resolved = config.resolve();
    tracing::info!(
        deploy_type = resolved.deploy_type.as_str(),
        node_url = %resolved.node_url,
        has_account = resolved.account.is_some(),
        "Configuration resolved"
    );
    if resolved.account.is_none() {
        println!("No account configured; results will not be recorded (set PATHMEM_ACCOUNT).");
    }

    let ledger = HttpLedger::new(
        &resolved.node_url,
        resolved.namespace.clone(),
        resolved.request_timeout,
    )
    .context("failed to set up ledger client")?;

    let pipeline = TransactionPipeline::new(
        Arc::new(ledger),
        resolved.account.clone().map(Account::new),
        ProfileStore::new(),
        pipeline_settings(&resolved),
    );

    let (emitter, results) = result_channel();
    let bridge = tokio::spawn(pipeline.clone().run_bridge(results));

    let game = GameStateMachine::new(
        LevelProgression::standard(),
        game_settings(&resolved),
        Some(emitter),
    );
    let mut host = Host::new(game, pipeline);
    let run_result = host.run().await;

    // Dropping the host drops the emitter, which lets the bridge drain and stop.
    drop(host);
    if tokio::time::timeout(SHUTDOWN_GRACE, bridge).await.is_err() {
        tracing::warn!("Gave up waiting for pending results to settle");
    }

    run_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_falls_back_past_unusable_dirs() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let fallback = root.path().join("logs");

        let (path, _file) = open_first_log([blocker.join("logs"), fallback.clone()]).unwrap();

        assert_eq!(path, fallback.join("pathmem.log"));
        assert!(path.exists());
    }

    #[test]
    fn no_usable_dir_means_no_log() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        assert!(open_first_log([blocker.join("logs")]).is_none());
    }
}
