//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pathmem_engine::{
    GameCommand, GameSettings, GameStateMachine, LevelProgression, Phase, ResultEmitter,
};
use pathmem_ledger::{Account, DEFAULT_NAMESPACE, HttpLedger};
use pathmem_settlement::{PipelineSettings, ProfileStore, TransactionPipeline};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "0x0badc0de";

pub fn seeded_game(emitter: ResultEmitter) -> GameStateMachine {
    GameStateMachine::new(
        LevelProgression::standard(),
        GameSettings::default(),
        Some(emitter),
    )
    .with_rng(StdRng::seed_from_u64(2024))
}

/// Advance through the reveal one interval at a time, recording each highlighted tile.
pub fn watch_reveal(machine: &mut GameStateMachine) -> Vec<usize> {
    let level = machine.level().expect("a level is active");
    let interval = machine
        .levels()
        .get(level)
        .expect("level is in the table")
        .reveal_interval;

    let mut path = Vec::new();
    while machine.phase() == Phase::Showing {
        let cell = machine.highlighted_cell().expect("a tile is lit while showing");
        path.push(cell.index());
        machine.advance(interval);
    }
    assert_eq!(machine.phase(), Phase::PlayerTurn);
    path
}

pub fn click_all(machine: &mut GameStateMachine, tiles: &[usize]) -> Phase {
    let mut phase = machine.phase();
    for &tile in tiles {
        phase = machine.apply(GameCommand::ClickTile(tile)).unwrap();
    }
    phase
}

/// Any tile that is not the first step of `path`.
pub fn wrong_first_tile(path: &[usize]) -> usize {
    if path[0] == 0 { 1 } else { 0 }
}

pub fn http_pipeline(server: &MockServer, account: Option<&str>) -> TransactionPipeline {
    let ledger = HttpLedger::new(&server.uri(), DEFAULT_NAMESPACE, Duration::from_secs(5))
        .expect("client builds");
    TransactionPipeline::new(
        Arc::new(ledger),
        account.map(Account::new),
        ProfileStore::new(),
        PipelineSettings::default(),
    )
}

pub async fn mount_entrypoint(server: &MockServer, entrypoint: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({
            "calls": [{ "entrypoint": entrypoint }]
        })))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn success_receipt(hash: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "transaction_hash": hash,
        "code": "SUCCESS"
    }))
}

/// Request bodies the server saw for `entrypoint`, oldest first.
pub async fn calls_to(server: &MockServer, entrypoint: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice::<Value>(&request.body).unwrap())
        .map(|body| body["calls"][0].clone())
        .filter(|call| call["entrypoint"] == entrypoint)
        .collect()
}
