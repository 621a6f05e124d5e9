//! A played game flows through the result bridge into ledger transactions.

use pathmem_engine::{GameCommand, Phase, result_channel};
use pathmem_settlement::{TxKind, TxStatus};
use serde_json::json;
use wiremock::MockServer;

use crate::common::{
    OWNER, calls_to, click_all, http_pipeline, mount_entrypoint, seeded_game, success_receipt,
    watch_reveal, wrong_first_tile,
};

#[tokio::test]
async fn won_level_then_lost_game_are_both_recorded() {
    let server = MockServer::start().await;
    mount_entrypoint(&server, "spawn_player", success_receipt("0xspawn")).await;
    mount_entrypoint(&server, "record_result", success_receipt("0xresult")).await;

    let pipeline = http_pipeline(&server, Some(OWNER));
    let spawned = pipeline.spawn().await.unwrap();
    assert_eq!(spawned.hash.as_deref(), Some("0xspawn"));
    assert!(pipeline.store().has_profile());

    let (emitter, results) = result_channel();
    let bridge = tokio::spawn(pipeline.clone().run_bridge(results));
    let mut game = seeded_game(emitter);

    game.apply(GameCommand::StartGame).unwrap();
    let path = watch_reveal(&mut game);
    assert_eq!(path.len(), 3);
    assert_eq!(click_all(&mut game, &path), Phase::LevelComplete);
    let after_level_one = game.score().unwrap();
    assert_eq!(after_level_one, 50 + 100 + 3 * 50);

    assert_eq!(game.apply(GameCommand::NextLevel).unwrap(), Phase::Showing);
    let path = watch_reveal(&mut game);
    let wrong = wrong_first_tile(&path);
    let mistake_delay = pathmem_engine::GameSettings::default().mistake_delay;
    for _ in 0..2 {
        assert_eq!(click_all(&mut game, &[wrong]), Phase::PlayerTurn);
        game.advance(mistake_delay);
    }
    assert_eq!(click_all(&mut game, &[wrong]), Phase::GameOver);

    drop(game);
    bridge.await.unwrap();

    let recorded = calls_to(&server, "record_result").await;
    assert_eq!(
        recorded,
        [
            json!({
                "contract_name": "game",
                "entrypoint": "record_result",
                "calldata": ["1", after_level_one.to_string(), "3", "1"]
            }),
            json!({
                "contract_name": "game",
                "entrypoint": "record_result",
                "calldata": ["2", after_level_one.to_string(), "0", "0"]
            }),
        ]
    );

    let profile = pipeline.store().confirmed().unwrap();
    assert_eq!(profile.owner, OWNER);
    assert_eq!(profile.games_played, 2);
    assert_eq!(profile.wins, 1);
    assert_eq!(profile.losses, 1);
    assert_eq!(profile.best_level, 2);
    assert_eq!(profile.last_score, after_level_one);
    assert_eq!(pipeline.store().pending_len(), 0);

    let status = pipeline.status(TxKind::RecordResult);
    assert_eq!(status.status, TxStatus::Success);
    assert_eq!(status.hash.as_deref(), Some("0xresult"));
}

#[tokio::test]
async fn returning_to_menu_mid_level_records_nothing() {
    let server = MockServer::start().await;
    mount_entrypoint(&server, "record_result", success_receipt("0xresult")).await;

    let pipeline = http_pipeline(&server, Some(OWNER));
    let (emitter, results) = result_channel();
    let bridge = tokio::spawn(pipeline.clone().run_bridge(results));
    let mut game = seeded_game(emitter);

    game.apply(GameCommand::StartGame).unwrap();
    let path = watch_reveal(&mut game);
    click_all(&mut game, &path[..1]);
    assert_eq!(game.apply(GameCommand::ReturnToMenu).unwrap(), Phase::Menu);

    drop(game);
    bridge.await.unwrap();

    assert!(calls_to(&server, "record_result").await.is_empty());
    assert_eq!(pipeline.status(TxKind::RecordResult).status, TxStatus::Idle);
}
