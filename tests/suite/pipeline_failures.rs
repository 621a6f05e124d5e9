//! Ledger failures seen through the HTTP client.

use pathmem_settlement::{TxError, TxKind, TxStatus};
use pathmem_types::SessionOutcome;
use wiremock::{MockServer, ResponseTemplate};

use crate::common::{OWNER, http_pipeline, mount_entrypoint, success_receipt};

const OUTCOME: SessionOutcome = SessionOutcome {
    level: 4,
    score: 1_350,
    lives_remaining: 1,
    won: true,
};

#[tokio::test]
async fn server_error_reverts_optimistic_stats() {
    let server = MockServer::start().await;
    mount_entrypoint(&server, "spawn_player", success_receipt("0xspawn")).await;
    mount_entrypoint(
        &server,
        "record_result",
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;

    let pipeline = http_pipeline(&server, Some(OWNER));
    pipeline.spawn().await.unwrap();
    let before = pipeline.store().view();

    let err = pipeline.record_result(&OUTCOME).await.unwrap_err();

    assert!(matches!(err, TxError::Network(_)));
    assert_eq!(pipeline.store().view(), before);
    let status = pipeline.status(TxKind::RecordResult);
    assert_eq!(status.status, TxStatus::Rejected);
    assert!(status.error.unwrap().contains("500"));
}

#[tokio::test]
async fn contract_rejection_is_reported_with_hash() {
    let server = MockServer::start().await;
    mount_entrypoint(
        &server,
        "record_result",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_hash": "0xdead",
            "code": "REVERTED"
        })),
    )
    .await;

    let pipeline = http_pipeline(&server, Some(OWNER));
    let err = pipeline.record_result(&OUTCOME).await.unwrap_err();

    assert_eq!(
        err,
        TxError::ContractRejection {
            code: "REVERTED".to_string(),
            hash: Some("0xdead".to_string()),
        }
    );
    assert_eq!(
        pipeline.status(TxKind::RecordResult).hash.as_deref(),
        Some("0xdead")
    );
}

#[tokio::test]
async fn missing_account_never_reaches_the_server() {
    let server = MockServer::start().await;
    let pipeline = http_pipeline(&server, None);

    assert!(matches!(pipeline.spawn().await, Err(TxError::Validation(_))));
    assert!(matches!(
        pipeline.record_result(&OUTCOME).await,
        Err(TxError::Validation(_))
    ));

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    assert_eq!(pipeline.status(TxKind::Spawn).status, TxStatus::Rejected);
    assert_eq!(pipeline.status(TxKind::RecordResult).status, TxStatus::Rejected);
}
