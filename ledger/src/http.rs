//! JSON relay to a ledger node.
//!
//! `POST {node_url}/execute` with
//! `{ "sender_address", "namespace", "calls": [LedgerCall] }`, answered by a
//! [`TxReceipt`] body. No retries here: resubmission is always the caller's choice.

use std::time::Duration;

use serde::Serialize;

use crate::{Account, LedgerCall, LedgerClient, LedgerError, LedgerFut, TxReceipt};

pub const DEFAULT_NAMESPACE: &str = "full_starter_react";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    sender_address: &'a str,
    namespace: &'a str,
    calls: [LedgerCall; 1],
}

#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: reqwest::Client,
    endpoint: String,
    namespace: String,
}

impl HttpLedger {
    pub fn new(
        node_url: &str,
        namespace: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LedgerError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/execute", node_url.trim_end_matches('/')),
            namespace: namespace.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, account: &Account, call: LedgerCall) -> Result<TxReceipt, LedgerError> {
        let entrypoint = call.entrypoint.clone();
        let body = ExecuteRequest {
            sender_address: &account.address,
            namespace: &self.namespace,
            calls: [call],
        };

        tracing::debug!(endpoint = %self.endpoint, %entrypoint, "Submitting ledger call");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail: String = text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!(%status, %entrypoint, "Ledger node returned an error status");
            return Err(LedgerError::Network {
                message: if detail.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {detail}")
                },
            });
        }

        let receipt: TxReceipt = response.json().await.map_err(|e| LedgerError::Decode {
            message: e.to_string(),
        })?;
        tracing::info!(
            %entrypoint,
            code = %receipt.code,
            hash = receipt.transaction_hash.as_deref().unwrap_or("-"),
            "Ledger call answered"
        );
        Ok(receipt)
    }
}

impl LedgerClient for HttpLedger {
    fn execute<'a>(&'a self, account: &'a Account, call: LedgerCall) -> LedgerFut<'a> {
        Box::pin(self.post(account, call))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathmem_types::SessionOutcome;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ledger(server: &MockServer) -> HttpLedger {
        HttpLedger::new(&server.uri(), DEFAULT_NAMESPACE, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn record_result_posts_encoded_calldata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_json(json!({
                "sender_address": "0xabc",
                "namespace": "full_starter_react",
                "calls": [{
                    "contract_name": "game",
                    "entrypoint": "record_result",
                    "calldata": ["3", "900", "2", "1"]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transaction_hash": "0xfeed",
                "code": "SUCCESS"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = SessionOutcome {
            level: 3,
            score: 900,
            lives_remaining: 2,
            won: true,
        };
        let receipt = ledger(&server)
            .record_result(&Account::new("0xabc"), &outcome)
            .await
            .unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.transaction_hash.as_deref(), Some("0xfeed"));
    }

    #[tokio::test]
    async fn non_success_code_is_still_a_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transaction_hash": null,
                "code": "REJECTED"
            })))
            .mount(&server)
            .await;

        let receipt = ledger(&server)
            .spawn_player(&Account::new("0xabc"))
            .await
            .unwrap();
        assert!(!receipt.is_success());
        assert_eq!(receipt.transaction_hash, None);
    }

    #[tokio::test]
    async fn http_error_maps_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(503).set_body_string("node syncing"))
            .mount(&server)
            .await;

        let err = ledger(&server)
            .spawn_player(&Account::new("0xabc"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Network {
                message: "HTTP 503 Service Unavailable: node syncing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn garbage_body_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = ledger(&server)
            .spawn_player(&Account::new("0xabc"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Decode { .. }));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let ledger =
            HttpLedger::new("http://localhost:5050/", "ns", Duration::from_secs(1)).unwrap();
        assert_eq!(ledger.endpoint(), "http://localhost:5050/execute");
    }
}
