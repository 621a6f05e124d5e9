use pathmem_types::SessionOutcome;
use serde::{Deserialize, Serialize};

pub const GAME_CONTRACT: &str = "game";
pub const SUCCESS_CODE: &str = "SUCCESS";

/// The authenticated sender of ledger transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
}

impl Account {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCall {
    pub contract_name: String,
    pub entrypoint: String,
    /// Field elements as decimal strings.
    pub calldata: Vec<String>,
}

impl LedgerCall {
    #[must_use]
    pub fn spawn_player() -> Self {
        Self {
            contract_name: GAME_CONTRACT.to_string(),
            entrypoint: "spawn_player".to_string(),
            calldata: Vec::new(),
        }
    }

    #[must_use]
    pub fn record_result(outcome: &SessionOutcome) -> Self {
        Self {
            contract_name: GAME_CONTRACT.to_string(),
            entrypoint: "record_result".to_string(),
            calldata: vec![
                outcome.level.to_string(),
                outcome.score.to_string(),
                outcome.lives_remaining.to_string(),
                u8::from(outcome.won).to_string(),
            ],
        }
    }
}

/// What the ledger answers for a submitted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    #[serde(default)]
    pub transaction_hash: Option<String>,
    pub code: String,
}

impl TxReceipt {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
