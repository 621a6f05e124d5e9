//! Wire format for session outcomes crossing the puzzle/host boundary.
//!
//! ```json
//! { "type": "PM_RESULT", "level": 3, "score": 900, "livesRemaining": 2, "won": true }
//! ```
//!
//! Hosts receive every message posted to them, so [`BridgeMessage::decode`]
//! treats foreign message types as "not for us" rather than as errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::SessionOutcome;

pub const RESULT_MESSAGE_TYPE: &str = "PM_RESULT";

#[derive(Debug, Error)]
#[error("malformed {RESULT_MESSAGE_TYPE} message: {0}")]
pub struct BridgeDecodeError(#[from] serde_json::Error);

/// The serialized boundary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    level: u8,
    #[serde(default)]
    score: u64,
    #[serde(default)]
    lives_remaining: u8,
    #[serde(default)]
    won: bool,
}

impl BridgeMessage {
    #[must_use]
    pub fn encode(outcome: &SessionOutcome) -> String {
        let message = Self::from(*outcome);
        // A struct of integers and a bool always serializes.
        serde_json::to_string(&message).unwrap_or_default()
    }

    /// Decode a raw host message.
    ///
    /// Returns `Ok(None)` for messages of any other type. Missing numeric fields
    /// default to zero and a missing `won` defaults to `false`.
    pub fn decode(raw: &str) -> Result<Option<SessionOutcome>, BridgeDecodeError> {
        let value: Value = serde_json::from_str(raw)?;
        if value.get("type").and_then(Value::as_str) != Some(RESULT_MESSAGE_TYPE) {
            return Ok(None);
        }
        let message: Self = serde_json::from_value(value)?;
        Ok(Some(message.into()))
    }
}

impl From<SessionOutcome> for BridgeMessage {
    fn from(outcome: SessionOutcome) -> Self {
        Self {
            kind: RESULT_MESSAGE_TYPE.to_string(),
            level: outcome.level,
            score: outcome.score,
            lives_remaining: outcome.lives_remaining,
            won: outcome.won,
        }
    }
}

impl From<BridgeMessage> for SessionOutcome {
    fn from(message: BridgeMessage) -> Self {
        Self {
            level: message.level,
            score: message.score,
            lives_remaining: message.lives_remaining,
            won: message.won,
        }
    }
}
