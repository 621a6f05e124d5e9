use serde::{Deserialize, Serialize};

/// Result of one terminated puzzle run, as settled on the ledger.
///
/// Field widths match the `record_result` contract: `u8` level and lives, `u64` score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub level: u8,
    pub score: u64,
    pub lives_remaining: u8,
    pub won: bool,
}
