use crate::CorrelationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Spawn,
    RecordResult,
}

impl TxKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::RecordResult => "record_result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Rejected,
}

impl TxStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Rejected => "rejected",
        }
    }
}

/// Latest attempt of one [`TxKind`], as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub kind: TxKind,
    pub status: TxStatus,
    pub correlation_id: Option<CorrelationId>,
    pub hash: Option<String>,
    pub error: Option<String>,
}

impl TransactionRecord {
    #[must_use]
    pub const fn idle(kind: TxKind) -> Self {
        Self {
            kind,
            status: TxStatus::Idle,
            correlation_id: None,
            hash: None,
            error: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }
}
