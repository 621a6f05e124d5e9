//! Ledger submission with per-kind status tracking.
//!
//! Each attempt gets a fresh [`CorrelationId`]. A status slot only accepts
//! updates from the attempt that currently owns it, so a slow earlier attempt
//! can never overwrite the result of a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use pathmem_engine::ResultReceiver;
use pathmem_ledger::{Account, LedgerClient, LedgerError, TxReceipt};
use pathmem_types::{PlayerProfile, SessionOutcome};
use thiserror::Error;

use crate::{CorrelationId, ProfileMutation, ProfileStore, TransactionRecord, TxKind, TxStatus};

/// How long a successful `record_result` stays visible before going back to idle.
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("{0}")]
    Validation(String),
    #[error("Already initializing")]
    AlreadyInFlight,
    #[error(transparent)]
    Network(#[from] LedgerError),
    #[error("transaction rejected with code {code}")]
    ContractRejection { code: String, hash: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub success_display: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            success_display: DEFAULT_SUCCESS_DISPLAY,
        }
    }
}

#[derive(Debug)]
struct Slot {
    record: TransactionRecord,
    reset: Option<AbortHandle>,
}

impl Slot {
    const fn new(kind: TxKind) -> Self {
        Self {
            record: TransactionRecord::idle(kind),
            reset: None,
        }
    }

    fn cancel_reset(&mut self) {
        if let Some(handle) = self.reset.take() {
            handle.abort();
        }
    }

    fn owned_by(&self, id: CorrelationId) -> bool {
        self.record.correlation_id == Some(id)
    }
}

#[derive(Debug)]
struct StatusBoard {
    spawn: Slot,
    record_result: Slot,
}

impl StatusBoard {
    fn slot_mut(&mut self, kind: TxKind) -> &mut Slot {
        match kind {
            TxKind::Spawn => &mut self.spawn,
            TxKind::RecordResult => &mut self.record_result,
        }
    }

    fn slot(&self, kind: TxKind) -> &Slot {
        match kind {
            TxKind::Spawn => &self.spawn,
            TxKind::RecordResult => &self.record_result,
        }
    }
}

/// Clears the spawn flag when the attempt ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits spawn and record-result transactions and keeps the profile store in step.
///
/// Cheap to clone; clones share status, store and the spawn flag.
#[derive(Clone)]
pub struct TransactionPipeline {
    ledger: Arc<dyn LedgerClient>,
    account: Option<Account>,
    store: ProfileStore,
    settings: PipelineSettings,
    spawn_in_flight: Arc<AtomicBool>,
    board: Arc<Mutex<StatusBoard>>,
}

impl std::fmt::Debug for TransactionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionPipeline")
            .field("account", &self.account)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TransactionPipeline {
    /// `account` is the signer context; without one every submission fails validation.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        account: Option<Account>,
        store: ProfileStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            ledger,
            account,
            store,
            settings,
            spawn_in_flight: Arc::new(AtomicBool::new(false)),
            board: Arc::new(Mutex::new(StatusBoard {
                spawn: Slot::new(TxKind::Spawn),
                record_result: Slot::new(TxKind::RecordResult),
            })),
        }
    }

    #[must_use]
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    #[must_use]
    pub fn status(&self, kind: TxKind) -> TransactionRecord {
        self.board().slot(kind).record.clone()
    }

    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawn_in_flight.load(Ordering::Acquire)
    }

    fn board(&self) -> MutexGuard<'_, StatusBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make sure the caller has a profile on the ledger.
    ///
    /// At most one spawn is outstanding; a second call while one is pending
    /// returns [`TxError::AlreadyInFlight`] without touching status.
    pub async fn spawn(&self) -> Result<TransactionRecord, TxError> {
        let Some(_guard) = InFlightGuard::acquire(&self.spawn_in_flight) else {
            tracing::debug!("Spawn requested while another is pending");
            return Err(TxError::AlreadyInFlight);
        };
        let kind = TxKind::Spawn;
        let Some(account) = self.account.clone() else {
            return Err(self.reject_local(kind, "No signer available to create a profile"));
        };

        let id = CorrelationId::new();
        self.begin(kind, id);
        if self.store.has_profile() {
            tracing::debug!(owner = %account.address, "Profile already present; skipping spawn");
            return Ok(self.settle(kind, id, None));
        }

        let profile = PlayerProfile::spawned(account.address.clone(), days_since_epoch());
        self.store
            .apply_optimistic(id, ProfileMutation::Create(profile));
        tracing::info!(correlation_id = %id, owner = %account.address, "Submitting spawn_player");

        match self.ledger.spawn_player(&account).await {
            Ok(receipt) if receipt.is_success() => {
                self.store.confirm(id);
                Ok(self.settle(kind, id, receipt.transaction_hash))
            }
            result => {
                self.store.revert(id);
                Err(self.reject(kind, id, failure(result)))
            }
        }
    }

    /// Record a finished session on the ledger.
    ///
    /// The profile's stats are bumped optimistically while the call is in
    /// flight and rolled back exactly if it fails.
    pub async fn record_result(
        &self,
        outcome: &SessionOutcome,
    ) -> Result<TransactionRecord, TxError> {
        let kind = TxKind::RecordResult;
        let Some(account) = self.account.clone() else {
            return Err(self.reject_local(kind, "No signer available to record the result"));
        };

        let id = CorrelationId::new();
        self.begin(kind, id);
        if self.store.has_profile() {
            self.store
                .apply_optimistic(id, ProfileMutation::RecordOutcome(*outcome));
        }
        tracing::info!(
            correlation_id = %id,
            level = outcome.level,
            score = outcome.score,
            won = outcome.won,
            "Submitting record_result"
        );

        match self.ledger.record_result(&account, outcome).await {
            Ok(receipt) if receipt.is_success() => {
                self.store.confirm(id);
                let record = self.settle(kind, id, receipt.transaction_hash);
                self.schedule_reset(kind, id);
                Ok(record)
            }
            result => {
                self.store.revert(id);
                Err(self.reject(kind, id, failure(result)))
            }
        }
    }

    /// Submit every outcome the puzzle emits, one at a time, until the emitter is gone.
    pub async fn run_bridge(self, mut results: ResultReceiver) {
        while let Some(outcome) = results.recv().await {
            if let Err(e) = self.record_result(&outcome).await {
                tracing::warn!(error = %e, "Failed to record session result");
            }
        }
        tracing::debug!("Result bridge closed");
    }

    fn begin(&self, kind: TxKind, id: CorrelationId) {
        let mut board = self.board();
        let slot = board.slot_mut(kind);
        slot.cancel_reset();
        slot.record = TransactionRecord {
            kind,
            status: TxStatus::Pending,
            correlation_id: Some(id),
            hash: None,
            error: None,
        };
    }

    fn settle(&self, kind: TxKind, id: CorrelationId, hash: Option<String>) -> TransactionRecord {
        let mut board = self.board();
        let slot = board.slot_mut(kind);
        let record = TransactionRecord {
            kind,
            status: TxStatus::Success,
            correlation_id: Some(id),
            hash,
            error: None,
        };
        if slot.owned_by(id) {
            slot.cancel_reset();
            slot.record = record.clone();
        }
        tracing::info!(kind = kind.as_str(), correlation_id = %id, "Transaction succeeded");
        record
    }

    fn reject(&self, kind: TxKind, id: CorrelationId, error: TxError) -> TxError {
        let hash = match &error {
            TxError::ContractRejection { hash, .. } => hash.clone(),
            _ => None,
        };
        let mut board = self.board();
        let slot = board.slot_mut(kind);
        if slot.owned_by(id) {
            slot.record.status = TxStatus::Rejected;
            slot.record.hash = hash;
            slot.record.error = Some(error.to_string());
        }
        tracing::warn!(kind = kind.as_str(), correlation_id = %id, error = %error, "Transaction rejected");
        error
    }

    fn reject_local(&self, kind: TxKind, message: &str) -> TxError {
        let error = TxError::Validation(message.to_string());
        let mut board = self.board();
        let slot = board.slot_mut(kind);
        slot.cancel_reset();
        slot.record = TransactionRecord {
            kind,
            status: TxStatus::Rejected,
            correlation_id: None,
            hash: None,
            error: Some(error.to_string()),
        };
        tracing::warn!(kind = kind.as_str(), "{message}");
        error
    }

    fn schedule_reset(&self, kind: TxKind, id: CorrelationId) {
        let (handle, registration) = AbortHandle::new_pair();
        let board = Arc::clone(&self.board);
        let window = self.settings.success_display;

        let task = async move {
            tokio::time::sleep(window).await;
            let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = board.slot_mut(kind);
            if slot.owned_by(id) && slot.record.status == TxStatus::Success {
                slot.record = TransactionRecord::idle(kind);
                slot.reset = None;
            }
        };

        let mut board = self.board();
        let slot = board.slot_mut(kind);
        if !slot.owned_by(id) {
            return;
        }
        slot.cancel_reset();
        slot.reset = Some(handle);
        drop(board);

        tokio::spawn(async move {
            let _ = Abortable::new(task, registration).await;
        });
    }
}

fn failure(result: Result<TxReceipt, LedgerError>) -> TxError {
    match result {
        Ok(receipt) => TxError::ContractRejection {
            code: receipt.code,
            hash: receipt.transaction_hash,
        },
        Err(e) => TxError::Network(e),
    }
}

fn days_since_epoch() -> u64 {
    let seconds = chrono::Utc::now().timestamp();
    u64::try_from(seconds.div_euclid(SECONDS_PER_DAY)).unwrap_or(0)
}
