use std::future::Future;
use std::pin::Pin;

use pathmem_types::SessionOutcome;
use thiserror::Error;

use crate::{Account, LedgerCall, TxReceipt};

pub type LedgerFut<'a> = Pin<Box<dyn Future<Output = Result<TxReceipt, LedgerError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {message}")]
    Network { message: String },
    #[error("unreadable ledger response: {message}")]
    Decode { message: String },
}

/// Submits contract calls to the ledger.
///
/// A returned `Ok` only means the ledger answered; callers must still check
/// [`TxReceipt::is_success`].
pub trait LedgerClient: Send + Sync {
    fn execute<'a>(&'a self, account: &'a Account, call: LedgerCall) -> LedgerFut<'a>;

    fn spawn_player<'a>(&'a self, account: &'a Account) -> LedgerFut<'a> {
        self.execute(account, LedgerCall::spawn_player())
    }

    fn record_result<'a>(&'a self, account: &'a Account, outcome: &SessionOutcome) -> LedgerFut<'a> {
        self.execute(account, LedgerCall::record_result(outcome))
    }
}
