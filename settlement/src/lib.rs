//! Settlement for PathMem session outcomes.
//!
//! [`TransactionPipeline`] turns outcomes into ledger transactions and tracks
//! one [`TransactionRecord`] per [`TxKind`]. Local profile changes go through
//! [`ProfileStore`] as optimistic log entries keyed by [`CorrelationId`], so a
//! failed attempt removes exactly its own entry and nothing else.

mod pipeline;
mod status;
mod store;


pub use pipeline::{DEFAULT_SUCCESS_DISPLAY, PipelineSettings, TransactionPipeline, TxError};
pub use status::{TransactionRecord, TxKind, TxStatus};
pub use store::{CorrelationId, ProfileMutation, ProfileStore};
