//! Ledger client for PathMem.
//!
//! # Architecture
//!
//! - [`LedgerClient`] - object-safe async trait; the settlement pipeline only sees this
//! - [`LedgerCall`] - one contract entrypoint invocation with its encoded calldata
//! - [`HttpLedger`] - relays calls to a node's `/execute` endpoint as JSON
//!
//! # Contracts
//!
//! | Entrypoint | Calldata |
//! |------------|----------|
//! | `spawn_player` | none |
//! | `record_result` | `[level: u8, score: u64, lives_remaining: u8, won: 0/1]` |
//!
//! Both answer with `{ transaction_hash, code }`; only `code == "SUCCESS"` counts
//! as success. Signing is the node's concern; callers only name the sender.

mod client;
mod contract;
mod http;

pub use client::{LedgerClient, LedgerError, LedgerFut};
pub use contract::{Account, GAME_CONTRACT, LedgerCall, SUCCESS_CODE, TxReceipt};
pub use http::{DEFAULT_NAMESPACE, HttpLedger};
