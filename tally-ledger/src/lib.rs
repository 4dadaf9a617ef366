//! Tally Ledger Core
//!
//! A minimal account ledger: principals register as users, hold a balance
//! and a loyalty-point counter, move funds between accounts, and redeem
//! points.
//!
//! # Architecture
//!
//! - **Two stores**: ordered key-value regions for users and transactions,
//!   behind injected trait contracts
//! - **Single writer**: one actor task serializes every operation, so no
//!   interleaving of mutations is ever externally visible
//! - **Fail-fast validation**: every check precedes every write; a rejected
//!   operation leaves no partial state
//! - **Append-only audit log**: transactions are written once and never
//!   mutated or deleted
//!
//! # Invariants
//!
//! - Balances and points are unsigned and never go negative
//! - A transfer conserves the sum of the two balances involved
//! - Points accrue to the sender at `amount / points_rate` per transfer
//! - Accrual arithmetic is checked; overflow is an error, never wraparound

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod provider;
pub mod storage;
pub mod store;
pub mod types;
pub mod validate;

// Re-exports
pub use config::{Config, PolicyConfig};
pub use engine::Engine;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use storage::Storage;
pub use store::{AccountStore, Backend, MemoryStore, TransactionStore};
pub use types::{
    Transaction, TransactionId, TransactionStatus, TransactionType, User, UserId,
};
