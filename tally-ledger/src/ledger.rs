//! Main ledger orchestration layer
//!
//! This module ties together storage, engine, and actor components into a
//! high-level API for account and transaction processing.
//!
//! # Example
//!
//! ```no_run
//! use tally_ledger::{Config, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> tally_ledger::Result<()> {
//!     let config = Config::default();
//!     let ledger = Ledger::open(config).await?;
//!
//!     let user = ledger
//!         .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
//!         .await?;
//!     ledger.deposit(&user.id, 100).await?;
//!
//!     ledger.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    engine::Engine,
    metrics::Metrics,
    store::MemoryStore,
    types::{Transaction, User, UserId},
    Config, Result, Storage,
};

/// Main ledger interface
pub struct Ledger {
    /// Actor handle for all operations
    handle: LedgerHandle,

    /// Metrics collector (shared with the engine)
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration (RocksDB-backed)
    pub async fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(&config)?;
        let engine = Engine::new(storage, config.policy.clone())?;
        let metrics = engine.metrics().clone();
        let handle = spawn_ledger_actor(engine);

        tracing::info!(service = %config.service_name, "Ledger opened");

        Ok(Self {
            handle,
            metrics,
            config,
        })
    }

    /// Open an in-memory ledger (tests and demos)
    pub async fn in_memory() -> Result<Self> {
        let config = Config::default();
        let engine = Engine::new(MemoryStore::new(), config.policy.clone())?;
        let metrics = engine.metrics().clone();
        let handle = spawn_ledger_actor(engine);

        Ok(Self {
            handle,
            metrics,
            config,
        })
    }

    /// Register a new user with zero balance and zero points
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<User> {
        self.handle
            .register(first_name, last_name, email, phone_number)
            .await
    }

    /// Credit `amount` to a user from the system sentinel
    pub async fn deposit(&self, user_id: &UserId, amount: u64) -> Result<Transaction> {
        self.handle.deposit(user_id, amount).await
    }

    /// Move `amount` between two user accounts
    pub async fn transfer(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        amount: u64,
    ) -> Result<Transaction> {
        self.handle.transfer(from_user_id, to_user_id, amount).await
    }

    /// Debit loyalty points from a user to the system sentinel
    pub async fn redeem_points(&self, user_id: &UserId, points: u64) -> Result<Transaction> {
        self.handle.redeem_points(user_id, points).await
    }

    /// Current balance of a user
    pub async fn get_balance(&self, user_id: &UserId) -> Result<u64> {
        self.handle.get_balance(user_id).await
    }

    /// Current loyalty points of a user
    pub async fn get_points(&self, user_id: &UserId) -> Result<u64> {
        self.handle.get_points(user_id).await
    }

    /// Transactions touching a user, newest first, with a pagination window
    pub async fn get_transaction_history(
        &self,
        user_id: &UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        self.handle
            .get_transaction_history(user_id, skip, limit)
            .await
    }

    /// Cloneable handle for sharing across tasks
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown ledger
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}
