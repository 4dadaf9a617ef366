//! Ledger engine: business rules for balances, points, and transactions
//!
//! The engine is pure decision logic over an injected [`Backend`]: it reads,
//! validates, computes the new User/Transaction states, and commits them.
//! All validation happens before any mutation; the first applicable error is
//! returned and no partial state is ever written.
//!
//! Serialization of operations is the caller's concern; in this crate the
//! single-writer actor ([`crate::actor`]) owns the engine and processes one
//! operation to completion at a time.

use crate::{
    config::PolicyConfig,
    error::{Error, Result},
    metrics::Metrics,
    provider::{Clock, IdProvider, SystemClock, UuidIds},
    store::Backend,
    types::{Transaction, TransactionId, TransactionStatus, TransactionType, User, UserId},
    validate::Validator,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Ledger engine over a storage backend
pub struct Engine<S> {
    store: S,
    policy: PolicyConfig,
    validator: Validator,
    ids: Arc<dyn IdProvider>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<S: Backend> Engine<S> {
    /// Create engine with production clock and id provider
    pub fn new(store: S, policy: PolicyConfig) -> Result<Self> {
        Self::with_providers(store, policy, Arc::new(UuidIds), Arc::new(SystemClock))
    }

    /// Create engine with injected clock and id provider
    pub fn with_providers(
        store: S,
        policy: PolicyConfig,
        ids: Arc<dyn IdProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to build metrics: {}", e)))?;

        Ok(Self {
            store,
            policy,
            validator: Validator::new(),
            ids,
            clock,
            metrics,
        })
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Storage backend
    pub fn store(&self) -> &S {
        &self.store
    }

    // Mutating operations

    /// Register a new user with zero balance and zero points
    ///
    /// No transaction record is produced for registration.
    pub fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<User> {
        let started = Instant::now();
        let result = self.do_register(first_name, last_name, email, phone_number);
        self.observe(started, &result);
        if result.is_ok() {
            self.metrics.users_registered.inc();
        }
        result
    }

    fn do_register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<User> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        let email = email.trim();
        let phone_number = phone_number.trim();

        self.validator.validate_name("first_name", first_name)?;
        self.validator.validate_name("last_name", last_name)?;
        self.validator.validate_email(email)?;
        self.validator.validate_phone(phone_number)?;

        let users = self.store.list_users()?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(Error::DuplicateEmail(email.to_string()));
        }

        let username = self.unique_username(first_name, last_name, &users)?;
        let now = self.clock.now();
        let user = User {
            id: UserId::new(self.ids.new_id()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username,
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            balance: 0,
            points: 0,
            created_at: now,
            updated_at: now,
        };

        self.store.put_user(&user)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Credit `amount` to a user from the system sentinel
    pub fn deposit(&self, user_id: &UserId, amount: u64) -> Result<Transaction> {
        let started = Instant::now();
        let result = self.do_deposit(user_id, amount);
        self.observe(started, &result);
        if result.is_ok() {
            self.metrics.deposits.inc();
        }
        result
    }

    fn do_deposit(&self, user_id: &UserId, amount: u64) -> Result<Transaction> {
        if amount == 0 {
            return Err(Error::Validation("amount must be positive".to_string()));
        }

        let mut user = self.store.get_user(user_id)?;

        user.balance = user.balance.checked_add(amount).ok_or_else(|| {
            Error::System(format!("balance overflow for user {}", user_id))
        })?;

        let now = self.clock.now();
        user.updated_at = now;

        let txn = Transaction {
            id: TransactionId::new(self.ids.new_id()),
            from_user_id: UserId::system(),
            to_user_id: user_id.clone(),
            amount,
            points_earned: 0,
            transaction_type: TransactionType::Deposit,
            status: TransactionStatus::Completed,
            created_at: now,
        };

        self.store.commit(&[&user], &txn)?;

        tracing::info!(user_id = %user_id, amount, "Deposit completed");

        Ok(txn)
    }

    /// Move `amount` between two user accounts, crediting loyalty points to
    /// the sender at the configured rate
    pub fn transfer(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        amount: u64,
    ) -> Result<Transaction> {
        let started = Instant::now();
        let result = self.do_transfer(from_user_id, to_user_id, amount);
        self.observe(started, &result);
        if result.is_ok() {
            self.metrics.transfers.inc();
        }
        result
    }

    fn do_transfer(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        amount: u64,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(Error::Validation("amount must be positive".to_string()));
        }
        if from_user_id == to_user_id {
            return Err(Error::Validation(
                "sender and recipient must differ".to_string(),
            ));
        }

        let mut sender = self.store.get_user(from_user_id)?;
        let mut recipient = self.store.get_user(to_user_id)?;

        if sender.balance < amount {
            return Err(Error::InsufficientFunds {
                available: sender.balance,
                requested: amount,
            });
        }

        let points = amount.checked_div(self.policy.points_rate).unwrap_or(0);
        let points_earned = i64::try_from(points)
            .map_err(|_| Error::System(format!("points accrual out of range: {}", points)))?;

        sender.balance = sender.balance.checked_sub(amount).ok_or_else(|| {
            Error::System(format!("balance underflow for user {}", from_user_id))
        })?;
        sender.points = sender.points.checked_add(points).ok_or_else(|| {
            Error::System(format!("points overflow for user {}", from_user_id))
        })?;
        recipient.balance = recipient.balance.checked_add(amount).ok_or_else(|| {
            Error::System(format!("balance overflow for user {}", to_user_id))
        })?;

        let now = self.clock.now();
        sender.updated_at = now;
        recipient.updated_at = now;

        let txn = Transaction {
            id: TransactionId::new(self.ids.new_id()),
            from_user_id: from_user_id.clone(),
            to_user_id: to_user_id.clone(),
            amount,
            points_earned,
            transaction_type: TransactionType::Transfer,
            status: TransactionStatus::Completed,
            created_at: now,
        };

        // Debit, credit, points accrual and the transaction record land as
        // one commit unit; no partial state is externally visible.
        self.store.commit(&[&sender, &recipient], &txn)?;

        tracing::info!(
            from = %from_user_id,
            to = %to_user_id,
            amount,
            points_earned,
            "Transfer completed"
        );

        Ok(txn)
    }

    /// Debit loyalty points from a user to the system sentinel
    pub fn redeem_points(&self, user_id: &UserId, points: u64) -> Result<Transaction> {
        let started = Instant::now();
        let result = self.do_redeem_points(user_id, points);
        self.observe(started, &result);
        if result.is_ok() {
            self.metrics.redemptions.inc();
        }
        result
    }

    fn do_redeem_points(&self, user_id: &UserId, points: u64) -> Result<Transaction> {
        if points == 0 {
            return Err(Error::Validation("points must be positive".to_string()));
        }
        if points > self.policy.max_points_per_redemption {
            return Err(Error::Validation(format!(
                "at most {} points may be redeemed per call",
                self.policy.max_points_per_redemption
            )));
        }

        let mut user = self.store.get_user(user_id)?;

        if user.points < points {
            return Err(Error::InsufficientPoints {
                available: user.points,
                requested: points,
            });
        }

        user.points = user.points.checked_sub(points).ok_or_else(|| {
            Error::System(format!("points underflow for user {}", user_id))
        })?;

        let now = self.clock.now();
        user.updated_at = now;

        let points_debited = i64::try_from(points)
            .map_err(|_| Error::System(format!("points debit out of range: {}", points)))?;

        let txn = Transaction {
            id: TransactionId::new(self.ids.new_id()),
            from_user_id: user_id.clone(),
            to_user_id: UserId::system(),
            amount: 0,
            points_earned: -points_debited,
            transaction_type: TransactionType::PointsRedemption,
            status: TransactionStatus::Completed,
            created_at: now,
        };

        self.store.commit(&[&user], &txn)?;

        tracing::info!(user_id = %user_id, points, "Points redeemed");

        Ok(txn)
    }

    // Query layer

    /// Current balance of a user
    pub fn get_balance(&self, user_id: &UserId) -> Result<u64> {
        Ok(self.store.get_user(user_id)?.balance)
    }

    /// Current loyalty points of a user
    pub fn get_points(&self, user_id: &UserId) -> Result<u64> {
        Ok(self.store.get_user(user_id)?.points)
    }

    /// Transactions touching a user, newest first, with a pagination window
    ///
    /// Fails with `TransactionNotFound` only when the pre-pagination filtered
    /// set is empty; an overshooting `skip` yields an empty page.
    pub fn get_transaction_history(
        &self,
        user_id: &UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        let mut txns: Vec<Transaction> = self
            .store
            .list_transactions()?
            .into_iter()
            .filter(|t| t.involves(user_id))
            .collect();

        if txns.is_empty() {
            return Err(Error::TransactionNotFound(format!(
                "no transactions for user {}",
                user_id
            )));
        }

        // Newest first; ties broken by id (v7 ids are time-ordered)
        txns.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(txns.into_iter().skip(skip).take(limit).collect())
    }

    // Helpers

    /// Deterministic username: lowercase alphanumerics of the first name,
    /// then at most 10 of the last name; collisions resolved with an
    /// increasing numeric suffix
    fn unique_username(&self, first_name: &str, last_name: &str, users: &[User]) -> Result<String> {
        let mut candidate: String = first_name
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        candidate.extend(
            last_name
                .to_lowercase()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .take(10),
        );

        if candidate.is_empty() {
            return Err(Error::Validation(
                "name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let taken: HashSet<&str> = users.iter().map(|u| u.username.as_str()).collect();
        if !taken.contains(candidate.as_str()) {
            return Ok(candidate);
        }

        let mut suffix = 2u64;
        loop {
            let suffixed = format!("{}{}", candidate, suffix);
            if !taken.contains(suffixed.as_str()) {
                return Ok(suffixed);
            }
            suffix += 1;
        }
    }

    fn observe<T>(&self, started: Instant, result: &Result<T>) {
        self.metrics.record_duration(started.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.record_failure();
        }
    }
}
