//! Store contracts and the in-memory backend
//!
//! The engine never talks to a database directly; it goes through the two
//! ordered key-value contracts below. Uniqueness rules (email, username) are
//! engine-level policy and deliberately do not live here.

use crate::{
    error::{Error, Result},
    types::{Transaction, TransactionId, User, UserId},
};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Ordered mapping from user identifier to User record
///
/// Owns all User entities. `put_user` commits unconditionally, overwriting
/// any prior value for that id, and is atomic for a single record.
pub trait AccountStore: Send + Sync {
    /// Get user by ID
    fn get_user(&self, id: &UserId) -> Result<User>;

    /// Put user, overwriting any prior value
    fn put_user(&self, user: &User) -> Result<()>;

    /// All users, in key order
    fn list_users(&self) -> Result<Vec<User>>;
}

/// Ordered mapping from transaction identifier to Transaction record
///
/// Append-only in practice: the engine only ever calls `append_transaction`
/// with a freshly generated id, never overwriting an existing record.
pub trait TransactionStore: Send + Sync {
    /// Get transaction by ID
    fn get_transaction(&self, id: &TransactionId) -> Result<Transaction>;

    /// Append transaction
    fn append_transaction(&self, txn: &Transaction) -> Result<()>;

    /// All transactions, in key order
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
}

/// Combined backend with the all-or-nothing commit unit
///
/// The default implementation writes sequentially, which is sound because
/// the actor serializes every mutating operation; backends with a native
/// batch primitive override it for crash atomicity.
pub trait Backend: AccountStore + TransactionStore {
    /// Commit the given user states and one transaction as a single unit
    fn commit(&self, users: &[&User], txn: &Transaction) -> Result<()> {
        for user in users {
            self.put_user(user)?;
        }
        self.append_transaction(txn)
    }
}

/// In-memory backend over ordered maps
///
/// Used by tests and the demo binary; the production backend is
/// [`crate::Storage`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<UserId, User>>,
    transactions: RwLock<BTreeMap<TransactionId, Transaction>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn get_user(&self, id: &UserId) -> Result<User> {
        self.users
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(id.to_string()))
    }

    fn put_user(&self, user: &User) -> Result<()> {
        self.users.write().insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().values().cloned().collect())
    }
}

impl TransactionStore for MemoryStore {
    fn get_transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.transactions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))
    }

    fn append_transaction(&self, txn: &Transaction) -> Result<()> {
        self.transactions
            .write()
            .insert(txn.id.clone(), txn.clone());
        Ok(())
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.read().values().cloned().collect())
    }
}

impl Backend for MemoryStore {}
