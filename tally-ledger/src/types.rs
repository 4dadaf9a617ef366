//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (unsigned integers for balances and points)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved identifier standing in for the ledger itself in deposit and
/// redemption records.
pub const SYSTEM_ACCOUNT: &str = "system";

/// User identifier (opaque string, immutable once assigned)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The system sentinel account
    pub fn system() -> Self {
        Self(SYSTEM_ACCOUNT.to_string())
    }

    /// Whether this is the system sentinel
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_ACCOUNT
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier (opaque string)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new transaction ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered account
///
/// Users are created once via registration and mutated in place by every
/// balance/point-affecting operation; they are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique ID (immutable)
    pub id: UserId,

    /// Display first name
    pub first_name: String,

    /// Display last name
    pub last_name: String,

    /// Derived username (unique, immutable)
    pub username: String,

    /// Email address (unique, case-insensitive)
    pub email: String,

    /// Phone number in international dialing shape
    pub phone_number: String,

    /// Unit-less currency balance. Invariant: never negative.
    pub balance: u64,

    /// Loyalty point counter. Invariant: never negative.
    pub points: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

/// One completed ledger movement, append-only once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique ID
    pub id: TransactionId,

    /// Sending account, or the system sentinel for deposits
    pub from_user_id: UserId,

    /// Receiving account, or the system sentinel for redemptions
    pub to_user_id: UserId,

    /// Moved amount; zero only for pure point-redemption records
    pub amount: u64,

    /// Points credited (positive) or debited (negative) by this movement
    pub points_earned: i64,

    /// Kind of movement
    pub transaction_type: TransactionType,

    /// Completion status
    pub status: TransactionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this transaction touches the given user on either side
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.from_user_id == user_id || &self.to_user_id == user_id
    }
}

/// Kind of ledger movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Funds moved between two user accounts
    Transfer = 1,
    /// Funds credited from the system sentinel
    Deposit = 2,
    /// Loyalty points debited to the system sentinel
    PointsRedemption = 3,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Transfer => "transfer",
            TransactionType::Deposit => "deposit",
            TransactionType::PointsRedemption => "points_redemption",
        };
        write!(f, "{}", name)
    }
}

/// Transaction status
///
/// An operation either fully commits or nothing is written, so no
/// partial/pending states are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionStatus {
    /// Fully committed
    Completed = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_sentinel() {
        let system = UserId::system();
        assert!(system.is_system());
        assert_eq!(system.as_str(), SYSTEM_ACCOUNT);

        let user = UserId::new("7f9c2ba4");
        assert!(!user.is_system());
    }

    #[test]
    fn test_transaction_involves() {
        let txn = Transaction {
            id: TransactionId::new("t1"),
            from_user_id: UserId::new("alice"),
            to_user_id: UserId::new("bob"),
            amount: 30,
            points_earned: 3,
            transaction_type: TransactionType::Transfer,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        assert!(txn.involves(&UserId::new("alice")));
        assert!(txn.involves(&UserId::new("bob")));
        assert!(!txn.involves(&UserId::new("carol")));
    }

    #[test]
    fn test_transaction_type_display() {
        assert_eq!(TransactionType::Transfer.to_string(), "transfer");
        assert_eq!(TransactionType::Deposit.to_string(), "deposit");
        assert_eq!(
            TransactionType::PointsRedemption.to_string(),
            "points_redemption"
        );
    }
}
