//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `accounts` - User records (key: user id)
//! - `transactions` - Append-only transaction log (key: transaction id)

use crate::{
    error::{Error, Result},
    store::{AccountStore, Backend, TransactionStore},
    types::{Transaction, TransactionId, User, UserId},
    Config,
};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, IteratorMode, Options, WriteBatch, DB,
};
use std::sync::Arc;

/// Column family names
const CF_ACCOUNTS: &str = "accounts";
const CF_TRANSACTIONS: &str = "transactions";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        // Universal compaction for write-heavy workload
        db_opts.set_compaction_style(DBCompactionStyle::Universal);

        // Enable statistics
        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Self::cf_options_accounts()),
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_transactions()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Accounts are frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_transactions() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Statistics

    /// Get storage statistics
    pub fn get_stats(&self) -> Result<StorageStats> {
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;

        Ok(StorageStats {
            total_users: self.approximate_count(cf_accounts)?,
            total_transactions: self.approximate_count(cf_transactions)?,
        })
    }

    fn approximate_count(&self, cf: &ColumnFamily) -> Result<u64> {
        // RocksDB property for approximate count
        let prop = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);

        Ok(prop)
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl AccountStore for Storage {
    fn get_user(&self, id: &UserId) -> Result<User> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        let value = self
            .db
            .get_cf(cf, id.as_str().as_bytes())?
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;

        let user: User = bincode::deserialize(&value)?;
        Ok(user)
    }

    fn put_user(&self, user: &User) -> Result<()> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let value = bincode::serialize(user)?;

        self.db.put_cf(cf, user.id.as_str().as_bytes(), &value)?;

        tracing::debug!(user_id = %user.id, balance = user.balance, "User persisted");

        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        let mut users = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            users.push(bincode::deserialize(&value)?);
        }

        Ok(users)
    }
}

impl TransactionStore for Storage {
    fn get_transaction(&self, id: &TransactionId) -> Result<Transaction> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;

        let value = self
            .db
            .get_cf(cf, id.as_str().as_bytes())?
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))?;

        let txn: Transaction = bincode::deserialize(&value)?;
        Ok(txn)
    }

    fn append_transaction(&self, txn: &Transaction) -> Result<()> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        let value = bincode::serialize(txn)?;

        self.db.put_cf(cf, txn.id.as_str().as_bytes(), &value)?;

        tracing::debug!(
            transaction_id = %txn.id,
            transaction_type = %txn.transaction_type,
            amount = txn.amount,
            "Transaction appended"
        );

        Ok(())
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;

        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            transactions.push(bincode::deserialize(&value)?);
        }

        Ok(transactions)
    }
}

impl Backend for Storage {
    /// Commit user states and one transaction atomically via WriteBatch
    fn commit(&self, users: &[&User], txn: &Transaction) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        for user in users {
            let value = bincode::serialize(user)?;
            batch.put_cf(cf_accounts, user.id.as_str().as_bytes(), &value);
        }

        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;
        let value = bincode::serialize(txn)?;
        batch.put_cf(cf_transactions, txn.id.as_str().as_bytes(), &value);

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(
            transaction_id = %txn.id,
            users = users.len(),
            "Atomic commit applied"
        );

        Ok(())
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Approximate user count
    pub total_users: u64,
    /// Approximate transaction count
    pub total_transactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TransactionStatus, TransactionType};
    use chrono::Utc;
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (config, temp_dir)
    }

    fn test_user(id: &str) -> User {
        User {
            id: UserId::new(id),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            username: "gracehopper".to_string(),
            email: format!("{}@example.com", id),
            phone_number: "+12025550123".to_string(),
            balance: 100,
            points: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_transaction(id: &str, from: &str, to: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            from_user_id: UserId::new(from),
            to_user_id: UserId::new(to),
            amount: 30,
            points_earned: 3,
            transaction_type: TransactionType::Transfer,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_storage_open() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        assert!(storage.db.cf_handle(CF_ACCOUNTS).is_some());
        assert!(storage.db.cf_handle(CF_TRANSACTIONS).is_some());
    }

    #[test]
    fn test_put_and_get_user() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let user = test_user("u1");
        storage.put_user(&user).unwrap();

        let retrieved = storage.get_user(&user.id).unwrap();
        assert_eq!(retrieved, user);
    }

    #[test]
    fn test_get_missing_user() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let err = storage.get_user(&UserId::new("missing")).unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[test]
    fn test_append_and_list_transactions() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        storage
            .append_transaction(&test_transaction("t1", "a", "b"))
            .unwrap();
        storage
            .append_transaction(&test_transaction("t2", "b", "a"))
            .unwrap();

        let all = storage.list_transactions().unwrap();
        assert_eq!(all.len(), 2);

        let retrieved = storage
            .get_transaction(&TransactionId::new("t1"))
            .unwrap();
        assert_eq!(retrieved.amount, 30);
    }

    #[test]
    fn test_atomic_commit() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let mut sender = test_user("a");
        let mut recipient = test_user("b");
        sender.balance = 70;
        recipient.balance = 30;
        let txn = test_transaction("t1", "a", "b");

        storage.commit(&[&sender, &recipient], &txn).unwrap();

        assert_eq!(storage.get_user(&sender.id).unwrap().balance, 70);
        assert_eq!(storage.get_user(&recipient.id).unwrap().balance, 30);
        assert!(storage.get_transaction(&txn.id).is_ok());
    }

    #[test]
    fn test_reopen_persists() {
        let (config, _temp) = test_config();

        {
            let storage = Storage::open(&config).unwrap();
            storage.put_user(&test_user("u1")).unwrap();
            storage.close().unwrap();
        }

        let storage = Storage::open(&config).unwrap();
        let user = storage.get_user(&UserId::new("u1")).unwrap();
        assert_eq!(user.balance, 100);
    }
}
