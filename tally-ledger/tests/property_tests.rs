//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Balance conservation: a transfer never changes the sum of balances
//! - Points accrual: sender earns exactly amount / rate per transfer
//! - Non-negativity: no operation drives a balance or points below zero
//! - History ordering: newest first, stable pagination window

use proptest::prelude::*;
use tally_ledger::{Config, Engine, Error, Ledger, MemoryStore, PolicyConfig};

const POINTS_RATE: u64 = 10;

fn test_engine() -> Engine<MemoryStore> {
    Engine::new(MemoryStore::new(), PolicyConfig::default()).unwrap()
}

/// Strategy for generating valid amounts
fn amount_strategy() -> impl Strategy<Value = u64> {
    1u64..1_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a transfer debits and credits exactly `amount`, and the sum
    /// of the two balances is unchanged
    #[test]
    fn prop_transfer_conserves_balances(
        funding in amount_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(amount <= funding);

        let engine = test_engine();
        let sender = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();
        let recipient = engine
            .register("Bob", "Babbage", "bob@example.com", "+12025550124")
            .unwrap();
        engine.deposit(&sender.id, funding).unwrap();

        let before_sender = engine.get_balance(&sender.id).unwrap();
        let before_recipient = engine.get_balance(&recipient.id).unwrap();

        engine.transfer(&sender.id, &recipient.id, amount).unwrap();

        let after_sender = engine.get_balance(&sender.id).unwrap();
        let after_recipient = engine.get_balance(&recipient.id).unwrap();

        prop_assert_eq!(after_sender + amount, before_sender);
        prop_assert_eq!(after_recipient - amount, before_recipient);
        prop_assert_eq!(
            before_sender + before_recipient,
            after_sender + after_recipient
        );
    }

    /// Property: the sender earns amount / rate points and the recipient's
    /// points are unaffected
    #[test]
    fn prop_transfer_points_accrual(amount in amount_strategy()) {
        let engine = test_engine();
        let sender = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();
        let recipient = engine
            .register("Bob", "Babbage", "bob@example.com", "+12025550124")
            .unwrap();
        engine.deposit(&sender.id, amount).unwrap();

        let txn = engine.transfer(&sender.id, &recipient.id, amount).unwrap();

        prop_assert_eq!(engine.get_points(&sender.id).unwrap(), amount / POINTS_RATE);
        prop_assert_eq!(engine.get_points(&recipient.id).unwrap(), 0);
        prop_assert_eq!(txn.points_earned, (amount / POINTS_RATE) as i64);
    }

    /// Property: a transfer exceeding the sender balance is rejected and
    /// changes nothing
    #[test]
    fn prop_overdraft_rejected_without_side_effects(
        funding in amount_strategy(),
        excess in 1u64..1_000_000,
    ) {
        let engine = test_engine();
        let sender = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();
        let recipient = engine
            .register("Bob", "Babbage", "bob@example.com", "+12025550124")
            .unwrap();
        engine.deposit(&sender.id, funding).unwrap();

        let err = engine
            .transfer(&sender.id, &recipient.id, funding + excess)
            .unwrap_err();

        prop_assert!(
            matches!(err, Error::InsufficientFunds { .. }),
            "expected InsufficientFunds, got {:?}",
            err
        );
        prop_assert_eq!(engine.get_balance(&sender.id).unwrap(), funding);
        prop_assert_eq!(engine.get_balance(&recipient.id).unwrap(), 0);
        // Only the funding deposit is on record for the sender
        let history = engine.get_transaction_history(&sender.id, 0, 10).unwrap();
        prop_assert_eq!(history.len(), 1);
    }

    /// Property: redemption never drives points negative; redeeming exactly
    /// the held amount leaves zero
    #[test]
    fn prop_redemption_bounded_by_held_points(amount in 10u64..100_000) {
        let engine = test_engine();
        let sender = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();
        let recipient = engine
            .register("Bob", "Babbage", "bob@example.com", "+12025550124")
            .unwrap();
        engine.deposit(&sender.id, amount).unwrap();
        engine.transfer(&sender.id, &recipient.id, amount).unwrap();

        let held = engine.get_points(&sender.id).unwrap();
        prop_assume!(held > 0 && held <= 10_000);

        let err = engine.redeem_points(&sender.id, held + 1).unwrap_err();
        prop_assert!(
            matches!(err, Error::InsufficientPoints { .. }),
            "expected InsufficientPoints, got {:?}",
            err
        );
        prop_assert_eq!(engine.get_points(&sender.id).unwrap(), held);

        engine.redeem_points(&sender.id, held).unwrap();
        prop_assert_eq!(engine.get_points(&sender.id).unwrap(), 0);
    }

    /// Property: deposits accumulate exactly
    #[test]
    fn prop_deposits_accumulate(amounts in prop::collection::vec(amount_strategy(), 1..10)) {
        let engine = test_engine();
        let user = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();

        let mut expected = 0u64;
        for amount in &amounts {
            engine.deposit(&user.id, *amount).unwrap();
            expected += amount;
        }

        prop_assert_eq!(engine.get_balance(&user.id).unwrap(), expected);
    }

    /// Property: history is newest-first and pagination windows tile it
    #[test]
    fn prop_history_ordering_and_pagination(
        count in 1usize..20,
        skip in 0u64..25,
        limit in 1u64..25,
    ) {
        let engine = test_engine();
        let user = engine
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .unwrap();
        for _ in 0..count {
            engine.deposit(&user.id, 10).unwrap();
        }

        let full = engine.get_transaction_history(&user.id, 0, u64::MAX).unwrap();
        prop_assert_eq!(full.len(), count);
        for pair in full.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }

        let page = engine.get_transaction_history(&user.id, skip, limit).unwrap();
        let expected: Vec<_> = full
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        prop_assert_eq!(page, expected);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use tally_ledger::UserId;

    /// The full end-to-end scenario: register, deposit, transfer, redeem
    #[tokio::test]
    async fn test_full_ledger_lifecycle() {
        let ledger = Ledger::in_memory().await.unwrap();

        let ada = ledger
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .await
            .unwrap();
        assert_eq!(ledger.get_balance(&ada.id).await.unwrap(), 0);
        assert_eq!(ledger.get_points(&ada.id).await.unwrap(), 0);

        ledger.deposit(&ada.id, 100).await.unwrap();
        assert_eq!(ledger.get_balance(&ada.id).await.unwrap(), 100);

        let bob = ledger
            .register("Bob", "Babbage", "bob@example.com", "+12025550124")
            .await
            .unwrap();

        let txn = ledger.transfer(&ada.id, &bob.id, 30).await.unwrap();
        assert_eq!(ledger.get_balance(&ada.id).await.unwrap(), 70);
        assert_eq!(ledger.get_points(&ada.id).await.unwrap(), 3);
        assert_eq!(ledger.get_balance(&bob.id).await.unwrap(), 30);
        assert_eq!(txn.amount, 30);
        assert_eq!(txn.points_earned, 3);

        ledger.redeem_points(&ada.id, 3).await.unwrap();
        assert_eq!(ledger.get_points(&ada.id).await.unwrap(), 0);

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let ledger = Ledger::in_memory().await.unwrap();

        ledger
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .await
            .unwrap();
        let err = ledger
            .register("Another", "Person", "ada@example.com", "+12025550125")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_history_not_found_vs_empty_page() {
        let ledger = Ledger::in_memory().await.unwrap();

        let ada = ledger
            .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
            .await
            .unwrap();

        // No transactions at all: NotFound
        let err = ledger
            .get_transaction_history(&ada.id, 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransactionNotFound(_)));

        // Transactions exist but skip overshoots: empty page
        ledger.deposit(&ada.id, 10).await.unwrap();
        let page = ledger
            .get_transaction_history(&ada.id, 5, 10)
            .await
            .unwrap();
        assert!(page.is_empty());

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let user_id: UserId;
        {
            let ledger = Ledger::open(config.clone()).await.unwrap();
            let user = ledger
                .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
                .await
                .unwrap();
            ledger.deposit(&user.id, 250).await.unwrap();
            user_id = user.id;
            ledger.shutdown().await.unwrap();
        }

        let ledger = Ledger::open(config).await.unwrap();
        assert_eq!(ledger.get_balance(&user_id).await.unwrap(), 250);

        let history = ledger
            .get_transaction_history(&user_id, 0, 10)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 250);

        ledger.shutdown().await.unwrap();
    }
}
