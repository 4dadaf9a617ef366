//! Actor-based serialization for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors: one
//! task owns the engine and its stores, and processes each operation to
//! completion before observing the next. That is the whole concurrency
//! story — no per-account locks, no interleaving of mutations is ever
//! externally visible, and a failed operation leaves no partial state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                Callers (any task)                     │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (single task)                │
//! │        Engine<S>: validate → compute → commit         │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::{
    engine::Engine,
    error::{Error, Result},
    store::Backend,
    types::{Transaction, User, UserId},
};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Register a new user
    Register {
        /// First name
        first_name: String,
        /// Last name
        last_name: String,
        /// Email address
        email: String,
        /// Phone number
        phone_number: String,
        /// Reply channel
        response: oneshot::Sender<Result<User>>,
    },

    /// Credit funds from the system sentinel
    Deposit {
        /// Target user
        user_id: UserId,
        /// Amount to credit
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Move funds between two users
    Transfer {
        /// Sending user
        from_user_id: UserId,
        /// Receiving user
        to_user_id: UserId,
        /// Amount to move
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Debit loyalty points to the system sentinel
    RedeemPoints {
        /// Redeeming user
        user_id: UserId,
        /// Points to debit
        points: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Read current balance
    GetBalance {
        /// Target user
        user_id: UserId,
        /// Reply channel
        response: oneshot::Sender<Result<u64>>,
    },

    /// Read current points
    GetPoints {
        /// Target user
        user_id: UserId,
        /// Reply channel
        response: oneshot::Sender<Result<u64>>,
    },

    /// Read transaction history, newest first
    GetTransactionHistory {
        /// Target user
        user_id: UserId,
        /// Records to skip
        skip: u64,
        /// Maximum records to return
        limit: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Vec<Transaction>>>,
    },

    /// Shutdown actor; acked once the stores are released
    Shutdown {
        /// Reply channel, signalled after the engine is dropped
        response: oneshot::Sender<()>,
    },
}

/// Actor that processes ledger messages
pub struct LedgerActor<S> {
    /// Engine owning the stores
    engine: Engine<S>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl<S: Backend> LedgerActor<S> {
    /// Create new actor
    pub fn new(engine: Engine<S>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { engine, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let mut ack = None;
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown { response } => {
                    ack = Some(response);
                    break;
                }
                other => self.handle_message(other),
            }
        }

        // Release the stores before acking so callers can reopen the same
        // data directory immediately after shutdown() returns.
        let Self { engine, mailbox } = self;
        drop(mailbox);
        drop(engine);

        tracing::debug!("Ledger actor stopped");

        if let Some(ack) = ack {
            let _ = ack.send(());
        }
    }

    /// Handle a single message to completion
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Register {
                first_name,
                last_name,
                email,
                phone_number,
                response,
            } => {
                let result = self
                    .engine
                    .register(&first_name, &last_name, &email, &phone_number);
                let _ = response.send(result);
            }

            LedgerMessage::Deposit {
                user_id,
                amount,
                response,
            } => {
                let _ = response.send(self.engine.deposit(&user_id, amount));
            }

            LedgerMessage::Transfer {
                from_user_id,
                to_user_id,
                amount,
                response,
            } => {
                let _ = response.send(self.engine.transfer(&from_user_id, &to_user_id, amount));
            }

            LedgerMessage::RedeemPoints {
                user_id,
                points,
                response,
            } => {
                let _ = response.send(self.engine.redeem_points(&user_id, points));
            }

            LedgerMessage::GetBalance { user_id, response } => {
                let _ = response.send(self.engine.get_balance(&user_id));
            }

            LedgerMessage::GetPoints { user_id, response } => {
                let _ = response.send(self.engine.get_points(&user_id));
            }

            LedgerMessage::GetTransactionHistory {
                user_id,
                skip,
                limit,
                response,
            } => {
                let _ = response.send(self.engine.get_transaction_history(&user_id, skip, limit));
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        msg: LedgerMessage,
        rx: oneshot::Receiver<Result<T>>,
    ) -> Result<T> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Register a new user
    pub async fn register(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<User> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::Register {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                phone_number: phone_number.into(),
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Credit funds to a user
    pub async fn deposit(&self, user_id: &UserId, amount: u64) -> Result<Transaction> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::Deposit {
                user_id: user_id.clone(),
                amount,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Move funds between two users
    pub async fn transfer(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        amount: u64,
    ) -> Result<Transaction> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::Transfer {
                from_user_id: from_user_id.clone(),
                to_user_id: to_user_id.clone(),
                amount,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Debit loyalty points from a user
    pub async fn redeem_points(&self, user_id: &UserId, points: u64) -> Result<Transaction> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::RedeemPoints {
                user_id: user_id.clone(),
                points,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Read current balance
    pub async fn get_balance(&self, user_id: &UserId) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::GetBalance {
                user_id: user_id.clone(),
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Read current points
    pub async fn get_points(&self, user_id: &UserId) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::GetPoints {
                user_id: user_id.clone(),
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Read transaction history, newest first
    pub async fn get_transaction_history(
        &self,
        user_id: &UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        let (tx, rx) = oneshot::channel();
        self.call(
            LedgerMessage::GetTransactionHistory {
                user_id: user_id.clone(),
                skip,
                limit,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Shutdown actor, waiting until the stores are released
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::Shutdown { response: tx })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor<S: Backend + 'static>(engine: Engine<S>) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = LedgerActor::new(engine, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
