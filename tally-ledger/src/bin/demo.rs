//! End-to-end demo against an in-memory ledger

use tally_ledger::Ledger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Tally ledger demo");

    let ledger = Ledger::in_memory().await?;

    let ada = ledger
        .register("Ada", "Lovelace", "ada@example.com", "+12025550123")
        .await?;
    let bob = ledger
        .register("Bob", "Babbage", "bob@example.com", "+12025550124")
        .await?;

    ledger.deposit(&ada.id, 100).await?;
    ledger.transfer(&ada.id, &bob.id, 30).await?;
    ledger.redeem_points(&ada.id, 3).await?;

    tracing::info!(
        ada_balance = ledger.get_balance(&ada.id).await?,
        ada_points = ledger.get_points(&ada.id).await?,
        bob_balance = ledger.get_balance(&bob.id).await?,
        "Final state"
    );

    for txn in ledger.get_transaction_history(&ada.id, 0, 10).await? {
        tracing::info!(
            id = %txn.id,
            transaction_type = %txn.transaction_type,
            amount = txn.amount,
            points_earned = txn.points_earned,
            "History entry"
        );
    }

    ledger.shutdown().await?;
    Ok(())
}
