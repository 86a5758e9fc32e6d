//! Ledger engine: the only writer of balance, possession, and transaction
//! rows. Each operation validates its input, captures the execution price
//! when one is needed, then runs check-then-mutate inside one database
//! transaction with the affected rows locked, so concurrent operations for
//! the same user serialize instead of racing on a stale snapshot.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DeletePolicy;
use crate::error::LedgerError;
use crate::ledger;
use crate::oracle::PriceOracle;
use crate::persistence;
use crate::types::transaction::{Transaction, TransactionKind};
use crate::types::{Cents, ShareCount};

#[derive(Clone)]
pub struct LedgerEngine {
    pool: PgPool,
    oracle: Arc<dyn PriceOracle>,
    delete_policy: DeletePolicy,
}

impl LedgerEngine {
    pub fn new(pool: PgPool, oracle: Arc<dyn PriceOracle>, delete_policy: DeletePolicy) -> Self {
        Self {
            pool,
            oracle,
            delete_policy,
        }
    }

    /// Increase the balance by `amount_cents` and append a DEPOSIT record.
    /// Returns the new balance.
    pub async fn deposit(&self, user_id: Uuid, amount_cents: Cents) -> Result<Cents, LedgerError> {
        ledger::require_positive_cents(amount_cents)?;
        let mut db_tx = self.pool.begin().await?;
        let balance = persistence::balance_for_update(&mut db_tx, user_id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        let new_balance = ledger::deposit(balance, amount_cents)?;
        persistence::set_balance(&mut db_tx, user_id, new_balance).await?;
        let record = cash_flow_record(user_id, TransactionKind::Deposit, amount_cents);
        persistence::insert_transaction(&mut db_tx, &record).await?;
        db_tx.commit().await?;
        tracing::info!("user {user_id} deposited {amount_cents} cents");
        Ok(new_balance)
    }

    /// Decrease the balance by `amount_cents` and append a WITHDRAW record.
    /// Fails with `InsufficientFunds` when the balance would go negative.
    pub async fn withdraw(&self, user_id: Uuid, amount_cents: Cents) -> Result<Cents, LedgerError> {
        ledger::require_positive_cents(amount_cents)?;
        let mut db_tx = self.pool.begin().await?;
        let balance = persistence::balance_for_update(&mut db_tx, user_id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        let new_balance = ledger::withdraw(balance, amount_cents)?;
        persistence::set_balance(&mut db_tx, user_id, new_balance).await?;
        let record = cash_flow_record(user_id, TransactionKind::Withdraw, amount_cents);
        persistence::insert_transaction(&mut db_tx, &record).await?;
        db_tx.commit().await?;
        tracing::info!("user {user_id} withdrew {amount_cents} cents");
        Ok(new_balance)
    }

    /// Buy `share_count` shares of `ticker` at the current market price.
    /// The price is looked up once, before the row locks are taken, and is
    /// recorded on the transaction as the execution price.
    pub async fn buy(
        &self,
        user_id: Uuid,
        ticker: &str,
        share_count: ShareCount,
    ) -> Result<Transaction, LedgerError> {
        let ticker = ledger::normalize_ticker(ticker)?;
        ledger::require_positive_shares(share_count)?;
        let price_cents = self.oracle.latest_close(&ticker).await?;

        let mut db_tx = self.pool.begin().await?;
        let balance = persistence::balance_for_update(&mut db_tx, user_id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        let held = persistence::amount_for_update(&mut db_tx, user_id, &ticker).await?;
        let outcome = ledger::buy(balance, held.unwrap_or(0), price_cents, share_count)?;
        persistence::set_balance(&mut db_tx, user_id, outcome.new_balance_cents).await?;
        persistence::upsert_possession(&mut db_tx, user_id, &ticker, outcome.new_share_amount)
            .await?;
        let record = trade_record(user_id, &ticker, TransactionKind::Buy, share_count, price_cents);
        persistence::insert_transaction(&mut db_tx, &record).await?;
        db_tx.commit().await?;
        tracing::info!("user {user_id} bought {share_count} {ticker} at {price_cents} cents");
        Ok(record)
    }

    /// Sell `share_count` shares of `ticker` at the current market price.
    /// Fails with `NoPosition` when the ticker was never held and with
    /// `InsufficientShares` when the held amount is too small.
    pub async fn sell(
        &self,
        user_id: Uuid,
        ticker: &str,
        share_count: ShareCount,
    ) -> Result<Transaction, LedgerError> {
        let ticker = ledger::normalize_ticker(ticker)?;
        ledger::require_positive_shares(share_count)?;
        let price_cents = self.oracle.latest_close(&ticker).await?;

        let mut db_tx = self.pool.begin().await?;
        let balance = persistence::balance_for_update(&mut db_tx, user_id)
            .await?
            .ok_or(LedgerError::NotFound)?;
        let held = persistence::amount_for_update(&mut db_tx, user_id, &ticker).await?;
        let outcome = ledger::sell(balance, held, price_cents, share_count)?;
        persistence::set_balance(&mut db_tx, user_id, outcome.new_balance_cents).await?;
        persistence::upsert_possession(&mut db_tx, user_id, &ticker, outcome.new_share_amount)
            .await?;
        let record = trade_record(user_id, &ticker, TransactionKind::Sell, share_count, price_cents);
        persistence::insert_transaction(&mut db_tx, &record).await?;
        db_tx.commit().await?;
        tracing::info!("user {user_id} sold {share_count} {ticker} at {price_cents} cents");
        Ok(record)
    }

    /// Delete a transaction record owned by the user. Under the default
    /// destructive policy the record is removed without reversing its
    /// ledger effect; under `Forbid` every delete of an existing record is
    /// rejected.
    pub async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, LedgerError> {
        let existing = persistence::get_transaction(&self.pool, user_id, id).await?;
        ledger::authorize_delete(self.delete_policy, existing.is_some())?;
        if persistence::delete_transaction(&self.pool, user_id, id).await? {
            tracing::info!("user {user_id} deleted transaction {id}");
            Ok(id)
        } else {
            Err(LedgerError::NotFound)
        }
    }
}

fn cash_flow_record(user_id: Uuid, kind: TransactionKind, amount_cents: Cents) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        user_id,
        ticker: None,
        kind,
        amount: amount_cents,
        price_cents: None,
        created_at: Utc::now(),
    }
}

fn trade_record(
    user_id: Uuid,
    ticker: &str,
    kind: TransactionKind,
    share_count: ShareCount,
    price_cents: Cents,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        user_id,
        ticker: Some(ticker.to_string()),
        kind,
        amount: share_count,
        price_cents: Some(price_cents),
        created_at: Utc::now(),
    }
}
