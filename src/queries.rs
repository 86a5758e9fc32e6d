//! Read-only facade: composes stored ledger state with live prices.
//! Nothing here mutates anything.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::history::{self, ValuePoint};
use crate::ledger;
use crate::oracle::{HistorySpan, PriceOracle};
use crate::persistence;
use crate::types::possession::Possession;
use crate::types::transaction::Transaction;
use crate::types::Cents;

pub async fn balance(pool: &PgPool, user_id: Uuid) -> Result<Cents, LedgerError> {
    persistence::get_balance(pool, user_id)
        .await?
        .ok_or(LedgerError::NotFound)
}

pub async fn possessions(pool: &PgPool, user_id: Uuid) -> Result<Vec<Possession>, LedgerError> {
    let rows = persistence::list_possessions_for_user(pool, user_id).await?;
    Ok(rows.into_iter().map(|row| row.into_possession()).collect())
}

/// Transaction log, most recent first (display order).
pub async fn transactions(pool: &PgPool, user_id: Uuid) -> Result<Vec<Transaction>, LedgerError> {
    Ok(persistence::list_transactions_for_user(pool, user_id).await?)
}

/// Distinct tickers the user has ever held, including fully sold ones.
pub async fn held_tickers(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, LedgerError> {
    Ok(persistence::list_held_tickers(pool, user_id).await?)
}

/// Balance plus the market value of every held ticker, one price lookup
/// per distinct ticker. All-or-nothing: any failed lookup fails the whole
/// aggregate rather than silently omitting a holding.
pub async fn portfolio_value(
    balance_cents: Cents,
    possessions: &[Possession],
    oracle: &dyn PriceOracle,
) -> Result<Cents, LedgerError> {
    let overflow = || LedgerError::Internal("portfolio value overflow".to_string());
    let mut total = balance_cents;
    for possession in possessions {
        if possession.amount == 0 {
            continue;
        }
        let close = oracle.latest_close(&possession.ticker).await?;
        let holding = possession.amount.checked_mul(close).ok_or_else(overflow)?;
        total = total.checked_add(holding).ok_or_else(overflow)?;
    }
    Ok(total)
}

pub async fn total_portfolio_value(
    pool: &PgPool,
    oracle: &dyn PriceOracle,
    user_id: Uuid,
) -> Result<Cents, LedgerError> {
    let balance = balance(pool, user_id).await?;
    let possessions = possessions(pool, user_id).await?;
    portfolio_value(balance, &possessions, oracle).await
}

/// Value-over-time series for one ticker: replays the user's BUY/SELL log
/// against the span's price history.
pub async fn value_over_time(
    pool: &PgPool,
    oracle: &dyn PriceOracle,
    user_id: Uuid,
    ticker: &str,
    span: HistorySpan,
) -> Result<Vec<ValuePoint>, LedgerError> {
    let ticker = ledger::normalize_ticker(ticker)?;
    let trades = persistence::list_trades_for_ticker(pool, user_id, &ticker).await?;
    let prices = oracle.history(&ticker, span).await?;
    history::value_over_time(&trades, &prices)
}
