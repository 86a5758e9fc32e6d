//! Portfolio value over time: replay one ticker's BUY/SELL transactions
//! against an ascending price series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::transaction::{Transaction, TransactionKind};
use crate::types::Cents;

/// One close from the market-data provider. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub close_cents: Cents,
}

/// Portfolio value at one historical price tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub time: DateTime<Utc>,
    pub value_cents: Cents,
}

/// Two-pointer merge of a chronological transaction log with a price
/// series. `transactions` must be ascending by `created_at` and belong to
/// one ticker; `prices` ascending per the oracle's contract.
///
/// For each price point at time `t`, all transactions with
/// `created_at <= t` are applied to the running share count before the
/// value `shares x close` is emitted, so a transaction stamped exactly at
/// a tick is reflected in that tick's value. Single pass, no backtracking;
/// output has the same length and timestamps as the input series. Fails
/// only when the running share count or a tick's value overflows i64.
pub fn value_over_time(
    transactions: &[Transaction],
    prices: &[PricePoint],
) -> Result<Vec<ValuePoint>, LedgerError> {
    let mut shares_held: i64 = 0;
    let mut cursor = 0;
    let mut series = Vec::with_capacity(prices.len());

    for point in prices {
        while cursor < transactions.len() && transactions[cursor].created_at <= point.time {
            let tx = &transactions[cursor];
            match tx.kind {
                TransactionKind::Buy => {
                    shares_held = shares_held.checked_add(tx.amount).ok_or_else(overflow)?;
                }
                TransactionKind::Sell => {
                    shares_held = shares_held.checked_sub(tx.amount).ok_or_else(overflow)?;
                }
                // Cash flows carry no shares; tolerated but never selected.
                TransactionKind::Deposit | TransactionKind::Withdraw => {}
            }
            cursor += 1;
        }
        series.push(ValuePoint {
            time: point.time,
            value_cents: shares_held
                .checked_mul(point.close_cents)
                .ok_or_else(overflow)?,
        });
    }

    Ok(series)
}

fn overflow() -> LedgerError {
    LedgerError::Internal("portfolio value overflow".to_string())
}
