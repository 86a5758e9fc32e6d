//! Ledger rules: the only balance/possession arithmetic in the crate.
//! Pure functions over a per-user snapshot; the engine loads the snapshot
//! under a row lock and applies the result.

use crate::config::DeletePolicy;
use crate::error::LedgerError;
use crate::types::{Cents, ShareCount};

/// Result of a validated buy or sell against one possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeOutcome {
    pub new_balance_cents: Cents,
    pub new_share_amount: ShareCount,
    /// price x shares moved, in cents.
    pub gross_cents: Cents,
}

/// Amounts are in cents, so "positive multiple of the minimum currency
/// unit" is simply a positive integer.
pub fn require_positive_cents(amount_cents: Cents) -> Result<(), LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::Validation(
            "amount must be a positive number of cents".to_string(),
        ));
    }
    Ok(())
}

pub fn require_positive_shares(share_count: ShareCount) -> Result<(), LedgerError> {
    if share_count <= 0 {
        return Err(LedgerError::Validation(
            "share count must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Uppercase a ticker and check it is 1-6 ASCII alphanumeric characters.
pub fn normalize_ticker(raw: &str) -> Result<String, LedgerError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() || ticker.len() > 6 || !ticker.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(LedgerError::Validation(format!(
            "invalid ticker '{raw}': expected 1-6 alphanumeric characters"
        )));
    }
    Ok(ticker)
}

/// Decide whether a transaction record may be deleted. Deletion never
/// reverses a record's ledger effect: under `Destructive` an existing
/// record is simply removed, under `Forbid` it is rejected. A missing
/// record is `NotFound` under either policy.
pub fn authorize_delete(policy: DeletePolicy, record_exists: bool) -> Result<(), LedgerError> {
    if !record_exists {
        return Err(LedgerError::NotFound);
    }
    match policy {
        DeletePolicy::Destructive => Ok(()),
        DeletePolicy::Forbid => Err(LedgerError::Validation(
            "transaction deletion is disabled: records have already affected the ledger"
                .to_string(),
        )),
    }
}

pub fn deposit(balance_cents: Cents, amount_cents: Cents) -> Result<Cents, LedgerError> {
    require_positive_cents(amount_cents)?;
    balance_cents
        .checked_add(amount_cents)
        .ok_or_else(|| LedgerError::Validation("balance overflow".to_string()))
}

pub fn withdraw(balance_cents: Cents, amount_cents: Cents) -> Result<Cents, LedgerError> {
    require_positive_cents(amount_cents)?;
    if balance_cents < amount_cents {
        return Err(LedgerError::InsufficientFunds);
    }
    Ok(balance_cents - amount_cents)
}

/// Buy `share_count` shares at `price_cents` each. `shares_held` is 0 when
/// no possession row exists yet; the caller upserts the row either way.
pub fn buy(
    balance_cents: Cents,
    shares_held: ShareCount,
    price_cents: Cents,
    share_count: ShareCount,
) -> Result<TradeOutcome, LedgerError> {
    require_positive_shares(share_count)?;
    require_positive_cents(price_cents)?;
    let gross_cents = price_cents
        .checked_mul(share_count)
        .ok_or_else(|| LedgerError::Validation("trade cost overflow".to_string()))?;
    if balance_cents < gross_cents {
        return Err(LedgerError::InsufficientFunds);
    }
    let new_share_amount = shares_held
        .checked_add(share_count)
        .ok_or_else(|| LedgerError::Validation("share amount overflow".to_string()))?;
    Ok(TradeOutcome {
        new_balance_cents: balance_cents - gross_cents,
        new_share_amount,
        gross_cents,
    })
}

/// Sell `share_count` shares at `price_cents` each. `shares_held` is `None`
/// when no possession row exists: that is a distinct failure from holding
/// too few shares (a 0-amount row fails with `InsufficientShares`).
pub fn sell(
    balance_cents: Cents,
    shares_held: Option<ShareCount>,
    price_cents: Cents,
    share_count: ShareCount,
) -> Result<TradeOutcome, LedgerError> {
    require_positive_shares(share_count)?;
    require_positive_cents(price_cents)?;
    let held = shares_held.ok_or(LedgerError::NoPosition)?;
    if held < share_count {
        return Err(LedgerError::InsufficientShares);
    }
    let gross_cents = price_cents
        .checked_mul(share_count)
        .ok_or_else(|| LedgerError::Validation("trade proceeds overflow".to_string()))?;
    let new_balance_cents = balance_cents
        .checked_add(gross_cents)
        .ok_or_else(|| LedgerError::Validation("balance overflow".to_string()))?;
    Ok(TradeOutcome {
        new_balance_cents,
        new_share_amount: held - share_count,
        gross_cents,
    })
}
