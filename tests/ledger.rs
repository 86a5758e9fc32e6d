//! Ledger rule tests: balance and possession arithmetic, rejection
//! conditions, and the full deposit/buy/sell/withdraw scenario.

use paper_trader::config::DeletePolicy;
use paper_trader::error::LedgerError;
use paper_trader::ledger::{authorize_delete, buy, deposit, normalize_ticker, sell, withdraw};

fn dollars(d: i64) -> i64 {
    d * 100
}

#[test]
fn deposit_increases_balance_by_exact_amount() {
    assert_eq!(deposit(0, 2500).unwrap(), 2500);
    assert_eq!(deposit(2500, 1).unwrap(), 2501);
}

#[test]
fn deposit_rejects_non_positive_amounts() {
    assert!(matches!(deposit(100, 0), Err(LedgerError::Validation(_))));
    assert!(matches!(deposit(100, -50), Err(LedgerError::Validation(_))));
}

#[test]
fn withdraw_decreases_balance_by_exact_amount() {
    assert_eq!(withdraw(2500, 1000).unwrap(), 1500);
    assert_eq!(withdraw(2500, 2500).unwrap(), 0);
}

#[test]
fn withdraw_rejected_when_balance_would_go_negative() {
    assert!(matches!(
        withdraw(2500, 2501),
        Err(LedgerError::InsufficientFunds)
    ));
    assert!(matches!(withdraw(0, 1), Err(LedgerError::InsufficientFunds)));
}

#[test]
fn deposit_withdraw_replay_matches_sum() {
    let deposits = [500i64, 1200, 33];
    let withdrawals = [400i64, 800];
    let mut balance = 0;
    for d in deposits {
        balance = deposit(balance, d).unwrap();
    }
    for w in withdrawals {
        balance = withdraw(balance, w).unwrap();
    }
    let expected: i64 = deposits.iter().sum::<i64>() - withdrawals.iter().sum::<i64>();
    assert_eq!(balance, expected);
}

#[test]
fn buy_decreases_balance_by_cost_and_increases_shares() {
    let outcome = buy(dollars(1000), 0, dollars(10), 5).unwrap();
    assert_eq!(outcome.gross_cents, dollars(50));
    assert_eq!(outcome.new_balance_cents, dollars(950));
    assert_eq!(outcome.new_share_amount, 5);
}

#[test]
fn buy_rejected_when_cost_exceeds_balance() {
    let err = buy(dollars(49), 0, dollars(10), 5).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds));
    // Exact cost is allowed.
    let outcome = buy(dollars(50), 0, dollars(10), 5).unwrap();
    assert_eq!(outcome.new_balance_cents, 0);
}

#[test]
fn buy_adds_to_existing_position() {
    let outcome = buy(dollars(100), 7, dollars(1), 3).unwrap();
    assert_eq!(outcome.new_share_amount, 10);
}

#[test]
fn sell_increases_balance_by_proceeds_and_decreases_shares() {
    let outcome = sell(dollars(100), Some(10), dollars(20), 4).unwrap();
    assert_eq!(outcome.gross_cents, dollars(80));
    assert_eq!(outcome.new_balance_cents, dollars(180));
    assert_eq!(outcome.new_share_amount, 6);
}

#[test]
fn sell_without_position_fails_with_no_position() {
    let err = sell(dollars(100), None, dollars(10), 1).unwrap_err();
    assert!(matches!(err, LedgerError::NoPosition));
}

#[test]
fn sell_beyond_held_amount_fails_with_insufficient_shares() {
    let err = sell(dollars(100), Some(3), dollars(10), 4).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientShares));
}

#[test]
fn zero_amount_position_is_held_not_missing() {
    // A fully-sold position fails with InsufficientShares, not NoPosition.
    let err = sell(dollars(100), Some(0), dollars(10), 1).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientShares));
}

#[test]
fn sell_down_to_zero_leaves_zero_amount() {
    let outcome = sell(0, Some(5), dollars(10), 5).unwrap();
    assert_eq!(outcome.new_share_amount, 0);
}

#[test]
fn buy_sell_replay_matches_net_shares() {
    let mut balance = dollars(10_000);
    let mut held: Option<i64> = None;
    let legs: [(bool, i64); 5] = [(true, 5), (true, 3), (false, 2), (true, 1), (false, 4)];
    let price = dollars(10);
    for (is_buy, qty) in legs {
        if is_buy {
            let outcome = buy(balance, held.unwrap_or(0), price, qty).unwrap();
            balance = outcome.new_balance_cents;
            held = Some(outcome.new_share_amount);
        } else {
            let outcome = sell(balance, held, price, qty).unwrap();
            balance = outcome.new_balance_cents;
            held = Some(outcome.new_share_amount);
        }
    }
    // bought 9, sold 6
    assert_eq!(held, Some(3));
    assert_eq!(balance, dollars(10_000) - 3 * price);
}

#[test]
fn trade_rejects_non_positive_share_counts_and_prices() {
    assert!(matches!(
        buy(dollars(100), 0, dollars(10), 0),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        buy(dollars(100), 0, 0, 1),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        sell(dollars(100), Some(5), dollars(10), -2),
        Err(LedgerError::Validation(_))
    ));
}

// The concrete scenario: start with $1000, buy 5 AAA at $10, sell 2 at
// $20, withdraw $500, then a rejected $1000 withdrawal leaves the
// balance untouched.
#[test]
fn full_scenario_replay() {
    let mut balance = dollars(1000);
    let mut held: Option<i64> = None;

    let outcome = buy(balance, held.unwrap_or(0), dollars(10), 5).unwrap();
    balance = outcome.new_balance_cents;
    held = Some(outcome.new_share_amount);
    assert_eq!(balance, dollars(950));
    assert_eq!(held, Some(5));

    let outcome = sell(balance, held, dollars(20), 2).unwrap();
    balance = outcome.new_balance_cents;
    held = Some(outcome.new_share_amount);
    assert_eq!(balance, dollars(990));
    assert_eq!(held, Some(3));

    balance = withdraw(balance, dollars(500)).unwrap();
    assert_eq!(balance, dollars(490));

    let err = withdraw(balance, dollars(1000)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds));
    assert_eq!(balance, dollars(490));
}

#[test]
fn destructive_policy_allows_deleting_existing_records() {
    assert!(authorize_delete(DeletePolicy::Destructive, true).is_ok());
}

#[test]
fn forbid_policy_rejects_deleting_existing_records() {
    let err = authorize_delete(DeletePolicy::Forbid, true).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn deleting_a_missing_record_is_not_found_under_either_policy() {
    assert!(matches!(
        authorize_delete(DeletePolicy::Destructive, false),
        Err(LedgerError::NotFound)
    ));
    assert!(matches!(
        authorize_delete(DeletePolicy::Forbid, false),
        Err(LedgerError::NotFound)
    ));
}

#[test]
fn normalize_ticker_uppercases_and_trims() {
    assert_eq!(normalize_ticker("aapl").unwrap(), "AAPL");
    assert_eq!(normalize_ticker("  msft ").unwrap(), "MSFT");
    assert_eq!(normalize_ticker("BRK1").unwrap(), "BRK1");
}

#[test]
fn normalize_ticker_rejects_bad_input() {
    assert!(normalize_ticker("").is_err());
    assert!(normalize_ticker("   ").is_err());
    assert!(normalize_ticker("TOOLONGG").is_err());
    assert!(normalize_ticker("A B").is_err());
    assert!(normalize_ticker("AA$").is_err());
}
