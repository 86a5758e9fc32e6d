use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Cents;

/// Closed set of ledger record kinds. Tags on the wire and in the database
/// are the uppercase names; anything else is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "DEPOSIT" => Some(Self::Deposit),
            "WITHDRAW" => Some(Self::Withdraw),
            _ => None,
        }
    }
}

/// Immutable ledger record. Never updated after insert; deletion does not
/// reverse the balance/possession effect it had when committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Set for BUY/SELL, absent for cash flows.
    pub ticker: Option<String>,
    pub kind: TransactionKind,
    /// Shares for BUY/SELL, cents for DEPOSIT/WITHDRAW.
    pub amount: i64,
    /// Price per share captured at execution time, BUY/SELL only.
    pub price_cents: Option<Cents>,
    pub created_at: DateTime<Utc>,
}
