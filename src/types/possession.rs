use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ShareCount;

/// Current holding per (user, ticker). A row at amount 0 means the ticker
/// was held and fully sold, not that it was never held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Possession {
    pub user_id: Uuid,
    pub ticker: String,
    pub amount: ShareCount,
}
