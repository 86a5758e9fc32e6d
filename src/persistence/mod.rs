//! Database layer: pool, migrations, and access for users, possessions,
//! and transactions.

mod pool;
mod possessions;
mod transactions;
mod users;

pub use pool::{create_lazy_pool, create_pool_and_migrate, run_migrations};
pub use possessions::{
    amount_for_update, list_held_tickers, list_possessions_for_user, upsert_possession,
    PossessionRow,
};
pub use sqlx::PgPool;
pub use transactions::{
    delete_transaction, get_transaction, insert_transaction, list_trades_for_ticker,
    list_transactions_for_user, transaction_row_to_transaction, TransactionRow,
};
pub use users::{
    balance_for_update, get_balance, get_user_by_username, insert_user, set_balance, UserRow,
};
