//! Route handlers and router assembly.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::{self, AuthError, AuthUser};
use crate::engine::LedgerEngine;
use crate::error::LedgerError;
use crate::history::ValuePoint;
use crate::oracle::{HistorySpan, PriceOracle};
use crate::persistence;
use crate::queries;
use crate::types::transaction::{Transaction, TransactionKind};
use crate::types::{Cents, ShareCount};

#[derive(Clone)]
pub struct AppState {
    pub engine: LedgerEngine,
    pub pool: PgPool,
    pub oracle: Arc<dyn PriceOracle>,
    pub jwt_secret: Vec<u8>,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/balance", get(read_balance).post(update_balance))
        .route("/possessions", get(list_possessions))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
        .route("/portfolio/value", get(read_portfolio_value))
        .route("/history/value", get(read_value_over_time))
        .route("/history/tickers", get(list_held_tickers))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, LedgerError> {
    let username = body.username.trim().to_lowercase();
    if username.is_empty() {
        return Err(LedgerError::Validation("username is required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(LedgerError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    let password_hash = auth::hash_password(&body.password)
        .map_err(|_| LedgerError::Internal("password hashing failed".to_string()))?;
    let user_id = Uuid::new_v4();
    match persistence::insert_user(&state.pool, user_id, &username, &password_hash).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(json!({ "user_id": user_id, "username": username })),
        )),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            LedgerError::Conflict(format!("username '{username}' is taken")),
        ),
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Response {
    let username = body.username.trim().to_lowercase();
    let row = match persistence::get_user_by_username(&state.pool, &username).await {
        Ok(row) => row,
        Err(err) => return LedgerError::from(err).into_response(),
    };
    let Some(user) = row else {
        return AuthError.into_response();
    };
    if !auth::verify_password(&body.password, &user.password_hash) {
        return AuthError.into_response();
    }
    match auth::create_token(&state.jwt_secret, user.id) {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(_) => LedgerError::Internal("token creation failed".to_string()).into_response(),
    }
}

#[derive(Serialize)]
struct BalanceResponse {
    balance_cents: Cents,
}

async fn read_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BalanceResponse>, LedgerError> {
    let balance_cents = queries::balance(&state.pool, user.user_id).await?;
    Ok(Json(BalanceResponse { balance_cents }))
}

#[derive(Deserialize)]
struct BalanceUpdateBody {
    amount_cents: Cents,
    kind: String,
}

async fn update_balance(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<BalanceUpdateBody>,
) -> Result<Json<BalanceResponse>, LedgerError> {
    let kind = TransactionKind::from_tag(&body.kind)
        .ok_or_else(|| LedgerError::Validation(format!("unrecognized kind '{}'", body.kind)))?;
    let balance_cents = match kind {
        TransactionKind::Deposit => state.engine.deposit(user.user_id, body.amount_cents).await?,
        TransactionKind::Withdraw => state.engine.withdraw(user.user_id, body.amount_cents).await?,
        TransactionKind::Buy | TransactionKind::Sell => {
            return Err(LedgerError::Validation(
                "kind must be DEPOSIT or WITHDRAW".to_string(),
            ));
        }
    };
    Ok(Json(BalanceResponse { balance_cents }))
}

#[derive(Serialize)]
struct PossessionView {
    ticker: String,
    amount: ShareCount,
}

async fn list_possessions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PossessionView>>, LedgerError> {
    let possessions = queries::possessions(&state.pool, user.user_id).await?;
    let view = possessions
        .into_iter()
        .map(|p| PossessionView {
            ticker: p.ticker,
            amount: p.amount,
        })
        .collect();
    Ok(Json(view))
}

async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Transaction>>, LedgerError> {
    let log = queries::transactions(&state.pool, user.user_id).await?;
    Ok(Json(log))
}

#[derive(Deserialize)]
struct TransactionCreateBody {
    ticker: String,
    amount: ShareCount,
    kind: String,
}

async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<TransactionCreateBody>,
) -> Result<impl IntoResponse, LedgerError> {
    let kind = TransactionKind::from_tag(&body.kind)
        .ok_or_else(|| LedgerError::Validation(format!("unrecognized kind '{}'", body.kind)))?;
    let record = match kind {
        TransactionKind::Buy => state.engine.buy(user.user_id, &body.ticker, body.amount).await?,
        TransactionKind::Sell => state.engine.sell(user.user_id, &body.ticker, body.amount).await?,
        TransactionKind::Deposit | TransactionKind::Withdraw => {
            return Err(LedgerError::Validation(
                "kind must be BUY or SELL".to_string(),
            ));
        }
    };
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, LedgerError> {
    let deleted = state.engine.delete_transaction(user.user_id, id).await?;
    Ok(Json(json!({ "id": deleted })))
}

#[derive(Serialize)]
struct PortfolioValueResponse {
    total_cents: Cents,
}

async fn read_portfolio_value(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PortfolioValueResponse>, LedgerError> {
    let total_cents =
        queries::total_portfolio_value(&state.pool, state.oracle.as_ref(), user.user_id).await?;
    Ok(Json(PortfolioValueResponse { total_cents }))
}

#[derive(Deserialize)]
struct HistoryQuery {
    ticker: String,
    span: String,
}

async fn read_value_over_time(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ValuePoint>>, LedgerError> {
    let span = HistorySpan::from_tag(&params.span).ok_or_else(|| {
        LedgerError::Validation(format!(
            "unrecognized span '{}': expected DAY, WEEK, or MONTH",
            params.span
        ))
    })?;
    let series = queries::value_over_time(
        &state.pool,
        state.oracle.as_ref(),
        user.user_id,
        &params.ticker,
        span,
    )
    .await?;
    Ok(Json(series))
}

async fn list_held_tickers(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<String>>, LedgerError> {
    let tickers = queries::held_tickers(&state.pool, user.user_id).await?;
    Ok(Json(tickers))
}
