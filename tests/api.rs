//! HTTP boundary tests: auth gating and input validation. These paths are
//! rejected before any storage access, so the app runs on a lazily
//! connected pool with no live database behind it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use paper_trader::api::auth::create_token;
use paper_trader::api::routes::{app_router, AppState};
use paper_trader::config::DeletePolicy;
use paper_trader::engine::LedgerEngine;
use paper_trader::history::PricePoint;
use paper_trader::oracle::{HistorySpan, OracleError, PriceOracle};
use paper_trader::persistence::create_lazy_pool;
use uuid::Uuid;

const JWT_SECRET: &[u8] = b"test-jwt-secret";

struct MockOracle {
    closes: HashMap<String, i64>,
}

#[async_trait]
impl PriceOracle for MockOracle {
    async fn latest_close(&self, ticker: &str) -> Result<i64, OracleError> {
        self.closes
            .get(ticker)
            .copied()
            .ok_or_else(|| OracleError::QuoteUnavailable {
                ticker: ticker.to_string(),
            })
    }

    async fn history(
        &self,
        ticker: &str,
        _span: HistorySpan,
    ) -> Result<Vec<PricePoint>, OracleError> {
        Err(OracleError::QuoteUnavailable {
            ticker: ticker.to_string(),
        })
    }
}

fn test_app_state() -> AppState {
    let pool = create_lazy_pool("postgres://postgres@localhost:1/unused").unwrap();
    let oracle: Arc<dyn PriceOracle> = Arc::new(MockOracle {
        closes: HashMap::new(),
    });
    let engine = LedgerEngine::new(pool.clone(), Arc::clone(&oracle), DeletePolicy::Destructive);
    AppState {
        engine,
        pool,
        oracle,
        jwt_secret: JWT_SECRET.to_vec(),
    }
}

/// Spawn the app on a random port and return (base_url, server guard).
async fn spawn_app() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let app = app_router(test_app_state());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, handle)
}

fn bearer() -> String {
    create_token(JWT_SECRET, Uuid::new_v4()).unwrap()
}

#[tokio::test]
async fn health_is_open() {
    let (base_url, _handle) = spawn_app().await;
    let res = reqwest::get(format!("{base_url}/health")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "healthy");
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    for path in [
        "/balance",
        "/possessions",
        "/transactions",
        "/portfolio/value",
        "/history/tickers",
    ] {
        let res = client.get(format!("{base_url}{path}")).send().await.unwrap();
        assert_eq!(res.status().as_u16(), 401, "expected 401 for {path}");
    }
}

#[tokio::test]
async fn protected_routes_reject_garbage_token() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{base_url}/balance"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn register_requires_username() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&serde_json::json!({ "username": "  ", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn register_rejects_short_password() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&serde_json::json!({ "username": "alice", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn balance_update_rejects_unrecognized_kind() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/balance"))
        .bearer_auth(bearer())
        .json(&serde_json::json!({ "amount_cents": 100, "kind": "TRANSFER" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("unrecognized"));
}

#[tokio::test]
async fn balance_update_rejects_trade_kinds() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/balance"))
        .bearer_auth(bearer())
        .json(&serde_json::json!({ "amount_cents": 100, "kind": "BUY" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn balance_update_rejects_non_positive_amount() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    for amount in [0i64, -500] {
        let res = client
            .post(format!("{base_url}/balance"))
            .bearer_auth(bearer())
            .json(&serde_json::json!({ "amount_cents": amount, "kind": "DEPOSIT" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 400);
    }
}

#[tokio::test]
async fn transaction_create_rejects_cash_flow_kinds() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/transactions"))
        .bearer_auth(bearer())
        .json(&serde_json::json!({ "ticker": "AAA", "amount": 1, "kind": "DEPOSIT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn transaction_create_rejects_invalid_ticker() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base_url}/transactions"))
        .bearer_auth(bearer())
        .json(&serde_json::json!({ "ticker": "WAYTOOLONG", "amount": 1, "kind": "BUY" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn history_rejects_unrecognized_span() {
    let (base_url, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{base_url}/history/value?ticker=AAA&span=YEAR"))
        .bearer_auth(bearer())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("span"));
}
