//! Polygon-style aggregates client over HTTP.

use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::history::PricePoint;
use crate::types::Cents;

use super::{span_window, HistorySpan, OracleError, PriceOracle};

/// Wraps the provider's previous-close and aggregate-range endpoints.
/// The API key is supplied at construction; a missing key is a startup
/// error, not something checked per request.
pub struct PolygonOracle {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AggsResponse {
    results: Option<Vec<AggBar>>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// Close, in dollars.
    c: Option<f64>,
    /// Bar timestamp, milliseconds since the Unix epoch.
    t: Option<i64>,
}

/// Round a dollar close to integer cents.
pub fn close_to_cents(close: f64) -> Cents {
    (close * 100.0).round() as Cents
}

impl PolygonOracle {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch_bars(&self, ticker: &str, path: &str) -> Result<Vec<AggBar>, OracleError> {
        let unavailable = || OracleError::QuoteUnavailable {
            ticker: ticker.to_string(),
        };
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("market data request for {ticker} failed: {err}");
                unavailable()
            })?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(OracleError::RateLimited);
        }
        if !response.status().is_success() {
            tracing::warn!("market data request for {ticker} returned {}", response.status());
            return Err(unavailable());
        }
        let body: AggsResponse = response.json().await.map_err(|_| unavailable())?;
        let bars = body.results.unwrap_or_default();
        if bars.is_empty() {
            return Err(unavailable());
        }
        Ok(bars)
    }
}

#[async_trait::async_trait]
impl PriceOracle for PolygonOracle {
    async fn latest_close(&self, ticker: &str) -> Result<Cents, OracleError> {
        let bars = self
            .fetch_bars(ticker, &format!("/v2/aggs/ticker/{ticker}/prev"))
            .await?;
        let close = bars.first().and_then(|bar| bar.c).ok_or_else(|| {
            OracleError::QuoteUnavailable {
                ticker: ticker.to_string(),
            }
        })?;
        Ok(close_to_cents(close))
    }

    async fn history(
        &self,
        ticker: &str,
        span: HistorySpan,
    ) -> Result<Vec<PricePoint>, OracleError> {
        let window = span_window(span, Utc::now().date_naive());
        let path = format!(
            "/v2/aggs/ticker/{ticker}/range/{}/{}/{}/{}",
            window.multiplier, window.timespan, window.from, window.to
        );
        let bars = self.fetch_bars(ticker, &path).await?;
        // Bars missing a close or timestamp are dropped, as the original
        // provider occasionally returns them.
        let points = bars
            .iter()
            .filter_map(|bar| {
                let close = bar.c?;
                let millis = bar.t?;
                let time = Utc.timestamp_millis_opt(millis).single()?;
                Some(PricePoint {
                    time,
                    close_cents: close_to_cents(close),
                })
            })
            .collect();
        Ok(points)
    }
}
