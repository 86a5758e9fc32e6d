//! Market-data provider adapter: the narrow trait the engine and queries
//! depend on, the span-to-query mapping, and the provider error taxonomy.

mod polygon;

pub use polygon::{close_to_cents, PolygonOracle};

use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate};

use crate::history::PricePoint;
use crate::types::Cents;

/// Provider failures surfaced to the caller as retryable-later errors.
/// No automatic retry happens inside the adapter.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("no quote available for {ticker}")]
    QuoteUnavailable { ticker: String },
    #[error("market data provider rate limited")]
    RateLimited,
}

/// Named lookback window for history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySpan {
    Day,
    Week,
    Month,
}

impl HistorySpan {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DAY" => Some(Self::Day),
            "WEEK" => Some(Self::Week),
            "MONTH" => Some(Self::Month),
            _ => None,
        }
    }
}

/// Latest close and time-ordered history for a ticker. Implemented by the
/// Polygon client in production and by in-memory fakes in tests.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn latest_close(&self, ticker: &str) -> Result<Cents, OracleError>;

    /// Ascending (time, close) points for the span ending today.
    async fn history(&self, ticker: &str, span: HistorySpan)
        -> Result<Vec<PricePoint>, OracleError>;
}

/// Aggregate-query parameters for one span request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Bucket size, in units of `timespan`.
    pub multiplier: u32,
    pub timespan: &'static str,
}

/// DAY: 1 day back, 5-minute buckets. WEEK: 1 week back, 30-minute
/// buckets. MONTH: 1 month back, daily buckets.
pub fn span_window(span: HistorySpan, today: NaiveDate) -> SpanWindow {
    match span {
        HistorySpan::Day => SpanWindow {
            from: today.checked_sub_days(Days::new(1)).unwrap_or(today),
            to: today,
            multiplier: 5,
            timespan: "minute",
        },
        HistorySpan::Week => SpanWindow {
            from: today.checked_sub_days(Days::new(7)).unwrap_or(today),
            to: today,
            multiplier: 30,
            timespan: "minute",
        },
        HistorySpan::Month => SpanWindow {
            from: today.checked_sub_months(Months::new(1)).unwrap_or(today),
            to: today,
            multiplier: 1,
            timespan: "day",
        },
    }
}
