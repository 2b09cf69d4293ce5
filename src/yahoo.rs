//! Yahoo Finance chart-API client for daily OHLCV history.
//!
//! Pagination, split/dividend adjustment, and throttling are Yahoo's side of
//! the contract; this client only requests a date range at daily resolution
//! and decodes the quote arrays.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// One decoded daily bar. Yahoo leaves holes in the quote arrays for
/// trading halts, so every field except the date is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    /// Fetches daily history for `symbol` over `[start, end)`, midnight UTC
    /// bounds, in chronological order.
    pub async fn get_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        if symbol.is_empty() {
            anyhow::bail!("symbol empty");
        }

        let period1 = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let period2 = end.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit&includePrePost=false",
            self.base_url, symbol, period1, period2
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("API request failed: {} - {}", status, text);
        }

        let chart: ChartResponse =
            serde_json::from_str(&text).context("Failed to parse chart response")?;
        decode_chart(chart, symbol)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_chart(response: ChartResponse, symbol: &str) -> Result<Vec<DailyBar>> {
    if let Some(error) = response.chart.error {
        anyhow::bail!("Yahoo error for {}: {} - {}", symbol, error.code, error.description);
    }

    let result = response
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .with_context(|| format!("No chart data returned for {}", symbol))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .with_context(|| format!("No quote data returned for {}", symbol))?;

    let field = |values: &Option<Vec<Option<f64>>>, i: usize| -> Option<f64> {
        values.as_ref().and_then(|v| v.get(i).copied().flatten())
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        bars.push(DailyBar {
            date,
            open: field(&quote.open, i),
            high: field(&quote.high, i),
            low: field(&quote.low, i),
            close: field(&quote.close, i),
            volume: quote
                .volume
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten()),
        });
    }

    Ok(bars)
}
