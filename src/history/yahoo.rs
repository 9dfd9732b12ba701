use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use super::sort_unique_by_date;
use crate::model::DailyBar;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) synth-tick/1.0";

pub struct YahooDailyClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooDailyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build Yahoo HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Daily bars for `symbol` with dates in `[start, end)`, oldest first.
    pub async fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        if end <= start {
            bail!("empty date range {} .. {}", start, end);
        }
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        let endpoint = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1_s = period1.to_string();
        let period2_s = period2.to_string();

        tracing::debug!(symbol, %start, %end, "Requesting Yahoo daily chart");
        let body: Value = self
            .http
            .get(&endpoint)
            .query(&[
                ("period1", period1_s.as_str()),
                ("period2", period2_s.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await
            .context("yahoo chart HTTP failed")?
            .error_for_status()
            .context("yahoo chart returned error status")?
            .json()
            .await
            .context("yahoo chart JSON parse failed")?;

        let bars = parse_chart(body)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect())
    }
}

/// Turn a Yahoo `v8/finance/chart` payload into daily bars.
///
/// Timestamps are shifted by the exchange GMT offset before taking the date.
/// Rows without both an open and a close are skipped.
pub fn parse_chart(body: Value) -> Result<Vec<DailyBar>> {
    let response: ChartResponse =
        serde_json::from_value(body).context("unexpected yahoo chart layout")?;
    if let Some(error) = response.chart.error.filter(|e| !e.is_null()) {
        bail!("yahoo chart API error: {}", error);
    }
    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        bail!("no chart data in yahoo response");
    };
    let Some(quote) = result.indicators.quote.first() else {
        bail!("no quote data in yahoo response");
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(Some(open)), Some(Some(close))) = (quote.open.get(i), quote.close.get(i)) else {
            tracing::debug!(ts, "Skipping yahoo row without open/close");
            continue;
        };
        let Some(local) = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0) else {
            bail!("invalid yahoo timestamp {}", ts);
        };
        bars.push(DailyBar::new(local.date_naive(), *open, *close));
    }
    sort_unique_by_date(bars)
}
