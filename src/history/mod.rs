pub mod file;
pub mod yahoo;

use anyhow::{bail, Context, Result};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::model::DailyBar;

pub use file::load_bars_file;
pub use yahoo::YahooDailyClient;

/// Fetch the daily bars the run is built from, from the bars file when one is
/// configured and from Yahoo otherwise. At least two bars are required.
pub async fn load_daily_bars(feed: &FeedConfig) -> Result<Vec<DailyBar>> {
    let (start, end) = feed.date_range()?;
    let bars = match &feed.bars_file {
        Some(path) => {
            let all = load_bars_file(path)?;
            all.into_iter()
                .filter(|b| b.date >= start && b.date < end)
                .collect::<Vec<_>>()
        }
        None => {
            YahooDailyClient::new(&feed.yahoo_base_url)?
                .daily_bars(&feed.symbol, start, end)
                .await?
        }
    };

    tracing::info!(
        symbol = %feed.symbol,
        %start,
        %end,
        bars = bars.len(),
        "Loaded daily history"
    );
    if bars.len() < 2 {
        return Err(FeedError::InsufficientHistory(bars.len())).with_context(|| {
            format!("no usable history for {} between {} and {}", feed.symbol, start, end)
        });
    }
    Ok(bars)
}

/// Sort bars by date and collapse repeated rows. Two rows for the same date
/// with different prices are rejected.
pub(crate) fn sort_unique_by_date(mut bars: Vec<DailyBar>) -> Result<Vec<DailyBar>> {
    bars.sort_by_key(|b| b.date);
    let mut unique: Vec<DailyBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match unique.last() {
            Some(prev) if prev.date == bar.date => {
                if *prev != bar {
                    bail!(
                        "conflicting bars for {}: open {} close {} vs open {} close {}",
                        bar.date,
                        prev.open_price,
                        prev.close_price,
                        bar.open_price,
                        bar.close_price
                    );
                }
                tracing::debug!(date = %bar.date, "Dropping repeated daily bar");
            }
            _ => unique.push(bar),
        }
    }
    Ok(unique)
}
