use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::FeedError;

/// One trading day of history as seen by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    #[serde(alias = "open")]
    pub open_price: f64,
    #[serde(alias = "close")]
    pub close_price: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, open_price: f64, close_price: f64) -> Self {
        Self {
            date,
            open_price,
            close_price,
        }
    }

    /// Open and close must be finite and strictly positive; both feed a logarithm or a ratio.
    pub fn validate(&self) -> Result<(), FeedError> {
        let invalid = |reason: String| FeedError::InvalidBar {
            date: self.date,
            reason,
        };
        if !self.open_price.is_finite() || self.open_price <= 0.0 {
            return Err(invalid(format!("open price {} must be > 0", self.open_price)));
        }
        if !self.close_price.is_finite() || self.close_price <= 0.0 {
            return Err(invalid(format!(
                "close price {} must be > 0",
                self.close_price
            )));
        }
        Ok(())
    }
}
