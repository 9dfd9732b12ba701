use chrono::NaiveDateTime;
use serde::Serialize;

/// Wire layout of the tick timestamp, e.g. `20230822 09:30:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// One synthesized observation of the intraday path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
}

/// The record consumers receive. Field names, field order and the fixed
/// six-decimal string encoding are the compatibility contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickMessage {
    pub timestamp: String,
    pub price: String,
    pub bid: String,
    pub ask: String,
}

impl Tick {
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.bid.is_finite() && self.ask.is_finite()
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    pub fn to_message(&self) -> TickMessage {
        TickMessage {
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            price: format!("{:.6}", self.price),
            bid: format!("{:.6}", self.bid),
            ask: format!("{:.6}", self.ask),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_message())
    }
}
