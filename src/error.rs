use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("insufficient history: need at least 2 daily bars, got {0}")]
    InsufficientHistory(usize),

    #[error("invalid daily bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },

    #[error("daily bars out of order: {current} does not follow {previous}")]
    UnorderedBars {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("non-finite tick at {timestamp}: price={price} bid={bid} ask={ask}")]
    NonFiniteTick {
        timestamp: NaiveDateTime,
        price: f64,
        bid: f64,
        ask: f64,
    },

    #[error("session of {0} seconds does not fit in a calendar day")]
    SessionOverflow(u32),

    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("publisher is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
