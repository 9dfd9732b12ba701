//! Per-day parameters of the intraday price process.
//!
//! Each simulated day is driven by its own open/close and by the previous
//! day's close, so the first bar of a history only serves as a reference.

use chrono::NaiveDate;

use crate::error::FeedError;
use crate::model::DailyBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayParameters {
    pub date: NaiveDate,
    /// Per-step log drift, `ln(close / open) / steps`.
    pub drift: f64,
    /// Signed close-to-close return against the previous day.
    pub base_volatility: f64,
    pub starting_price: f64,
}

impl DayParameters {
    /// Drift expressed per trading day, the unit the intraday recurrence runs in.
    pub fn daily_drift(&self, steps: u32) -> f64 {
        self.drift * f64::from(steps)
    }
}

/// Derive one [`DayParameters`] per bar after the first.
///
/// `steps` is the number of intraday steps in a session; the simulator must be
/// run with the same value. A zero-length session keeps the drift at zero.
/// Fewer than two bars yield an empty vector.
pub fn derive_day_parameters(
    bars: &[DailyBar],
    steps: u32,
) -> Result<Vec<DayParameters>, FeedError> {
    for bar in bars {
        bar.validate()?;
    }
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(FeedError::UnorderedBars {
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }

    Ok(bars
        .windows(2)
        .map(|pair| day_parameters(&pair[0], &pair[1], steps))
        .collect())
}

fn day_parameters(prev: &DailyBar, day: &DailyBar, steps: u32) -> DayParameters {
    let drift = if steps == 0 {
        0.0
    } else {
        (day.close_price / day.open_price).ln() / f64::from(steps)
    };
    DayParameters {
        date: day.date,
        drift,
        base_volatility: pct_change(prev.close_price, day.close_price),
        starting_price: day.open_price,
    }
}

fn pct_change(prev: f64, current: f64) -> f64 {
    (current - prev) / prev
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, open: f64, close: f64) -> DailyBar {
        DailyBar::new(NaiveDate::from_ymd_opt(2023, 8, day).unwrap(), open, close)
    }

    #[test]
    fn first_bar_is_reference_only() {
        let params =
            derive_day_parameters(&[bar(21, 175.0, 176.0), bar(22, 176.5, 175.8)], 23_400)
                .unwrap();
        assert_eq!(params.len(), 1);
        let p = params[0];
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2023, 8, 22).unwrap());
        assert!((p.starting_price - 176.5).abs() < f64::EPSILON);
        assert!((p.drift - (175.8f64 / 176.5).ln() / 23_400.0).abs() < 1e-15);
        assert!((p.base_volatility - (175.8 - 176.0) / 176.0).abs() < 1e-15);
        assert!(p.base_volatility < 0.0);
    }

    #[test]
    fn daily_drift_recovers_open_to_close_log_return() {
        let params =
            derive_day_parameters(&[bar(21, 175.0, 176.0), bar(22, 176.5, 175.8)], 390).unwrap();
        let daily = params[0].daily_drift(390);
        assert!((daily - (175.8f64 / 176.5).ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_steps_keeps_drift_finite() {
        let params =
            derive_day_parameters(&[bar(21, 175.0, 176.0), bar(22, 176.5, 175.8)], 0).unwrap();
        assert_eq!(params[0].drift, 0.0);
    }

    #[test]
    fn short_history_is_empty() {
        assert!(derive_day_parameters(&[], 23_400).unwrap().is_empty());
        assert!(derive_day_parameters(&[bar(21, 175.0, 176.0)], 23_400)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn rejects_invalid_and_unordered_bars() {
        let err = derive_day_parameters(&[bar(21, 0.0, 176.0), bar(22, 176.5, 175.8)], 390)
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidBar { .. }));

        let err = derive_day_parameters(&[bar(22, 175.0, 176.0), bar(21, 176.5, 175.8)], 390)
            .unwrap_err();
        assert!(matches!(err, FeedError::UnorderedBars { .. }));
    }
}
