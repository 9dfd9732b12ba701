use std::f64::consts::PI;

use crate::config::ModelConfig;

/// Deterministic part of the intraday process: time grid, volatility
/// modulation, spread shape and the single-step price update.
///
/// Time is measured in trading days; one session is `steps` steps of
/// `dt = 1 / steps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntradayModel {
    pub config: ModelConfig,
    pub steps: u32,
}

impl IntradayModel {
    pub fn new(config: ModelConfig, steps: u32) -> Self {
        Self { config, steps }
    }

    pub fn dt(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            1.0 / f64::from(self.steps)
        }
    }

    /// Fraction of the trading day elapsed at `step`.
    pub fn time_fraction(&self, step: u32) -> f64 {
        f64::from(step) * self.dt()
    }

    /// `sigma * (1 + A * cos(2π (τ - 0.25)))`. A negative `sigma` flips the sign of
    /// the whole term; the variance correction below squares it anyway.
    pub fn modulated_volatility(&self, sigma: f64, time_fraction: f64) -> f64 {
        sigma * (1.0 + self.config.amplitude * (2.0 * PI * (time_fraction - 0.25)).cos())
    }

    /// `A * sin(2π f τ + φ) + min_spread / 2`.
    pub fn half_spread(&self, time_fraction: f64) -> f64 {
        let c = &self.config;
        c.amplitude * (2.0 * PI * c.frequency * time_fraction + c.phase).sin() + c.min_spread / 2.0
    }

    /// Smallest half-spread quoted over the session's time points, `None` for an
    /// empty session.
    pub fn min_half_spread(&self) -> Option<f64> {
        (0..self.steps)
            .map(|t| self.half_spread(self.time_fraction(t)))
            .reduce(f64::min)
    }

    /// True when every tick of the session quotes `bid < price < ask`.
    pub fn spread_is_positive(&self) -> bool {
        self.min_half_spread().map_or(true, |half| half > 0.0)
    }

    /// One exact-in-log step of geometric motion over `dt`.
    ///
    /// `daily_drift` is the drift per trading day, `shock` a standard normal draw.
    pub fn advance(&self, price: f64, daily_drift: f64, volatility: f64, shock: f64) -> f64 {
        let dt = self.dt();
        let w = shock * dt.sqrt();
        price * ((daily_drift - 0.5 * volatility * volatility) * dt + volatility * w).exp()
    }

    /// Bid and ask around `price` at `time_fraction`.
    pub fn quote(&self, price: f64, time_fraction: f64) -> (f64, f64) {
        let half = self.half_spread(time_fraction);
        (price - half, price + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(amplitude: f64, min_spread: f64, steps: u32) -> IntradayModel {
        IntradayModel::new(
            ModelConfig {
                amplitude,
                frequency: 0.5,
                phase: 0.0,
                min_spread,
                seed: None,
            },
            steps,
        )
    }

    #[test]
    fn time_grid_covers_one_day() {
        let m = model(0.025, 0.005, 23_400);
        assert!((m.dt() - 1.0 / 23_400.0).abs() < 1e-18);
        assert_eq!(m.time_fraction(0), 0.0);
        assert!((m.time_fraction(11_700) - 0.5).abs() < 1e-12);
        assert_eq!(model(0.025, 0.005, 0).dt(), 0.0);
    }

    #[test]
    fn volatility_modulation_peaks_at_quarter_day() {
        let m = model(0.1, 0.005, 100);
        assert!((m.modulated_volatility(0.02, 0.25) - 0.02 * 1.1).abs() < 1e-12);
        assert!((m.modulated_volatility(0.02, 0.75) - 0.02 * 0.9).abs() < 1e-12);
        // cos(-π/2) = 0 at the open
        assert!((m.modulated_volatility(0.02, 0.0) - 0.02).abs() < 1e-12);
        assert!(m.modulated_volatility(-0.02, 0.25) < 0.0);
    }

    #[test]
    fn half_spread_at_open_is_min_spread_half() {
        let m = model(0.025, 0.005, 23_400);
        assert!((m.half_spread(0.0) - 0.0025).abs() < 1e-15);
    }

    #[test]
    fn half_spread_trough_stays_positive_when_amplitude_small() {
        // f = 0.5 puts sin(π τ) at -1 only outside the session, so use a phase shift
        let mut m = model(0.002, 0.005, 23_400);
        m.config.phase = -PI / 2.0;
        let trough = m.half_spread(0.0);
        assert!((trough - (0.0025 - 0.002)).abs() < 1e-12);
        let (bid, ask) = m.quote(100.0, 0.0);
        assert!(bid < 100.0 && 100.0 < ask);
    }

    #[test]
    fn default_constants_never_cross_within_the_session() {
        // sin(π τ) >= 0 on [0, 1), so the amplitude only ever widens the spread
        let m = IntradayModel::new(ModelConfig::default(), 23_400);
        let min = m.min_half_spread().unwrap();
        assert!((min - 0.0025).abs() < 1e-15, "min half-spread {}", min);
        assert!(m.spread_is_positive());
    }

    #[test]
    fn spread_check_follows_frequency_and_phase() {
        let mut m = model(0.025, 0.005, 23_400);
        m.config.frequency = 1.0;
        assert!(m.min_half_spread().unwrap() < 0.0);
        assert!(!m.spread_is_positive());

        let mut m = model(0.0024, 0.005, 23_400);
        m.config.phase = -PI / 2.0;
        assert!(m.spread_is_positive());
        m.config.amplitude = 0.0026;
        assert!(!m.spread_is_positive());
    }

    #[test]
    fn empty_session_has_no_spread_minimum() {
        let m = model(0.025, 0.005, 0);
        assert_eq!(m.min_half_spread(), None);
        assert!(m.spread_is_positive());
    }

    #[test]
    fn zero_shock_step_follows_drift() {
        let m = model(0.0, 0.005, 100);
        let next = m.advance(100.0, 0.01, 0.0, 0.0);
        assert!((next - 100.0 * (0.01f64 / 100.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn zero_drift_zero_vol_is_identity() {
        let m = model(0.025, 0.005, 23_400);
        assert_eq!(m.advance(176.5, 0.0, 0.0, 0.0), 176.5);
    }

    #[test]
    fn shock_moves_price_in_its_direction() {
        let m = model(0.0, 0.005, 100);
        let up = m.advance(100.0, 0.0, 0.2, 1.0);
        let down = m.advance(100.0, 0.0, 0.2, -1.0);
        assert!(up > 100.0);
        assert!(down < 100.0);
        assert!(down > 0.0);
    }
}
