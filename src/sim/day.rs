use crate::error::FeedError;
use crate::model::Tick;
use crate::params::DayParameters;
use crate::sim::{IntradayModel, SessionClock, ShockSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NotStarted,
    Running(u32),
    DayComplete,
}

/// The ticks of one trading day, produced strictly in order.
///
/// Tick `t` quotes the price at elapsed time `t * dt`; the state is then
/// advanced with the modulation at `t` and one fresh shock. The first tick
/// of a day therefore always carries the opening price.
pub struct DayPath<'a, S> {
    model: &'a IntradayModel,
    clock: &'a SessionClock,
    params: DayParameters,
    shocks: S,
    daily_drift: f64,
    current_price: f64,
    state: DayState,
}

impl<'a, S: ShockSource> DayPath<'a, S> {
    pub fn new(
        model: &'a IntradayModel,
        clock: &'a SessionClock,
        params: DayParameters,
        shocks: S,
    ) -> Self {
        Self {
            model,
            clock,
            daily_drift: params.daily_drift(model.steps),
            current_price: params.starting_price,
            params,
            shocks,
            state: DayState::NotStarted,
        }
    }

    pub fn state(&self) -> DayState {
        self.state
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    fn step(&mut self, t: u32) -> Result<Tick, FeedError> {
        let time_fraction = self.model.time_fraction(t);
        let (bid, ask) = self.model.quote(self.current_price, time_fraction);
        let tick = Tick {
            timestamp: self.clock.timestamp(self.params.date, t),
            price: self.current_price,
            bid,
            ask,
        };
        if !tick.is_finite() || tick.price <= 0.0 {
            return Err(FeedError::NonFiniteTick {
                timestamp: tick.timestamp,
                price: tick.price,
                bid: tick.bid,
                ask: tick.ask,
            });
        }

        let volatility = self
            .model
            .modulated_volatility(self.params.base_volatility, time_fraction);
        let shock = self.shocks.standard_normal();
        self.current_price =
            self.model
                .advance(self.current_price, self.daily_drift, volatility, shock);
        Ok(tick)
    }
}

impl<S: ShockSource> Iterator for DayPath<'_, S> {
    type Item = Result<Tick, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        let t = match self.state {
            DayState::NotStarted => 0,
            DayState::Running(t) => t + 1,
            DayState::DayComplete => return None,
        };
        if t >= self.model.steps {
            self.state = DayState::DayComplete;
            return None;
        }
        self.state = DayState::Running(t);
        match self.step(t) {
            Ok(tick) => Some(Ok(tick)),
            Err(e) => {
                self.state = DayState::DayComplete;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::sim::FixedShocks;
    use chrono::{NaiveDate, NaiveTime};

    fn params(start: f64, drift: f64, vol: f64) -> DayParameters {
        DayParameters {
            date: NaiveDate::from_ymd_opt(2023, 8, 22).unwrap(),
            drift,
            base_volatility: vol,
            starting_price: start,
        }
    }

    fn clock(len: u32) -> SessionClock {
        SessionClock::new(NaiveTime::from_hms_opt(9, 30, 0).unwrap(), len)
    }

    #[test]
    fn emits_exactly_steps_ticks_then_completes() {
        let model = IntradayModel::new(ModelConfig::default(), 5);
        let clock = clock(5);
        let mut path = DayPath::new(&model, &clock, params(100.0, 0.0, 0.01), FixedShocks::zeros());
        assert_eq!(path.state(), DayState::NotStarted);
        let ticks: Vec<Tick> = path.by_ref().map(|t| t.unwrap()).collect();
        assert_eq!(ticks.len(), 5);
        assert_eq!(path.state(), DayState::DayComplete);
        assert!(path.next().is_none());
    }

    #[test]
    fn zero_length_session_is_empty() {
        let model = IntradayModel::new(ModelConfig::default(), 0);
        let clock = clock(0);
        let mut path = DayPath::new(&model, &clock, params(100.0, 0.0, 0.01), FixedShocks::zeros());
        assert!(path.next().is_none());
        assert_eq!(path.state(), DayState::DayComplete);
    }

    #[test]
    fn one_shock_drawn_per_tick() {
        let model = IntradayModel::new(ModelConfig::default(), 7);
        let clock = clock(7);
        let mut shocks = FixedShocks::new(vec![0.3, -0.2]);
        let n = DayPath::new(&model, &clock, params(50.0, 0.0, 0.02), &mut shocks).count();
        assert_eq!(n, 7);
        assert_eq!(shocks.drawn(), 7);
    }

    #[test]
    fn explosive_path_fails_instead_of_publishing_garbage() {
        let model = IntradayModel::new(ModelConfig::default(), 4);
        let clock = clock(4);
        let shocks = FixedShocks::new(vec![f64::INFINITY]);
        let results: Vec<_> = DayPath::new(&model, &clock, params(100.0, 0.0, 0.5), shocks).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(FeedError::NonFiniteTick { .. })));
    }
}
