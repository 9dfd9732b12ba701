use std::time::Duration;

use tokio::sync::watch;

use crate::error::FeedError;
use crate::params::DayParameters;
use crate::publisher::Publish;
use crate::sim::{DayPath, IntradayModel, SessionClock, ShockSource};

/// Delay between consecutive ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub interval: Duration,
}

impl Pacing {
    pub fn per_second() -> Self {
        Self::from_millis(1_000)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Days whose session ran to completion.
    pub days: usize,
    pub ticks: u64,
    /// Sum over ticks of the subscribers each message reached.
    pub deliveries: u64,
    pub cancelled: bool,
}

/// Simulate and publish every day in order, one tick per pacing interval.
///
/// Publishing happens before the pacing delay; the shutdown signal is observed
/// before each tick and during each delay, so a cancelled run stops between
/// two complete ticks. Any error aborts the whole run.
pub async fn run_feed<P, S>(
    days: &[DayParameters],
    model: &IntradayModel,
    clock: &SessionClock,
    shocks: &mut S,
    publisher: &mut P,
    pacing: Pacing,
    mut shutdown: watch::Receiver<bool>,
) -> Result<RunSummary, FeedError>
where
    P: Publish + ?Sized,
    S: ShockSource + ?Sized,
{
    clock.ensure_fits()?;
    let mut summary = RunSummary::default();

    for params in days {
        tracing::info!(
            date = %params.date,
            open = params.starting_price,
            drift = params.drift,
            volatility = params.base_volatility,
            steps = model.steps,
            "Simulating trading day"
        );

        let mut path = DayPath::new(model, clock, *params, &mut *shocks);
        loop {
            if *shutdown.borrow() {
                summary.cancelled = true;
                return Ok(summary);
            }
            let Some(tick) = path.next() else {
                break;
            };

            let tick = tick?;
            let message = tick.to_json()?;
            let receivers = publisher.publish(&message)?;
            summary.ticks += 1;
            summary.deliveries += receivers as u64;
            tracing::trace!(timestamp = %tick.timestamp, price = tick.price, receivers, "Tick published");

            if pause(pacing.interval, &mut shutdown).await {
                tracing::info!(date = %params.date, "Shutdown requested, stopping feed");
                summary.cancelled = true;
                return Ok(summary);
            }
        }

        summary.days += 1;
        tracing::info!(date = %params.date, ticks = summary.ticks, "Trading day complete");
    }

    Ok(summary)
}

/// Sleep for `interval` unless shutdown is requested first. A dropped sender
/// counts as a shutdown request. Returns true when cancelled.
async fn pause(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let delay = tokio::time::sleep(interval);
    tokio::pin!(delay);
    loop {
        tokio::select! {
            _ = &mut delay => return false,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return true;
                }
            }
        }
    }
}
