use anyhow::{Context, Result};
use tokio::sync::watch;

use synth_tick::config::Config;
use synth_tick::history;
use synth_tick::params::derive_day_parameters;
use synth_tick::publisher::WsPublisher;
use synth_tick::sim::{run_feed, GaussianShocks, IntradayModel, Pacing, SessionClock};

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(&config.logging.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set SYNTH_TICK_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!(
        symbol = %config.feed.symbol,
        start_date = %config.feed.start_date,
        bind = %config.publish.bind,
        session_secs = config.session.length_secs,
        "Starting synth-tick"
    );
    // everything that can fail runs before the first tick
    let steps = config.session.length_secs;
    let clock = SessionClock::new(config.session.open_time()?, steps);
    clock.ensure_fits()?;
    let bars = history::load_daily_bars(&config.feed).await?;
    let days = derive_day_parameters(&bars, steps).context("daily history is unusable")?;
    let model = IntradayModel::new(config.model, steps);
    if !model.spread_is_positive() {
        tracing::warn!(
            amplitude = config.model.amplitude,
            frequency = config.model.frequency,
            phase = config.model.phase,
            min_half_spread = model.min_half_spread().unwrap_or_default(),
            "Spread reaches zero during the session; bid/ask will cross"
        );
    }

    let mut publisher = WsPublisher::bind(&config.publish.bind, config.publish.channel_capacity)
        .await
        .with_context(|| format!("failed to bind publisher on {}", config.publish.bind))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut shocks = GaussianShocks::new(config.model.seed);
    let summary = run_feed(
        &days,
        &model,
        &clock,
        &mut shocks,
        &mut publisher,
        Pacing::from_millis(config.session.tick_interval_ms),
        shutdown_rx,
    )
    .await?;

    tracing::info!(
        days = summary.days,
        ticks = summary.ticks,
        deliveries = summary.deliveries,
        cancelled = summary.cancelled,
        "Feed finished"
    );
    drop(shutdown_tx);
    Ok(())
}
