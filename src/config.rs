use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub symbol: String,
    /// First calendar day of the history window, `MM/DD/YYYY`.
    pub start_date: String,
    #[serde(default = "default_range_days")]
    pub range_days: u32,
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    /// Offline alternative to the Yahoo download.
    #[serde(default)]
    pub bars_file: Option<PathBuf>,
}

/// Constants of the intraday model, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub min_spread: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_length_secs")]
    pub length_secs: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_range_days() -> u32 {
    19
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_open_time() -> String {
    "09:30".to_string()
}

fn default_length_secs() -> u32 {
    // 6.5 hour cash session
    23_400
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_bind() -> String {
    "0.0.0.0:5555".to_string()
}

fn default_channel_capacity() -> usize {
    1_024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.025,
            frequency: 0.5,
            phase: 0.0,
            min_spread: 0.005,
            seed: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open_time: default_open_time(),
            length_secs: default_length_secs(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Parse a start date in the `MM/DD/YYYY` form used on the command line of the old tool.
pub fn parse_start_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y")
        .with_context(|| format!("invalid start date '{}': expected MM/DD/YYYY", s))
}

/// Parse a session open time such as `09:30`.
pub fn parse_session_open(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("invalid session open time '{}': expected HH:MM", s))
}

impl FeedConfig {
    /// Calendar window `[start, end)` handed to the history source.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = parse_start_date(&self.start_date)?;
        if self.range_days == 0 {
            bail!("feed.range_days must be > 0");
        }
        let end = start
            .checked_add_signed(Duration::days(i64::from(self.range_days)))
            .with_context(|| format!("feed.range_days {} overflows the calendar", self.range_days))?;
        Ok((start, end))
    }
}

impl ModelConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("phase", self.phase),
            ("min_spread", self.min_spread),
        ] {
            if !value.is_finite() {
                bail!("model.{} must be finite, got {}", name, value);
            }
        }
        if self.min_spread <= 0.0 {
            bail!("model.min_spread must be > 0, got {}", self.min_spread);
        }
        Ok(())
    }
}

impl SessionConfig {
    pub fn open_time(&self) -> Result<NaiveTime> {
        parse_session_open(&self.open_time)
    }

    fn validate(&self) -> Result<()> {
        let open = self.open_time()?;
        let secs_to_midnight = 86_400 - i64::from(open.num_seconds_from_midnight());
        if i64::from(self.length_secs) > secs_to_midnight {
            bail!(
                "session.length_secs {} runs past midnight from open {}",
                self.length_secs,
                self.open_time
            );
        }
        if self.tick_interval_ms == 0 {
            bail!("session.tick_interval_ms must be > 0");
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var("SYNTH_TICK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::from_path(&config_path)?;

        if let Ok(symbol) = std::env::var("SYNTH_TICK_SYMBOL") {
            config.feed.symbol = symbol;
        }
        if let Ok(start) = std::env::var("SYNTH_TICK_START_DATE") {
            config.feed.start_date = start;
        }
        if let Ok(bind) = std::env::var("SYNTH_TICK_BIND") {
            config.publish.bind = bind;
        }

        config.feed.symbol = config.feed.symbol.trim().to_ascii_uppercase();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed.symbol.trim().is_empty() {
            bail!("feed.symbol must not be empty");
        }
        self.feed.date_range().context("feed date range is invalid")?;
        self.model.validate().context("model constants are invalid")?;
        self.session.validate().context("session is invalid")?;
        if self.publish.channel_capacity == 0 {
            bail!("publish.channel_capacity must be > 0");
        }
        Ok(())
    }
}
