pub mod clock;
pub mod day;
pub mod process;
pub mod runner;
pub mod shocks;

pub use clock::SessionClock;
pub use day::{DayPath, DayState};
pub use process::IntradayModel;
pub use runner::{run_feed, Pacing, RunSummary};
pub use shocks::{FixedShocks, GaussianShocks, ShockSource};
