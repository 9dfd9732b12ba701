pub mod bar;
pub mod tick;

pub use bar::DailyBar;
pub use tick::{Tick, TickMessage, TIMESTAMP_FORMAT};
