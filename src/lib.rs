pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod params;
pub mod publisher;
pub mod sim;
