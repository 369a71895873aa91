// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod sampler;
pub mod source;
pub mod store;
pub mod usage;

pub use collector::{Profile, ScheduledCollector};
pub use error::CollectorError;
