pub mod metrics;
pub mod poller;
pub mod usage;

pub use metrics::CoreMetrics;
pub use poller::SignalWatcher;
pub use usage::{UsageRecord, UsageTracker};
