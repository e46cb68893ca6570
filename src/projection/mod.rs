//! Projection enhancement pipeline

pub mod aggregator;
pub mod service;

pub use aggregator::ProjectionAggregator;
pub use service::ProjectionService;
