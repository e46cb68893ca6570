pub mod alerts;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod projection;
pub mod providers;
pub mod services;

pub use alerts::{AlertBus, AlertEngine, AlertKind, AlertNotification, AlertSeverity};
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use domain::{
    Player, Position, ProjectionResult, SignalSet, SlateStore, SocialSignal, StatsSignal,
    VegasSignal, WeatherSignal,
};
pub use error::{Result, SlatecastError};
pub use projection::{ProjectionAggregator, ProjectionService};
pub use providers::{ProviderHub, ProviderKind, SignalSource};
pub use services::{CoreMetrics, SignalWatcher, UsageTracker};
