use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub usage: UsageConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the API server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Per-provider connection and quota settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// REST endpoint; provider is disabled when unset
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key sent as a bearer token when present
    #[serde(default)]
    pub api_key: Option<String>,
    /// Token bucket size and per-minute refill
    pub requests_per_minute: u32,
    /// Daily request quota reported in usage records
    pub daily_limit: u32,
    /// Accounting cost per successful call, in dollars
    pub cost_per_call: f64,
    /// Per-request HTTP timeout in milliseconds
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_provider_timeout_ms() -> u64 {
    2500
}

impl ProviderConfig {
    fn quota(requests_per_minute: u32, daily_limit: u32, cost_per_call: f64) -> Self {
        Self {
            base_url: None,
            api_key: None,
            requests_per_minute,
            daily_limit,
            cost_per_call,
            timeout_ms: default_provider_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_weather_provider")]
    pub weather: ProviderConfig,
    #[serde(default = "default_odds_provider")]
    pub odds: ProviderConfig,
    #[serde(default = "default_stats_provider")]
    pub stats: ProviderConfig,
    #[serde(default = "default_social_provider")]
    pub social: ProviderConfig,
    #[serde(default = "default_ai_provider")]
    pub ai: ProviderConfig,
}

fn default_weather_provider() -> ProviderConfig {
    ProviderConfig::quota(30, 1000, 0.0)
}

fn default_odds_provider() -> ProviderConfig {
    ProviderConfig::quota(20, 500, 0.001)
}

fn default_stats_provider() -> ProviderConfig {
    ProviderConfig::quota(60, 2000, 0.0005)
}

fn default_social_provider() -> ProviderConfig {
    ProviderConfig::quota(40, 1500, 0.0002)
}

fn default_ai_provider() -> ProviderConfig {
    ProviderConfig::quota(10, 200, 0.01)
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            weather: default_weather_provider(),
            odds: default_odds_provider(),
            stats: default_stats_provider(),
            social: default_social_provider(),
            ai: default_ai_provider(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    /// Cache window for weather/odds responses in seconds
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
    /// Deadline for a single signal fetch during enhancement, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_cache_secs() -> u64 {
    300
}

fn default_fetch_timeout_ms() -> u64 {
    3000
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            cache_secs: default_cache_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// League-average implied team total the vegas modifier is anchored to
    #[serde(default = "default_league_avg_total")]
    pub league_avg_total: f64,
    /// Fraction of the relative total deviation applied as the vegas modifier
    #[serde(default = "default_vegas_sensitivity")]
    pub vegas_sensitivity: f64,
    /// Volatility floor applied even at full confidence
    #[serde(default = "default_base_volatility")]
    pub base_volatility: f64,
    /// Additional volatility applied in proportion to missing confidence
    #[serde(default = "default_volatility_spread")]
    pub volatility_spread: f64,
}

fn default_league_avg_total() -> f64 {
    22.5
}

fn default_vegas_sensitivity() -> f64 {
    0.5
}

fn default_base_volatility() -> f64 {
    0.10
}

fn default_volatility_spread() -> f64 {
    0.50
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            league_avg_total: default_league_avg_total(),
            vegas_sensitivity: default_vegas_sensitivity(),
            base_volatility: default_base_volatility(),
            volatility_spread: default_volatility_spread(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Fractional projection change that triggers an alert (0.03 = 3%)
    #[serde(default = "default_projection_change_pct")]
    pub projection_change_pct: f64,
    /// Absolute sentiment delta that triggers an alert
    #[serde(default = "default_sentiment_delta")]
    pub sentiment_delta: f64,
    /// Absolute weather severity delta that triggers an alert
    #[serde(default = "default_weather_severity_delta")]
    pub weather_severity_delta: f64,
    /// Window during which duplicate alerts are suppressed, in seconds
    #[serde(default = "default_suppression_secs")]
    pub suppression_secs: u64,
    /// Broadcast channel capacity; slow subscribers lose the oldest messages
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_projection_change_pct() -> f64 {
    0.03
}

fn default_sentiment_delta() -> f64 {
    0.3
}

fn default_weather_severity_delta() -> f64 {
    1.0
}

fn default_suppression_secs() -> u64 {
    300
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            projection_change_pct: default_projection_change_pct(),
            sentiment_delta: default_sentiment_delta(),
            weather_severity_delta: default_weather_severity_delta(),
            suppression_secs: default_suppression_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Days of per-provider usage history kept before pruning
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Snapshot file for the usage ledger; persistence is disabled when unset
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: Option<String>,
    /// Interval between best-effort snapshot flushes, in seconds
    #[serde(default = "default_flush_secs")]
    pub flush_secs: u64,
}

fn default_retention_days() -> u32 {
    30
}

fn default_snapshot_path() -> Option<String> {
    Some("data/usage.json".to_string())
}

fn default_flush_secs() -> u64 {
    60
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            snapshot_path: default_snapshot_path(),
            flush_secs: default_flush_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Enable the background signal watcher
    #[serde(default = "default_watcher_enabled")]
    pub enabled: bool,
    /// Interval between weather refreshes per tracked game, in seconds
    #[serde(default = "default_weather_interval_secs")]
    pub weather_interval_secs: u64,
    /// Interval between social refreshes per tracked player, in seconds
    #[serde(default = "default_social_interval_secs")]
    pub social_interval_secs: u64,
}

fn default_watcher_enabled() -> bool {
    true
}

fn default_weather_interval_secs() -> u64 {
    300
}

fn default_social_interval_secs() -> u64 {
    120
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: default_watcher_enabled(),
            weather_interval_secs: default_weather_interval_secs(),
            social_interval_secs: default_social_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SLATECAST_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SLATECAST_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("SLATECAST")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            signals: SignalsConfig::default(),
            projection: ProjectionConfig::default(),
            alerts: AlertsConfig::default(),
            usage: UsageConfig::default(),
            watcher: WatcherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Validate alert thresholds
        if self.alerts.projection_change_pct <= 0.0 || self.alerts.projection_change_pct >= 1.0 {
            errors.push("alerts.projection_change_pct must be between 0 and 1".to_string());
        }

        if self.alerts.sentiment_delta <= 0.0 || self.alerts.sentiment_delta > 2.0 {
            errors.push("alerts.sentiment_delta must be between 0 and 2".to_string());
        }

        if self.alerts.weather_severity_delta <= 0.0 {
            errors.push("alerts.weather_severity_delta must be positive".to_string());
        }

        if self.alerts.channel_capacity == 0 {
            errors.push("alerts.channel_capacity must be positive".to_string());
        }

        // Validate projection params
        if self.projection.league_avg_total <= 0.0 {
            errors.push("projection.league_avg_total must be positive".to_string());
        }

        let max_volatility = self.projection.base_volatility + self.projection.volatility_spread;
        if !(0.0..=1.0).contains(&max_volatility) {
            errors.push(format!(
                "projection.base_volatility + volatility_spread must stay within [0, 1], got {max_volatility}. A wider band would push floors negative."
            ));
        }

        // Validate provider quotas
        for (name, provider) in self.providers.iter() {
            if provider.requests_per_minute == 0 {
                errors.push(format!("providers.{name}.requests_per_minute must be positive"));
            }
            if provider.daily_limit == 0 {
                errors.push(format!("providers.{name}.daily_limit must be positive"));
            }
            if provider.cost_per_call < 0.0 {
                errors.push(format!("providers.{name}.cost_per_call must not be negative"));
            }
        }

        if self.signals.fetch_timeout_ms == 0 {
            errors.push("signals.fetch_timeout_ms must be positive".to_string());
        }

        if self.usage.retention_days == 0 {
            errors.push("usage.retention_days must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl ProvidersConfig {
    /// Iterate provider sections with their config names
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ProviderConfig)> {
        [
            ("weather", &self.weather),
            ("odds", &self.odds),
            ("stats", &self.stats),
            ("social", &self.social),
            ("ai", &self.ai),
        ]
        .into_iter()
    }
}
