//! Provider clients for external data sources
//!
//! One client per upstream source. Every call is guarded by the provider's
//! token bucket and recorded into the usage ledger; weather and odds
//! responses are cached for the configured window.

pub mod ai;
pub mod odds;
pub mod rate_limit;
pub mod social;
pub mod stats;
pub mod weather;

pub use ai::InsightClient;
pub use odds::OddsClient;
pub use rate_limit::{RateLimitConfig, RateLimits, TokenBucket};
pub use social::SocialClient;
pub use stats::StatsClient;
pub use weather::WeatherClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::{AppConfig, ProviderConfig};
use crate::domain::{InsightSignal, SocialSignal, StatsSignal, VegasSignal, WeatherSignal};
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

/// Upstream data sources the service accounts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Weather,
    Odds,
    Stats,
    Social,
    Ai,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Weather,
        ProviderKind::Odds,
        ProviderKind::Stats,
        ProviderKind::Social,
        ProviderKind::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Weather => "weather",
            ProviderKind::Odds => "odds",
            ProviderKind::Stats => "stats",
            ProviderKind::Social => "social",
            ProviderKind::Ai => "ai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Seam between signal assembly and the concrete provider clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn weather(&self, game_key: &str) -> Result<WeatherSignal>;
    async fn vegas(&self, game_key: &str, team: &str) -> Result<VegasSignal>;
    async fn social(&self, player_id: &str) -> Result<SocialSignal>;
    async fn stats(&self, player_id: &str) -> Result<StatsSignal>;
    async fn insight(&self, player_id: &str) -> Result<InsightSignal>;
}

/// Shared plumbing for one provider client: HTTP transport, rate limiting
/// and usage accounting around every call.
pub(crate) struct ProviderCore {
    kind: ProviderKind,
    http: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
    cost_per_call: f64,
    bucket: Arc<TokenBucket>,
    usage: Arc<UsageTracker>,
    metrics: Arc<CoreMetrics>,
}

impl ProviderCore {
    pub(crate) fn new(
        kind: ProviderKind,
        config: &ProviderConfig,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("slatecast/0.1")
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .map_err(|e| {
                SlatecastError::Internal(format!("failed to build {kind} HTTP client: {e}"))
            })?;

        Ok(Self {
            kind,
            http,
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
            cost_per_call: config.cost_per_call,
            bucket,
            usage,
            metrics,
        })
    }

    pub(crate) fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub(crate) fn enabled(&self) -> bool {
        self.base_url.is_some()
    }

    pub(crate) fn note_cache_hit(&self) {
        self.metrics.inc_cache_hits();
    }

    /// Rate-limited, accounted GET returning parsed JSON
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            SlatecastError::provider_unavailable(self.kind.as_str(), ProviderError::NotConfigured)
        })?;

        self.bucket.acquire().await?;
        self.metrics.inc_provider_calls();

        let url = format!("{base}{path}");
        let started = Instant::now();
        let mut request = self.http.get(&url);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                self.metrics.inc_provider_failures();
                // The call never completed, so no cost is charged
                self.usage.record_request(self.kind, path, 0, elapsed_ms, 0.0);
                let reason = if e.is_timeout() {
                    ProviderError::Timeout { elapsed_ms }
                } else {
                    ProviderError::Transport(e.to_string())
                };
                return Err(SlatecastError::provider_unavailable(
                    self.kind.as_str(),
                    reason,
                ));
            }
        };

        let status = response.status();
        let latency_ms = started.elapsed().as_millis() as u64;
        self.usage
            .record_request(self.kind, path, status.as_u16(), latency_ms, self.cost_per_call);

        if !status.is_success() {
            self.metrics.inc_provider_failures();
            return Err(SlatecastError::provider_unavailable(
                self.kind.as_str(),
                ProviderError::BadStatus {
                    status: status.as_u16(),
                },
            ));
        }

        response.json::<T>().await.map_err(|e| {
            self.metrics.inc_provider_failures();
            SlatecastError::provider_unavailable(
                self.kind.as_str(),
                ProviderError::Decode(e.to_string()),
            )
        })
    }
}

/// Time-windowed cache for responses shared across players in a game
pub(crate) struct SignalCache<T> {
    entries: DashMap<String, (Instant, T)>,
    ttl: Duration,
}

impl<T: Clone> SignalCache<T> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        let (stored_at, value) = entry.value();
        if stored_at.elapsed() <= self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    pub(crate) fn insert(&self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), (Instant::now(), value));
    }
}

/// The concrete clients behind the `SignalSource` seam
pub struct ProviderHub {
    weather: WeatherClient,
    odds: OddsClient,
    stats: StatsClient,
    social: SocialClient,
    ai: InsightClient,
}

impl ProviderHub {
    pub fn from_config(
        config: &AppConfig,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        let limits = RateLimits::from_config(&config.providers);
        let cache_ttl = Duration::from_secs(config.signals.cache_secs.max(1));

        Ok(Self {
            weather: WeatherClient::new(
                &config.providers.weather,
                cache_ttl,
                limits.bucket(ProviderKind::Weather),
                usage.clone(),
                metrics.clone(),
            )?,
            odds: OddsClient::new(
                &config.providers.odds,
                cache_ttl,
                limits.bucket(ProviderKind::Odds),
                usage.clone(),
                metrics.clone(),
            )?,
            stats: StatsClient::new(
                &config.providers.stats,
                limits.bucket(ProviderKind::Stats),
                usage.clone(),
                metrics.clone(),
            )?,
            social: SocialClient::new(
                &config.providers.social,
                limits.bucket(ProviderKind::Social),
                usage.clone(),
                metrics.clone(),
            )?,
            ai: InsightClient::new(
                &config.providers.ai,
                limits.bucket(ProviderKind::Ai),
                usage,
                metrics,
            )?,
        })
    }

    /// Providers with a configured endpoint, for the health surface
    pub fn enabled_providers(&self) -> Vec<ProviderKind> {
        let mut enabled = Vec::new();
        if self.weather.enabled() {
            enabled.push(ProviderKind::Weather);
        }
        if self.odds.enabled() {
            enabled.push(ProviderKind::Odds);
        }
        if self.stats.enabled() {
            enabled.push(ProviderKind::Stats);
        }
        if self.social.enabled() {
            enabled.push(ProviderKind::Social);
        }
        if self.ai.enabled() {
            enabled.push(ProviderKind::Ai);
        }
        enabled
    }
}

#[async_trait]
impl SignalSource for ProviderHub {
    async fn weather(&self, game_key: &str) -> Result<WeatherSignal> {
        self.weather.fetch(game_key).await
    }

    async fn vegas(&self, game_key: &str, team: &str) -> Result<VegasSignal> {
        self.odds.fetch(game_key, team).await
    }

    async fn social(&self, player_id: &str) -> Result<SocialSignal> {
        self.social.fetch(player_id).await
    }

    async fn stats(&self, player_id: &str) -> Result<StatsSignal> {
        self.stats.fetch(player_id).await
    }

    async fn insight(&self, player_id: &str) -> Result<InsightSignal> {
        self.ai.fetch(player_id).await
    }
}
