//! Weather conditions provider
//!
//! Conditions are game-scoped and slow-moving, so responses are cached for
//! the configured window and shared by every player in the matchup.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::domain::WeatherSignal;
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

use super::{ProviderCore, ProviderKind, SignalCache, TokenBucket};

/// Raw conditions payload from the weather API
#[derive(Debug, Clone, Deserialize)]
struct ConditionsResponse {
    temperature_f: f64,
    wind_mph: f64,
    #[serde(default)]
    precipitation_in: f64,
    #[serde(default)]
    dome: bool,
}

pub struct WeatherClient {
    core: ProviderCore,
    cache: SignalCache<WeatherSignal>,
}

impl WeatherClient {
    pub fn new(
        config: &ProviderConfig,
        cache_ttl: Duration,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        Ok(Self {
            core: ProviderCore::new(ProviderKind::Weather, config, bucket, usage, metrics)?,
            cache: SignalCache::new(cache_ttl),
        })
    }

    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Conditions for one game, served from the cache within the window
    pub async fn fetch(&self, game_key: &str) -> Result<WeatherSignal> {
        if let Some(hit) = self.cache.get(game_key) {
            self.core.note_cache_hit();
            return Ok(hit);
        }

        let raw: ConditionsResponse = self
            .core
            .get_json(&format!("/v1/conditions/{game_key}"))
            .await?;
        let signal = self.sanitize(raw)?;
        self.cache.insert(game_key, signal);
        Ok(signal)
    }

    fn sanitize(&self, raw: ConditionsResponse) -> Result<WeatherSignal> {
        if !raw.temperature_f.is_finite()
            || !raw.wind_mph.is_finite()
            || !raw.precipitation_in.is_finite()
        {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode("non-finite weather fields".to_string()),
            ));
        }
        Ok(WeatherSignal {
            temperature_f: raw.temperature_f,
            wind_mph: raw.wind_mph.max(0.0),
            precipitation_in: raw.precipitation_in.max(0.0),
            indoor: raw.dome,
        })
    }
}
