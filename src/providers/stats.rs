//! Play-by-play factor provider

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::domain::StatsSignal;
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

use super::{ProviderCore, ProviderKind, TokenBucket};

/// Situational factors modeled upstream; each is already a bounded fraction
#[derive(Debug, Clone, Deserialize)]
struct FactorsResponse {
    #[serde(default)]
    historical: f64,
    #[serde(default)]
    game_script: f64,
    #[serde(default)]
    defense: f64,
    #[serde(default = "default_factor_confidence")]
    confidence: f64,
}

fn default_factor_confidence() -> f64 {
    0.75
}

pub struct StatsClient {
    core: ProviderCore,
}

impl StatsClient {
    pub fn new(
        config: &ProviderConfig,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        Ok(Self {
            core: ProviderCore::new(ProviderKind::Stats, config, bucket, usage, metrics)?,
        })
    }

    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Situational factors for one player; values pass through unchanged
    pub async fn fetch(&self, player_id: &str) -> Result<StatsSignal> {
        let raw: FactorsResponse = self
            .core
            .get_json(&format!("/v1/factors/{player_id}"))
            .await?;
        self.sanitize(raw)
    }

    fn sanitize(&self, raw: FactorsResponse) -> Result<StatsSignal> {
        if !raw.historical.is_finite()
            || !raw.game_script.is_finite()
            || !raw.defense.is_finite()
            || !raw.confidence.is_finite()
        {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode("non-finite factor fields".to_string()),
            ));
        }
        Ok(StatsSignal {
            historical: raw.historical,
            game_script: raw.game_script,
            defense: raw.defense,
            confidence: raw.confidence.clamp(0.0, 1.0),
        })
    }
}
