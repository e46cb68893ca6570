//! Social sentiment provider

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::domain::SocialSignal;
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

use super::{ProviderCore, ProviderKind, TokenBucket};

/// Raw sentiment aggregate for one player
#[derive(Debug, Clone, Deserialize)]
struct SentimentResponse {
    sentiment: f64,
    confidence: f64,
    #[serde(default)]
    mention_count: u32,
    #[serde(default)]
    beat_writer_sentiment: f64,
    #[serde(default)]
    trending_score: f64,
}

pub struct SocialClient {
    core: ProviderCore,
}

impl SocialClient {
    pub fn new(
        config: &ProviderConfig,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        Ok(Self {
            core: ProviderCore::new(ProviderKind::Social, config, bucket, usage, metrics)?,
        })
    }

    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Sentiment for one player. Never cached: trending moves faster than
    /// the game-scoped signals.
    pub async fn fetch(&self, player_id: &str) -> Result<SocialSignal> {
        let raw: SentimentResponse = self
            .core
            .get_json(&format!("/v1/sentiment/{player_id}"))
            .await?;
        self.sanitize(raw)
    }

    fn sanitize(&self, raw: SentimentResponse) -> Result<SocialSignal> {
        if !raw.sentiment.is_finite() || !raw.confidence.is_finite() {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode("non-finite sentiment fields".to_string()),
            ));
        }
        Ok(SocialSignal {
            sentiment: raw.sentiment.clamp(-1.0, 1.0),
            confidence: raw.confidence.clamp(0.0, 1.0),
            mention_count: raw.mention_count,
            beat_writer_sentiment: if raw.beat_writer_sentiment.is_finite() {
                raw.beat_writer_sentiment.clamp(-1.0, 1.0)
            } else {
                0.0
            },
            trending_score: if raw.trending_score.is_finite() {
                raw.trending_score.max(0.0)
            } else {
                0.0
            },
        })
    }
}
