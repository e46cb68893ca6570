//! Commentary model provider

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::domain::InsightSignal;
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

use super::{ProviderCore, ProviderKind, TokenBucket};

#[derive(Debug, Clone, Deserialize)]
struct CommentaryResponse {
    headline: String,
    #[serde(default)]
    outlook: f64,
    #[serde(default = "default_commentary_confidence")]
    confidence: f64,
}

fn default_commentary_confidence() -> f64 {
    0.5
}

pub struct InsightClient {
    core: ProviderCore,
}

impl InsightClient {
    pub fn new(
        config: &ProviderConfig,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        Ok(Self {
            core: ProviderCore::new(ProviderKind::Ai, config, bucket, usage, metrics)?,
        })
    }

    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Narrative read for one player; annotation only, never a modifier
    pub async fn fetch(&self, player_id: &str) -> Result<InsightSignal> {
        let raw: CommentaryResponse = self
            .core
            .get_json(&format!("/v1/commentary/{player_id}"))
            .await?;
        self.sanitize(raw)
    }

    fn sanitize(&self, raw: CommentaryResponse) -> Result<InsightSignal> {
        if raw.headline.trim().is_empty() {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode("empty commentary headline".to_string()),
            ));
        }
        Ok(InsightSignal {
            headline: raw.headline.trim().to_string(),
            outlook: if raw.outlook.is_finite() {
                raw.outlook.clamp(-1.0, 1.0)
            } else {
                0.0
            },
            confidence: if raw.confidence.is_finite() {
                raw.confidence.clamp(0.0, 1.0)
            } else {
                0.5
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProvidersConfig, UsageConfig};
    use crate::providers::RateLimitConfig;

    fn client() -> InsightClient {
        let config = ProviderConfig {
            base_url: Some("http://ai.test".to_string()),
            api_key: Some("key".to_string()),
            requests_per_minute: 10,
            daily_limit: 200,
            cost_per_call: 0.01,
            timeout_ms: 1000,
        };
        let usage = Arc::new(UsageTracker::new(
            &UsageConfig {
                retention_days: 30,
                snapshot_path: None,
                flush_secs: 60,
            },
            &ProvidersConfig::default(),
        ));
        InsightClient::new(
            &config,
            Arc::new(TokenBucket::new("ai", RateLimitConfig::per_minute(10))),
            usage,
            Arc::new(CoreMetrics::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_blank_headline_is_rejected() {
        let client = client();
        let raw = CommentaryResponse {
            headline: "   ".to_string(),
            outlook: 0.2,
            confidence: 0.6,
        };
        assert!(client.sanitize(raw).is_err());
    }

    #[test]
    fn test_outlook_clamps_and_trims() {
        let client = client();
        let signal = client
            .sanitize(CommentaryResponse {
                headline: "  Volume spike expected  ".to_string(),
                outlook: 2.5,
                confidence: 0.6,
            })
            .unwrap();

        assert_eq!(signal.headline, "Volume spike expected");
        assert_eq!(signal.outlook, 1.0);
    }
}
