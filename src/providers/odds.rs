//! Betting lines provider
//!
//! Lines are fetched per game and cached; the per-team view (spread sign and
//! implied total) is derived on read so both sides share one upstream call.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::domain::VegasSignal;
use crate::error::{ProviderError, Result, SlatecastError};
use crate::services::metrics::CoreMetrics;
use crate::services::usage::UsageTracker;

use super::{ProviderCore, ProviderKind, SignalCache, TokenBucket};

/// Raw lines payload; spread is quoted from the home side
#[derive(Debug, Clone, Deserialize)]
struct LinesResponse {
    total: f64,
    home_team: String,
    away_team: String,
    home_spread: f64,
}

pub struct OddsClient {
    core: ProviderCore,
    cache: SignalCache<LinesResponse>,
}

impl OddsClient {
    pub fn new(
        config: &ProviderConfig,
        cache_ttl: Duration,
        bucket: Arc<TokenBucket>,
        usage: Arc<UsageTracker>,
        metrics: Arc<CoreMetrics>,
    ) -> Result<Self> {
        Ok(Self {
            core: ProviderCore::new(ProviderKind::Odds, config, bucket, usage, metrics)?,
            cache: SignalCache::new(cache_ttl),
        })
    }

    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Lines for one game viewed from `team`'s side
    pub async fn fetch(&self, game_key: &str, team: &str) -> Result<VegasSignal> {
        let lines = match self.cache.get(game_key) {
            Some(hit) => {
                self.core.note_cache_hit();
                hit
            }
            None => {
                let raw: LinesResponse =
                    self.core.get_json(&format!("/v1/lines/{game_key}")).await?;
                let lines = self.sanitize(raw)?;
                self.cache.insert(game_key, lines.clone());
                lines
            }
        };
        self.view_for(&lines, team)
    }

    fn sanitize(&self, raw: LinesResponse) -> Result<LinesResponse> {
        if !raw.total.is_finite() || !raw.home_spread.is_finite() || raw.total <= 0.0 {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode("unusable game total or spread".to_string()),
            ));
        }
        Ok(raw)
    }

    fn view_for(&self, lines: &LinesResponse, team: &str) -> Result<VegasSignal> {
        let spread = if team.eq_ignore_ascii_case(&lines.home_team) {
            lines.home_spread
        } else if team.eq_ignore_ascii_case(&lines.away_team) {
            -lines.home_spread
        } else {
            return Err(SlatecastError::provider_unavailable(
                self.core.kind().as_str(),
                ProviderError::Decode(format!(
                    "team {team} is not part of {}-{}",
                    lines.away_team, lines.home_team
                )),
            ));
        };

        Ok(VegasSignal {
            game_total: lines.total,
            spread,
            implied_total: VegasSignal::implied_for(lines.total, spread),
        })
    }
}
