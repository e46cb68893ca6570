//! Token bucket rate limiting for outbound provider calls
//!
//! One bucket per provider, shared process-wide. Refill is computed lazily
//! from elapsed time on each acquire; no background timer runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::config::ProvidersConfig;
use crate::error::{Result, SlatecastError};

use super::ProviderKind;

/// Token bucket settings for one provider channel
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Bucket capacity; also the burst ceiling
    pub max_tokens: u32,
    /// How often a refill tick lands
    pub refill_interval: Duration,
    /// Tokens credited per tick, capped at `max_tokens`
    pub refill_amount: u32,
}

impl RateLimitConfig {
    /// Requests-per-minute quota: full bucket refresh every minute
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            max_tokens: requests_per_minute,
            refill_interval: Duration::from_secs(60),
            refill_amount: requests_per_minute,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(30)
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

/// Token bucket guarding one outbound provider channel.
///
/// An exhausted bucket parks the caller until the next refill tick and then
/// retries exactly once; there is no busy-polling and no fairness guarantee.
/// A caller that loses the post-tick race gets `RateLimitExhausted`, which
/// the provider wrappers degrade instead of surfacing.
#[derive(Debug)]
pub struct TokenBucket {
    provider: String,
    config: RateLimitConfig,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(provider: impl Into<String>, config: RateLimitConfig) -> Self {
        let state = BucketState {
            tokens: config.max_tokens,
            last_refill: Instant::now(),
        };
        Self {
            provider: provider.into(),
            config,
            state: Mutex::new(state),
        }
    }

    /// Take one token, waiting for the next refill tick when empty
    pub async fn acquire(&self) -> Result<()> {
        match self.take_or_wait_hint().await {
            Ok(()) => Ok(()),
            Err(wait) => {
                tokio::time::sleep(wait).await;
                self.take_or_wait_hint().await.map_err(|_| {
                    warn!(
                        provider = %self.provider,
                        "token bucket still empty after refill tick"
                    );
                    SlatecastError::RateLimitExhausted {
                        provider: self.provider.clone(),
                    }
                })
            }
        }
    }

    /// Take a token without waiting
    pub async fn try_acquire(&self) -> bool {
        self.take_or_wait_hint().await.is_ok()
    }

    /// Tokens currently available, after applying any pending lazy refill
    pub async fn available(&self) -> u32 {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens
    }

    /// Decrement-then-check under the state lock; on an empty bucket return
    /// how long until the next refill tick lands.
    async fn take_or_wait_hint(&self) -> std::result::Result<(), Duration> {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        if state.tokens > 0 {
            state.tokens -= 1;
            return Ok(());
        }
        let elapsed = state.last_refill.elapsed();
        let wait = self.config.refill_interval.saturating_sub(elapsed);
        // A zero-length hint still yields to the scheduler before the retry
        Err(wait.max(Duration::from_millis(1)))
    }

    /// Credit whole elapsed intervals, preserving the remainder so ticks do
    /// not drift. The bucket never refills past `max_tokens`.
    fn refill(&self, state: &mut BucketState) {
        let interval = self.config.refill_interval;
        if interval.is_zero() || self.config.refill_amount == 0 {
            return;
        }
        let elapsed = state.last_refill.elapsed();
        if elapsed < interval {
            return;
        }

        let intervals = (elapsed.as_nanos() / interval.as_nanos()) as u64;
        let credit = intervals.saturating_mul(self.config.refill_amount as u64);
        let refreshed = (state.tokens as u64).saturating_add(credit);

        if refreshed >= self.config.max_tokens as u64 {
            // Full bucket: the fractional remainder cannot matter anymore
            state.tokens = self.config.max_tokens;
            state.last_refill = Instant::now();
        } else {
            state.tokens = refreshed as u32;
            state.last_refill += interval.saturating_mul(intervals as u32);
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

/// Per-provider token buckets built from configuration
#[derive(Debug, Clone)]
pub struct RateLimits {
    buckets: HashMap<ProviderKind, Arc<TokenBucket>>,
}

impl RateLimits {
    pub fn from_config(providers: &ProvidersConfig) -> Self {
        let mut buckets = HashMap::new();
        for (kind, provider) in [
            (ProviderKind::Weather, &providers.weather),
            (ProviderKind::Odds, &providers.odds),
            (ProviderKind::Stats, &providers.stats),
            (ProviderKind::Social, &providers.social),
            (ProviderKind::Ai, &providers.ai),
        ] {
            let config = RateLimitConfig::per_minute(provider.requests_per_minute);
            buckets.insert(kind, Arc::new(TokenBucket::new(kind.as_str(), config)));
        }
        Self { buckets }
    }

    pub fn bucket(&self, kind: ProviderKind) -> Arc<TokenBucket> {
        self.buckets
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| {
                Arc::new(TokenBucket::new(kind.as_str(), RateLimitConfig::default()))
            })
    }
}
