//! Per-provider usage accounting
//!
//! Ledger of request counts and cost keyed by (provider, UTC day). Recording
//! never fails outward: accounting must not abort the request it tracks, so
//! storage problems are logged and swallowed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::{ProvidersConfig, UsageConfig};
use crate::error::{Result, SlatecastError};
use crate::providers::ProviderKind;

/// Daily limit reported for providers with no configured quota
const FALLBACK_DAILY_LIMIT: u32 = 1000;

/// One day of usage for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub provider: ProviderKind,
    pub day: NaiveDate,
    pub request_count: u64,
    pub total_cost: f64,
    pub daily_limit: u32,
}

impl UsageRecord {
    fn empty(provider: ProviderKind, day: NaiveDate, daily_limit: u32) -> Self {
        Self {
            provider,
            day,
            request_count: 0,
            total_cost: 0.0,
            daily_limit,
        }
    }

    /// Fraction of the daily quota consumed
    pub fn quota_used(&self) -> f64 {
        if self.daily_limit == 0 {
            return 0.0;
        }
        self.request_count as f64 / self.daily_limit as f64
    }
}

/// Process-wide ledger of provider usage
pub struct UsageTracker {
    ledger: DashMap<(ProviderKind, NaiveDate), UsageRecord>,
    limits: HashMap<ProviderKind, u32>,
    retention_days: u32,
    snapshot_path: Option<PathBuf>,
    dirty: AtomicBool,
}

impl UsageTracker {
    pub fn new(usage: &UsageConfig, providers: &ProvidersConfig) -> Self {
        let mut limits = HashMap::new();
        limits.insert(ProviderKind::Weather, providers.weather.daily_limit);
        limits.insert(ProviderKind::Odds, providers.odds.daily_limit);
        limits.insert(ProviderKind::Stats, providers.stats.daily_limit);
        limits.insert(ProviderKind::Social, providers.social.daily_limit);
        limits.insert(ProviderKind::Ai, providers.ai.daily_limit);

        Self {
            ledger: DashMap::new(),
            limits,
            retention_days: usage.retention_days.max(1),
            snapshot_path: usage.snapshot_path.as_ref().map(PathBuf::from),
            dirty: AtomicBool::new(false),
        }
    }

    /// Account one provider call. Endpoint, status and latency go to the log;
    /// the ledger aggregates count and cost per day.
    pub fn record_request(
        &self,
        provider: ProviderKind,
        endpoint: &str,
        status_code: u16,
        latency_ms: u64,
        cost: f64,
    ) {
        let day = Utc::now().date_naive();
        let daily_limit = self.daily_limit(provider);

        let mut entry = self
            .ledger
            .entry((provider, day))
            .or_insert_with(|| UsageRecord::empty(provider, day, daily_limit));
        // Replace the record whole so a reader never sees a half-applied update
        let updated = UsageRecord {
            request_count: entry.request_count + 1,
            total_cost: entry.total_cost + cost.max(0.0),
            ..entry.clone()
        };
        *entry = updated;
        drop(entry);

        self.dirty.store(true, Ordering::Relaxed);
        debug!(
            provider = %provider,
            endpoint,
            status_code,
            latency_ms,
            cost,
            "recorded provider request"
        );
    }

    /// Today's snapshot, with a zeroed record for every provider that has not
    /// been called yet. Dashboards never have to handle absent entries.
    pub fn current_usage(&self) -> Vec<UsageRecord> {
        let day = Utc::now().date_naive();
        ProviderKind::ALL
            .iter()
            .map(|&provider| self.record_or_default(provider, day))
            .collect()
    }

    /// Day-ordered history for the last `days` days, zero-filled so plots
    /// render a continuous series. Capped at the retention window.
    pub fn usage_history(&self, days: u32) -> Vec<UsageRecord> {
        let today = Utc::now().date_naive();
        let days = days.clamp(1, self.retention_days) as u64;

        let mut out = Vec::with_capacity(days as usize * ProviderKind::ALL.len());
        for offset in (0..days).rev() {
            let Some(day) = today.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            for &provider in ProviderKind::ALL.iter() {
                out.push(self.record_or_default(provider, day));
            }
        }
        out
    }

    /// Drop records older than the retention window, returning how many went
    pub fn prune(&self) -> usize {
        let Some(cutoff) = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(self.retention_days as u64))
        else {
            return 0;
        };

        let before = self.ledger.len();
        self.ledger.retain(|key, _| key.1 > cutoff);
        // A concurrent record_request can grow the ledger between the two
        // len() reads, so the difference must not underflow
        let dropped = before.saturating_sub(self.ledger.len());
        if dropped > 0 {
            self.dirty.store(true, Ordering::Relaxed);
            debug!(dropped, "pruned expired usage records");
        }
        dropped
    }

    pub fn daily_limit(&self, provider: ProviderKind) -> u32 {
        self.limits
            .get(&provider)
            .copied()
            .unwrap_or(FALLBACK_DAILY_LIMIT)
    }

    fn record_or_default(&self, provider: ProviderKind, day: NaiveDate) -> UsageRecord {
        self.ledger
            .get(&(provider, day))
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| UsageRecord::empty(provider, day, self.daily_limit(provider)))
    }

    /// Reload the ledger from the snapshot file, if one exists
    pub async fn load_snapshot(&self) {
        let Some(path) = self.snapshot_path.as_ref() else {
            return;
        };
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(_) => return,
        };
        match serde_json::from_str::<Vec<UsageRecord>>(&raw) {
            Ok(records) => {
                let count = records.len();
                for record in records {
                    self.ledger.insert((record.provider, record.day), record);
                }
                info!(count, path = %path.display(), "restored usage ledger from snapshot");
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "usage snapshot unreadable, starting fresh");
            }
        }
    }

    /// Write the ledger to the snapshot file. Best-effort: callers log the
    /// failure and move on.
    pub async fn flush_snapshot(&self) -> Result<()> {
        let Some(path) = self.snapshot_path.as_ref() else {
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::Relaxed) {
            return Ok(());
        }

        let mut records: Vec<UsageRecord> = self
            .ledger
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| (a.day, a.provider.as_str()).cmp(&(b.day, b.provider.as_str())));

        let payload = serde_json::to_vec_pretty(&records)
            .map_err(|e| SlatecastError::TrackingWriteFailure(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SlatecastError::TrackingWriteFailure(e.to_string()))?;
        }
        tokio::fs::write(path, payload)
            .await
            .map_err(|e| SlatecastError::TrackingWriteFailure(e.to_string()))
    }

    /// Spawn the periodic prune + snapshot task
    pub fn spawn_persistence(self: Arc<Self>, flush_secs: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(flush_secs.max(1)));

            loop {
                ticker.tick().await;
                self.prune();
                if let Err(e) = self.flush_snapshot().await {
                    warn!(error = %e, "usage snapshot flush failed");
                }
            }
        })
    }
}
