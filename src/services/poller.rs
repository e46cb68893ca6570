//! Background signal watcher
//!
//! Re-polls weather per tracked game and sentiment per tracked player on
//! their own cadences and feeds every reading to the alert engine, so alerts
//! fire between enhancement requests and not only when a client asks.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::alerts::AlertEngine;
use crate::config::WatcherConfig;
use crate::domain::SlateStore;
use crate::error::Result;
use crate::providers::SignalSource;

pub struct SignalWatcher {
    source: Arc<dyn SignalSource>,
    slate: Arc<SlateStore>,
    alerts: Arc<AlertEngine>,
    config: WatcherConfig,
}

impl SignalWatcher {
    pub fn new(
        config: &WatcherConfig,
        source: Arc<dyn SignalSource>,
        slate: Arc<SlateStore>,
        alerts: Arc<AlertEngine>,
    ) -> Self {
        Self {
            source,
            slate,
            alerts,
            config: config.clone(),
        }
    }

    /// Run both poll loops until the owning task is cancelled. The loops are
    /// plain futures, not spawned tasks, so aborting the caller stops them.
    pub async fn start(&self) -> Result<()> {
        info!(
            "starting signal watcher (weather every {}s, social every {}s)",
            self.config.weather_interval_secs, self.config.social_interval_secs
        );

        tokio::join!(self.weather_watch(), self.social_watch());
        Ok(())
    }

    async fn weather_watch(&self) {
        let period = Duration::from_secs(self.config.weather_interval_secs.max(1));
        let mut tick = interval(period);

        loop {
            tick.tick().await;

            let games = self.slate.game_keys();
            if games.is_empty() {
                debug!("no slate loaded; weather watch idle");
                continue;
            }

            for game_key in games {
                match self.source.weather(&game_key).await {
                    Ok(signal) => {
                        self.alerts.observe_weather(&game_key, &signal);
                    }
                    Err(e) => {
                        warn!("weather poll failed for {}: {}", game_key, e);
                    }
                }
            }
        }
    }

    async fn social_watch(&self) {
        let period = Duration::from_secs(self.config.social_interval_secs.max(1));
        let mut tick = interval(period);

        loop {
            tick.tick().await;

            for player in self.slate.players() {
                match self.source.social(&player.id).await {
                    Ok(signal) => {
                        self.alerts.observe_social(&player.id, &signal);
                    }
                    Err(e) => {
                        warn!("social poll failed for {}: {}", player.id, e);
                    }
                }
            }
        }
    }
}
