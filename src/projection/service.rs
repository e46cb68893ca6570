//! Signal collection and batch enhancement
//!
//! Fans out to every provider concurrently under one per-fetch deadline,
//! builds a `SignalSet` from whatever resolved, and runs the aggregator.
//! Players in a batch are fully independent: one player's dead providers
//! degrade that player's confidence, never the batch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::alerts::AlertEngine;
use crate::config::AppConfig;
use crate::domain::{Player, ProjectionResult, SignalSet};
use crate::error::Result;
use crate::projection::ProjectionAggregator;
use crate::providers::SignalSource;
use crate::services::metrics::CoreMetrics;

pub struct ProjectionService {
    source: Arc<dyn SignalSource>,
    aggregator: ProjectionAggregator,
    alerts: Arc<AlertEngine>,
    metrics: Arc<CoreMetrics>,
    fetch_timeout: Duration,
}

impl ProjectionService {
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn SignalSource>,
        alerts: Arc<AlertEngine>,
        metrics: Arc<CoreMetrics>,
    ) -> Self {
        Self {
            source,
            aggregator: ProjectionAggregator::new(config.projection.clone()),
            alerts,
            metrics,
            fetch_timeout: Duration::from_millis(config.signals.fetch_timeout_ms),
        }
    }

    /// Resolve every signal for one player concurrently. Each fetch gets the
    /// same deadline; whatever misses it stays `None`.
    pub async fn collect_signals(&self, player: &Player) -> SignalSet {
        let game_key = player.game_key();
        let (weather, vegas, social, stats, insight) = tokio::join!(
            self.bounded("weather", self.source.weather(&game_key)),
            self.bounded("odds", self.source.vegas(&game_key, &player.team)),
            self.bounded("social", self.source.social(&player.id)),
            self.bounded("stats", self.source.stats(&player.id)),
            self.bounded("ai", self.source.insight(&player.id)),
        );

        SignalSet {
            weather,
            vegas,
            social,
            stats,
            insight,
        }
    }

    /// Enhance one player. Total: degraded signals reduce confidence but a
    /// result always comes back.
    pub async fn enhance_player(&self, player: &Player) -> ProjectionResult {
        let signals = self.collect_signals(player).await;
        if signals.is_empty() {
            debug!(
                "no signals resolved for {}; projection falls back to base",
                player.id
            );
        }

        let result = self.aggregator.project(player, &signals);
        self.alerts
            .observe_projection(&player.id, result.modified_projection);
        self.metrics.inc_projections(1);
        result
    }

    /// Enhance a batch. One result per input player, same order.
    pub async fn enhance_slate(&self, players: &[Player]) -> Vec<ProjectionResult> {
        let results = join_all(players.iter().map(|p| self.enhance_player(p))).await;
        self.metrics.inc_batches().await;
        results
    }

    async fn bounded<T>(&self, label: &str, fetch: impl Future<Output = Result<T>>) -> Option<T> {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(signal)) => Some(signal),
            Ok(Err(e)) => {
                debug!("{} signal unavailable: {}", label, e);
                None
            }
            Err(_) => {
                warn!(
                    "{} signal fetch missed the {}ms deadline",
                    label,
                    self.fetch_timeout.as_millis()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::{Position, SocialSignal, StatsSignal, VegasSignal, WeatherSignal};
    use crate::error::{ProviderError, SlatecastError};
    use crate::providers::MockSignalSource;

    fn test_config() -> AppConfig {
        AppConfig::default_config()
    }

    fn service(source: Arc<dyn SignalSource>) -> (ProjectionService, Arc<AlertEngine>) {
        let config = test_config();
        let metrics = Arc::new(CoreMetrics::new());
        let alerts = Arc::new(AlertEngine::new(&config.alerts, Arc::clone(&metrics)));
        (
            ProjectionService::new(&config, source, Arc::clone(&alerts), metrics),
            alerts,
        )
    }

    fn player(id: &str, base: f64) -> Player {
        Player {
            id: id.to_string(),
            name: "Test Player".to_string(),
            position: Position::Qb,
            team: "BUF".to_string(),
            opponent: "MIA".to_string(),
            salary: 8000,
            base_projection: base,
        }
    }

    fn unavailable(provider: &str) -> SlatecastError {
        SlatecastError::provider_unavailable(provider, ProviderError::NotConfigured)
    }

    fn dead_source() -> MockSignalSource {
        let mut mock = MockSignalSource::new();
        mock.expect_weather()
            .returning(|_| Err(unavailable("weather")));
        mock.expect_vegas()
            .returning(|_, _| Err(unavailable("odds")));
        mock.expect_social()
            .returning(|_| Err(unavailable("social")));
        mock.expect_stats().returning(|_| Err(unavailable("stats")));
        mock.expect_insight().returning(|_| Err(unavailable("ai")));
        mock
    }

    #[tokio::test]
    async fn test_dead_providers_degrade_to_base() {
        let (service, _alerts) = service(Arc::new(dead_source()));
        let result = service.enhance_player(&player("p1", 18.5)).await;

        assert_eq!(result.modified_projection, 18.5);
        assert!(result.confidence <= 0.5);
    }

    #[tokio::test]
    async fn test_partial_signals_still_enhance() {
        let mut mock = MockSignalSource::new();
        mock.expect_weather()
            .returning(|_| Err(unavailable("weather")));
        mock.expect_vegas().returning(|_, _| {
            Ok(VegasSignal {
                game_total: 54.0,
                spread: -1.8,
                implied_total: 26.1,
            })
        });
        mock.expect_social()
            .returning(|_| Err(unavailable("social")));
        mock.expect_stats().returning(|_| Err(unavailable("stats")));
        mock.expect_insight().returning(|_| Err(unavailable("ai")));

        let (service, _alerts) = service(Arc::new(mock));
        let result = service.enhance_player(&player("p1", 20.0)).await;

        assert!((result.modifiers.vegas - 0.08).abs() < 1e-9);
        assert!((result.modified_projection - 21.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_length() {
        let (service, _alerts) = service(Arc::new(dead_source()));
        let players = vec![player("p1", 10.0), player("p2", 20.0), player("p3", 5.5)];

        let results = service.enhance_slate(&players).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].player_id, "p1");
        assert_eq!(results[1].player_id, "p2");
        assert_eq!(results[2].player_id, "p3");
        assert_eq!(results[2].modified_projection, 5.5);
    }

    #[tokio::test]
    async fn test_recomputed_projection_feeds_alerts() {
        let mut mock = MockSignalSource::new();
        mock.expect_weather()
            .returning(|_| Err(unavailable("weather")));
        mock.expect_social()
            .returning(|_| Err(unavailable("social")));
        mock.expect_stats().returning(|_| Err(unavailable("stats")));
        mock.expect_insight().returning(|_| Err(unavailable("ai")));
        // First pass sees no line, second pass a shootout total
        mock.expect_vegas()
            .times(1)
            .returning(|_, _| Err(unavailable("odds")));
        mock.expect_vegas().times(1).returning(|_, _| {
            Ok(VegasSignal {
                game_total: 54.0,
                spread: -1.8,
                implied_total: 26.1,
            })
        });

        let (service, alerts) = service(Arc::new(mock));
        let mut rx = alerts.subscribe();
        let subject = player("p1", 20.0);

        service.enhance_player(&subject).await;
        service.enhance_player(&subject).await;

        let note = rx.recv().await.unwrap();
        assert_eq!(note.subject_id, "p1");
        assert_eq!(note.payload.old_value, 20.0);
        assert!((note.payload.new_value - 21.6).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_misses_the_deadline() {
        use async_trait::async_trait;

        struct SlowSource;

        #[async_trait]
        impl SignalSource for SlowSource {
            async fn weather(&self, _game_key: &str) -> Result<WeatherSignal> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(WeatherSignal {
                    temperature_f: 60.0,
                    wind_mph: 0.0,
                    precipitation_in: 0.0,
                    indoor: false,
                })
            }
            async fn vegas(&self, _game_key: &str, _team: &str) -> Result<VegasSignal> {
                Err(unavailable("odds"))
            }
            async fn social(&self, _player_id: &str) -> Result<SocialSignal> {
                Err(unavailable("social"))
            }
            async fn stats(&self, _player_id: &str) -> Result<StatsSignal> {
                Err(unavailable("stats"))
            }
            async fn insight(&self, _player_id: &str) -> Result<crate::domain::InsightSignal> {
                Err(unavailable("ai"))
            }
        }

        let (service, _alerts) = service(Arc::new(SlowSource));
        let signals = service.collect_signals(&player("p1", 12.0)).await;

        assert!(signals.weather.is_none());
        assert!(signals.is_empty());
    }
}
