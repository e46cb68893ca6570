use slatecast::alerts::{AlertEngine, AlertKind, AlertSeverity};
use slatecast::config::AlertsConfig;
use slatecast::domain::{SocialSignal, WeatherSignal};
use slatecast::services::CoreMetrics;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

fn engine_with_metrics() -> (AlertEngine, Arc<CoreMetrics>) {
    let metrics = Arc::new(CoreMetrics::new());
    let engine = AlertEngine::new(&AlertsConfig::default(), Arc::clone(&metrics));
    (engine, metrics)
}

fn social(sentiment: f64) -> SocialSignal {
    SocialSignal {
        sentiment,
        confidence: 0.8,
        mention_count: 120,
        beat_writer_sentiment: sentiment,
        trending_score: 2.0,
    }
}

fn outdoor(wind_mph: f64, precipitation_in: f64) -> WeatherSignal {
    WeatherSignal {
        temperature_f: 55.0,
        wind_mph,
        precipitation_in,
        indoor: false,
    }
}

#[tokio::test]
async fn every_subscriber_gets_its_own_copy() {
    let (engine, _metrics) = engine_with_metrics();
    let mut first = engine.subscribe();
    let mut second = engine.subscribe();
    assert_eq!(engine.subscriber_count(), 2);

    engine.observe_projection("qb-allen", 20.0);
    let emitted = engine
        .observe_projection("qb-allen", 20.8)
        .expect("a 4% move should alert");

    let a = first.recv().await.expect("first subscriber");
    let b = second.recv().await.expect("second subscriber");
    assert_eq!(a.id, emitted.id);
    assert_eq!(b.id, emitted.id);
    assert_eq!(a.severity, AlertSeverity::Warning);
    assert!((a.payload.percentage_change - 0.04).abs() < 1e-9);
}

#[tokio::test]
async fn critical_escalation_is_visible_to_subscribers() {
    let (engine, _metrics) = engine_with_metrics();
    let mut rx = engine.subscribe();

    engine.observe_projection("qb-allen", 20.0);
    engine.observe_projection("qb-allen", 22.4);

    let note = rx.recv().await.expect("subscriber should see the alert");
    assert_eq!(note.severity, AlertSeverity::Critical);
    assert_eq!(note.payload.old_value, 20.0);
    assert!(note.message.contains("+12.0%"), "got: {}", note.message);
}

#[tokio::test]
async fn all_kinds_flow_through_one_bus() {
    let (engine, _metrics) = engine_with_metrics();
    let mut rx = engine.subscribe();

    // Seed every stream; first observations never alert
    engine.observe_projection("qb-allen", 20.0);
    engine.observe_social("qb-allen", &social(0.0));
    engine.observe_weather("BUF-MIA", &outdoor(5.0, 0.0));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    engine.observe_projection("qb-allen", 20.8);
    engine.observe_social("qb-allen", &social(0.5));
    engine.observe_weather("BUF-MIA", &outdoor(20.0, 0.2));

    assert_eq!(
        rx.recv().await.unwrap().kind,
        AlertKind::ProjectionChange
    );
    assert_eq!(rx.recv().await.unwrap().kind, AlertKind::SocialUpdate);

    let weather_note = rx.recv().await.unwrap();
    assert_eq!(weather_note.kind, AlertKind::WeatherUpdate);
    assert_eq!(weather_note.subject_id, "BUF-MIA");
}

#[tokio::test(start_paused = true)]
async fn suppression_gates_duplicates_and_counts_them() {
    let (engine, metrics) = engine_with_metrics();
    let mut rx = engine.subscribe();

    engine.observe_projection("qb-allen", 20.0);
    engine.observe_projection("qb-allen", 20.8);
    assert!(rx.recv().await.is_ok());

    // Another +4% lands in the same change bucket inside the window
    assert!(engine.observe_projection("qb-allen", 21.632).is_none());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    tokio::time::advance(Duration::from_secs(301)).await;

    // Window expired; the suppressed value is still the stored baseline
    let reopened = engine
        .observe_projection("qb-allen", 22.49728)
        .expect("expired window should re-arm the bucket");
    assert_eq!(reopened.payload.old_value, 21.632);

    assert_eq!(metrics.alerts_emitted.load(Ordering::Relaxed), 2);
    assert_eq!(metrics.alerts_suppressed.load(Ordering::Relaxed), 1);
}
