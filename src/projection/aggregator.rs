//! Modifier math for the projection pipeline
//!
//! Pure and total: every input combination produces a result. Each modifier
//! is bounded on its own, the combined projection is floored at zero, and a
//! missing signal contributes a neutral modifier with reduced confidence so
//! an unknown factor can never inflate the output.

use crate::config::ProjectionConfig;
use crate::domain::{
    Player, Position, ProjectionModifiers, ProjectionResult, SignalSet, SocialSignal,
    VegasSignal, WeatherSignal,
};

/// Confidence assigned to a resolved weather reading
const WEATHER_CONFIDENCE: f64 = 0.9;
/// Confidence assigned to a resolved betting line
const VEGAS_CONFIDENCE: f64 = 0.85;
/// Confidence stand-in for any missing signal
const MISSING_CONFIDENCE: f64 = 0.5;

const WEATHER_MODIFIER_MIN: f64 = -0.15;
const WEATHER_MODIFIER_MAX: f64 = 0.05;
const VEGAS_MODIFIER_BOUND: f64 = 0.20;
const SOCIAL_MODIFIER_BOUND: f64 = 0.10;

pub struct ProjectionAggregator {
    config: ProjectionConfig,
}

impl ProjectionAggregator {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Full enhancement for one player from whatever signals resolved
    pub fn project(&self, player: &Player, signals: &SignalSet) -> ProjectionResult {
        let modifiers = self.modifiers(player, signals);
        let confidence = self.confidence(signals);
        let volatility = self.volatility(confidence);
        let insight = signals.insight.as_ref().map(|i| i.headline.clone());

        ProjectionResult::compute(
            player.id.clone(),
            player.base_projection,
            modifiers,
            confidence,
            volatility,
            insight,
        )
    }

    pub fn modifiers(&self, player: &Player, signals: &SignalSet) -> ProjectionModifiers {
        ProjectionModifiers {
            weather: signals
                .weather
                .map(|w| self.weather_modifier(player.position, &w))
                .unwrap_or(0.0),
            vegas: signals
                .vegas
                .map(|v| self.vegas_modifier(&v))
                .unwrap_or(0.0),
            social: signals
                .social
                .as_ref()
                .map(|s| self.social_modifier(s))
                .unwrap_or(0.0),
            historical: signals.stats.map(|s| s.historical).unwrap_or(0.0),
            game_script: signals.stats.map(|s| s.game_script).unwrap_or(0.0),
            defense: signals.stats.map(|s| s.defense).unwrap_or(0.0),
        }
    }

    /// Bad weather only drags down the passing game. A ground-heavy back
    /// picks up a small bump when conditions push teams toward the run.
    /// Indoor games are always neutral.
    pub fn weather_modifier(&self, position: Position, weather: &WeatherSignal) -> f64 {
        if weather.indoor {
            return 0.0;
        }

        if position.is_passing_heavy() {
            let mut modifier = 0.0_f64;
            if weather.wind_mph >= 20.0 {
                modifier -= 0.10;
            } else if weather.wind_mph >= 15.0 {
                modifier -= 0.06;
            }
            if weather.precipitation_in >= 0.5 {
                modifier -= 0.05;
            }
            if weather.temperature_f < 20.0 {
                modifier -= 0.02;
            }
            return modifier.clamp(WEATHER_MODIFIER_MIN, 0.0);
        }

        if position.is_ground_game() && weather.is_disruptive() {
            return 0.03_f64.min(WEATHER_MODIFIER_MAX);
        }

        0.0
    }

    /// Scales with how far the implied team total sits from the league
    /// average, damped by the configured sensitivity.
    pub fn vegas_modifier(&self, vegas: &VegasSignal) -> f64 {
        let baseline = self.config.league_avg_total;
        if !(baseline > 0.0) || !vegas.implied_total.is_finite() {
            return 0.0;
        }
        let swing = (vegas.implied_total - baseline) / baseline;
        (swing * self.config.vegas_sensitivity).clamp(-VEGAS_MODIFIER_BOUND, VEGAS_MODIFIER_BOUND)
    }

    pub fn social_modifier(&self, social: &SocialSignal) -> f64 {
        (social.sentiment * social.confidence).clamp(-SOCIAL_MODIFIER_BOUND, SOCIAL_MODIFIER_BOUND)
    }

    /// Product of the four modifier-bearing component confidences. The
    /// commentary signal annotates but never moves a projection, so it does
    /// not participate here.
    pub fn confidence(&self, signals: &SignalSet) -> f64 {
        let weather = if signals.weather.is_some() {
            WEATHER_CONFIDENCE
        } else {
            MISSING_CONFIDENCE
        };
        let vegas = if signals.vegas.is_some() {
            VEGAS_CONFIDENCE
        } else {
            MISSING_CONFIDENCE
        };
        let social = signals
            .social
            .as_ref()
            .map(|s| s.confidence.clamp(0.0, 1.0))
            .unwrap_or(MISSING_CONFIDENCE);
        let stats = signals
            .stats
            .map(|s| s.confidence.clamp(0.0, 1.0))
            .unwrap_or(MISSING_CONFIDENCE);

        (weather * vegas * social * stats).clamp(0.0, 1.0)
    }

    /// Lower confidence widens the projection band
    pub fn volatility(&self, confidence: f64) -> f64 {
        let confidence = confidence.clamp(0.0, 1.0);
        (self.config.base_volatility + self.config.volatility_spread * (1.0 - confidence))
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatsSignal;

    fn aggregator() -> ProjectionAggregator {
        ProjectionAggregator::new(ProjectionConfig::default())
    }

    fn player(position: Position, base: f64) -> Player {
        Player {
            id: "p-001".to_string(),
            name: "Test Player".to_string(),
            position,
            team: "BUF".to_string(),
            opponent: "MIA".to_string(),
            salary: 7000,
            base_projection: base,
        }
    }

    fn outdoor(temperature_f: f64, wind_mph: f64, precipitation_in: f64) -> WeatherSignal {
        WeatherSignal {
            temperature_f,
            wind_mph,
            precipitation_in,
            indoor: false,
        }
    }

    #[test]
    fn test_indoor_weather_is_always_neutral() {
        let agg = aggregator();
        let dome = WeatherSignal {
            temperature_f: 10.0,
            wind_mph: 40.0,
            precipitation_in: 2.0,
            indoor: true,
        };
        for position in [Position::Qb, Position::Rb, Position::Wr, Position::Te] {
            assert_eq!(agg.weather_modifier(position, &dome), 0.0);
        }
    }

    #[test]
    fn test_wind_suppresses_only_the_passing_game() {
        let agg = aggregator();
        let gusty = outdoor(55.0, 22.0, 0.0);

        assert!(agg.weather_modifier(Position::Qb, &gusty) < 0.0);
        assert!(agg.weather_modifier(Position::Wr, &gusty) < 0.0);
        assert!(agg.weather_modifier(Position::Rb, &gusty) > 0.0);
        assert_eq!(agg.weather_modifier(Position::K, &gusty), 0.0);
        assert_eq!(agg.weather_modifier(Position::Dst, &gusty), 0.0);
    }

    #[test]
    fn test_weather_modifier_stays_bounded() {
        let agg = aggregator();
        // High wind + heavy rain + deep cold stacks past the bound raw
        let blizzard = outdoor(5.0, 35.0, 1.5);
        let modifier = agg.weather_modifier(Position::Qb, &blizzard);
        assert!((modifier - WEATHER_MODIFIER_MIN).abs() < 1e-9);

        let rb_bump = agg.weather_modifier(Position::Rb, &blizzard);
        assert!(rb_bump > 0.0 && rb_bump <= WEATHER_MODIFIER_MAX);
    }

    #[test]
    fn test_vegas_modifier_tracks_the_baseline() {
        let agg = aggregator();
        let league_average = VegasSignal {
            game_total: 45.0,
            spread: 0.0,
            implied_total: 22.5,
        };
        assert_eq!(agg.vegas_modifier(&league_average), 0.0);

        let shootout = VegasSignal {
            game_total: 54.0,
            spread: -1.8,
            implied_total: 26.1,
        };
        assert!((agg.vegas_modifier(&shootout) - 0.08).abs() < 1e-9);

        let slugfest = VegasSignal {
            game_total: 33.0,
            spread: 3.0,
            implied_total: 15.0,
        };
        assert!(agg.vegas_modifier(&slugfest) < 0.0);
    }

    #[test]
    fn test_vegas_modifier_clamps_extreme_totals() {
        let agg = aggregator();
        let absurd = VegasSignal {
            game_total: 120.0,
            spread: 0.0,
            implied_total: 60.0,
        };
        assert_eq!(agg.vegas_modifier(&absurd), 0.20);
    }

    #[test]
    fn test_social_modifier_weights_by_confidence() {
        let agg = aggregator();
        let hyped = SocialSignal {
            sentiment: 0.04,
            confidence: 0.5,
            mention_count: 200,
            beat_writer_sentiment: 0.1,
            trending_score: 2.0,
        };
        assert!((agg.social_modifier(&hyped) - 0.02).abs() < 1e-9);

        let meltdown = SocialSignal {
            sentiment: -1.0,
            confidence: 1.0,
            mention_count: 5000,
            beat_writer_sentiment: -1.0,
            trending_score: 9.0,
        };
        assert_eq!(agg.social_modifier(&meltdown), -0.10);
    }

    #[test]
    fn test_missing_signals_leave_base_untouched() {
        let agg = aggregator();
        let result = agg.project(&player(Position::Wr, 14.2), &SignalSet::default());

        assert_eq!(result.modified_projection, result.base_projection);
        assert!(result.confidence <= 0.5);
        assert!(result.floor <= result.modified_projection);
        assert!(result.modified_projection <= result.ceiling);
    }

    #[test]
    fn test_scenario_full_enhancement() {
        // base 24.5 with weather -0.05, vegas +0.08, social +0.02 => 25.725
        let agg = aggregator();
        let signals = SignalSet {
            weather: Some(outdoor(60.0, 5.0, 0.5)),
            vegas: Some(VegasSignal {
                game_total: 54.0,
                spread: -1.8,
                implied_total: 26.1,
            }),
            social: Some(SocialSignal {
                sentiment: 0.04,
                confidence: 0.5,
                mention_count: 120,
                beat_writer_sentiment: 0.0,
                trending_score: 1.0,
            }),
            stats: None,
            insight: None,
        };

        let result = agg.project(&player(Position::Qb, 24.5), &signals);

        assert!((result.modifiers.weather + 0.05).abs() < 1e-9);
        assert!((result.modifiers.vegas - 0.08).abs() < 1e-9);
        assert!((result.modifiers.social - 0.02).abs() < 1e-9);
        assert!((result.modified_projection - 25.725).abs() < 1e-9);
    }

    #[test]
    fn test_stats_factors_pass_through_unchanged() {
        let agg = aggregator();
        let signals = SignalSet {
            stats: Some(StatsSignal {
                historical: 0.04,
                game_script: -0.02,
                defense: 0.01,
                confidence: 0.7,
            }),
            ..Default::default()
        };
        let modifiers = agg.modifiers(&player(Position::Rb, 15.0), &signals);

        assert_eq!(modifiers.historical, 0.04);
        assert_eq!(modifiers.game_script, -0.02);
        assert_eq!(modifiers.defense, 0.01);
    }

    #[test]
    fn test_confidence_shrinks_with_each_missing_signal() {
        let agg = aggregator();
        let full = SignalSet {
            weather: Some(outdoor(60.0, 5.0, 0.0)),
            vegas: Some(VegasSignal {
                game_total: 45.0,
                spread: 0.0,
                implied_total: 22.5,
            }),
            social: Some(SocialSignal {
                sentiment: 0.1,
                confidence: 0.9,
                mention_count: 10,
                beat_writer_sentiment: 0.0,
                trending_score: 0.0,
            }),
            stats: Some(StatsSignal {
                historical: 0.0,
                game_script: 0.0,
                defense: 0.0,
                confidence: 0.8,
            }),
            insight: None,
        };
        let mut degraded = full.clone();
        degraded.vegas = None;

        assert!(agg.confidence(&degraded) < agg.confidence(&full));
        assert_eq!(agg.confidence(&SignalSet::default()), 0.0625);
    }

    #[test]
    fn test_volatility_widens_as_confidence_drops() {
        let agg = aggregator();
        assert!(agg.volatility(0.2) > agg.volatility(0.9));
        assert!((agg.volatility(1.0) - 0.10).abs() < 1e-9);
        assert!(agg.volatility(0.0) <= 1.0);
    }

    #[test]
    fn test_insight_annotates_without_moving_the_number() {
        let agg = aggregator();
        let signals = SignalSet {
            insight: Some(crate::domain::InsightSignal {
                headline: "Expanded red zone role".to_string(),
                outlook: 0.9,
                confidence: 0.9,
            }),
            ..Default::default()
        };

        let result = agg.project(&player(Position::Te, 11.0), &signals);
        assert_eq!(result.modified_projection, result.base_projection);
        assert_eq!(result.insight.as_deref(), Some("Expanded red zone role"));
    }
}
