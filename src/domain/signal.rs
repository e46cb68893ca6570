use serde::{Deserialize, Serialize};

/// Game-site weather conditions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherSignal {
    pub temperature_f: f64,
    pub wind_mph: f64,
    pub precipitation_in: f64,
    pub indoor: bool,
}

impl WeatherSignal {
    /// Composite severity score driving weather alerts. Indoor games score 0.
    pub fn severity(&self) -> f64 {
        if self.indoor {
            return 0.0;
        }
        let mut score = self.wind_mph / 10.0 + self.precipitation_in * 2.0;
        if self.temperature_f < 20.0 {
            score += 1.0;
        }
        score
    }

    /// Conditions harsh enough to shift how a game is played
    pub fn is_disruptive(&self) -> bool {
        !self.indoor && (self.wind_mph >= 15.0 || self.precipitation_in >= 0.3)
    }
}

/// Betting market view of one game from a single team's perspective
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VegasSignal {
    pub game_total: f64,
    pub spread: f64,
    pub implied_total: f64,
}

impl VegasSignal {
    /// Implied points for a side given the game total and its spread.
    /// Spread is negative for the favorite.
    pub fn implied_for(game_total: f64, spread: f64) -> f64 {
        (game_total - spread) / 2.0
    }
}

/// Aggregated social sentiment for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialSignal {
    /// Net sentiment in [-1, 1]
    pub sentiment: f64,
    /// Sample confidence in [0, 1]
    pub confidence: f64,
    pub mention_count: u32,
    pub beat_writer_sentiment: f64,
    pub trending_score: f64,
}

/// Situational factors from play-by-play modeling, already bounded upstream
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsSignal {
    pub historical: f64,
    pub game_script: f64,
    pub defense: f64,
    pub confidence: f64,
}

/// Narrative read from the commentary model; annotation only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSignal {
    pub headline: String,
    /// Directional lean in [-1, 1]
    pub outlook: f64,
    pub confidence: f64,
}

/// Everything resolved for one player, with explicit absence per slot.
/// A provider that failed or timed out leaves its slot `None`; downstream
/// code must treat that as "unknown", never as zero weather or zero odds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub weather: Option<WeatherSignal>,
    pub vegas: Option<VegasSignal>,
    pub social: Option<SocialSignal>,
    pub stats: Option<StatsSignal>,
    pub insight: Option<InsightSignal>,
}

impl SignalSet {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none()
            && self.vegas.is_none()
            && self.social.is_none()
            && self.stats.is_none()
            && self.insight.is_none()
    }

    /// Number of resolved slots
    pub fn resolved_count(&self) -> usize {
        usize::from(self.weather.is_some())
            + usize::from(self.vegas.is_some())
            + usize::from(self.social.is_some())
            + usize::from(self.stats.is_some())
            + usize::from(self.insight.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indoor_severity_is_zero() {
        let weather = WeatherSignal {
            temperature_f: 70.0,
            wind_mph: 40.0,
            precipitation_in: 2.0,
            indoor: true,
        };
        assert_eq!(weather.severity(), 0.0);
        assert!(!weather.is_disruptive());
    }

    #[test]
    fn test_severity_scales_with_wind_and_rain() {
        let calm = WeatherSignal {
            temperature_f: 65.0,
            wind_mph: 5.0,
            precipitation_in: 0.0,
            indoor: false,
        };
        let storm = WeatherSignal {
            temperature_f: 65.0,
            wind_mph: 25.0,
            precipitation_in: 0.8,
            indoor: false,
        };
        assert!(storm.severity() > calm.severity());
    }

    #[test]
    fn test_deep_cold_adds_severity() {
        let cold = WeatherSignal {
            temperature_f: 10.0,
            wind_mph: 10.0,
            precipitation_in: 0.0,
            indoor: false,
        };
        let mild = WeatherSignal {
            temperature_f: 55.0,
            wind_mph: 10.0,
            precipitation_in: 0.0,
            indoor: false,
        };
        assert!((cold.severity() - mild.severity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_implied_total_favors_the_favorite() {
        // Total 47, favorite at -6.5: 26.75 vs 20.25 for the dog
        let favorite = VegasSignal::implied_for(47.0, -6.5);
        let underdog = VegasSignal::implied_for(47.0, 6.5);
        assert!((favorite - 26.75).abs() < 1e-9);
        assert!((underdog - 20.25).abs() < 1e-9);
        assert!((favorite + underdog - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_signal_set_counts_resolved_slots() {
        let mut signals = SignalSet::default();
        assert!(signals.is_empty());
        assert_eq!(signals.resolved_count(), 0);

        signals.weather = Some(WeatherSignal {
            temperature_f: 60.0,
            wind_mph: 4.0,
            precipitation_in: 0.0,
            indoor: false,
        });
        assert!(!signals.is_empty());
        assert_eq!(signals.resolved_count(), 1);
    }
}
