use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributable adjustment factors applied to a base projection.
/// Each field is a signed fraction; a caller can always reconstruct how a
/// modified projection was produced from these plus the base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionModifiers {
    pub weather: f64,
    pub vegas: f64,
    pub social: f64,
    pub historical: f64,
    pub game_script: f64,
    pub defense: f64,
}

impl ProjectionModifiers {
    /// Net adjustment applied to the base projection
    pub fn sum(&self) -> f64 {
        self.weather + self.vegas + self.social + self.historical + self.game_script + self.defense
    }
}

/// Enhanced projection for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub player_id: String,
    pub base_projection: f64,
    pub modified_projection: f64,
    pub ceiling: f64,
    pub floor: f64,
    /// Joint confidence in [0, 1]; the product of per-signal confidences
    pub confidence: f64,
    pub modifiers: ProjectionModifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    pub computed_at: DateTime<Utc>,
}

impl ProjectionResult {
    /// Derive a result from its parts, enforcing the output bounds:
    /// projections never go negative and floor <= modified <= ceiling.
    pub fn compute(
        player_id: impl Into<String>,
        base_projection: f64,
        modifiers: ProjectionModifiers,
        confidence: f64,
        volatility: f64,
        insight: Option<String>,
    ) -> Self {
        let base_projection = base_projection.max(0.0);
        let modified_projection = (base_projection * (1.0 + modifiers.sum())).max(0.0);
        let confidence = confidence.clamp(0.0, 1.0);
        let volatility = volatility.clamp(0.0, 1.0);
        let ceiling = modified_projection * (1.0 + volatility);
        let floor = (modified_projection * (1.0 - volatility)).max(0.0);

        Self {
            player_id: player_id.into(),
            base_projection,
            modified_projection,
            ceiling,
            floor,
            confidence,
            modifiers,
            insight,
            computed_at: Utc::now(),
        }
    }
}
