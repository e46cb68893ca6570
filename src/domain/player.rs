use serde::{Deserialize, Serialize};

use crate::error::{Result, SlatecastError};

/// Roster position of a slate player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    K,
    Dst,
}

impl Position {
    /// Whether production at this position leans on the passing game
    pub fn is_passing_heavy(&self) -> bool {
        matches!(self, Position::Qb | Position::Wr | Position::Te)
    }

    /// Whether production at this position leans on the ground game
    pub fn is_ground_game(&self) -> bool {
        matches!(self, Position::Rb)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::K => "K",
            Position::Dst => "DST",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One slate entry: a player plus the upstream base projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub opponent: String,
    pub salary: u32,
    pub base_projection: f64,
}

impl Player {
    /// Key shared by both sides of a matchup, for game-scoped signals
    pub fn game_key(&self) -> String {
        let (a, b) = if self.team <= self.opponent {
            (&self.team, &self.opponent)
        } else {
            (&self.opponent, &self.team)
        };
        format!("{a}-{b}")
    }

    /// Reject players that cannot be projected
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SlatecastError::InvalidInput(
                "player id must not be empty".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(SlatecastError::InvalidInput(format!(
                "player {}: name must not be empty",
                self.id
            )));
        }
        if self.team.trim().is_empty() || self.opponent.trim().is_empty() {
            return Err(SlatecastError::InvalidInput(format!(
                "player {}: team and opponent are required",
                self.id
            )));
        }
        if !self.base_projection.is_finite() || self.base_projection < 0.0 {
            return Err(SlatecastError::InvalidInput(format!(
                "player {}: base projection must be finite and non-negative",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> Player {
        Player {
            id: "p-001".to_string(),
            name: "Test Player".to_string(),
            position: Position::Wr,
            team: "BUF".to_string(),
            opponent: "MIA".to_string(),
            salary: 7200,
            base_projection: 15.5,
        }
    }

    #[test]
    fn test_passing_heavy_positions() {
        assert!(Position::Qb.is_passing_heavy());
        assert!(Position::Wr.is_passing_heavy());
        assert!(Position::Te.is_passing_heavy());
        assert!(!Position::Rb.is_passing_heavy());
        assert!(!Position::K.is_passing_heavy());
        assert!(!Position::Dst.is_passing_heavy());
    }

    #[test]
    fn test_game_key_is_side_independent() {
        let home = sample_player();
        let mut away = sample_player();
        away.team = "MIA".to_string();
        away.opponent = "BUF".to_string();

        assert_eq!(home.game_key(), away.game_key());
    }

    #[test]
    fn test_validate_rejects_negative_projection() {
        let mut player = sample_player();
        player.base_projection = -1.0;
        assert!(player.validate().is_err());

        player.base_projection = f64::NAN;
        assert!(player.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let mut player = sample_player();
        player.id = "  ".to_string();
        assert!(player.validate().is_err());
    }
}
