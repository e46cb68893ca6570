use dashmap::DashMap;
use tokio::sync::RwLock;

use super::player::Player;

/// In-memory registry of the active slate's players.
///
/// Entries arrive from an explicit slate load or are upserted by enhancement
/// requests so the background watcher always has subjects. Rollover clears
/// everything; players do not outlive their slate.
#[derive(Debug, Default)]
pub struct SlateStore {
    players: DashMap<String, Player>,
    label: RwLock<Option<String>>,
}

impl SlateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slate contents, returning how many players were loaded
    pub async fn load(&self, label: Option<String>, players: Vec<Player>) -> usize {
        self.players.clear();
        let count = players.len();
        for player in players {
            self.players.insert(player.id.clone(), player);
        }
        *self.label.write().await = label;
        count
    }

    /// Rollover: drop every player and the slate label
    pub async fn clear(&self) -> usize {
        let count = self.players.len();
        self.players.clear();
        *self.label.write().await = None;
        count
    }

    pub async fn label(&self) -> Option<String> {
        self.label.read().await.clone()
    }

    /// Insert or refresh a single player
    pub fn upsert(&self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn player(&self, id: &str) -> Option<Player> {
        self.players.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every tracked player
    pub fn players(&self) -> Vec<Player> {
        self.players
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Distinct game keys across the slate, for game-scoped signal refreshes
    pub fn game_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .players
            .iter()
            .map(|entry| entry.value().game_key())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::Position;

    fn player(id: &str, team: &str, opponent: &str) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            position: Position::Rb,
            team: team.to_string(),
            opponent: opponent.to_string(),
            salary: 5000,
            base_projection: 12.0,
        }
    }

    #[tokio::test]
    async fn test_load_replaces_previous_slate() {
        let store = SlateStore::new();
        store
            .load(Some("main".to_string()), vec![player("a", "BUF", "MIA")])
            .await;
        store
            .load(Some("late".to_string()), vec![player("b", "DAL", "PHI")])
            .await;

        assert_eq!(store.len(), 1);
        assert!(store.player("a").is_none());
        assert!(store.player("b").is_some());
        assert_eq!(store.label().await.as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn test_game_keys_dedupe_both_sides() {
        let store = SlateStore::new();
        store
            .load(
                None,
                vec![
                    player("a", "BUF", "MIA"),
                    player("b", "MIA", "BUF"),
                    player("c", "DAL", "PHI"),
                ],
            )
            .await;

        let keys = store.game_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"BUF-MIA".to_string()));
        assert!(keys.contains(&"DAL-PHI".to_string()));
    }

    #[tokio::test]
    async fn test_clear_empties_the_store() {
        let store = SlateStore::new();
        store
            .load(Some("main".to_string()), vec![player("a", "BUF", "MIA")])
            .await;

        let dropped = store.clear().await;
        assert_eq!(dropped, 1);
        assert!(store.is_empty());
        assert!(store.label().await.is_none());
    }
}
