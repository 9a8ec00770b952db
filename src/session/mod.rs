//! External session-store boundary
//!
//! The durable session record is owned by the skill's persistence layer.
//! The sequencer reads the battle configuration at start and writes token
//! checkpoints at pause points, never on the latency-critical advance path.

use crate::model::BattleConfig;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Checkpoint record persisted per user
///
/// A fixed schema validated at the boundary, not a free-form attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub config: BattleConfig,
    /// Last checkpointed playback token, if a battle has been played
    pub token: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Collaborator interface owned by the external persistence layer
pub trait SessionStore {
    /// Battle configuration for a user, assembled by the dialog layer
    fn get_config(&self, user_id: &str) -> Result<BattleConfig>;

    /// Persist a token checkpoint for cross-session resume
    fn save_token(&mut self, user_id: &str, token: &str) -> Result<()>;
}

/// In-memory store backing tests and the simulator CLI
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session record for a user
    pub fn put_config(&mut self, user_id: impl Into<String>, config: BattleConfig) {
        let user_id = user_id.into();
        self.records.insert(
            user_id.clone(),
            SessionRecord {
                user_id,
                config,
                token: None,
                saved_at: Utc::now(),
            },
        );
    }

    pub fn record(&self, user_id: &str) -> Option<&SessionRecord> {
        self.records.get(user_id)
    }
}

impl SessionStore for MemoryStore {
    fn get_config(&self, user_id: &str) -> Result<BattleConfig> {
        match self.records.get(user_id) {
            Some(record) => Ok(record.config.clone()),
            None => bail!("no session record for user {}", user_id),
        }
    }

    fn save_token(&mut self, user_id: &str, token: &str) -> Result<()> {
        match self.records.get_mut(user_id) {
            Some(record) => {
                record.token = Some(token.to_string());
                record.saved_at = Utc::now();
                Ok(())
            }
            None => bail!("no session record for user {}", user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.put_config("user-1", BattleConfig::new("arctic", 4, 240));

        let config = store.get_config("user-1").unwrap();
        assert_eq!(config.scenario, "arctic");

        store.save_token("user-1", "session_00.1_track_01_playlist_01.00.A_02.21").unwrap();
        assert!(store.record("user-1").unwrap().token.is_some());
    }

    #[test]
    fn test_unknown_user_is_an_error() {
        let mut store = MemoryStore::new();
        assert!(store.get_config("ghost").is_err());
        assert!(store.save_token("ghost", "t").is_err());
    }

    #[test]
    fn test_record_serializes_with_schema() {
        let record = SessionRecord {
            user_id: "user-1".to_string(),
            config: BattleConfig::new("jungle", 2, 180).with_teams(3),
            token: None,
            saved_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["config"]["scenario"], "jungle");
        assert_eq!(json["config"]["team_count"], 3);
    }
}
