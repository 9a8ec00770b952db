//! Battle configuration supplied by the session layer

use crate::catalog::CatalogSet;
use crate::planner::{MAX_SLOTS, SEGMENT_INTERVAL_SECS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest player rank with dedicated content
pub const MAX_RANK: u8 = 10;

/// Most teams a single battle supports
pub const MAX_TEAMS: u8 = 8;

/// Longest supported battle; bounded so every playlist encodes within the
/// platform's token ceiling
pub const MAX_DURATION_SECS: u32 = MAX_SLOTS * SEGMENT_INTERVAL_SECS;

/// Immutable input to playlist planning
///
/// Assembled by the dialog layer from the persistent session record and
/// validated once at battle start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Scenario theme (e.g. "arctic") selecting the event catalog
    pub scenario: String,

    /// Player progression tier gating event availability
    pub rank: u8,

    /// Requested battle duration in seconds
    pub duration_secs: u32,

    /// Number of competing teams (1 for a co-op battle against the clock)
    pub team_count: u8,

    /// When false, the battle plays soundtrack fillers only
    pub events_enabled: bool,

    /// Team battles get team-targeted events and the team outro
    pub using_teams: bool,
}

/// Rejected battle configuration, surfaced at `start()`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("battle duration {0}s is outside the supported range")]
    InvalidDuration(u32),

    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("rank {0} is above the highest supported tier")]
    RankOutOfRange(u8),

    #[error("team count {0} is outside the supported range")]
    InvalidTeamCount(u8),
}

impl BattleConfig {
    /// Create a configuration with solo defaults: one team, events enabled
    pub fn new(scenario: impl Into<String>, rank: u8, duration_secs: u32) -> Self {
        Self {
            scenario: scenario.into(),
            rank,
            duration_secs,
            team_count: 1,
            events_enabled: true,
            using_teams: false,
        }
    }

    /// Set the team count; two or more teams switches to team mode
    pub fn with_teams(mut self, team_count: u8) -> Self {
        self.team_count = team_count;
        self.using_teams = team_count >= 2;
        self
    }

    /// Disable events, producing a soundtrack-only battle
    pub fn without_events(mut self) -> Self {
        self.events_enabled = false;
        self
    }

    /// Validate ranges and scenario existence against the loaded catalogs
    pub fn validate(&self, catalogs: &CatalogSet) -> Result<(), ConfigError> {
        if self.duration_secs == 0 || self.duration_secs > MAX_DURATION_SECS {
            return Err(ConfigError::InvalidDuration(self.duration_secs));
        }
        if self.rank > MAX_RANK {
            return Err(ConfigError::RankOutOfRange(self.rank));
        }
        if self.team_count == 0 || self.team_count > MAX_TEAMS {
            return Err(ConfigError::InvalidTeamCount(self.team_count));
        }
        if self.using_teams && self.team_count < 2 {
            return Err(ConfigError::InvalidTeamCount(self.team_count));
        }
        if catalogs.scenario(&self.scenario).is_none() {
            return Err(ConfigError::UnknownScenario(self.scenario.clone()));
        }
        Ok(())
    }
}
