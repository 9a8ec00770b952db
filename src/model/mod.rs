//! Unified data model for battle playback
//!
//! This module defines data structures that are independent of
//! both the dialog layer and the hosting platform's wire format.

mod config;
mod directive;
mod segment;

pub use config::{BattleConfig, ConfigError, MAX_DURATION_SECS, MAX_RANK, MAX_TEAMS};
pub use directive::{Directive, PlatformEvent, PlayBehavior};
pub use segment::{Playlist, Segment, OUTRO_SOLO, OUTRO_TEAMS, PROMO_VARIANT};
