//! Playback observation
//!
//! Domain milestones are reported through an explicitly passed observer
//! rather than an ambient singleton, so hosts can collect metrics without
//! the sequencer knowing about their telemetry stack.

use crate::model::{BattleConfig, Playlist, Segment};

/// Receiver for playback milestones; every method has an empty default so
/// implementations override only what they care about
pub trait PlaybackObserver {
    /// A battle was planned and its opening segment served
    fn battle_started(&self, _config: &BattleConfig, _playlist: &Playlist) {}

    /// A segment URL was resolved for playback
    fn segment_served(&self, _cursor: usize, _segment: &Segment, _url: &str) {}

    /// An inbound token was rejected and downgraded to a stop
    fn token_rejected(&self, _token: &str, _reason: &str) {}

    /// The outro finished; the battle is complete
    fn battle_finished(&self) {}

    /// Playback was explicitly stopped or paused mid-segment
    fn battle_stopped(&self, _offset_ms: u64) {}
}

/// Observer forwarding milestones to the log facade
pub struct LogObserver;

impl PlaybackObserver for LogObserver {
    fn battle_started(&self, config: &BattleConfig, playlist: &Playlist) {
        log::info!(
            "Battle started: scenario={} rank={} segments={}",
            config.scenario,
            config.rank,
            playlist.len()
        );
    }

    fn segment_served(&self, cursor: usize, segment: &Segment, url: &str) {
        log::debug!("Serving segment {}: {:?} -> {}", cursor + 1, segment, url);
    }

    fn token_rejected(&self, token: &str, reason: &str) {
        log::warn!("Rejected token ({}): {}", reason, token);
    }

    fn battle_finished(&self) {
        log::info!("Battle finished");
    }

    fn battle_stopped(&self, offset_ms: u64) {
        log::info!("Battle stopped at {}ms", offset_ms);
    }
}

/// Observer that discards every milestone
pub struct NullObserver;

impl PlaybackObserver for NullObserver {}
