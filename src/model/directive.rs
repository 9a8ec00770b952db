//! Platform-facing directive payloads and inbound playback events

use serde::{Deserialize, Serialize};

/// How the platform should queue the directive's audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayBehavior {
    /// Drop the current queue and play immediately
    ReplaceAll,

    /// Append after the currently playing stream
    Enqueue,

    /// Replace queued streams but finish the current one
    ReplaceEnqueued,
}

/// Outbound directive handed to the skill response layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Directive {
    /// Stream one segment; the token is echoed back verbatim by the
    /// platform on every subsequent callback
    #[serde(rename_all = "camelCase")]
    Play {
        token: String,
        url: String,
        offset_ms: u64,
        play_behavior: PlayBehavior,
    },

    /// Terminate playback
    Stop,
}

impl Directive {
    pub fn is_stop(&self) -> bool {
        matches!(self, Directive::Stop)
    }

    /// The echoed token, when this directive carries one
    pub fn token(&self) -> Option<&str> {
        match self {
            Directive::Play { token, .. } => Some(token),
            Directive::Stop => None,
        }
    }

    /// The streamed URL, when this directive carries one
    pub fn url(&self) -> Option<&str> {
        match self {
            Directive::Play { url, .. } => Some(url),
            Directive::Stop => None,
        }
    }
}

/// Playback lifecycle notification delivered by the hosting platform
///
/// Each event carries the opaque token of the stream it refers to; the
/// platform may deliver `PlaybackNearlyFinished` and `PlaybackStopped` in
/// close succession near a track boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlatformEvent {
    #[serde(rename_all = "camelCase")]
    PlaybackStarted { token: String },

    #[serde(rename_all = "camelCase")]
    PlaybackNearlyFinished { token: String, offset_ms: u64 },

    #[serde(rename_all = "camelCase")]
    PlaybackFinished { token: String },

    #[serde(rename_all = "camelCase")]
    PlaybackStopped { token: String, offset_ms: u64 },
}

impl PlatformEvent {
    /// The token echoed with this event
    pub fn token(&self) -> &str {
        match self {
            PlatformEvent::PlaybackStarted { token }
            | PlatformEvent::PlaybackNearlyFinished { token, .. }
            | PlatformEvent::PlaybackFinished { token }
            | PlatformEvent::PlaybackStopped { token, .. } => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_accessors() {
        let play = Directive::Play {
            token: "session_x".to_string(),
            url: "https://cdn/intro.mp3".to_string(),
            offset_ms: 0,
            play_behavior: PlayBehavior::ReplaceAll,
        };
        assert!(!play.is_stop());
        assert_eq!(play.token(), Some("session_x"));
        assert_eq!(play.url(), Some("https://cdn/intro.mp3"));

        assert!(Directive::Stop.is_stop());
        assert_eq!(Directive::Stop.token(), None);
    }

    #[test]
    fn test_directive_wire_shape() {
        let play = Directive::Play {
            token: "t".to_string(),
            url: "u".to_string(),
            offset_ms: 1500,
            play_behavior: PlayBehavior::Enqueue,
        };
        let json = serde_json::to_value(&play).unwrap();
        assert_eq!(json["type"], "play");
        assert_eq!(json["offsetMs"], 1500);
        assert_eq!(json["playBehavior"], "ENQUEUE");
    }

    #[test]
    fn test_event_token_accessor() {
        let event = PlatformEvent::PlaybackStopped {
            token: "session_y".to_string(),
            offset_ms: 42_000,
        };
        assert_eq!(event.token(), "session_y");
    }
}
