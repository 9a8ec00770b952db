use serde::{Deserialize, Serialize};

/// Outro terminal code for free-for-all battles
pub const OUTRO_SOLO: u8 = 21;

/// Outro terminal code for team battles
pub const OUTRO_TEAMS: u8 = 22;

/// Intro variant letter reserved for the sponsor promo insert
pub const PROMO_VARIANT: char = 'P';

/// One atomic audio unit within a battle playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Opening announcement; the variant letter selects the asset.
    /// The promo insert is an intro with the reserved [`PROMO_VARIANT`] letter.
    Intro { variant: char },

    /// Idle soundtrack filler of a fixed duration
    Soundtrack { duration_secs: u32 },

    /// A scenario event; `index` is the template's stable 1-based catalog
    /// index, `team` the 1-based target team (0 when the event has no team)
    Event { index: u8, name: String, team: u8 },

    /// Closing announcement; the code distinguishes solo/team endings
    Outro { code: u8 },
}

impl Segment {
    /// The outro segment matching the battle's team mode
    pub fn outro_for(using_teams: bool) -> Self {
        Segment::Outro {
            code: if using_teams { OUTRO_TEAMS } else { OUTRO_SOLO },
        }
    }

    pub fn is_intro(&self) -> bool {
        matches!(self, Segment::Intro { .. })
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Segment::Event { .. })
    }

    pub fn is_outro(&self) -> bool {
        matches!(self, Segment::Outro { .. })
    }
}

/// The full ordered segment sequence for one battle
///
/// Generated once at battle start and never regenerated mid-session;
/// in-flight tokens serialize the entire remaining sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    segments: Vec<Segment>,
}

impl Playlist {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// All segments in playback order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at a 0-based cursor position
    pub fn get(&self, cursor: usize) -> Option<&Segment> {
        self.segments.get(cursor)
    }

    /// Number of segments in this playlist
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 0-based position of the final (outro) segment
    pub fn last_index(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Number of event segments
    pub fn event_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_event()).count()
    }

    /// Number of soundtrack filler segments
    pub fn soundtrack_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Soundtrack { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outro_codes() {
        assert_eq!(Segment::outro_for(true), Segment::Outro { code: OUTRO_TEAMS });
        assert_eq!(Segment::outro_for(false), Segment::Outro { code: OUTRO_SOLO });
    }

    #[test]
    fn test_playlist_counts() {
        let playlist = Playlist::new(vec![
            Segment::Intro { variant: 'A' },
            Segment::Soundtrack { duration_secs: 60 },
            Segment::Event {
                index: 3,
                name: "Yeti".to_string(),
                team: 0,
            },
            Segment::Soundtrack { duration_secs: 60 },
            Segment::outro_for(false),
        ]);

        assert_eq!(playlist.len(), 5);
        assert_eq!(playlist.event_count(), 1);
        assert_eq!(playlist.soundtrack_count(), 2);
        assert_eq!(playlist.last_index(), 4);
        assert!(playlist.get(4).unwrap().is_outro());
        assert!(playlist.get(5).is_none());
    }
}
