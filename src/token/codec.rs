//! Token grammar implementation
//!
//! Grammar (dot/underscore-delimited, positional fields):
//!
//! ```text
//! token        := "session_" rank2 "." teamDigits "_track_" cursor2 "_playlist_" segmentList
//! teamDigits   := "1" ("." "1")*            ; one field per team
//! segmentList  := segment ("_" segment)*
//! segment      := ordinal2 "." body
//! body(intro)      := "00" "." variantLetter
//! body(soundtrack) := "02" "." durationSeconds
//! body(event)      := eventIndex2 "." eventName "." teamTag2
//! body(outro)      := terminalCode          ; 21 solo, 22 teams
//! ```
//!
//! Bodies are disambiguated by field count and content. The cursor field is
//! the 1-based ordinal of the segment currently playing. Any structural
//! deviation is rejected outright; there is no best-effort parsing.

use super::TokenError;
use crate::model::{Playlist, Segment, MAX_TEAMS, OUTRO_SOLO, OUTRO_TEAMS};

/// Hosting platform's ceiling on the opaque token string
pub const MAX_TOKEN_LEN: usize = 1024;

/// Replacement token issued when an inbound token is rejected: a played-out
/// minimal battle, so a re-entrant callback stays inside the grammar and
/// terminates immediately
pub const SAFE_TOKEN: &str = "session_00.1_track_02_playlist_01.00.A_02.21";

const SESSION_MARKER: &str = "session_";
const TRACK_MARKER: &str = "_track_";
const PLAYLIST_MARKER: &str = "_playlist_";

/// Segment subtype code for intros (and promo inserts)
const SUBTYPE_INTRO: &str = "00";
/// Segment subtype code for soundtrack fillers
const SUBTYPE_SOUNDTRACK: &str = "02";

/// Config fingerprint carried in the token prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMeta {
    pub rank: u8,
    pub team_count: u8,
}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub meta: TokenMeta,
    pub playlist: Playlist,
    /// 0-based cursor; may point past the playlist end when the platform
    /// replays stale callbacks, the resolver clamps it to the outro
    pub cursor: usize,
}

/// Encode a playlist position as an opaque token
///
/// `cursor` is the 0-based index of the segment currently playing.
pub fn encode(meta: &TokenMeta, playlist: &Playlist, cursor: usize) -> Result<String, TokenError> {
    if playlist.is_empty() {
        return Err(TokenError::InvalidStructure("empty playlist"));
    }
    if playlist.len() > 99 {
        return Err(TokenError::InvalidStructure(
            "playlist longer than two-digit ordinals allow",
        ));
    }
    if cursor >= playlist.len() {
        return Err(TokenError::InvalidCursor(format!("{}", cursor + 1)));
    }
    if meta.rank > 99 {
        return Err(TokenError::InvalidRank(meta.rank.to_string()));
    }
    if meta.team_count == 0 || meta.team_count > MAX_TEAMS {
        return Err(TokenError::InvalidTeamDigits(meta.team_count.to_string()));
    }

    let mut out = String::with_capacity(MAX_TOKEN_LEN / 2);
    out.push_str(SESSION_MARKER);
    out.push_str(&format!("{:02}", meta.rank));
    for _ in 0..meta.team_count {
        out.push_str(".1");
    }
    out.push_str(TRACK_MARKER);
    out.push_str(&format!("{:02}", cursor + 1));
    out.push_str(PLAYLIST_MARKER);

    for (position, segment) in playlist.segments().iter().enumerate() {
        if position > 0 {
            out.push('_');
        }
        out.push_str(&format!("{:02}.", position + 1));
        encode_body(position, segment, &mut out)?;
    }

    if out.len() > MAX_TOKEN_LEN {
        return Err(TokenError::Overflow(out.len()));
    }
    Ok(out)
}

fn encode_body(position: usize, segment: &Segment, out: &mut String) -> Result<(), TokenError> {
    match segment {
        Segment::Intro { variant } => {
            if !variant.is_ascii_uppercase() {
                return Err(TokenError::MalformedSegment {
                    position,
                    body: variant.to_string(),
                });
            }
            out.push_str(SUBTYPE_INTRO);
            out.push('.');
            out.push(*variant);
        }
        Segment::Soundtrack { duration_secs } => {
            if *duration_secs == 0 || *duration_secs > 9999 {
                return Err(TokenError::MalformedSegment {
                    position,
                    body: duration_secs.to_string(),
                });
            }
            out.push_str(SUBTYPE_SOUNDTRACK);
            out.push('.');
            out.push_str(&duration_secs.to_string());
        }
        Segment::Event { index, name, team } => {
            if *index == 0 || *index > 99 || *team > 99 {
                return Err(TokenError::MalformedSegment {
                    position,
                    body: format!("{}.{}.{}", index, name, team),
                });
            }
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(TokenError::UnsafeEventName(name.clone()));
            }
            out.push_str(&format!("{:02}.{}.{:02}", index, name, team));
        }
        Segment::Outro { code } => {
            if *code != OUTRO_SOLO && *code != OUTRO_TEAMS {
                return Err(TokenError::MalformedSegment {
                    position,
                    body: code.to_string(),
                });
            }
            out.push_str(&format!("{:02}", code));
        }
    }
    Ok(())
}

/// Decode a token, rejecting any structural deviation
pub fn decode(token: &str) -> Result<DecodedToken, TokenError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(TokenError::Overflow(token.len()));
    }

    let rest = token
        .strip_prefix(SESSION_MARKER)
        .ok_or(TokenError::MissingMarker(SESSION_MARKER))?;
    let (head, rest) = rest
        .split_once(TRACK_MARKER)
        .ok_or(TokenError::MissingMarker(TRACK_MARKER))?;
    let (cursor_field, list) = rest
        .split_once(PLAYLIST_MARKER)
        .ok_or(TokenError::MissingMarker(PLAYLIST_MARKER))?;

    let (rank_field, team_field) = head
        .split_once('.')
        .ok_or_else(|| TokenError::InvalidRank(head.to_string()))?;
    let rank = two_digits(rank_field)
        .ok_or_else(|| TokenError::InvalidRank(rank_field.to_string()))?;
    let team_count = parse_team_digits(team_field)?;

    let cursor_1based = two_digits(cursor_field)
        .ok_or_else(|| TokenError::InvalidCursor(cursor_field.to_string()))?;
    if cursor_1based == 0 {
        return Err(TokenError::InvalidCursor(cursor_field.to_string()));
    }

    let mut segments = Vec::new();
    for (position, raw) in list.split('_').enumerate() {
        let (ordinal, body) = raw.split_once('.').ok_or_else(|| {
            TokenError::MalformedSegment {
                position,
                body: raw.to_string(),
            }
        })?;
        match two_digits(ordinal) {
            Some(n) if n as usize == position + 1 => {}
            _ => {
                return Err(TokenError::OutOfSequence {
                    position,
                    ordinal: ordinal.to_string(),
                });
            }
        }
        segments.push(decode_body(position, body, team_count)?);
    }

    validate_structure(&segments)?;

    Ok(DecodedToken {
        meta: TokenMeta { rank, team_count },
        playlist: Playlist::new(segments),
        cursor: cursor_1based as usize - 1,
    })
}

fn decode_body(position: usize, body: &str, team_count: u8) -> Result<Segment, TokenError> {
    let malformed = || TokenError::MalformedSegment {
        position,
        body: body.to_string(),
    };

    let fields: Vec<&str> = body.split('.').collect();
    match fields.as_slice() {
        [code] => {
            let code = two_digits(code).ok_or_else(malformed)?;
            if code != OUTRO_SOLO && code != OUTRO_TEAMS {
                return Err(malformed());
            }
            Ok(Segment::Outro { code })
        }

        [subtype, payload] if *subtype == SUBTYPE_INTRO => {
            let mut chars = payload.chars();
            match (chars.next(), chars.next()) {
                (Some(variant), None) if variant.is_ascii_uppercase() => {
                    Ok(Segment::Intro { variant })
                }
                _ => Err(malformed()),
            }
        }

        [subtype, payload] if *subtype == SUBTYPE_SOUNDTRACK => {
            if payload.is_empty()
                || payload.len() > 4
                || !payload.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(malformed());
            }
            let duration_secs: u32 = payload.parse().map_err(|_| malformed())?;
            if duration_secs == 0 {
                return Err(malformed());
            }
            Ok(Segment::Soundtrack { duration_secs })
        }

        [index, name, team] => {
            let index = two_digits(index).ok_or_else(malformed)?;
            if index == 0 {
                return Err(malformed());
            }
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(TokenError::UnsafeEventName(name.to_string()));
            }
            let team = two_digits(team).ok_or_else(malformed)?;
            if team > team_count {
                return Err(TokenError::InvalidStructure(
                    "event targets a team outside the battle",
                ));
            }
            Ok(Segment::Event {
                index,
                name: name.to_string(),
                team,
            })
        }

        _ => Err(malformed()),
    }
}

/// Structural rules the planner always satisfies: one or two opening intro
/// segments, a single outro in final position, nothing else out of place
fn validate_structure(segments: &[Segment]) -> Result<(), TokenError> {
    let leading_intros = segments.iter().take_while(|s| s.is_intro()).count();
    if leading_intros == 0 {
        return Err(TokenError::InvalidStructure(
            "token must open with an intro segment",
        ));
    }
    if leading_intros > 2 {
        return Err(TokenError::InvalidStructure(
            "more than two opening intro segments",
        ));
    }
    if segments[leading_intros..].iter().any(|s| s.is_intro()) {
        return Err(TokenError::InvalidStructure("intro after the battle body"));
    }

    match segments.last() {
        Some(s) if s.is_outro() => {}
        _ => {
            return Err(TokenError::InvalidStructure(
                "token must close with an outro segment",
            ));
        }
    }
    let last = segments.len() - 1;
    if segments[..last].iter().any(|s| s.is_outro()) {
        return Err(TokenError::InvalidStructure(
            "outro before the end of the playlist",
        ));
    }
    Ok(())
}

fn parse_team_digits(field: &str) -> Result<u8, TokenError> {
    let mut count: u8 = 0;
    for part in field.split('.') {
        if part != "1" {
            return Err(TokenError::InvalidTeamDigits(field.to_string()));
        }
        count += 1;
        if count > MAX_TEAMS {
            return Err(TokenError::InvalidTeamDigits(field.to_string()));
        }
    }
    if count == 0 {
        return Err(TokenError::InvalidTeamDigits(field.to_string()));
    }
    Ok(count)
}

/// Parse a field that must be exactly two ASCII digits
fn two_digits(field: &str) -> Option<u8> {
    let bytes = field.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((bytes[0] - b'0') * 10 + (bytes[1] - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captured from a live session: arctic, rank 4, four teams, playing
    /// the intro of a three-slot battle with two drawn events
    const FIXTURE: &str = "session_04.1.1.1.1_track_01_playlist_01.00.A_02.02.60_03.06.HeatSignature.00_04.02.60_05.03.Yeti.00_06.02.60_07.22";

    fn fixture_playlist() -> Playlist {
        Playlist::new(vec![
            Segment::Intro { variant: 'A' },
            Segment::Soundtrack { duration_secs: 60 },
            Segment::Event {
                index: 6,
                name: "HeatSignature".to_string(),
                team: 0,
            },
            Segment::Soundtrack { duration_secs: 60 },
            Segment::Event {
                index: 3,
                name: "Yeti".to_string(),
                team: 0,
            },
            Segment::Soundtrack { duration_secs: 60 },
            Segment::Outro { code: OUTRO_TEAMS },
        ])
    }

    #[test]
    fn test_decode_fixture() {
        let decoded = decode(FIXTURE).unwrap();
        assert_eq!(decoded.meta, TokenMeta { rank: 4, team_count: 4 });
        // cursor field 01 -> 0-based 0 (the intro is playing)
        assert_eq!(decoded.cursor, 0);
        assert_eq!(decoded.playlist, fixture_playlist());
    }

    #[test]
    fn test_encode_fixture_is_byte_identical() {
        let token = encode(
            &TokenMeta { rank: 4, team_count: 4 },
            &fixture_playlist(),
            0,
        )
        .unwrap();
        assert_eq!(token, FIXTURE);
    }

    #[test]
    fn test_round_trip_every_cursor() {
        let playlist = fixture_playlist();
        let meta = TokenMeta { rank: 4, team_count: 4 };
        for cursor in 0..playlist.len() {
            let token = encode(&meta, &playlist, cursor).unwrap();
            let decoded = decode(&token).unwrap();
            assert_eq!(decoded.meta, meta);
            assert_eq!(decoded.cursor, cursor);
            assert_eq!(decoded.playlist, playlist);
            // Tokens we emit re-encode byte-identically
            assert_eq!(
                encode(&decoded.meta, &decoded.playlist, decoded.cursor).unwrap(),
                token
            );
        }
    }

    #[test]
    fn test_encode_minimal_battle() {
        // intro + outro only; cursor on the intro
        // prefix: session_00.1_track_01_playlist_
        let playlist = Playlist::new(vec![
            Segment::Intro { variant: 'B' },
            Segment::Outro { code: OUTRO_SOLO },
        ]);
        let token = encode(&TokenMeta { rank: 0, team_count: 1 }, &playlist, 0).unwrap();
        assert_eq!(token, "session_00.1_track_01_playlist_01.00.B_02.21");
    }

    #[test]
    fn test_safe_token_is_valid_and_terminal() {
        let decoded = decode(SAFE_TOKEN).unwrap();
        assert_eq!(decoded.meta, TokenMeta { rank: 0, team_count: 1 });
        // cursor already on the outro: the next advance terminates
        assert_eq!(decoded.cursor, decoded.playlist.last_index());
        assert_eq!(
            encode(&decoded.meta, &decoded.playlist, decoded.cursor).unwrap(),
            SAFE_TOKEN
        );
    }

    #[test]
    fn test_decode_accepts_overflowed_cursor() {
        // cursor field past the playlist end decodes; clamping is the
        // resolver's recovery, not a grammar violation
        let token = "session_00.1_track_09_playlist_01.00.A_02.21";
        let decoded = decode(token).unwrap();
        assert_eq!(decoded.cursor, 8);
        assert_eq!(decoded.playlist.len(), 2);
    }

    #[test]
    fn test_decode_rejects_missing_markers() {
        assert_eq!(
            decode("ticket_00.1_track_01_playlist_01.00.A_02.21"),
            Err(TokenError::MissingMarker("session_"))
        );
        assert_eq!(
            decode("session_00.1_01_playlist_01.00.A_02.21"),
            Err(TokenError::MissingMarker("_track_"))
        );
        assert_eq!(
            decode("session_00.1_track_01_01.00.A_02.21"),
            Err(TokenError::MissingMarker("_playlist_"))
        );
    }

    #[test]
    fn test_decode_rejects_bad_prefix_fields() {
        // one-digit rank
        assert!(matches!(
            decode("session_4.1_track_01_playlist_01.00.A_02.21"),
            Err(TokenError::InvalidRank(_))
        ));
        // team digit other than 1
        assert!(matches!(
            decode("session_04.2_track_01_playlist_01.00.A_02.21"),
            Err(TokenError::InvalidTeamDigits(_))
        ));
        // cursor 00
        assert!(matches!(
            decode("session_04.1_track_00_playlist_01.00.A_02.21"),
            Err(TokenError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_decode_rejects_segment_corruption() {
        // ordinal gap: second segment numbered 03
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.00.A_03.21"),
            Err(TokenError::OutOfSequence { .. })
        ));
        // unknown subtype
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.07.A_02.21"),
            Err(TokenError::MalformedSegment { .. })
        ));
        // unknown outro code
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.00.A_02.37"),
            Err(TokenError::MalformedSegment { .. })
        ));
        // event name with a non-alphanumeric byte
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.00.A_02.03.Ye-ti.00_03.21"),
            Err(TokenError::UnsafeEventName(_))
        ));
        // truncated tail
        assert!(decode("session_04.1.1.1.1_track_01_playlist_01.00.A_02.02").is_err());
    }

    #[test]
    fn test_decode_rejects_structural_violations() {
        // no intro first
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.02.60_02.21"),
            Err(TokenError::InvalidStructure(_))
        ));
        // no outro last
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.00.A_02.02.60"),
            Err(TokenError::InvalidStructure(_))
        ));
        // interior outro
        assert!(matches!(
            decode("session_04.1_track_01_playlist_01.00.A_02.21_03.21"),
            Err(TokenError::InvalidStructure(_))
        ));
        // event targeting team 3 in a 2-team battle
        assert!(matches!(
            decode("session_04.1.1_track_01_playlist_01.00.A_02.02.Frostbite.03_03.22"),
            Err(TokenError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_token() {
        let mut token = String::from("session_04.1_track_01_playlist_");
        token.push_str(&"x".repeat(MAX_TOKEN_LEN));
        assert!(matches!(decode(&token), Err(TokenError::Overflow(_))));
    }

    #[test]
    fn test_encode_rejects_out_of_range_cursor() {
        let playlist = Playlist::new(vec![
            Segment::Intro { variant: 'A' },
            Segment::Outro { code: OUTRO_SOLO },
        ]);
        let meta = TokenMeta { rank: 0, team_count: 1 };
        assert!(matches!(
            encode(&meta, &playlist, 2),
            Err(TokenError::InvalidCursor(_))
        ));
        assert!(matches!(
            encode(&meta, &Playlist::new(vec![]), 0),
            Err(TokenError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_worst_case_battle_fits_the_ceiling() {
        // Longest plannable battle: two opening segments, 20 slots each
        // carrying an event with the longest permitted name, 8 teams.
        let mut segments = vec![
            Segment::Intro { variant: 'P' },
            Segment::Intro { variant: 'A' },
        ];
        for i in 0..20u8 {
            segments.push(Segment::Soundtrack { duration_secs: 60 });
            segments.push(Segment::Event {
                index: i + 1,
                name: "AbcdefghijKlmnopqrstUvwx".to_string(),
                team: 8,
            });
        }
        segments.push(Segment::Outro { code: OUTRO_TEAMS });

        let playlist = Playlist::new(segments);
        let token = encode(&TokenMeta { rank: 10, team_count: 8 }, &playlist, 0).unwrap();
        assert!(token.len() <= MAX_TOKEN_LEN, "token is {} bytes", token.len());
    }
}
