//! Playback resolution state machine
//!
//! Every operation is one stateless request/response cycle: the inbound
//! token is decoded, advanced, and re-encoded, and nothing survives in
//! process memory between calls. The advance path performs zero I/O; the
//! session store is touched only at battle start and at pause checkpoints.

mod observer;

pub use observer::{LogObserver, NullObserver, PlaybackObserver};

use crate::assets;
use crate::catalog::CatalogSet;
use crate::model::{
    BattleConfig, ConfigError, Directive, PlatformEvent, PlayBehavior, Playlist, Segment,
};
use crate::planner;
use crate::session::SessionStore;
use crate::token::{self, TokenMeta, SAFE_TOKEN};
use anyhow::{anyhow, Context, Result};
use rand::Rng;

/// Position of a battle within its playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No battle token exists yet
    AwaitingStart,
    /// An opening announcement (or promo insert) is playing
    InIntro,
    /// A body segment at the given 0-based cursor is playing
    InBody(usize),
    /// The closing announcement is playing
    InOutro,
    /// The outro has been served; only a fresh start re-enters
    Finished,
}

impl PlaybackState {
    /// Classify a cursor within a playlist
    pub fn at(cursor: usize, playlist: &Playlist) -> Self {
        if cursor >= playlist.len() {
            return PlaybackState::Finished;
        }
        if cursor == playlist.last_index() {
            return PlaybackState::InOutro;
        }
        match playlist.get(cursor) {
            Some(segment) if segment.is_intro() => PlaybackState::InIntro,
            _ => PlaybackState::InBody(cursor),
        }
    }
}

/// Outcome of one resolver operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Directive for the platform response
    pub directive: Directive,

    /// Token for the session layer to persist at its next checkpoint; when
    /// the inbound token was rejected this is the safe replacement, never
    /// the corrupt original
    pub checkpoint: String,

    /// Position after the operation
    pub state: PlaybackState,
}

/// The battle playback state machine
///
/// Holds only static catalog data and the observer; all per-battle state
/// travels inside the token.
pub struct PlaybackResolver<O: PlaybackObserver> {
    catalogs: CatalogSet,
    observer: O,
}

impl<O: PlaybackObserver> PlaybackResolver<O> {
    pub fn new(catalogs: CatalogSet, observer: O) -> Self {
        Self { catalogs, observer }
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    /// Start a battle: validate the config, plan the playlist, and serve
    /// the opening segment at offset zero
    pub fn start(&self, config: &BattleConfig, rng: &mut impl Rng) -> Result<Resolution> {
        config.validate(&self.catalogs)?;
        let catalog = self
            .catalogs
            .scenario(&config.scenario)
            .ok_or_else(|| ConfigError::UnknownScenario(config.scenario.clone()))?;

        let playlist = planner::plan(config, catalog, rng);
        let meta = TokenMeta {
            rank: config.rank,
            team_count: config.team_count,
        };
        let token = token::encode(&meta, &playlist, 0)?;
        let opening = playlist
            .get(0)
            .ok_or_else(|| anyhow!("planner produced an empty playlist"))?;
        let url = self
            .segment_url(&meta, opening)
            .map_err(|reason| anyhow!("cannot serve opening segment: {}", reason))?;

        self.observer.battle_started(config, &playlist);
        self.observer.segment_served(0, opening, &url);

        Ok(Resolution {
            directive: Directive::Play {
                token: token.clone(),
                url,
                offset_ms: 0,
                play_behavior: PlayBehavior::ReplaceAll,
            },
            checkpoint: token,
            state: PlaybackState::at(0, &playlist),
        })
    }

    /// Start a battle for a stored session: loads the config from the
    /// session store and checkpoints the initial token
    pub fn start_for_user(
        &self,
        user_id: &str,
        store: &mut dyn SessionStore,
        rng: &mut impl Rng,
    ) -> Result<Resolution> {
        let config = store
            .get_config(user_id)
            .with_context(|| format!("Failed to load battle config for user {}", user_id))?;
        let resolution = self.start(&config, rng)?;
        store
            .save_token(user_id, &resolution.checkpoint)
            .with_context(|| format!("Failed to checkpoint start token for user {}", user_id))?;
        Ok(resolution)
    }

    /// Advance one segment
    ///
    /// Infallible by design: a token that cannot be decoded or served is
    /// downgraded to a Stop directive with a safe checkpoint token. Byte
    /// identical input produces byte-identical output, so duplicate
    /// near-boundary callbacks are harmless.
    pub fn resolve_next(&self, token: &str) -> Resolution {
        let decoded = match token::decode(token) {
            Ok(decoded) => decoded,
            Err(err) => return self.reject(token, &err.to_string()),
        };

        let last = decoded.playlist.last_index();
        if decoded.cursor > last {
            // Stale or duplicated callback overran the plan; clamp to the
            // outro rather than dropping audio mid-session
            return self.serve(
                &decoded.meta,
                &decoded.playlist,
                last,
                0,
                PlayBehavior::ReplaceAll,
                token,
            );
        }

        let next = decoded.cursor + 1;
        if next > last {
            // Outro already served: the battle is complete
            self.observer.battle_finished();
            let checkpoint = token::encode(&decoded.meta, &decoded.playlist, last)
                .unwrap_or_else(|_| SAFE_TOKEN.to_string());
            return Resolution {
                directive: Directive::Stop,
                checkpoint,
                state: PlaybackState::Finished,
            };
        }

        self.serve(
            &decoded.meta,
            &decoded.playlist,
            next,
            0,
            PlayBehavior::Enqueue,
            token,
        )
    }

    /// Re-serve the current segment at a given offset after a pause; the
    /// cursor does not move
    pub fn resolve_resume(&self, token: &str, offset_ms: u64) -> Resolution {
        let decoded = match token::decode(token) {
            Ok(decoded) => decoded,
            Err(err) => return self.reject(token, &err.to_string()),
        };
        let cursor = decoded.cursor.min(decoded.playlist.last_index());
        self.serve(
            &decoded.meta,
            &decoded.playlist,
            cursor,
            offset_ms,
            PlayBehavior::ReplaceAll,
            token,
        )
    }

    /// Explicit stop/pause: terminal for this battle, position abandoned
    pub fn stop(&self, offset_ms: u64) -> Directive {
        self.observer.battle_stopped(offset_ms);
        Directive::Stop
    }

    /// Dispatch an inbound platform callback
    ///
    /// Only the pause checkpoint touches the session store; the
    /// latency-critical nearly-finished path resolves purely in memory.
    pub fn handle_event(
        &self,
        user_id: &str,
        event: &PlatformEvent,
        store: &mut dyn SessionStore,
    ) -> Result<Option<Directive>> {
        match event {
            PlatformEvent::PlaybackStarted { token } => {
                log::debug!("Playback started for user {}: {}", user_id, token);
                Ok(None)
            }
            PlatformEvent::PlaybackNearlyFinished { token, .. } => {
                Ok(Some(self.resolve_next(token).directive))
            }
            PlatformEvent::PlaybackFinished { token } => {
                log::debug!("Playback finished for user {}: {}", user_id, token);
                Ok(None)
            }
            PlatformEvent::PlaybackStopped { token, offset_ms } => {
                self.observer.battle_stopped(*offset_ms);
                // Persist a decodable token so a later cross-session resume
                // re-enters at this segment
                let checkpoint = match token::decode(token) {
                    Ok(_) => token.as_str(),
                    Err(err) => {
                        self.observer.token_rejected(token, &err.to_string());
                        SAFE_TOKEN
                    }
                };
                store
                    .save_token(user_id, checkpoint)
                    .with_context(|| format!("Failed to checkpoint token for user {}", user_id))?;
                Ok(None)
            }
        }
    }

    /// Serve the segment at `cursor`, failing closed on anything the
    /// catalogs cannot back
    fn serve(
        &self,
        meta: &TokenMeta,
        playlist: &Playlist,
        cursor: usize,
        offset_ms: u64,
        play_behavior: PlayBehavior,
        original_token: &str,
    ) -> Resolution {
        let segment = match playlist.get(cursor) {
            Some(segment) => segment,
            None => return self.reject(original_token, "cursor outside the playlist"),
        };
        let url = match self.segment_url(meta, segment) {
            Ok(url) => url,
            Err(reason) => return self.reject(original_token, &reason),
        };
        let checkpoint = match token::encode(meta, playlist, cursor) {
            Ok(token) => token,
            Err(err) => return self.reject(original_token, &err.to_string()),
        };

        self.observer.segment_served(cursor, segment, &url);

        Resolution {
            directive: Directive::Play {
                token: checkpoint.clone(),
                url,
                offset_ms,
                play_behavior,
            },
            checkpoint,
            state: PlaybackState::at(cursor, playlist),
        }
    }

    /// Resolve a segment to its asset URL
    fn segment_url(&self, meta: &TokenMeta, segment: &Segment) -> Result<String, String> {
        match segment {
            Segment::Intro { variant } => Ok(assets::intro_url(*variant)),
            Segment::Soundtrack { duration_secs } => Ok(assets::soundtrack_url(*duration_secs)),
            Segment::Outro { code } => Ok(assets::outro_url(*code)),
            Segment::Event { index, name, team } => {
                let (catalog, template) = self
                    .catalogs
                    .lookup_event(name)
                    .ok_or_else(|| format!("event `{}` is not in any loaded catalog", name))?;
                if template.index != *index {
                    return Err(format!(
                        "event `{}` index mismatch: token {}, catalog {}",
                        name, index, template.index
                    ));
                }
                let path = assets::expand_event_path(&template.path, meta.rank, *team);
                Ok(assets::event_url(catalog.name(), &path))
            }
        }
    }

    /// Fail closed: report the rejection and answer with a terminal stop
    /// plus a safe replacement token
    fn reject(&self, token: &str, reason: &str) -> Resolution {
        self.observer.token_rejected(token, reason);
        log::warn!("Rejected playback token ({}); issuing stop", reason);
        Resolution {
            directive: Directive::Stop,
            checkpoint: SAFE_TOKEN.to_string(),
            state: PlaybackState::Finished,
        }
    }
}
