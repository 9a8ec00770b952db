//! Battle playlist planning
//!
//! Planning is the only place randomness is consulted; everything after it
//! (encoding, advancing, serving) is a pure function of the token. The
//! random source is injected so a fixed seed reproduces the exact playlist.

use crate::catalog::ScenarioCatalog;
use crate::model::{BattleConfig, Playlist, Segment, PROMO_VARIANT};
use rand::Rng;

/// Fixed spacing between event slots
pub const SEGMENT_INTERVAL_SECS: u32 = 60;

/// Slot ceiling, chosen so the longest playlist still encodes within the
/// platform's token length limit
pub const MAX_SLOTS: u32 = 20;

/// Opening announcement variants with their selection weights
const INTRO_VARIANTS: &[(char, u32)] = &[('A', 5), ('B', 3), ('C', 2)];

/// Where the optional promo insert lands relative to the intro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromoPlacement {
    Skip,
    BeforeIntro,
    AfterIntro,
}

/// Promo weights; most battles carry no promo at all
const PROMO_PLACEMENTS: &[(PromoPlacement, u32)] = &[
    (PromoPlacement::Skip, 6),
    (PromoPlacement::BeforeIntro, 2),
    (PromoPlacement::AfterIntro, 2),
];

/// Build the full segment sequence for one battle
///
/// Events are drawn without replacement from the rank-resolved pool; when
/// the pool runs dry the remaining slots carry soundtrack only. With events
/// disabled the silent catalog is substituted and the playlist has no event
/// segments at all.
pub fn plan(config: &BattleConfig, catalog: &ScenarioCatalog, rng: &mut impl Rng) -> Playlist {
    let slot_count = (config.duration_secs / SEGMENT_INTERVAL_SECS).min(MAX_SLOTS);

    let silent = ScenarioCatalog::silent();
    let source = if config.events_enabled { catalog } else { &silent };

    let mut pool = source.events_for_rank(config.rank);
    pool.retain(|e| !e.needs_team || (config.using_teams && config.team_count >= 2));

    log::debug!(
        "Planning battle: scenario={} rank={} slots={} pool={}",
        source.name(),
        config.rank,
        slot_count,
        pool.len()
    );

    let mut segments = Vec::with_capacity(slot_count as usize * 2 + 3);

    let variant = *weighted_pick(rng, INTRO_VARIANTS);
    let intro = Segment::Intro { variant };
    match *weighted_pick(rng, PROMO_PLACEMENTS) {
        PromoPlacement::Skip => segments.push(intro),
        PromoPlacement::BeforeIntro => {
            segments.push(Segment::Intro {
                variant: PROMO_VARIANT,
            });
            segments.push(intro);
        }
        PromoPlacement::AfterIntro => {
            segments.push(intro);
            segments.push(Segment::Intro {
                variant: PROMO_VARIANT,
            });
        }
    }

    for _ in 0..slot_count {
        segments.push(Segment::Soundtrack {
            duration_secs: SEGMENT_INTERVAL_SECS,
        });

        if pool.is_empty() {
            continue;
        }
        let drawn = pool.remove(rng.gen_range(0..pool.len()));
        let team = if drawn.needs_team {
            rng.gen_range(1..=config.team_count)
        } else {
            0
        };
        segments.push(Segment::Event {
            index: drawn.index,
            name: drawn.name,
            team,
        });
    }

    segments.push(Segment::outro_for(config.using_teams));

    let playlist = Playlist::new(segments);
    log::info!(
        "Planned {} segments ({} events, {} fillers) for scenario `{}`",
        playlist.len(),
        playlist.event_count(),
        playlist.soundtrack_count(),
        config.scenario
    );
    playlist
}

/// Draw one entry from a weighted choice table
fn weighted_pick<'a, T>(rng: &mut impl Rng, choices: &'a [(T, u32)]) -> &'a T {
    let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (value, weight) in choices {
        if roll < *weight {
            return value;
        }
        roll -= weight;
    }
    // Weights are all positive, so the loop always returns
    &choices[choices.len() - 1].0
}
