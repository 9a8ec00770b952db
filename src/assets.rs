//! Static asset URL composition
//!
//! Every audio unit is an immutable, pre-rendered file published under a
//! versioned content base; nothing is generated at runtime. Serving only
//! ever composes URLs from the token and the loaded catalogs.

use crate::model::PROMO_VARIANT;

/// Versioned content base for all battle audio
pub const ASSET_BASE: &str = "https://d2c9vmcbask3pi.cloudfront.net/battle/v2";

/// URL of an opening announcement (or the promo insert)
pub fn intro_url(variant: char) -> String {
    if variant == PROMO_VARIANT {
        format!("{}/promo/promo_insert.mp3", ASSET_BASE)
    } else {
        format!(
            "{}/intro/intro_{}.mp3",
            ASSET_BASE,
            variant.to_ascii_lowercase()
        )
    }
}

/// URL of the idle soundtrack filler for one slot
pub fn soundtrack_url(duration_secs: u32) -> String {
    format!("{}/soundtrack/battle_loop_{}s.mp3", ASSET_BASE, duration_secs)
}

/// URL of a scenario event asset
///
/// `path` is the template path with placeholders already expanded; each
/// component is percent-encoded since manifest-supplied paths are not
/// restricted to URL-safe characters.
pub fn event_url(scenario: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect();
    format!(
        "{}/{}/{}",
        ASSET_BASE,
        urlencoding::encode(scenario),
        encoded.join("/")
    )
}

/// URL of a closing announcement
pub fn outro_url(code: u8) -> String {
    format!("{}/outro/outro_{}.mp3", ASSET_BASE, code)
}

/// Substitute rank/team placeholders into an event template path
pub fn expand_event_path(path: &str, rank: u8, team: u8) -> String {
    path.replace("{rank}", &format!("{:02}", rank))
        .replace("{team}", &team.to_string())
}
