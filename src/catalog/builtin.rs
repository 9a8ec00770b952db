//! Compiled-in scenario catalogs
//!
//! Event indices are a compatibility contract: tokens in flight reference
//! events by index, so templates must only ever be appended, never
//! reordered or removed.

use super::ScenarioCatalog;

/// All scenarios shipped with the skill
pub fn scenarios() -> Vec<ScenarioCatalog> {
    vec![arctic(), jungle()]
}

fn arctic() -> ScenarioCatalog {
    let mut catalog = ScenarioCatalog::new("arctic");
    catalog.add_event("Blizzard", 0, false, "events/blizzard_r{rank}.mp3");
    catalog.add_event("Frostbite", 0, true, "events/frostbite_r{rank}_t{team}.mp3");
    catalog.add_event("Yeti", 2, false, "events/yeti_r{rank}.mp3");
    catalog.add_event("Avalanche", 1, true, "events/avalanche_r{rank}_t{team}.mp3");
    catalog.add_event("IceQuake", 3, false, "events/ice_quake_r{rank}.mp3");
    catalog.add_event("HeatSignature", 4, false, "events/heat_signature_r{rank}.mp3");
    catalog.add_event("WhiteOut", 5, true, "events/white_out_r{rank}_t{team}.mp3");
    catalog.add_event("PolarVortex", 6, false, "events/polar_vortex_r{rank}.mp3");
    catalog.add_event("Meltdown", 8, true, "events/meltdown_r{rank}_t{team}.mp3");
    catalog
}

fn jungle() -> ScenarioCatalog {
    let mut catalog = ScenarioCatalog::new("jungle");
    catalog.add_event("Quicksand", 0, false, "events/quicksand_r{rank}.mp3");
    catalog.add_event("VineSnare", 1, true, "events/vine_snare_r{rank}_t{team}.mp3");
    catalog.add_event("Stampede", 2, false, "events/stampede_r{rank}.mp3");
    catalog.add_event("PoisonDart", 3, true, "events/poison_dart_r{rank}_t{team}.mp3");
    catalog.add_event("TempleDrums", 5, false, "events/temple_drums_r{rank}.mp3");
    catalog.add_event("RiverFlood", 7, true, "events/river_flood_r{rank}_t{team}.mp3");
    catalog
}
