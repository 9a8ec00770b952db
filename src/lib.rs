//! Battle Sequencer - long-form battle audio for a voice party game
//!
//! Builds a battle experience (intro, alternating soundtrack/event slots,
//! outro) from short pre-rendered audio files and resumes exact playback
//! position across fully stateless invocations: the entire plan travels
//! inside an opaque token the hosting platform echoes back at every track
//! boundary.

pub mod assets;
pub mod catalog;
pub mod model;
pub mod planner;
pub mod resolver;
pub mod session;
pub mod token;

pub use model::{BattleConfig, Directive, PlatformEvent, PlayBehavior};
pub use resolver::{PlaybackResolver, Resolution};
