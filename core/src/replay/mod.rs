//! Command recording and timed playback
//!
//! - **Recorder**: captures replayable commands as they execute
//! - **Player**: re-enqueues a captured session at its original pacing

mod player;
mod recorder;
mod session;

pub use player::{Player, PlayerConfig};
pub use recorder::Recorder;
pub use session::RecordedSession;
