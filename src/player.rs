//! Playback engine.
//!
//! A dedicated thread owns the decoder backend and every piece of playback
//! state. Commands from the UI and lifecycle events from the decoder arrive
//! through one channel, so the state only ever changes in one place.

mod handle;
mod thread;
mod types;

pub use handle::Player;
pub use types::{DecoderEvent, DecoderEvents, PlayerCmd, PlayerSnapshot, PROGRESS_SCALE};
