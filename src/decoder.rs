//! Decoder backend seam between the player and the audio output.
//!
//! The player drives playback exclusively through [`Decoder`]; the
//! production backend is rodio. Loading is asynchronous: [`Decoder::load`]
//! returns at once and the outcome arrives later as a lifecycle event.

mod sink;

pub use sink::RodioDecoder;

use std::time::Duration;

use thiserror::Error;

use crate::album::{FetchError, Track};

/// Why a source could not be brought to readiness.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("undecodable source: {0}")]
    Decode(String),
}

pub trait Decoder {
    /// Abort any in-flight load and drop the current source.
    fn reset(&mut self);
    /// Begin loading `track`; reports `Prepared` or `Failed` later.
    fn load(&mut self, track: &Track);
    /// Start or resume the transport. Only valid on a prepared source.
    fn start(&mut self);
    /// Pause the transport, keeping the position.
    fn pause(&mut self);
    /// Reposition to `position`; reports `SeekComplete` when done.
    fn seek(&mut self, position: Duration);
    /// Current transport position.
    fn position(&self) -> Duration;
    /// Total source duration, when the backend knows it.
    fn duration(&self) -> Option<Duration>;
    /// Give up the audio device; the decoder is unusable afterwards.
    fn release(&mut self);
}
