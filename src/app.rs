//! Application state and model.
//!
//! [`App`] holds everything the UI renders: the fetched album, the cursor,
//! the latest playback snapshot and small bits of interaction state.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
