//! Album domain: the descriptor wire format, the fetch thread and the
//! per-track duration probe.

mod fetch;
mod model;
pub mod probe;

pub use fetch::*;
pub use model::*;

#[cfg(test)]
mod tests;
