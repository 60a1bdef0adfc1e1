//! Core data structures: prepared observations and the season lookup.

mod observation;
mod season;

pub use observation::{Granularity, Observation};
pub use season::SeasonMap;
