//! Generation - procedural creation of the nest and its founding colony.

mod colony;
mod terrain;

pub use colony::*;
pub use terrain::*;
