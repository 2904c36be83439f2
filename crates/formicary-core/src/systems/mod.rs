//! Systems - logic that operates on components

mod death;
mod metabolism;
mod movement;
mod scheduler;
mod spawning;
mod work;

pub use death::*;
pub use metabolism::*;
pub use movement::*;
pub use scheduler::*;
pub use spawning::*;
pub use work::*;
