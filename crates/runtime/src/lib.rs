pub mod generation;
pub mod timers;

pub use generation::*;
pub use timers::*;
