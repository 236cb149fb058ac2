pub mod catalog;
pub mod engine;
pub mod mode;
pub mod target;

pub use catalog::*;
pub use engine::*;
pub use mode::*;
pub use target::*;
