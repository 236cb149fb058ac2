pub mod bounds;
pub mod ids;
pub mod level;
pub mod time;

// Foundation crate: identifiers, levels and virtual time.
pub use bounds::*;
pub use ids::*;
pub use level::*;
pub use time::*;
