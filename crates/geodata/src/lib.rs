pub mod cache;
pub mod collection;
pub mod error;
pub mod lookup;
pub mod resolver;
pub mod source;

pub use cache::*;
pub use collection::*;
pub use error::*;
pub use lookup::*;
pub use resolver::*;
pub use source::*;
