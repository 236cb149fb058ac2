pub mod base;
pub mod graph;
pub mod node;

pub use base::*;
pub use graph::*;
pub use node::*;

/// Navigation seam used by consumers that steer the graph without owning it.
pub trait Navigate {
    fn go_to(&mut self, id: &str);
    fn current_id(&self) -> &str;
    fn root_id(&self) -> &str;
}
