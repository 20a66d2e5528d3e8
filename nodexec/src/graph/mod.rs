mod node;
mod types;

pub use node::describe_node;
pub use types::{AttrValue, NodeDef, OpAttr, OpAttrs};
