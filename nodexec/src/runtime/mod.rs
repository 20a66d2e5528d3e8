//! Single-node dispatch: schema lookup, input coercion, attribute resolution
//! and output packaging around the CPU kernels.
mod attrs;
mod context;
mod input;
mod op_runner;
mod output;

pub use attrs::AttrTable;
pub use context::ExecContext;
pub use input::NodeInput;
pub use op_runner::{run_node, run_node_with, RunOptions};
pub use output::{NodeOutputs, OutputValue};
