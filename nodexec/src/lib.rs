//! Execute single ONNX operator nodes on host tensors.
//!
//! A caller describes one operator invocation as a [`NodeDef`], hands
//! [`run_node`] the positional inputs, and gets back the outputs keyed by the
//! node's output names.
//!
//! ```
//! # use nodexec::{run_node, NodeDef, Tensor};
//! # fn main() -> anyhow::Result<()> {
//! let node = NodeDef::new("Sum", ["A", "B"], ["Z"]);
//! let a = Tensor::from_vec(vec![1.0f32, 2.0])?;
//! let b = Tensor::from_vec(vec![10.0f32, 20.0])?;
//! let outputs = run_node(&node, [a, b])?;
//! assert_eq!(outputs.tensor("Z").unwrap().as_f32()?.data, vec![11.0, 22.0]);
//! # Ok(()) }
//! ```
mod error;
mod formatting;
mod graph;
#[doc(hidden)]
pub mod logging;
mod ops;
mod random;
mod registry;
mod runtime;
mod tensor;

pub use error::OpError;
pub use formatting::{format_tensor, format_truncated, FormatValue};
pub use graph::{describe_node, AttrValue, NodeDef, OpAttr, OpAttrs};
pub use ops::Kernel;
pub use random::{EntropyRng, RngProvider, SeededRng};
pub use registry::{op_def, supported_ops, Arity, AttrDefault, OpAttrDef, OpAttrType, OpDef};
pub use runtime::{
    run_node, run_node_with, AttrTable, ExecContext, NodeInput, NodeOutputs, OutputValue,
    RunOptions,
};
pub use tensor::{
    compute_strides, linear_to_indices, normalize_axes, normalize_axis, numel, DType, Numeric,
    Tensor, TensorElement, TensorOptions, TensorValue,
};
