//! Process-wide operator table.
//!
//! `OPS` is a static slice; `op_def` looks names up through an index built
//! once on first use. Nothing mutates either after initialization.
use std::collections::HashMap;

use once_cell::sync::Lazy;

mod op_attrs;
mod op_defs;

pub use op_attrs::{AttrDefault, OpAttrDef, OpAttrType};
pub use op_defs::{Arity, OpDef, OPS};

static OP_INDEX: Lazy<HashMap<&'static str, &'static OpDef>> =
    Lazy::new(|| OPS.iter().map(|op| (op.name, op)).collect());

/// Look up an operator by its exact (case-sensitive) ONNX name.
pub fn op_def(name: &str) -> Option<&'static OpDef> {
    OP_INDEX.get(name).copied()
}

/// Names of every registered operator, in table order.
pub fn supported_ops() -> impl Iterator<Item = &'static str> {
    OPS.iter().map(|op| op.name)
}
