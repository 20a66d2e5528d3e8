use anyhow::{anyhow, Result};
use rand::rngs::StdRng;

use crate::error::OpError;
use crate::graph::NodeDef;
use crate::random::RngProvider;
use crate::registry::OpDef;
use crate::tensor::TensorValue;

use super::AttrTable;

/// Everything a kernel sees of one invocation. Inputs are already coerced and
/// attributes already resolved against the op schema.
pub struct ExecContext<'a> {
    op: &'static OpDef,
    node: &'a NodeDef,
    inputs: Vec<TensorValue>,
    attrs: AttrTable,
    rng: &'a dyn RngProvider,
}

impl<'a> ExecContext<'a> {
    pub(crate) fn new(
        op: &'static OpDef,
        node: &'a NodeDef,
        inputs: Vec<TensorValue>,
        attrs: AttrTable,
        rng: &'a dyn RngProvider,
    ) -> Self {
        Self {
            op,
            node,
            inputs,
            attrs,
            rng,
        }
    }

    pub fn op_name(&self) -> &'static str {
        self.op.name
    }

    pub fn node(&self) -> &NodeDef {
        self.node
    }

    pub fn inputs(&self) -> &[TensorValue] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Result<&TensorValue> {
        self.inputs
            .get(index)
            .ok_or_else(|| anyhow!("{}: missing input {}", self.op.name, index))
    }

    pub fn optional_input(&self, index: usize) -> Option<&TensorValue> {
        self.inputs.get(index)
    }

    pub fn attrs(&self) -> &AttrTable {
        &self.attrs
    }

    /// Number of output slots the node declares.
    pub fn output_count(&self) -> usize {
        self.node.outputs.len()
    }

    /// Fresh generator from the run's provider.
    pub fn rng(&self) -> StdRng {
        self.rng.rng()
    }

    pub fn shape_mismatch(&self, detail: impl Into<String>) -> anyhow::Error {
        OpError::shape_mismatch(self.op.name, detail).into()
    }

    pub fn missing_attr(&self, name: &str) -> anyhow::Error {
        OpError::missing_attr(self.op.name, name).into()
    }
}
