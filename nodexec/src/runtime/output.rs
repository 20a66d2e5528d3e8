use std::collections::hash_map;
use std::collections::HashMap;

use crate::error::OpError;
use crate::graph::NodeDef;
use crate::registry::OpDef;
use crate::tensor::{Tensor, TensorElement, TensorValue};

/// Value a kernel produces for a node.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Tensor(TensorValue),
    /// Ordered tensors, as produced by Split.
    Sequence(Vec<TensorValue>),
}

impl OutputValue {
    pub fn as_tensor(&self) -> Option<&TensorValue> {
        match self {
            OutputValue::Tensor(value) => Some(value),
            OutputValue::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TensorValue]> {
        match self {
            OutputValue::Sequence(values) => Some(values),
            OutputValue::Tensor(_) => None,
        }
    }

    pub fn into_tensor(self) -> Option<TensorValue> {
        match self {
            OutputValue::Tensor(value) => Some(value),
            OutputValue::Sequence(_) => None,
        }
    }
}

impl From<TensorValue> for OutputValue {
    fn from(value: TensorValue) -> Self {
        OutputValue::Tensor(value)
    }
}

impl<T: TensorElement> From<Tensor<T>> for OutputValue {
    fn from(value: Tensor<T>) -> Self {
        OutputValue::Tensor(T::into_value(value))
    }
}

/// Results of one node execution keyed by the node's output slot names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutputs {
    values: HashMap<String, OutputValue>,
}

impl NodeOutputs {
    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.values.get(name)
    }

    /// Borrow a plain tensor output.
    pub fn tensor(&self, name: &str) -> Option<&TensorValue> {
        self.get(name).and_then(OutputValue::as_tensor)
    }

    pub fn sequence(&self, name: &str) -> Option<&[TensorValue]> {
        self.get(name).and_then(OutputValue::as_sequence)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, OutputValue> {
        self.values.iter()
    }

    pub fn into_inner(self) -> HashMap<String, OutputValue> {
        self.values
    }
}

impl IntoIterator for NodeOutputs {
    type Item = (String, OutputValue);
    type IntoIter = hash_map::IntoIter<String, OutputValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeOutputs {
    type Item = (&'a String, &'a OutputValue);
    type IntoIter = hash_map::Iter<'a, String, OutputValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Bind a kernel result to the node's output slots.
///
/// A single slot takes the value as is. A sequence is spread one tensor per
/// slot when the node declares exactly as many slots as it has items.
pub(crate) fn package_outputs(
    op: &OpDef,
    node: &NodeDef,
    value: OutputValue,
) -> Result<NodeOutputs, OpError> {
    let names = &node.outputs;
    let mut values = HashMap::with_capacity(names.len());
    match value {
        value if names.len() == 1 => {
            values.insert(names[0].clone(), value);
        }
        OutputValue::Sequence(items) if items.len() == names.len() => {
            for (name, item) in names.iter().zip(items) {
                values.insert(name.clone(), OutputValue::Tensor(item));
            }
        }
        OutputValue::Sequence(items) => {
            return Err(OpError::ArityMismatch {
                op: op.name.to_string(),
                what: "outputs",
                expected: format!("1 or {}", items.len()),
                actual: names.len(),
            });
        }
        OutputValue::Tensor(_) => {
            return Err(OpError::ArityMismatch {
                op: op.name.to_string(),
                what: "outputs",
                expected: "exactly 1".to_string(),
                actual: names.len(),
            });
        }
    }
    if values.len() != names.len() {
        return Err(OpError::ArityMismatch {
            op: op.name.to_string(),
            what: "distinct output names",
            expected: names.len().to_string(),
            actual: values.len(),
        });
    }
    Ok(NodeOutputs { values })
}
