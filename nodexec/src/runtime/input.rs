use crate::error::OpError;
use crate::registry::OpDef;
use crate::tensor::{Tensor, TensorElement, TensorValue};

/// Positional input supplied to `run_node`.
///
/// Plain integer or float lists stand in for 1-D tensors, which is how
/// parameter inputs such as Slice bounds are usually written.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeInput {
    Tensor(TensorValue),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
}

impl From<TensorValue> for NodeInput {
    fn from(value: TensorValue) -> Self {
        NodeInput::Tensor(value)
    }
}

impl<T: TensorElement> From<Tensor<T>> for NodeInput {
    fn from(value: Tensor<T>) -> Self {
        NodeInput::Tensor(T::into_value(value))
    }
}

impl From<Vec<i64>> for NodeInput {
    fn from(value: Vec<i64>) -> Self {
        NodeInput::Ints(value)
    }
}

impl From<&[i64]> for NodeInput {
    fn from(value: &[i64]) -> Self {
        NodeInput::Ints(value.to_vec())
    }
}

impl From<Vec<f32>> for NodeInput {
    fn from(value: Vec<f32>) -> Self {
        NodeInput::Floats(value)
    }
}

impl From<&[f32]> for NodeInput {
    fn from(value: &[f32]) -> Self {
        NodeInput::Floats(value.to_vec())
    }
}

/// Turn positional inputs into tensors. Data inputs keep their dtype;
/// parameter inputs become exact i64 tensors.
pub(crate) fn coerce_inputs(op: &OpDef, inputs: Vec<NodeInput>) -> Result<Vec<TensorValue>, OpError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| match op.param_inputs_from {
            Some(first) if index >= first => coerce_param(op, index, input),
            _ => Ok(coerce_data(input)),
        })
        .collect()
}

fn coerce_data(input: NodeInput) -> TensorValue {
    match input {
        NodeInput::Tensor(value) => value,
        NodeInput::Ints(values) => TensorValue::I64(Tensor::from(values)),
        NodeInput::Floats(values) => TensorValue::F32(Tensor::from(values)),
    }
}

fn coerce_param(op: &OpDef, index: usize, input: NodeInput) -> Result<TensorValue, OpError> {
    let value = match input {
        NodeInput::Ints(values) => return Ok(TensorValue::I64(Tensor::from(values))),
        NodeInput::Tensor(TensorValue::I64(tensor)) => return Ok(TensorValue::I64(tensor)),
        NodeInput::Tensor(value) => value,
        NodeInput::Floats(values) => TensorValue::F32(Tensor::from(values)),
    };
    let invalid = |reason: String| OpError::InputCoercion {
        op: op.name.to_string(),
        index,
        expected: "integer parameters",
        reason,
    };
    let data = value.to_i64_vec().map_err(|err| invalid(err.to_string()))?;
    Tensor::with_shape(data, value.shape().to_vec())
        .map(TensorValue::I64)
        .map_err(|err| invalid(err.to_string()))
}
