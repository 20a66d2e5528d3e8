mod shape;
mod tensor;
mod value;

pub use shape::{compute_strides, linear_to_indices, normalize_axes, normalize_axis, numel};
pub(crate) use shape::bump_index;
pub use tensor::{Tensor, TensorOptions};
pub use value::{DType, Numeric, TensorElement, TensorValue};
