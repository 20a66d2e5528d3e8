//! CPU kernels.
//!
//! Kernels borrow their inputs from the `ExecContext` and allocate a fresh
//! output. Dtype dispatch goes through the macros below, which expand the
//! body once per supported element type.

/// Apply `$body` to the typed tensor inside a `TensorValue`. `$body` yields
/// `anyhow::Result<Tensor<T>>` for the same `T`.
macro_rules! map_numeric {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            $crate::tensor::TensorValue::F32($t) => $crate::tensor::TensorValue::F32($body?),
            $crate::tensor::TensorValue::F64($t) => $crate::tensor::TensorValue::F64($body?),
            $crate::tensor::TensorValue::I32($t) => $crate::tensor::TensorValue::I32($body?),
            $crate::tensor::TensorValue::I64($t) => $crate::tensor::TensorValue::I64($body?),
        }
    };
}

/// Like `map_numeric!` but rejects integer tensors.
macro_rules! map_float {
    ($ctx:expr, $value:expr, $t:ident => $body:expr) => {
        match $value {
            $crate::tensor::TensorValue::F32($t) => $crate::tensor::TensorValue::F32($body?),
            $crate::tensor::TensorValue::F64($t) => $crate::tensor::TensorValue::F64($body?),
            other => {
                return Err(anyhow::anyhow!(
                    "{} does not support {} tensors",
                    $ctx.op_name(),
                    other.dtype()
                ))
            }
        }
    };
}

/// Dispatch two values that must share a dtype.
macro_rules! map_numeric_pair {
    ($ctx:expr, ($a:expr, $b:expr), ($x:ident, $y:ident) => $body:expr) => {
        match ($a, $b) {
            ($crate::tensor::TensorValue::F32($x), $crate::tensor::TensorValue::F32($y)) => {
                $crate::tensor::TensorValue::F32($body?)
            }
            ($crate::tensor::TensorValue::F64($x), $crate::tensor::TensorValue::F64($y)) => {
                $crate::tensor::TensorValue::F64($body?)
            }
            ($crate::tensor::TensorValue::I32($x), $crate::tensor::TensorValue::I32($y)) => {
                $crate::tensor::TensorValue::I32($body?)
            }
            ($crate::tensor::TensorValue::I64($x), $crate::tensor::TensorValue::I64($y)) => {
                $crate::tensor::TensorValue::I64($body?)
            }
            (lhs, rhs) => {
                return Err(anyhow::anyhow!(
                    "{} operands must share a dtype, got {} and {}",
                    $ctx.op_name(),
                    lhs.dtype(),
                    rhs.dtype()
                ))
            }
        }
    };
}

pub mod activation;
pub mod arithmetic;
pub mod broadcast;
pub mod elementwise;
pub mod pad;
pub mod random;
pub mod reduce;
pub mod shape;
pub mod slice;
