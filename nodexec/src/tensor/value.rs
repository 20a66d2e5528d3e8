use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{numel, Tensor};

/// Supported element dtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
}

impl DType {
    /// Parse a dtype from its identifier string.
    pub fn from_ident(ident: &str) -> Result<Self> {
        match ident {
            "f32" | "float" | "FLOAT" => Ok(DType::F32),
            "f64" | "double" | "DOUBLE" => Ok(DType::F64),
            "i32" | "int32" | "INT32" => Ok(DType::I32),
            "i64" | "int64" | "INT64" => Ok(DType::I64),
            _ => Err(anyhow!("unsupported dtype {}", ident)),
        }
    }

    /// Map an ONNX `TensorProto.DataType` code.
    pub fn from_onnx(code: i64) -> Result<Self> {
        match code {
            1 => Ok(DType::F32),
            6 => Ok(DType::I32),
            7 => Ok(DType::I64),
            11 => Ok(DType::F64),
            _ => Err(anyhow!("unsupported onnx data type code {}", code)),
        }
    }

    /// ONNX `TensorProto.DataType` code for this dtype.
    pub fn onnx_code(self) -> i64 {
        match self {
            DType::F32 => 1,
            DType::I32 => 6,
            DType::I64 => 7,
            DType::F64 => 11,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
        };
        write!(f, "{}", name)
    }
}

/// Element type that can be converted to/from `TensorValue`.
pub trait TensorElement: Sized + Clone {
    const DTYPE: DType;
    /// Borrow a typed tensor out of a generic value.
    fn from_value(value: &TensorValue) -> Option<&Tensor<Self>>;
    /// Wrap a typed tensor into a generic value.
    fn into_value(tensor: Tensor<Self>) -> TensorValue;
}

/// Arithmetic shared by every supported element type.
///
/// Float kernels that need transcendental functions go through `to_f64` /
/// `from_f64`; integer arithmetic wraps on overflow.
pub trait Numeric: TensorElement + Copy + PartialOrd + std::fmt::Debug + Send + Sync + 'static {
    fn zero() -> Self;
    fn one() -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
    fn add_elem(self, rhs: Self) -> Self;
    fn sub_elem(self, rhs: Self) -> Self;
    fn mul_elem(self, rhs: Self) -> Self;
    /// `None` on integer division by zero.
    fn div_elem(self, rhs: Self) -> Option<Self>;
    fn neg_elem(self) -> Self;
    fn abs_elem(self) -> Self;
    fn max_elem(self, rhs: Self) -> Self {
        if rhs > self {
            rhs
        } else {
            self
        }
    }
    fn min_elem(self, rhs: Self) -> Self {
        if rhs < self {
            rhs
        } else {
            self
        }
    }
}

macro_rules! impl_tensor_element {
    ($ty:ty, $variant:ident) => {
        impl TensorElement for $ty {
            const DTYPE: DType = DType::$variant;

            fn from_value(value: &TensorValue) -> Option<&Tensor<Self>> {
                match value {
                    TensorValue::$variant(tensor) => Some(tensor),
                    _ => None,
                }
            }

            fn into_value(tensor: Tensor<Self>) -> TensorValue {
                TensorValue::$variant(tensor)
            }
        }

        impl From<Tensor<$ty>> for TensorValue {
            fn from(value: Tensor<$ty>) -> Self {
                TensorValue::$variant(value)
            }
        }
    };
}

impl_tensor_element!(f32, F32);
impl_tensor_element!(f64, F64);
impl_tensor_element!(i32, I32);
impl_tensor_element!(i64, I64);

macro_rules! impl_numeric_float {
    ($ty:ty) => {
        impl Numeric for $ty {
            fn zero() -> Self {
                0.0
            }
            fn one() -> Self {
                1.0
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
            fn add_elem(self, rhs: Self) -> Self {
                self + rhs
            }
            fn sub_elem(self, rhs: Self) -> Self {
                self - rhs
            }
            fn mul_elem(self, rhs: Self) -> Self {
                self * rhs
            }
            fn div_elem(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }
            fn neg_elem(self) -> Self {
                -self
            }
            fn abs_elem(self) -> Self {
                self.abs()
            }
        }
    };
}

macro_rules! impl_numeric_int {
    ($ty:ty) => {
        impl Numeric for $ty {
            fn zero() -> Self {
                0
            }
            fn one() -> Self {
                1
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
            fn add_elem(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn sub_elem(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn mul_elem(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn div_elem(self, rhs: Self) -> Option<Self> {
                if rhs == 0 {
                    None
                } else {
                    Some(self.wrapping_div(rhs))
                }
            }
            fn neg_elem(self) -> Self {
                self.wrapping_neg()
            }
            fn abs_elem(self) -> Self {
                self.wrapping_abs()
            }
        }
    };
}

impl_numeric_float!(f32);
impl_numeric_float!(f64);
impl_numeric_int!(i32);
impl_numeric_int!(i64);

/// Dynamically typed tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    F32(Tensor<f32>),
    F64(Tensor<f64>),
    I32(Tensor<i32>),
    I64(Tensor<i64>),
}

impl TensorValue {
    /// Return the dtype of this value.
    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::F32(_) => DType::F32,
            TensorValue::F64(_) => DType::F64,
            TensorValue::I32(_) => DType::I32,
            TensorValue::I64(_) => DType::I64,
        }
    }

    /// Return the tensor shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            TensorValue::F32(tensor) => tensor.shape(),
            TensorValue::F64(tensor) => tensor.shape(),
            TensorValue::I32(tensor) => tensor.shape(),
            TensorValue::I64(tensor) => tensor.shape(),
        }
    }

    /// Return the logical element count.
    pub fn len(&self) -> usize {
        numel(self.shape())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Borrow as an f32 tensor.
    pub fn as_f32(&self) -> Result<&Tensor<f32>> {
        match self {
            TensorValue::F32(tensor) => Ok(tensor),
            _ => Err(anyhow!("expected f32 tensor, got {}", self.dtype())),
        }
    }

    /// Borrow as an f64 tensor.
    pub fn as_f64(&self) -> Result<&Tensor<f64>> {
        match self {
            TensorValue::F64(tensor) => Ok(tensor),
            _ => Err(anyhow!("expected f64 tensor, got {}", self.dtype())),
        }
    }

    /// Borrow as an i32 tensor.
    pub fn as_i32(&self) -> Result<&Tensor<i32>> {
        match self {
            TensorValue::I32(tensor) => Ok(tensor),
            _ => Err(anyhow!("expected i32 tensor, got {}", self.dtype())),
        }
    }

    /// Borrow as an i64 tensor.
    pub fn as_i64(&self) -> Result<&Tensor<i64>> {
        match self {
            TensorValue::I64(tensor) => Ok(tensor),
            _ => Err(anyhow!("expected i64 tensor, got {}", self.dtype())),
        }
    }

    /// Copy the elements out as f64 (exact for every supported dtype except
    /// i64 values beyond 2^53).
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            TensorValue::F32(tensor) => tensor.data.iter().map(|v| *v as f64).collect(),
            TensorValue::F64(tensor) => tensor.data.clone(),
            TensorValue::I32(tensor) => tensor.data.iter().map(|v| *v as f64).collect(),
            TensorValue::I64(tensor) => tensor.data.iter().map(|v| *v as f64).collect(),
        }
    }

    /// Copy the elements out as i64. Float elements must be integral; nothing
    /// is rounded.
    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        match self {
            TensorValue::I32(tensor) => Ok(tensor.data.iter().map(|v| *v as i64).collect()),
            TensorValue::I64(tensor) => Ok(tensor.data.clone()),
            TensorValue::F32(tensor) => integral_values(tensor.data.iter().map(|v| *v as f64)),
            TensorValue::F64(tensor) => integral_values(tensor.data.iter().copied()),
        }
    }
}

fn integral_values(values: impl Iterator<Item = f64>) -> Result<Vec<i64>> {
    values
        .map(|value| {
            if value.fract() == 0.0 && value.is_finite() && value.abs() <= i64::MAX as f64 {
                Ok(value as i64)
            } else {
                Err(anyhow!("value {} is not an integer", value))
            }
        })
        .collect()
}
