//! Tensor container.
//!
//! `Tensor<T>` owns flat row-major storage with shape/stride metadata. Tensors
//! handed to kernels are only ever borrowed; every kernel allocates its output.
use anyhow::{anyhow, Result};

use super::shape::{compute_strides, numel, offset_for};

/// Tensor construction options (shape override).
#[derive(Debug, Clone, Default)]
pub struct TensorOptions {
    /// Optional explicit shape. Defaults to a 1-D shape of the data length.
    pub shape: Option<Vec<usize>>,
}

/// Owned tensor container with shape and stride metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> Tensor<T> {
    /// Build a 1-D tensor from a flat data vector.
    ///
    /// # Example
    /// ```
    /// # use nodexec::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0])?;
    /// assert_eq!(t.shape(), &[3]);
    /// # Ok(()) }
    /// ```
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        Self::from_vec_with_opts(data, TensorOptions::default())
    }

    /// Build a tensor with explicit options.
    pub fn from_vec_with_opts(data: Vec<T>, opts: TensorOptions) -> Result<Self> {
        let shape = match opts.shape {
            Some(shape) => shape,
            None => vec![data.len()],
        };
        let expected = numel(&shape);
        if expected != data.len() {
            return Err(anyhow!(
                "tensor shape {:?} expects {} values, got {}",
                shape,
                expected,
                data.len()
            ));
        }
        let strides = compute_strides(&shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Build a tensor with the given shape.
    ///
    /// # Example
    /// ```
    /// # use nodexec::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::with_shape(vec![0i64; 6], vec![2, 3])?;
    /// assert_eq!(t.strides(), &[3, 1]);
    /// # Ok(()) }
    /// ```
    pub fn with_shape(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        Self::from_vec_with_opts(data, TensorOptions { shape: Some(shape) })
    }

    /// Create a rank-0 tensor from a single value.
    pub fn from_scalar(value: T) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
            strides: Vec::new(),
        }
    }

    /// Return the raw data length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the tensor shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the tensor strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Return the logical element count.
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Access a value by multidimensional indices.
    pub fn get(&self, indices: &[usize]) -> Result<&T> {
        let offset = offset_for(&self.shape, &self.strides, indices)?;
        Ok(&self.data[offset])
    }

    /// Reinterpret the storage under a new shape with the same element count.
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Self::with_shape(self.data, shape)
    }
}

impl<T: Clone> Tensor<T> {
    /// Build a tensor of `shape` with every element set to `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        let data = vec![value; numel(shape)];
        Self {
            data,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    /// Clone the tensor data into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T> From<Vec<T>> for Tensor<T> {
    /// 1-D tensor over `data`.
    fn from(data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        Self {
            data,
            strides: compute_strides(&shape),
            shape,
        }
    }
}
