use anyhow::{anyhow, Result};

use crate::ops::cpu::broadcast::{broadcast_strides, for_each_broadcast_index};
use crate::tensor::{compute_strides, numel, Numeric, Tensor};

pub fn unary_map<T: Copy, U>(a: &Tensor<T>, f: impl FnMut(T) -> U) -> Result<Tensor<U>> {
    let data = a.data.iter().copied().map(f).collect();
    Tensor::with_shape(data, a.shape().to_vec())
}

/// Map through `f64`, for transcendental functions.
pub fn unary_float<T: Numeric>(a: &Tensor<T>, f: impl Fn(f64) -> f64) -> Result<Tensor<T>> {
    unary_map(a, |value| T::from_f64(f(value.to_f64())))
}

/// Combine two tensors of identical shape.
pub fn binary_same_shape<T: Copy>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    mut f: impl FnMut(T, T) -> Result<T>,
) -> Result<Tensor<T>> {
    if a.shape() != b.shape() {
        return Err(anyhow!(
            "operand shapes {:?} and {:?} differ",
            a.shape(),
            b.shape()
        ));
    }
    let data = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(x, y)| f(*x, *y))
        .collect::<Result<Vec<_>>>()?;
    Tensor::with_shape(data, a.shape().to_vec())
}

/// Combine `a` with `b` viewed as `b_shape`, producing `out_shape`. Both
/// operand shapes must broadcast to `out_shape`.
pub fn binary_broadcast<T: Copy>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    b_shape: &[usize],
    out_shape: &[usize],
    mut f: impl FnMut(T, T) -> Result<T>,
) -> Result<Tensor<T>> {
    if numel(b_shape) != b.numel() {
        return Err(anyhow!(
            "cannot view {:?} as {:?}",
            b.shape(),
            b_shape
        ));
    }
    let rank = out_shape.len();
    let a_strides = broadcast_strides(a.shape(), a.strides(), rank);
    let b_strides = broadcast_strides(b_shape, &compute_strides(b_shape), rank);
    let mut data = Vec::with_capacity(numel(out_shape));
    for_each_broadcast_index(out_shape, &a_strides, &b_strides, |a_offset, b_offset| {
        data.push(f(a.data[a_offset], b.data[b_offset])?);
        Ok(())
    })?;
    Tensor::with_shape(data, out_shape.to_vec())
}
