use anyhow::{anyhow, Result};

use crate::tensor::bump_index;

/// NumPy-style broadcast of two shapes, aligned from the trailing dimension.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    (0..rank)
        .map(|axis| {
            let lhs = aligned_dim(a, rank, axis);
            let rhs = aligned_dim(b, rank, axis);
            match (lhs, rhs) {
                _ if lhs == rhs => Ok(lhs),
                (1, other) | (other, 1) => Ok(other),
                _ => Err(anyhow!(
                    "cannot broadcast {:?} with {:?}: dims {} and {} differ",
                    a,
                    b,
                    lhs,
                    rhs
                )),
            }
        })
        .collect()
}

/// Strides of `shape` viewed at rank `rank`: leading and extent-1 axes step by
/// zero so they repeat.
pub fn broadcast_strides(shape: &[usize], strides: &[usize], rank: usize) -> Vec<usize> {
    let offset = rank.saturating_sub(shape.len());
    (0..rank)
        .map(|axis| match axis.checked_sub(offset) {
            Some(src) if shape[src] != 1 => strides[src],
            _ => 0,
        })
        .collect()
}

/// Rank-extended shape for the legacy `broadcast=1, axis=k` form: `operand`
/// is lined up with dimension `axis` of a rank-`rank` tensor and padded with
/// trailing ones.
pub fn align_at_axis(operand: &[usize], rank: usize, axis: i64) -> Result<Vec<usize>> {
    let start = if axis < 0 { axis + rank as i64 } else { axis };
    if start < 0 || start as usize + operand.len() > rank {
        return Err(anyhow!(
            "operand of shape {:?} does not fit at axis {} of a rank {} tensor",
            operand,
            axis,
            rank
        ));
    }
    let trailing = rank - start as usize - operand.len();
    let mut shape = operand.to_vec();
    shape.extend(std::iter::repeat(1).take(trailing));
    Ok(shape)
}

/// Visit every position of `out_shape` with the matching offsets into two
/// broadcast operands. Output positions are visited in row-major order.
pub fn for_each_broadcast_index(
    out_shape: &[usize],
    a_strides: &[usize],
    b_strides: &[usize],
    mut f: impl FnMut(usize, usize) -> Result<()>,
) -> Result<()> {
    if out_shape.iter().any(|dim| *dim == 0) {
        return Ok(());
    }
    let mut index = vec![0usize; out_shape.len()];
    loop {
        f(dot(&index, a_strides), dot(&index, b_strides))?;
        if !bump_index(&mut index, out_shape) {
            return Ok(());
        }
    }
}

fn aligned_dim(shape: &[usize], rank: usize, axis: usize) -> usize {
    let offset = rank - shape.len();
    if axis < offset {
        1
    } else {
        shape[axis - offset]
    }
}

fn dot(index: &[usize], strides: &[usize]) -> usize {
    index.iter().zip(strides).map(|(i, s)| i * s).sum()
}
