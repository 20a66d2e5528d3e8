//! Slice and Split. Both copy rectangular blocks out of the input.
use anyhow::{anyhow, Result};

use crate::error::OpError;
use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{bump_index, normalize_axis, Tensor, TensorValue};

/// Copy the block of `x` that starts at `origin` and spans `extent`.
fn block_typed<T: Copy>(x: &Tensor<T>, origin: &[usize], extent: &[usize]) -> Result<Tensor<T>> {
    let total = extent.iter().product::<usize>();
    let mut data = Vec::with_capacity(total);
    if total > 0 {
        let mut index = vec![0usize; extent.len()];
        loop {
            let offset = index
                .iter()
                .zip(origin)
                .zip(x.strides())
                .map(|((i, o), s)| (i + o) * s)
                .sum::<usize>();
            data.push(x.data[offset]);
            if !bump_index(&mut index, extent) {
                break;
            }
        }
    }
    Tensor::with_shape(data, extent.to_vec())
}

fn block(x: &TensorValue, origin: &[usize], extent: &[usize]) -> Result<TensorValue> {
    Ok(map_numeric!(x, t => block_typed(t, origin, extent)))
}

/// Inputs `[data, axes, starts, ends]`; without parameter inputs the bounds
/// come from the `axes`, `starts` and `ends` attributes. Parameter inputs
/// come as a full set or not at all.
pub fn slice(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let given = ctx.inputs().len();
    if given == 2 || given == 3 {
        return Err(OpError::ArityMismatch {
            op: ctx.op_name().to_string(),
            what: "input values",
            expected: "1 (data) or 4 (data, axes, starts, ends)".to_string(),
            actual: given,
        }
        .into());
    }
    let (axes, starts, ends) = if given > 1 {
        (
            param(ctx, 1)?,
            param(ctx, 2)?,
            param(ctx, 3)?,
        )
    } else {
        let attrs = ctx.attrs();
        (
            attrs.opt_ints("axes")?.map(<[i64]>::to_vec),
            attrs.opt_ints("starts")?.map(<[i64]>::to_vec),
            attrs.opt_ints("ends")?.map(<[i64]>::to_vec),
        )
    };
    let starts = starts.ok_or_else(|| ctx.missing_attr("starts"))?;
    let ends = ends.ok_or_else(|| ctx.missing_attr("ends"))?;
    let axes = axes.unwrap_or_else(|| (0..starts.len() as i64).collect());
    if axes.len() != starts.len() || ends.len() != starts.len() {
        return Err(anyhow!(
            "Slice needs one start and end per axis, got {} axes, {} starts, {} ends",
            axes.len(),
            starts.len(),
            ends.len()
        ));
    }

    let rank = x.rank();
    let mut origin = vec![0usize; rank];
    let mut extent = x.shape().to_vec();
    let mut touched = vec![false; rank];
    for ((axis, start), end) in axes.iter().zip(&starts).zip(&ends) {
        let axis = normalize_axis(*axis, rank)?;
        if std::mem::replace(&mut touched[axis], true) {
            return Err(anyhow!("Slice axis {} given more than once", axis));
        }
        let dim = x.shape()[axis];
        let lo = clamp_index(*start, dim);
        let hi = clamp_index(*end, dim);
        origin[axis] = lo;
        extent[axis] = hi.saturating_sub(lo);
    }
    Ok(block(x, &origin, &extent)?.into())
}

fn param(ctx: &ExecContext<'_>, index: usize) -> Result<Option<Vec<i64>>> {
    ctx.optional_input(index)
        .map(TensorValue::to_i64_vec)
        .transpose()
}

/// Resolve a negative index from the end and clamp into `[0, dim]`.
fn clamp_index(index: i64, dim: usize) -> usize {
    let dim = dim as i64;
    let resolved = if index < 0 { index + dim } else { index };
    resolved.clamp(0, dim) as usize
}

/// Split along `axis` into the lengths given by the second input or the
/// `split` attribute, or into one equal part per output slot.
pub fn split(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let axis = normalize_axis(ctx.attrs().int("axis")?, x.rank())?;
    let dim = x.shape()[axis];
    let lengths = match (ctx.optional_input(1), ctx.attrs().opt_ints("split")?) {
        (Some(value), _) => value.to_i64_vec()?,
        (None, Some(split)) => split.to_vec(),
        (None, None) => {
            let parts = ctx.output_count();
            if dim % parts != 0 {
                return Err(ctx.shape_mismatch(format!(
                    "axis {} of extent {} does not split into {} equal parts",
                    axis, dim, parts
                )));
            }
            vec![(dim / parts) as i64; parts]
        }
    };
    if let Some(negative) = lengths.iter().find(|len| **len < 0) {
        return Err(anyhow!("negative split length {}", negative));
    }
    let covered = lengths
        .iter()
        .try_fold(0i64, |acc, len| acc.checked_add(*len))
        .ok_or_else(|| ctx.shape_mismatch(format!("split lengths {:?} overflow", lengths)))?;
    if covered != dim as i64 {
        return Err(ctx.shape_mismatch(format!(
            "split lengths {:?} cover {} of {} elements on axis {}",
            lengths, covered, dim, axis
        )));
    }

    let mut origin = vec![0usize; x.rank()];
    let mut extent = x.shape().to_vec();
    let mut parts = Vec::with_capacity(lengths.len());
    for len in lengths {
        extent[axis] = len as usize;
        parts.push(block(x, &origin, &extent)?);
        origin[axis] += len as usize;
    }
    Ok(OutputValue::Sequence(parts))
}
