//! Layout operators: Reshape, Transpose, Squeeze, Unsqueeze, Flatten, Concat.
use anyhow::{anyhow, Result};

use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{bump_index, normalize_axes, normalize_axis, numel, Tensor, TensorValue};

/// Replace the shape metadata of `value`, keeping element order.
fn with_shape(value: &TensorValue, shape: Vec<usize>) -> Result<TensorValue> {
    Ok(map_numeric!(value, t => t.clone().reshape(shape.clone())))
}

/// Shape from the optional second input, else from the `shape` attribute.
pub fn reshape(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let target = match ctx.optional_input(1) {
        Some(shape) => shape.to_i64_vec()?,
        None => ctx
            .attrs()
            .opt_ints("shape")?
            .ok_or_else(|| ctx.missing_attr("shape"))?
            .to_vec(),
    };
    let shape = resolve_reshape(x.shape(), &target).map_err(|err| ctx.shape_mismatch(err.to_string()))?;
    Ok(with_shape(x, shape)?.into())
}

/// `0` copies the input extent at the same position; a single `-1` is
/// inferred from the remaining element count.
pub fn resolve_reshape(input: &[usize], target: &[i64]) -> Result<Vec<usize>> {
    let mut shape = Vec::with_capacity(target.len());
    let mut inferred = None;
    for (idx, dim) in target.iter().enumerate() {
        match *dim {
            -1 if inferred.is_none() => {
                inferred = Some(idx);
                shape.push(1);
            }
            -1 => return Err(anyhow!("reshape target {:?} has more than one -1", target)),
            0 => {
                let copied = input
                    .get(idx)
                    .ok_or_else(|| anyhow!("reshape target {:?} copies missing dim {}", target, idx))?;
                shape.push(*copied);
            }
            d if d > 0 => shape.push(d as usize),
            d => return Err(anyhow!("invalid reshape dim {}", d)),
        }
    }
    let total = numel(input);
    if let Some(idx) = inferred {
        let known = numel(&shape);
        if known == 0 || total % known != 0 {
            return Err(anyhow!(
                "cannot infer -1 in {:?} for {} elements",
                target,
                total
            ));
        }
        shape[idx] = total / known;
    }
    if numel(&shape) != total {
        return Err(anyhow!(
            "cannot reshape {:?} ({} elements) to {:?}",
            input,
            total,
            shape
        ));
    }
    Ok(shape)
}

/// Reverse the axes unless `perm` says otherwise.
pub fn transpose(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let rank = x.rank();
    let perm = match ctx.attrs().opt_ints("perm")? {
        Some(raw) => {
            let perm = raw
                .iter()
                .map(|axis| normalize_axis(*axis, rank))
                .collect::<Result<Vec<_>>>()?;
            let mut seen = perm.clone();
            seen.sort_unstable();
            seen.dedup();
            if perm.len() != rank || seen.len() != rank {
                return Err(anyhow!("perm {:?} is not a permutation of rank {}", raw, rank));
            }
            perm
        }
        None => (0..rank).rev().collect(),
    };
    Ok(map_numeric!(x, t => transpose_typed(t, &perm)).into())
}

fn transpose_typed<T: Copy>(x: &Tensor<T>, perm: &[usize]) -> Result<Tensor<T>> {
    let out_shape = perm.iter().map(|axis| x.shape()[*axis]).collect::<Vec<_>>();
    let src_strides = perm.iter().map(|axis| x.strides()[*axis]).collect::<Vec<_>>();
    let mut data = Vec::with_capacity(x.data.len());
    if !x.data.is_empty() {
        let mut index = vec![0usize; out_shape.len()];
        loop {
            let offset = index.iter().zip(&src_strides).map(|(i, s)| i * s).sum::<usize>();
            data.push(x.data[offset]);
            if !bump_index(&mut index, &out_shape) {
                break;
            }
        }
    }
    Tensor::with_shape(data, out_shape)
}

/// Drop the listed extent-1 axes, or every extent-1 axis when none are listed.
pub fn squeeze(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let axes = match ctx.attrs().opt_ints("axes")? {
        Some(raw) => {
            let axes = normalize_axes(raw, x.rank())?;
            if let Some(axis) = axes.iter().find(|axis| x.shape()[**axis] != 1) {
                return Err(ctx.shape_mismatch(format!(
                    "cannot squeeze axis {} of extent {}",
                    axis,
                    x.shape()[*axis]
                )));
            }
            axes
        }
        None => (0..x.rank()).filter(|axis| x.shape()[*axis] == 1).collect(),
    };
    let shape = x
        .shape()
        .iter()
        .enumerate()
        .filter(|(idx, _)| !axes.contains(idx))
        .map(|(_, dim)| *dim)
        .collect();
    Ok(with_shape(x, shape)?.into())
}

/// Insert extent-1 axes at the listed positions of the output.
pub fn unsqueeze(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let raw = ctx.attrs().ints("axes")?;
    let out_rank = x.rank() + raw.len();
    let axes = normalize_axes(raw, out_rank)?;
    if axes.len() != raw.len() {
        return Err(anyhow!("Unsqueeze axes {:?} repeat an axis", raw));
    }
    let mut dims = x.shape().iter();
    let shape = (0..out_rank)
        .map(|axis| {
            if axes.contains(&axis) {
                1
            } else {
                dims.next().copied().unwrap_or(1)
            }
        })
        .collect();
    Ok(with_shape(x, shape)?.into())
}

/// Collapse into 2-D around `axis`.
pub fn flatten(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let rank = x.rank();
    let raw = ctx.attrs().int("axis")?;
    let axis = if raw < 0 { raw + rank as i64 } else { raw };
    if axis < 0 || axis > rank as i64 {
        return Err(anyhow!("Flatten axis {} out of range for rank {}", raw, rank));
    }
    let (outer, inner) = x.shape().split_at(axis as usize);
    Ok(with_shape(x, vec![numel(outer), numel(inner)])?.into())
}

/// Join inputs along `axis`; every other extent must agree.
pub fn concat(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let inputs = ctx.inputs();
    let first = ctx.input(0)?;
    let rank = first.rank();
    let axis = normalize_axis(ctx.attrs().int("axis")?, rank)?;
    for (idx, value) in inputs.iter().enumerate().skip(1) {
        if value.dtype() != first.dtype() {
            return Err(anyhow!(
                "Concat input {} is {}, expected {}",
                idx,
                value.dtype(),
                first.dtype()
            ));
        }
        let compatible = value.rank() == rank
            && value
                .shape()
                .iter()
                .zip(first.shape())
                .enumerate()
                .all(|(dim, (a, b))| dim == axis || a == b);
        if !compatible {
            return Err(ctx.shape_mismatch(format!(
                "input {} has shape {:?}, incompatible with {:?} along axis {}",
                idx,
                value.shape(),
                first.shape(),
                axis
            )));
        }
    }
    Ok(map_numeric!(first, t => concat_typed(t, inputs, axis)).into())
}

fn concat_typed<T: crate::tensor::Numeric>(
    first: &Tensor<T>,
    inputs: &[TensorValue],
    axis: usize,
) -> Result<Tensor<T>> {
    let parts = inputs
        .iter()
        .map(|value| {
            T::from_value(value).ok_or_else(|| anyhow!("expected {} input", T::DTYPE))
        })
        .collect::<Result<Vec<_>>>()?;
    let outer = numel(&first.shape()[..axis]);
    let mut shape = first.shape().to_vec();
    shape[axis] = parts.iter().map(|part| part.shape()[axis]).sum();
    let mut data = Vec::with_capacity(numel(&shape));
    for row in 0..outer {
        for part in &parts {
            let chunk = numel(&part.shape()[axis..]);
            data.extend_from_slice(&part.data[row * chunk..(row + 1) * chunk]);
        }
    }
    Tensor::with_shape(data, shape)
}
