use anyhow::{anyhow, Result};

use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{bump_index, Numeric, Tensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadMode {
    Constant,
    Edge,
    Reflect,
}

impl PadMode {
    fn parse(mode: &str) -> Result<Self> {
        match mode {
            "constant" => Ok(PadMode::Constant),
            "edge" => Ok(PadMode::Edge),
            "reflect" => Ok(PadMode::Reflect),
            other => Err(anyhow!("unsupported pad mode {:?}", other)),
        }
    }
}

/// `paddings` lists every leading amount first, then every trailing amount:
/// `[b0, b1, .., e0, e1, ..]`.
pub fn pad(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let rank = x.rank();
    let paddings = ctx.attrs().ints("paddings")?;
    if paddings.len() != 2 * rank {
        return Err(ctx.shape_mismatch(format!(
            "paddings has {} entries, rank {} input needs {}",
            paddings.len(),
            rank,
            2 * rank
        )));
    }
    if let Some(negative) = paddings.iter().find(|p| **p < 0) {
        return Err(anyhow!("negative padding {} is not supported", negative));
    }
    let bounds = (0..rank)
        .map(|axis| (paddings[axis] as usize, paddings[axis + rank] as usize))
        .collect::<Vec<_>>();
    let mode = PadMode::parse(ctx.attrs().string("mode")?)?;
    let value = ctx.attrs().float("value")? as f64;
    Ok(map_numeric!(x, t => pad_typed(t, &bounds, mode, value)).into())
}

fn pad_typed<T: Numeric>(
    x: &Tensor<T>,
    bounds: &[(usize, usize)],
    mode: PadMode,
    value: f64,
) -> Result<Tensor<T>> {
    let shape = x.shape();
    if mode != PadMode::Constant {
        for (axis, (before, after)) in bounds.iter().enumerate() {
            let dim = shape[axis];
            let needs = if mode == PadMode::Reflect { 2 } else { 1 };
            if (*before > 0 || *after > 0) && dim < needs {
                return Err(anyhow!(
                    "{:?} padding needs at least {} elements on axis {}, found {}",
                    mode,
                    needs,
                    axis,
                    dim
                ));
            }
        }
    }

    let out_shape = shape
        .iter()
        .zip(bounds)
        .map(|(dim, (before, after))| {
            dim.checked_add(*before)
                .and_then(|grown| grown.checked_add(*after))
                .ok_or_else(|| {
                    anyhow!("padding ({}, {}) overflows axis of extent {}", before, after, dim)
                })
        })
        .collect::<Result<Vec<_>>>()?;
    let fill = T::from_f64(value);
    let total = out_shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
        .filter(|total| {
            total
                .checked_mul(std::mem::size_of::<T>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| anyhow!("padded shape {:?} is too large", out_shape))?;
    let mut data = Vec::with_capacity(total);
    if total > 0 {
        let mut index = vec![0usize; out_shape.len()];
        loop {
            data.push(source_offset(x, bounds, mode, &index).map_or(fill, |offset| x.data[offset]));
            if !bump_index(&mut index, &out_shape) {
                break;
            }
        }
    }
    Tensor::with_shape(data, out_shape)
}

/// Offset into `x` that feeds the output position `index`, or `None` when the
/// position takes the constant fill value.
fn source_offset<T>(
    x: &Tensor<T>,
    bounds: &[(usize, usize)],
    mode: PadMode,
    index: &[usize],
) -> Option<usize> {
    let mut offset = 0;
    for (axis, out) in index.iter().enumerate() {
        let dim = x.shape()[axis] as i64;
        let pos = *out as i64 - bounds[axis].0 as i64;
        let src = if (0..dim).contains(&pos) {
            pos
        } else {
            match mode {
                PadMode::Constant => return None,
                PadMode::Edge => pos.clamp(0, dim - 1),
                PadMode::Reflect => reflect(pos, dim),
            }
        };
        offset += src as usize * x.strides()[axis];
    }
    Some(offset)
}

/// Mirror `pos` into `[0, dim)` without repeating the edge element.
fn reflect(pos: i64, dim: i64) -> i64 {
    let period = 2 * (dim - 1);
    let folded = pos.rem_euclid(period);
    if folded < dim {
        folded
    } else {
        period - folded
    }
}
