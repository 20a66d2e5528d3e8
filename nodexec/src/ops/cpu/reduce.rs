use anyhow::{anyhow, Result};

use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{bump_index, compute_strides, normalize_axes, numel, Numeric, Tensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReduceOp {
    Sum,
    Mean,
    Max,
    Min,
    Prod,
    LogSumExp,
}

pub fn reduce_sum(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::Sum)
}

pub fn reduce_mean(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::Mean)
}

pub fn reduce_max(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::Max)
}

pub fn reduce_min(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::Min)
}

pub fn reduce_prod(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::Prod)
}

pub fn reduce_log_sum_exp(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    reduce_kernel(ctx, ReduceOp::LogSumExp)
}

/// Reduce over `axes` (every axis when absent). `keepdims` leaves the reduced
/// axes in place with extent 1.
fn reduce_kernel(ctx: &ExecContext<'_>, op: ReduceOp) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let rank = x.rank();
    let axes = match ctx.attrs().opt_ints("axes")? {
        Some(raw) => normalize_axes(raw, rank)?,
        None => (0..rank).collect(),
    };
    let keepdims = ctx.attrs().int("keepdims")? != 0;
    let out = if op == ReduceOp::LogSumExp {
        map_float!(ctx, x, t => reduce_typed(t, &axes, keepdims, op))
    } else {
        map_numeric!(x, t => reduce_typed(t, &axes, keepdims, op))
    };
    Ok(out.into())
}

pub fn output_shape(shape: &[usize], axes: &[usize], keepdims: bool) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter_map(|(idx, dim)| match (axes.contains(&idx), keepdims) {
            (false, _) => Some(*dim),
            (true, true) => Some(1),
            (true, false) => None,
        })
        .collect()
}

/// Number of input elements folded into each output element.
pub fn reduce_count(shape: &[usize], axes: &[usize]) -> usize {
    axes.iter().map(|axis| shape[*axis]).product()
}

/// Fold every input element into the output slot it reduces to. `f` receives
/// the slot index, the running accumulator and the element.
fn fold_axes<T: Copy, A: Copy>(
    x: &Tensor<T>,
    axes: &[usize],
    init: A,
    mut f: impl FnMut(usize, A, T) -> A,
) -> Vec<A> {
    let kept = output_shape(x.shape(), axes, true);
    let mut acc = vec![init; numel(&kept)];
    if x.data.is_empty() {
        return acc;
    }
    // reduced axes contribute nothing to the slot offset
    let mut slot_strides = compute_strides(&kept);
    for axis in axes {
        slot_strides[*axis] = 0;
    }
    let mut index = vec![0usize; x.rank()];
    for value in &x.data {
        let slot = index
            .iter()
            .zip(&slot_strides)
            .map(|(i, s)| i * s)
            .sum::<usize>();
        acc[slot] = f(slot, acc[slot], *value);
        bump_index(&mut index, x.shape());
    }
    acc
}

fn reduce_typed<T: Numeric>(
    x: &Tensor<T>,
    axes: &[usize],
    keepdims: bool,
    op: ReduceOp,
) -> Result<Tensor<T>> {
    let count = reduce_count(x.shape(), axes);
    if count == 0 && matches!(op, ReduceOp::Max | ReduceOp::Min) {
        return Err(anyhow!("cannot take the extremum of an empty axis"));
    }
    let data = match op {
        ReduceOp::Sum => fold_axes(x, axes, T::zero(), |_, acc, v| acc.add_elem(v)),
        ReduceOp::Prod => fold_axes(x, axes, T::one(), |_, acc, v| acc.mul_elem(v)),
        ReduceOp::Max => fold_axes(x, axes, None, |_, acc: Option<T>, v| {
            Some(acc.map_or(v, |a| a.max_elem(v)))
        })
        .into_iter()
        .map(|v| v.unwrap_or_else(T::zero))
        .collect(),
        ReduceOp::Min => fold_axes(x, axes, None, |_, acc: Option<T>, v| {
            Some(acc.map_or(v, |a| a.min_elem(v)))
        })
        .into_iter()
        .map(|v| v.unwrap_or_else(T::zero))
        .collect(),
        ReduceOp::Mean => {
            let divisor = T::from_f64(count as f64);
            fold_axes(x, axes, T::zero(), |_, acc, v| acc.add_elem(v))
                .into_iter()
                .map(|sum| {
                    sum.div_elem(divisor)
                        .ok_or_else(|| anyhow!("mean over an empty axis"))
                })
                .collect::<Result<Vec<_>>>()?
        }
        ReduceOp::LogSumExp => {
            let maxima = fold_axes(x, axes, f64::NEG_INFINITY, |_, acc, v| acc.max(v.to_f64()));
            let sums = fold_axes(x, axes, 0.0f64, |slot, acc, v| {
                acc + (v.to_f64() - finite_or_zero(maxima[slot])).exp()
            });
            sums.iter()
                .zip(&maxima)
                .map(|(sum, max)| T::from_f64(finite_or_zero(*max) + sum.ln()))
                .collect()
        }
    };
    Tensor::with_shape(data, output_shape(x.shape(), axes, keepdims))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
