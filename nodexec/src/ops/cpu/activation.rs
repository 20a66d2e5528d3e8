//! Elementwise unary math, activations, Softmax and PRelu.
use anyhow::{anyhow, Result};

use crate::ops::cpu::broadcast::broadcast_shape;
use crate::ops::cpu::elementwise::{binary_broadcast, unary_float, unary_map};
use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{numel, Numeric, Tensor};

fn float_unary(ctx: &ExecContext<'_>, f: impl Fn(f64) -> f64 + Copy) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    Ok(map_float!(ctx, x, t => unary_float(t, f)).into())
}

pub fn abs(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    Ok(map_numeric!(x, t => unary_map(t, |v| v.abs_elem())).into())
}

pub fn neg(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    Ok(map_numeric!(x, t => unary_map(t, |v| v.neg_elem())).into())
}

pub fn identity(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    Ok(ctx.input(0)?.clone().into())
}

pub fn relu(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    Ok(map_numeric!(x, t => relu_typed(t)).into())
}

fn relu_typed<T: Numeric>(x: &Tensor<T>) -> Result<Tensor<T>> {
    unary_map(x, |v| v.max_elem(T::zero()))
}

pub fn exp(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::exp)
}

pub fn log(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::ln)
}

pub fn sqrt(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::sqrt)
}

pub fn reciprocal(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::recip)
}

pub fn floor(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::floor)
}

pub fn ceil(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::ceil)
}

pub fn tanh(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, f64::tanh)
}

pub fn sigmoid(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    float_unary(ctx, |x| {
        if x >= 0.0 {
            1.0 / (1.0 + (-x).exp())
        } else {
            let e = x.exp();
            e / (1.0 + e)
        }
    })
}

pub fn elu(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let alpha = ctx.attrs().float("alpha")? as f64;
    float_unary(ctx, move |x| if x >= 0.0 { x } else { alpha * x.exp_m1() })
}

pub fn leaky_relu(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let alpha = ctx.attrs().float("alpha")? as f64;
    float_unary(ctx, move |x| if x >= 0.0 { x } else { alpha * x })
}

pub fn selu(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let alpha = ctx.attrs().float("alpha")? as f64;
    let gamma = ctx.attrs().float("gamma")? as f64;
    float_unary(ctx, move |x| {
        if x > 0.0 {
            gamma * x
        } else {
            gamma * alpha * x.exp_m1()
        }
    })
}

/// Softmax over the input viewed as 2-D: dimensions before `axis` form the
/// rows and the rest form the columns.
pub fn softmax(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let rank = x.rank();
    let raw = ctx.attrs().int("axis")?;
    let axis = if raw < 0 { raw + rank as i64 } else { raw };
    if axis < 0 || axis > rank as i64 {
        return Err(anyhow!(
            "Softmax axis {} out of range for rank {}",
            raw,
            rank
        ));
    }
    let cols = numel(&x.shape()[axis as usize..]);
    Ok(map_float!(ctx, x, t => softmax_rows(t, cols)).into())
}

fn softmax_rows<T: Numeric>(x: &Tensor<T>, cols: usize) -> Result<Tensor<T>> {
    let mut data = Vec::with_capacity(x.data.len());
    if cols > 0 {
        for row in x.data.chunks(cols) {
            let max = row
                .iter()
                .map(|v| v.to_f64())
                .fold(f64::NEG_INFINITY, f64::max);
            let exps = row
                .iter()
                .map(|v| (v.to_f64() - max).exp())
                .collect::<Vec<_>>();
            let sum = exps.iter().sum::<f64>();
            data.extend(exps.into_iter().map(|e| T::from_f64(e / sum)));
        }
    }
    Tensor::with_shape(data, x.shape().to_vec())
}

/// `x` where positive, `slope * x` elsewhere. The slope broadcasts to the
/// shape of `x`, never the other way round.
pub fn prelu(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let x = ctx.input(0)?;
    let slope = ctx.input(1)?;
    let out_shape = broadcast_shape(x.shape(), slope.shape())
        .map_err(|err| ctx.shape_mismatch(err.to_string()))?;
    if out_shape != x.shape() {
        return Err(ctx.shape_mismatch(format!(
            "slope {:?} does not broadcast to input {:?}",
            slope.shape(),
            x.shape()
        )));
    }
    let out = map_numeric_pair!(ctx, (x, slope), (a, s) => prelu_typed(a, s));
    Ok(out.into())
}

fn prelu_typed<T: Numeric>(x: &Tensor<T>, slope: &Tensor<T>) -> Result<Tensor<T>> {
    binary_broadcast(x, slope, slope.shape(), x.shape(), |v, k| {
        Ok(if v < T::zero() { v.mul_elem(k) } else { v })
    })
}
