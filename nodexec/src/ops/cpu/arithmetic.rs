//! Binary arithmetic and n-ary accumulation.
use anyhow::{anyhow, Result};

use crate::ops::cpu::broadcast::{align_at_axis, broadcast_shape};
use crate::ops::cpu::elementwise::{binary_broadcast, binary_same_shape};
use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{Numeric, Tensor, TensorValue};

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply<T: Numeric>(self, x: T, y: T) -> Result<T> {
        match self {
            BinaryOp::Add => Ok(x.add_elem(y)),
            BinaryOp::Sub => Ok(x.sub_elem(y)),
            BinaryOp::Mul => Ok(x.mul_elem(y)),
            BinaryOp::Div => x
                .div_elem(y)
                .ok_or_else(|| anyhow!("integer division by zero")),
            BinaryOp::Pow => Ok(T::from_f64(x.to_f64().powf(y.to_f64()))),
        }
    }
}

pub fn add(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    binary_kernel(ctx, BinaryOp::Add)
}

pub fn sub(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    binary_kernel(ctx, BinaryOp::Sub)
}

pub fn mul(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    binary_kernel(ctx, BinaryOp::Mul)
}

pub fn div(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    binary_kernel(ctx, BinaryOp::Div)
}

pub fn pow(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    binary_kernel(ctx, BinaryOp::Pow)
}

/// Shapes must match unless the node sets `broadcast=1`. With broadcasting on,
/// an `axis` attribute lines the second operand up with that dimension of the
/// first; without it both operands broadcast NumPy-style.
fn binary_kernel(ctx: &ExecContext<'_>, op: BinaryOp) -> Result<OutputValue> {
    let a = ctx.input(0)?;
    let b = ctx.input(1)?;
    if ctx.attrs().int("broadcast")? == 0 {
        if a.shape() != b.shape() {
            return Err(ctx.shape_mismatch(format!(
                "{:?} and {:?} differ and broadcast is off",
                a.shape(),
                b.shape()
            )));
        }
        let out = map_numeric_pair!(ctx, (a, b), (x, y) => binary_same_shape(x, y, |p, q| op.apply(p, q)));
        return Ok(out.into());
    }

    let b_shape = match ctx.attrs().opt_int("axis")? {
        Some(axis) => align_at_axis(b.shape(), a.rank(), axis)
            .map_err(|err| ctx.shape_mismatch(err.to_string()))?,
        None => b.shape().to_vec(),
    };
    let out_shape =
        broadcast_shape(a.shape(), &b_shape).map_err(|err| ctx.shape_mismatch(err.to_string()))?;
    let out = map_numeric_pair!(ctx, (a, b), (x, y) => {
        binary_broadcast(x, y, &b_shape, &out_shape, |p, q| op.apply(p, q))
    });
    Ok(out.into())
}

#[derive(Debug, Clone, Copy)]
enum NaryOp {
    Sum,
    Mean,
    Max,
    Min,
}

pub fn sum(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    nary_kernel(ctx, NaryOp::Sum)
}

pub fn mean(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    nary_kernel(ctx, NaryOp::Mean)
}

pub fn max(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    nary_kernel(ctx, NaryOp::Max)
}

pub fn min(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    nary_kernel(ctx, NaryOp::Min)
}

/// Fold any number of same-shape, same-dtype inputs elementwise.
fn nary_kernel(ctx: &ExecContext<'_>, op: NaryOp) -> Result<OutputValue> {
    let inputs = ctx.inputs();
    let first = ctx.input(0)?;
    for (idx, other) in inputs.iter().enumerate().skip(1) {
        if other.dtype() != first.dtype() {
            return Err(anyhow!(
                "{} input {} is {}, expected {}",
                ctx.op_name(),
                idx,
                other.dtype(),
                first.dtype()
            ));
        }
        if other.shape() != first.shape() {
            return Err(ctx.shape_mismatch(format!(
                "input {} has shape {:?}, expected {:?}",
                idx,
                other.shape(),
                first.shape()
            )));
        }
    }
    Ok(map_numeric!(first, t => nary_typed(t, &inputs[1..], op)).into())
}

fn nary_typed<T: Numeric>(first: &Tensor<T>, rest: &[TensorValue], op: NaryOp) -> Result<Tensor<T>> {
    let mut acc = first.data.clone();
    for value in rest {
        let tensor = T::from_value(value)
            .ok_or_else(|| anyhow!("expected {} input, got {}", T::DTYPE, value.dtype()))?;
        for (slot, v) in acc.iter_mut().zip(&tensor.data) {
            *slot = match op {
                NaryOp::Sum | NaryOp::Mean => slot.add_elem(*v),
                NaryOp::Max => slot.max_elem(*v),
                NaryOp::Min => slot.min_elem(*v),
            };
        }
    }
    if let NaryOp::Mean = op {
        let count = T::from_f64((rest.len() + 1) as f64);
        for slot in &mut acc {
            *slot = slot
                .div_elem(count)
                .ok_or_else(|| anyhow!("mean over zero inputs"))?;
        }
    }
    Tensor::with_shape(acc, first.shape().to_vec())
}
