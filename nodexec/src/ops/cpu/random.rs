//! RandomNormal / RandomUniform and their `*Like` variants.
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::runtime::{ExecContext, OutputValue};
use crate::tensor::{numel, DType, Tensor, TensorValue};

pub fn random_normal(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let shape = attr_shape(ctx)?;
    normal(ctx, ctx.attrs().dtype("dtype")?, &shape)
}

pub fn random_normal_like(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let (dtype, shape) = like(ctx)?;
    normal(ctx, dtype, &shape)
}

pub fn random_uniform(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let shape = attr_shape(ctx)?;
    uniform(ctx, ctx.attrs().dtype("dtype")?, &shape)
}

pub fn random_uniform_like(ctx: &ExecContext<'_>) -> Result<OutputValue> {
    let (dtype, shape) = like(ctx)?;
    uniform(ctx, dtype, &shape)
}

fn normal(ctx: &ExecContext<'_>, dtype: DType, shape: &[usize]) -> Result<OutputValue> {
    let mean = ctx.attrs().float("mean")? as f64;
    let scale = ctx.attrs().float("scale")? as f64;
    let dist = Normal::new(mean, scale)
        .map_err(|err| anyhow!("invalid normal distribution (mean {}, scale {}): {}", mean, scale, err))?;
    let mut rng = generator(ctx)?;
    Ok(fill(dtype, shape, || dist.sample(&mut rng))?.into())
}

/// Samples from `[low, high)`; `low == high` yields a constant tensor.
fn uniform(ctx: &ExecContext<'_>, dtype: DType, shape: &[usize]) -> Result<OutputValue> {
    let low = ctx.attrs().float("low")? as f64;
    let high = ctx.attrs().float("high")? as f64;
    if !low.is_finite() || !high.is_finite() {
        return Err(anyhow!("uniform bounds [{}, {}) must be finite", low, high));
    }
    if low > high {
        return Err(anyhow!("uniform bounds [{}, {}) are empty", low, high));
    }
    let mut rng = generator(ctx)?;
    Ok(fill(dtype, shape, || {
        if low == high {
            low
        } else {
            rng.gen_range(low..high)
        }
    })?
    .into())
}

/// A `seed` attribute pins the stream; otherwise the run's provider decides.
fn generator(ctx: &ExecContext<'_>) -> Result<StdRng> {
    Ok(match ctx.attrs().opt_float("seed")? {
        Some(seed) => StdRng::seed_from_u64(u64::from(seed.to_bits())),
        None => ctx.rng(),
    })
}

fn attr_shape(ctx: &ExecContext<'_>) -> Result<Vec<usize>> {
    ctx.attrs()
        .ints("shape")?
        .iter()
        .map(|dim| usize::try_from(*dim).map_err(|_| anyhow!("invalid shape dim {}", dim)))
        .collect()
}

/// Shape from the input; dtype from the attribute, else from the input.
fn like(ctx: &ExecContext<'_>) -> Result<(DType, Vec<usize>)> {
    let input = ctx.input(0)?;
    let dtype = ctx.attrs().opt_dtype("dtype")?.unwrap_or(input.dtype());
    Ok((dtype, input.shape().to_vec()))
}

fn fill(dtype: DType, shape: &[usize], mut draw: impl FnMut() -> f64) -> Result<TensorValue> {
    let count = numel(shape);
    match dtype {
        DType::F32 => {
            let data = (0..count).map(|_| draw() as f32).collect();
            Ok(TensorValue::F32(Tensor::with_shape(data, shape.to_vec())?))
        }
        DType::F64 => {
            let data = (0..count).map(|_| draw()).collect();
            Ok(TensorValue::F64(Tensor::with_shape(data, shape.to_vec())?))
        }
        other => Err(anyhow!("random generators produce float tensors, not {}", other)),
    }
}
