#![allow(dead_code)]

use anyhow::{anyhow, Result};
use nodexec::{run_node, DType, NodeDef, NodeInput, Tensor, TensorValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy)]
pub struct FloatTol {
    abs: f64,
    rel: f64,
}

impl FloatTol {
    pub fn for_dtype(dtype: DType) -> Option<Self> {
        match dtype {
            DType::F32 => Some(Self { abs: 1e-5, rel: 1e-5 }),
            DType::F64 => Some(Self { abs: 1e-9, rel: 1e-9 }),
            _ => None,
        }
    }

    fn accepts(self, actual: f64, expected: f64) -> bool {
        if actual.is_nan() || expected.is_nan() {
            return actual.is_nan() && expected.is_nan();
        }
        if actual == expected {
            return true;
        }
        let diff = (actual - expected).abs();
        diff <= self.abs || diff <= self.rel * expected.abs()
    }
}

/// Uniform values in `[-1, 1)` from a fixed seed so failures reproduce.
pub fn rnd(shape: &[usize], seed: u64) -> Tensor<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = shape.iter().product::<usize>();
    let data = (0..count).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    Tensor::with_shape(data, shape.to_vec()).expect("shape covers data")
}

pub fn f32s(data: Vec<f32>, shape: &[usize]) -> Tensor<f32> {
    Tensor::with_shape(data, shape.to_vec()).expect("shape covers data")
}

pub fn i64s(data: Vec<i64>, shape: &[usize]) -> Tensor<i64> {
    Tensor::with_shape(data, shape.to_vec()).expect("shape covers data")
}

/// Run `node` and return its only output as a plain tensor.
pub fn run_single<I>(node: &NodeDef, inputs: I) -> Result<TensorValue>
where
    I: IntoIterator,
    I::Item: Into<NodeInput>,
{
    let outputs = run_node(node, inputs)?;
    let name = node
        .outputs
        .first()
        .ok_or_else(|| anyhow!("node declares no outputs"))?;
    outputs
        .tensor(name)
        .cloned()
        .ok_or_else(|| anyhow!("output {} is not a tensor", name))
}

pub fn assert_tensor_close(actual: &TensorValue, expected: &TensorValue) -> Result<()> {
    if actual.dtype() != expected.dtype() {
        return Err(anyhow!(
            "dtype mismatch: actual {:?} expected {:?}",
            actual.dtype(),
            expected.dtype()
        ));
    }
    if actual.shape() != expected.shape() {
        return Err(anyhow!(
            "shape mismatch: actual {:?} expected {:?}",
            actual.shape(),
            expected.shape()
        ));
    }
    let Some(tol) = FloatTol::for_dtype(actual.dtype()) else {
        if actual != expected {
            return Err(anyhow!("value mismatch: {:?} vs {:?}", actual, expected));
        }
        return Ok(());
    };
    let lhs = actual.to_f64_vec();
    let rhs = expected.to_f64_vec();
    for (idx, (a, e)) in lhs.iter().zip(&rhs).enumerate() {
        if !tol.accepts(*a, *e) {
            return Err(anyhow!(
                "value mismatch at {}: actual {} expected {}",
                idx,
                a,
                e
            ));
        }
    }
    Ok(())
}

/// Compare against a reference computed elementwise in f64.
pub fn assert_map_close(
    actual: &TensorValue,
    input: &Tensor<f32>,
    f: impl Fn(f64) -> f64,
) -> Result<()> {
    let data = input.data.iter().map(|x| f(*x as f64) as f32).collect();
    assert_tensor_close(actual, &TensorValue::F32(f32s(data, input.shape())))
}
