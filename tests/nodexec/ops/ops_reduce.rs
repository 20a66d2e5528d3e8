use anyhow::Result;
use nodexec::{NodeDef, Tensor, TensorValue};

use crate::common::{assert_tensor_close, f32s, i64s, rnd, run_single};

fn reduce_node(op: &str) -> NodeDef {
    NodeDef::new(op, ["X"], ["Y"])
        .with_attr("axes", vec![0i64, 1])
        .with_attr("keepdims", 0i64)
}

/// Fold each of the 5 trailing positions over the leading 5x5 block.
fn reference(x: &Tensor<f32>, f: impl Fn(&[f64]) -> f64) -> TensorValue {
    let data = (0..5)
        .map(|k| {
            let column = (0..25).map(|ij| x.data[ij * 5 + k] as f64).collect::<Vec<_>>();
            f(&column) as f32
        })
        .collect();
    TensorValue::F32(f32s(data, &[5]))
}

#[test]
fn reductions_over_leading_axes() -> Result<()> {
    let x = rnd(&[5, 5, 5], 70);
    let cases: [(&str, fn(&[f64]) -> f64); 6] = [
        ("ReduceSum", |v| v.iter().sum()),
        ("ReduceMean", |v| v.iter().sum::<f64>() / v.len() as f64),
        ("ReduceMax", |v| v.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        ("ReduceMin", |v| v.iter().copied().fold(f64::INFINITY, f64::min)),
        ("ReduceProd", |v| v.iter().product()),
        ("ReduceLogSumExp", |v| v.iter().map(|x| x.exp()).sum::<f64>().ln()),
    ];
    for (op, f) in cases {
        let y = run_single(&reduce_node(op), [x.clone()])?;
        assert_tensor_close(&y, &reference(&x, f)).map_err(|err| err.context(op))?;
    }
    Ok(())
}

#[test]
fn keepdims_defaults_to_on() -> Result<()> {
    let x = f32s(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let node = NodeDef::new("ReduceSum", ["X"], ["Y"]).with_attr("axes", vec![-1i64]);
    let y = run_single(&node, [x])?;
    assert_eq!(y.shape(), &[2, 1]);
    assert_eq!(y.as_f32()?.data, vec![6.0, 15.0]);
    Ok(())
}

#[test]
fn missing_axes_reduce_everything() -> Result<()> {
    let x = i64s(vec![1, 2, 3, 4], &[2, 2]);
    let y = run_single(&NodeDef::new("ReduceProd", ["X"], ["Y"]), [x.clone()])?;
    assert_eq!(y, TensorValue::I64(i64s(vec![24], &[1, 1])));

    let node = NodeDef::new("ReduceMax", ["X"], ["Y"]).with_attr("keepdims", 0i64);
    let y = run_single(&node, [x])?;
    assert_eq!(y.shape(), &[] as &[usize]);
    assert_eq!(y.as_i64()?.data, vec![4]);
    Ok(())
}

#[test]
fn log_sum_exp_is_stable_for_large_values() -> Result<()> {
    let x = f32s(vec![1000.0, 1000.0], &[2]);
    let y = run_single(&NodeDef::new("ReduceLogSumExp", ["X"], ["Y"]), [x])?;
    let expected = 1000.0 + 2f64.ln();
    assert!((y.as_f32()?.data[0] as f64 - expected).abs() < 1e-3);
    Ok(())
}
