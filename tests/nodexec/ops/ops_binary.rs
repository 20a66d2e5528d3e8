use anyhow::Result;
use nodexec::{run_node, NodeDef, OpError, Tensor, TensorValue};

use crate::common::{assert_tensor_close, f32s, i64s, rnd, run_single};

fn zip_with(a: &Tensor<f32>, b: &Tensor<f32>, f: impl Fn(f32, f32) -> f32) -> TensorValue {
    let data = a.data.iter().zip(&b.data).map(|(x, y)| f(*x, *y)).collect();
    TensorValue::F32(f32s(data, a.shape()))
}

#[test]
fn pow_matches_powf_for_positive_bases() -> Result<()> {
    let shift = |t: Tensor<f32>| f32s(t.data.iter().map(|v| v / 2.0 + 0.5).collect(), t.shape());
    let x = shift(rnd(&[1000], 11));
    let y = shift(rnd(&[1000], 12));
    let z = run_single(&NodeDef::new("Pow", ["X", "Y"], ["Z"]), [x.clone(), y.clone()])?;
    assert_tensor_close(&z, &zip_with(&x, &y, f32::powf))
}

#[test]
fn sub_with_broadcast_flag_on_equal_shapes() -> Result<()> {
    let x = rnd(&[10, 10], 13);
    let y = rnd(&[10, 10], 14);
    let node = NodeDef::new("Sub", ["X", "Y"], ["Z"]).with_attr("broadcast", 1i64);
    let z = run_single(&node, [x.clone(), y.clone()])?;
    assert_tensor_close(&z, &zip_with(&x, &y, |a, b| a - b))
}

#[test]
fn broadcast_is_opt_in() -> Result<()> {
    let a = f32s(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = f32s(vec![10.0, 20.0, 30.0], &[3]);

    let strict = NodeDef::new("Add", ["A", "B"], ["C"]);
    let err = run_node(&strict, [a.clone(), b.clone()]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");

    let flagged = strict.clone().with_attr("broadcast", 1i64);
    let c = run_single(&flagged, [a, b])?;
    assert_tensor_close(
        &c,
        &TensorValue::F32(f32s(vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0], &[2, 3])),
    )
}

#[test]
fn legacy_axis_aligns_second_operand() -> Result<()> {
    let a = f32s((0..6).map(|v| v as f32).collect(), &[2, 3]);
    let b = f32s(vec![100.0, 200.0], &[2]);
    let node = NodeDef::new("Mul", ["A", "B"], ["C"])
        .with_attr("broadcast", 1i64)
        .with_attr("axis", 0i64);
    let c = run_single(&node, [a, b])?;
    assert_tensor_close(
        &c,
        &TensorValue::F32(f32s(vec![0.0, 100.0, 200.0, 600.0, 800.0, 1000.0], &[2, 3])),
    )
}

#[test]
fn incompatible_broadcast_is_a_shape_mismatch() {
    let node = NodeDef::new("Add", ["A", "B"], ["C"]).with_attr("broadcast", 1i64);
    let err = run_node(&node, [rnd(&[2, 3], 1), rnd(&[4], 2)]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");
}

#[test]
fn operand_dtypes_must_agree() {
    let node = NodeDef::new("Add", ["A", "B"], ["C"]);
    let err = run_node(&node, [
        TensorValue::F32(f32s(vec![1.0], &[1])),
        TensorValue::I64(i64s(vec![1], &[1])),
    ])
    .unwrap_err();
    assert!(matches!(err, OpError::Execution { .. }), "{err}");
}

#[test]
fn integer_division_by_zero_fails() -> Result<()> {
    let node = NodeDef::new("Div", ["A", "B"], ["C"]);
    let c = run_single(&node, [i64s(vec![7, -9], &[2]), i64s(vec![2, 4], &[2])])?;
    assert_eq!(c, TensorValue::I64(i64s(vec![3, -2], &[2])));

    let err = run_node(&node, [i64s(vec![1], &[1]), i64s(vec![0], &[1])]).unwrap_err();
    match err {
        OpError::Execution { op, source } => {
            assert_eq!(op, "Div");
            assert!(source.to_string().contains("division by zero"));
        }
        other => panic!("unexpected error {other}"),
    }
    Ok(())
}

#[test]
fn float_division_by_zero_follows_ieee() -> Result<()> {
    let node = NodeDef::new("Div", ["A", "B"], ["C"]);
    let c = run_single(&node, [f32s(vec![1.0, -1.0], &[2]), f32s(vec![0.0, 0.0], &[2])])?;
    assert_eq!(c.as_f32()?.data, vec![f32::INFINITY, f32::NEG_INFINITY]);
    Ok(())
}

#[test]
fn sum_accumulates_every_input() -> Result<()> {
    let ones = f32s(vec![1.0; 100], &[10, 10]);
    let node = NodeDef::new("Sum", ["X1", "X2", "X3", "X4"], ["Z"]);
    let z = run_single(&node, vec![ones.clone(); 4])?;
    assert_tensor_close(&z, &TensorValue::F32(f32s(vec![4.0; 100], &[10, 10])))?;

    let xs = (0..4).map(|seed| rnd(&[10, 10], 20 + seed)).collect::<Vec<_>>();
    let z = run_single(&node, xs.clone())?;
    let expected = (0..100)
        .map(|i| xs[0].data[i] + xs[1].data[i] + xs[2].data[i] + xs[3].data[i])
        .collect();
    assert_tensor_close(&z, &TensorValue::F32(f32s(expected, &[10, 10])))
}

#[test]
fn mean_max_min_fold_elementwise() -> Result<()> {
    let a = f32s(vec![1.0, 5.0, -2.0], &[3]);
    let b = f32s(vec![3.0, 1.0, -4.0], &[3]);
    let run = |op: &str| run_single(&NodeDef::new(op, ["A", "B"], ["C"]), [a.clone(), b.clone()]);
    assert_eq!(run("Mean")?.as_f32()?.data, vec![2.0, 3.0, -3.0]);
    assert_eq!(run("Max")?.as_f32()?.data, vec![3.0, 5.0, -2.0]);
    assert_eq!(run("Min")?.as_f32()?.data, vec![1.0, 1.0, -4.0]);
    Ok(())
}

#[test]
fn single_input_sum_is_a_copy() -> Result<()> {
    let x = rnd(&[3, 3], 30);
    let z = run_single(&NodeDef::new("Sum", ["X"], ["Z"]), [x.clone()])?;
    assert_eq!(z, TensorValue::F32(x));
    Ok(())
}

#[test]
fn sum_rejects_mismatched_shapes() {
    let node = NodeDef::new("Sum", ["A", "B"], ["C"]);
    let err = run_node(&node, [rnd(&[2], 1), rnd(&[3], 2)]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");
}
