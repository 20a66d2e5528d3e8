use anyhow::Result;
use nodexec::{run_node, NodeDef, OpError, TensorValue};

use crate::common::{assert_map_close, assert_tensor_close, f32s, i64s, rnd, run_single};

#[test]
fn relu_clamps_negatives() -> Result<()> {
    let node = NodeDef::new("Relu", ["X"], ["Y"]);
    let y = run_single(&node, [f32s(vec![-1.0, 0.0, 2.0], &[3])])?;
    assert_tensor_close(&y, &TensorValue::F32(f32s(vec![0.0, 0.0, 2.0], &[3])))?;

    let x = rnd(&[1000], 1);
    let y = run_single(&node, [x.clone()])?;
    assert_map_close(&y, &x, |v| v.max(0.0))
}

#[test]
fn relu_keeps_integer_dtype() -> Result<()> {
    let node = NodeDef::new("Relu", ["X"], ["Y"]);
    let y = run_single(&node, [i64s(vec![-3, 4], &[2])])?;
    assert_eq!(y, TensorValue::I64(i64s(vec![0, 4], &[2])));
    Ok(())
}

#[test]
fn reciprocal_inverts_nonzero_values() -> Result<()> {
    let x = rnd(&[1000], 2);
    let y = run_single(&NodeDef::new("Reciprocal", ["X"], ["Y"]), [x.clone()])?;
    assert_map_close(&y, &x, |v| 1.0 / v)
}

#[test]
fn sigmoid_tanh_sqrt_match_reference() -> Result<()> {
    let x = rnd(&[1000], 3);
    let y = run_single(&NodeDef::new("Sigmoid", ["X"], ["Y"]), [x.clone()])?;
    assert_map_close(&y, &x, |v| 1.0 / (1.0 + (-v).exp()))?;

    let shifted = f32s(x.data.iter().map(|v| v + 1.0).collect(), &[1000]);
    let y = run_single(&NodeDef::new("Tanh", ["X"], ["Y"]), [shifted.clone()])?;
    assert_map_close(&y, &shifted, f64::tanh)?;
    let y = run_single(&NodeDef::new("Sqrt", ["X"], ["Y"]), [shifted.clone()])?;
    assert_map_close(&y, &shifted, f64::sqrt)
}

#[test]
fn unary_output_shape_equals_input_shape() -> Result<()> {
    let x = rnd(&[2, 3, 4], 4);
    for op in [
        "Abs", "Neg", "Exp", "Floor", "Ceil", "Identity", "Relu", "Sigmoid", "Tanh", "Elu",
        "LeakyRelu", "Selu", "Softmax",
    ] {
        let y = run_single(&NodeDef::new(op, ["X"], ["Y"]), [x.clone()])?;
        assert_eq!(y.shape(), x.shape(), "{op}");
    }
    Ok(())
}

#[test]
fn parametrised_activations_use_attributes() -> Result<()> {
    let x = f32s(vec![-2.0, -0.5, 0.0, 1.5], &[4]);
    let y = run_single(
        &NodeDef::new("LeakyRelu", ["X"], ["Y"]).with_attr("alpha", 0.1f32),
        [x.clone()],
    )?;
    assert_map_close(&y, &x, |v| if v < 0.0 { 0.1f32 as f64 * v } else { v })?;

    let y = run_single(&NodeDef::new("Elu", ["X"], ["Y"]), [x.clone()])?;
    assert_map_close(&y, &x, |v| if v < 0.0 { v.exp() - 1.0 } else { v })?;

    let alpha = 1.673_263_2f32 as f64;
    let gamma = 1.050_701f32 as f64;
    let y = run_single(&NodeDef::new("Selu", ["X"], ["Y"]), [x.clone()])?;
    assert_map_close(&y, &x, |v| {
        if v > 0.0 {
            gamma * v
        } else {
            gamma * alpha * (v.exp() - 1.0)
        }
    })
}

#[test]
fn softmax_rows_sum_to_one() -> Result<()> {
    let x = rnd(&[4, 5], 5);
    let y = run_single(&NodeDef::new("Softmax", ["X"], ["Y"]), [x])?;
    for row in y.as_f32()?.data.chunks(5) {
        let total = row.iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5, "row sums to {total}");
    }
    Ok(())
}

#[test]
fn softmax_on_vector_with_default_axis_is_all_ones() -> Result<()> {
    // axis 1 on a rank-1 tensor leaves one column per row
    let x = rnd(&[100], 6);
    let y = run_single(&NodeDef::new("Softmax", ["X"], ["Y"]), [x])?;
    assert!(y.as_f32()?.data.iter().all(|v| *v == 1.0));
    Ok(())
}

#[test]
fn softmax_over_last_axis_of_vector() -> Result<()> {
    let x = f32s(vec![1.0, 2.0, 3.0], &[3]);
    let y = run_single(
        &NodeDef::new("Softmax", ["X"], ["Y"]).with_attr("axis", 0i64),
        [x],
    )?;
    let denom = 1f64.exp() + 2f64.exp() + 3f64.exp();
    let expected = [1f64, 2.0, 3.0].map(|v| (v.exp() / denom) as f32).to_vec();
    assert_tensor_close(&y, &TensorValue::F32(f32s(expected, &[3])))
}

#[test]
fn float_only_ops_reject_integers() {
    let node = NodeDef::new("Sqrt", ["X"], ["Y"]);
    let err = run_node(&node, [i64s(vec![4], &[1])]).unwrap_err();
    assert!(matches!(err, OpError::Execution { .. }), "{err}");
}

#[test]
fn prelu_scales_negative_inputs() -> Result<()> {
    let x = rnd(&[100], 7);
    let slope = rnd(&[100], 8);
    let node = NodeDef::new("PRelu", ["X", "Slope"], ["Y"]);
    let y = run_single(&node, [x.clone(), slope.clone()])?;
    let expected = x
        .data
        .iter()
        .zip(&slope.data)
        .map(|(v, s)| if *v < 0.0 { v * s } else { *v })
        .collect();
    assert_tensor_close(&y, &TensorValue::F32(f32s(expected, &[100])))
}

#[test]
fn prelu_broadcasts_slope_only_towards_input() -> Result<()> {
    let node = NodeDef::new("PRelu", ["X", "Slope"], ["Y"]);
    let x = f32s(vec![-1.0, 2.0, -3.0, 4.0], &[2, 2]);
    let y = run_single(&node, [x, f32s(vec![0.5, 0.25], &[2])])?;
    assert_tensor_close(
        &y,
        &TensorValue::F32(f32s(vec![-0.5, 2.0, -1.5, 4.0], &[2, 2])),
    )?;

    let err = run_node(&node, [f32s(vec![-1.0], &[1]), f32s(vec![1.0, 2.0], &[2])]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");
    Ok(())
}
