use anyhow::Result;
use nodexec::{run_node, NodeDef, NodeInput, OpError, Tensor, TensorValue};

use crate::common::{f32s, rnd, run_single};

fn slice_node() -> NodeDef {
    NodeDef::new("Slice", ["X", "Y", "Z", "W"], ["S"])
}

#[test]
fn slice_with_parameter_inputs() -> Result<()> {
    let x = rnd(&[10, 10, 10], 80);
    let s = run_single(&slice_node(), [
        NodeInput::from(x.clone()),
        NodeInput::from(vec![0i64, 1, 2]),
        NodeInput::from(vec![0i64, 0, 0]),
        NodeInput::from(vec![2i64, 2, 2]),
    ])?;
    let s = s.as_f32()?;
    assert_eq!(s.shape(), &[2, 2, 2]);
    for i in 0..2 {
        for j in 0..2 {
            for k in 0..2 {
                assert_eq!(s.get(&[i, j, k])?, x.get(&[i, j, k])?);
            }
        }
    }
    Ok(())
}

#[test]
fn slice_extent_follows_clamped_bounds() -> Result<()> {
    let x = rnd(&[4, 6], 81);
    let s = run_single(&slice_node(), [
        NodeInput::from(x.clone()),
        NodeInput::from(vec![1i64]),
        NodeInput::from(vec![2i64]),
        NodeInput::from(vec![100i64]),
    ])?;
    // unsliced axis 0 passes through, axis 1 is min(100, 6) - 2
    assert_eq!(s.shape(), &[4, 4]);
    assert_eq!(s.as_f32()?.get(&[3, 0])?, x.get(&[3, 2])?);

    let s = run_single(&slice_node(), [
        NodeInput::from(x.clone()),
        NodeInput::from(vec![-1i64]),
        NodeInput::from(vec![-3i64]),
        NodeInput::from(vec![-1i64]),
    ])?;
    assert_eq!(s.shape(), &[4, 2]);
    assert_eq!(s.as_f32()?.get(&[0, 0])?, x.get(&[0, 3])?);

    let s = run_single(&slice_node(), [
        NodeInput::from(x),
        NodeInput::from(vec![0i64]),
        NodeInput::from(vec![3i64]),
        NodeInput::from(vec![1i64]),
    ])?;
    assert_eq!(s.shape(), &[0, 6]);
    Ok(())
}

#[test]
fn float_parameter_lists_must_be_integral() -> Result<()> {
    let x = rnd(&[4], 82);
    let s = run_single(&slice_node(), [
        NodeInput::from(x.clone()),
        NodeInput::from(vec![0.0f32]),
        NodeInput::from(vec![1.0f32]),
        NodeInput::from(vec![3.0f32]),
    ])?;
    assert_eq!(s.shape(), &[2]);

    let err = run_node(&slice_node(), [
        NodeInput::from(x),
        NodeInput::from(vec![0.0f32]),
        NodeInput::from(vec![0.5f32]),
        NodeInput::from(vec![3.0f32]),
    ])
    .unwrap_err();
    assert!(matches!(err, OpError::InputCoercion { index: 2, .. }), "{err}");
    Ok(())
}

#[test]
fn slice_falls_back_to_attributes() -> Result<()> {
    let x = f32s((0..12).map(|v| v as f32).collect(), &[3, 4]);
    let node = NodeDef::new("Slice", ["X"], ["S"])
        .with_attr("starts", vec![1i64, 1])
        .with_attr("ends", vec![3i64, 3]);
    let s = run_single(&node, [x.clone()])?;
    assert_eq!(s.as_f32()?.data, vec![5.0, 6.0, 9.0, 10.0]);

    let missing = NodeDef::new("Slice", ["X"], ["S"]).with_attr("ends", vec![1i64]);
    let err = run_node(&missing, [x]).unwrap_err();
    assert!(matches!(err, OpError::MissingRequiredAttribute { .. }), "{err}");
    Ok(())
}

#[test]
fn split_into_listed_lengths() -> Result<()> {
    let x = rnd(&[10, 10], 83);
    let node = NodeDef::new("Split", ["X", "Y"], ["Z"]).with_attr("axis", 0i64);
    let outputs = run_node(&node, [NodeInput::from(x.clone()), NodeInput::from(vec![3i64, 3, 4])])?;
    assert_eq!(outputs.len(), 1);
    let parts = outputs.sequence("Z").expect("Z holds a sequence");
    let shapes = parts.iter().map(|p| p.shape().to_vec()).collect::<Vec<_>>();
    assert_eq!(shapes, vec![vec![3, 10], vec![3, 10], vec![4, 10]]);

    // row-concatenation reconstructs the input
    let joined = parts
        .iter()
        .map(|p| p.as_f32().map(|t| t.data.clone()))
        .collect::<Result<Vec<_>>>()?
        .concat();
    assert_eq!(joined, x.data);
    Ok(())
}

#[test]
fn split_round_trips_through_concat() -> Result<()> {
    let x = rnd(&[5, 5, 5], 84);
    let split = NodeDef::new("Split", ["X", "Y"], ["Z"]).with_attr("axis", 1i64);
    let outputs = run_node(&split, [NodeInput::from(x.clone()), NodeInput::from(vec![2i64, 2, 1])])?;
    let parts = outputs.sequence("Z").expect("sequence").to_vec();
    assert_eq!(parts[2].shape(), &[5, 1, 5]);

    let concat = NodeDef::new("Concat", ["A", "B", "C"], ["Y"]).with_attr("axis", 1i64);
    let y = run_single(&concat, parts)?;
    assert_eq!(y, TensorValue::F32(x));
    Ok(())
}

#[test]
fn split_spreads_over_declared_outputs() -> Result<()> {
    let x = f32s((0..6).map(|v| v as f32).collect(), &[6]);
    let node = NodeDef::new("Split", ["X"], ["A", "B", "C"]);
    let outputs = run_node(&node, [x])?;
    assert_eq!(outputs.len(), 3);
    assert_eq!(
        outputs.tensor("C").expect("C"),
        &TensorValue::F32(Tensor::from_vec(vec![4.0, 5.0])?)
    );
    Ok(())
}

#[test]
fn split_attribute_and_coverage_check() -> Result<()> {
    let x = f32s((0..6).map(|v| v as f32).collect(), &[6]);
    let node = NodeDef::new("Split", ["X"], ["A", "B"]).with_attr("split", vec![1i64, 5]);
    let outputs = run_node(&node, [x.clone()])?;
    assert_eq!(outputs.tensor("B").expect("B").shape(), &[5]);

    let short = NodeDef::new("Split", ["X", "L"], ["Z"]);
    let err = run_node(&short, [NodeInput::from(x.clone()), NodeInput::from(vec![2i64, 2])]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");

    let uneven = NodeDef::new("Split", ["X"], ["A", "B", "C", "D"]);
    let err = run_node(&uneven, [x]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");
    Ok(())
}

#[test]
fn split_lengths_that_overflow_are_rejected() {
    let x = f32s(vec![1.0, 2.0], &[2]);
    let node = NodeDef::new("Split", ["X", "L"], ["Z"]);
    let err = run_node(&node, [NodeInput::from(x), NodeInput::from(vec![i64::MAX, 1])]).unwrap_err();
    assert!(matches!(err, OpError::ShapeMismatch { .. }), "{err}");
}

#[test]
fn partial_parameter_inputs_are_an_arity_error() {
    let x = rnd(&[4, 4], 85);
    let axes_only = NodeDef::new("Slice", ["X", "axes"], ["S"]);
    let err = run_node(&axes_only, [NodeInput::from(x.clone()), NodeInput::from(vec![0i64])])
        .unwrap_err();
    assert!(matches!(err, OpError::ArityMismatch { actual: 2, .. }), "{err}");

    let no_ends = NodeDef::new("Slice", ["X", "axes", "starts"], ["S"]);
    let err = run_node(&no_ends, [
        NodeInput::from(x),
        NodeInput::from(vec![0i64]),
        NodeInput::from(vec![1i64]),
    ])
    .unwrap_err();
    assert!(matches!(err, OpError::ArityMismatch { actual: 3, .. }), "{err}");
}
