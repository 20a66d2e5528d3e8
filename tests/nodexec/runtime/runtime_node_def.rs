use anyhow::Result;
use nodexec::{AttrValue, DType, NodeDef};

use crate::common::{f32s, run_single};

#[test]
fn node_round_trips_through_json() -> Result<()> {
    let node = NodeDef::new("Pad", ["X"], ["Y"])
        .with_name("pad_0")
        .with_attr("mode", "constant")
        .with_attr("paddings", vec![1i64, 1])
        .with_attr("value", 2.5f32);
    let text = serde_json::to_string(&node)?;
    let parsed: NodeDef = serde_json::from_str(&text)?;
    assert_eq!(parsed, node);
    assert_eq!(parsed.display_name(), "pad_0");

    let y = run_single(&parsed, [f32s(vec![1.0], &[1])])?;
    assert_eq!(y.as_f32()?.data, vec![2.5, 1.0, 2.5]);
    Ok(())
}

#[test]
fn sparse_json_fills_defaults() -> Result<()> {
    let text = r#"{
        "op_type": "RandomUniformLike",
        "inputs": ["X"],
        "outputs": ["Y"],
        "attrs": { "items": [ { "name": "dtype", "value": { "DType": "F64" } } ] }
    }"#;
    let node: NodeDef = serde_json::from_str(text)?;
    assert_eq!(node.name, None);
    assert_eq!(node.attrs.get("dtype"), Some(&AttrValue::DType(DType::F64)));

    let source: NodeDef = serde_json::from_str(r#"{ "op_type": "RandomUniform" }"#)?;
    assert!(source.inputs.is_empty());
    assert!(source.attrs.items.is_empty());
    Ok(())
}
