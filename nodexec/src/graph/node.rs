use super::{AttrValue, NodeDef};

pub fn describe_node(node: &NodeDef) -> String {
    let attrs = node
        .attrs
        .items
        .iter()
        .map(|attr| format!("{}={}", attr.name, format_attr(&attr.value)))
        .collect::<Vec<_>>();
    let mut rendered = format!(
        "op {}({}) >> {}",
        node.op_type,
        node.inputs.join(","),
        node.outputs.join(",")
    );
    if !attrs.is_empty() {
        rendered.push_str(&format!(" [{}]", attrs.join(", ")));
    }
    rendered
}

fn format_attr(value: &AttrValue) -> String {
    match value {
        AttrValue::Float(value) => value.to_string(),
        AttrValue::Int(value) => value.to_string(),
        AttrValue::Str(value) => format!("\"{}\"", value),
        AttrValue::Ints(values) => format!("{:?}", values),
        AttrValue::Floats(values) => format!("{:?}", values),
        AttrValue::DType(dtype) => dtype.to_string(),
    }
}
