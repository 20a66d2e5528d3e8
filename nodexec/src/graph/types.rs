//! Node descriptor types.
//!
//! A `NodeDef` describes one operator invocation the way an ONNX `NodeProto`
//! does: operator name, named input and output slots, and attributes.
use serde::{Deserialize, Serialize};

use crate::tensor::DType;

/// Attribute value attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Float(f32),
    Int(i64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    DType(DType),
}

impl AttrValue {
    /// Tag name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Float(_) => "float",
            AttrValue::Int(_) => "int",
            AttrValue::Str(_) => "string",
            AttrValue::Ints(_) => "ints",
            AttrValue::Floats(_) => "floats",
            AttrValue::DType(_) => "dtype",
        }
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Float(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value as f32)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(value: Vec<i64>) -> Self {
        AttrValue::Ints(value)
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(value: Vec<f32>) -> Self {
        AttrValue::Floats(value)
    }
}

impl From<DType> for AttrValue {
    fn from(value: DType) -> Self {
        AttrValue::DType(value)
    }
}

/// Named attribute for an op invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpAttr {
    pub name: String,
    pub value: AttrValue,
}

/// Collection of op attributes, in the order the node declared them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpAttrs {
    pub items: Vec<OpAttr>,
}

impl OpAttrs {
    /// Build an empty attribute set.
    pub fn none() -> Self {
        Self { items: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.items
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }
}

/// Immutable description of one operator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub op_type: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub attrs: OpAttrs,
    #[serde(default)]
    pub name: Option<String>,
}

impl NodeDef {
    /// Build a node with no attributes, mirroring `onnx.helper.make_node`.
    ///
    /// # Example
    /// ```
    /// # use nodexec::NodeDef;
    /// let node = NodeDef::new("Transpose", ["X"], ["Y"]).with_attr("perm", vec![1i64, 0]);
    /// assert_eq!(node.outputs, vec!["Y".to_string()]);
    /// ```
    pub fn new<I, O>(op_type: &str, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            op_type: op_type.to_string(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            attrs: OpAttrs::none(),
            name: None,
        }
    }

    /// Append an attribute.
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.items.push(OpAttr {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Label used in logs: the node name when set, otherwise the op type.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.op_type)
    }
}
