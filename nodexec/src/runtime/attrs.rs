use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};

use crate::error::OpError;
use crate::graph::{AttrValue, OpAttrs};
use crate::registry::{AttrDefault, OpAttrDef, OpAttrType, OpDef};
use crate::tensor::DType;

/// Attributes of one invocation after defaults and coercions were applied.
///
/// Every entry has the kind its schema declares, so the typed accessors only
/// fail for attributes the schema marks optional and the node left out.
#[derive(Debug, Clone)]
pub struct AttrTable {
    op: &'static str,
    values: HashMap<&'static str, AttrValue>,
}

impl AttrTable {
    /// Check `attrs` against the schema of `op` and fill in defaults.
    pub fn resolve(op: &'static OpDef, attrs: &OpAttrs) -> Result<Self, OpError> {
        let mut seen = HashSet::new();
        let mut values = HashMap::with_capacity(op.attrs.len());
        for attr in &attrs.items {
            if !seen.insert(attr.name.as_str()) {
                return Err(OpError::DuplicateAttribute {
                    op: op.name.to_string(),
                    name: attr.name.clone(),
                });
            }
            let Some(def) = op.attr(&attr.name) else {
                crate::warning!("{}: ignoring unknown attribute {}", op.name, attr.name);
                continue;
            };
            let value = coerce(def.kind, &attr.value).ok_or_else(|| OpError::AttributeType {
                op: op.name.to_string(),
                name: attr.name.clone(),
                expected: def.kind.name(),
                found: attr.value.kind_name(),
            })?;
            values.insert(def.name, value);
        }
        for def in op.attrs {
            if values.contains_key(def.name) {
                continue;
            }
            if let Some(value) = default_value(op, def)? {
                values.insert(def.name, value);
            }
        }
        Ok(Self {
            op: op.name,
            values,
        })
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        match self.require(name)? {
            AttrValue::Float(value) => Ok(*value),
            other => Err(self.wrong_kind(name, "float", other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            AttrValue::Int(value) => Ok(*value),
            other => Err(self.wrong_kind(name, "int", other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            AttrValue::Str(value) => Ok(value),
            other => Err(self.wrong_kind(name, "string", other)),
        }
    }

    pub fn ints(&self, name: &str) -> Result<&[i64]> {
        match self.require(name)? {
            AttrValue::Ints(values) => Ok(values),
            other => Err(self.wrong_kind(name, "ints", other)),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[f32]> {
        match self.require(name)? {
            AttrValue::Floats(values) => Ok(values),
            other => Err(self.wrong_kind(name, "floats", other)),
        }
    }

    pub fn dtype(&self, name: &str) -> Result<DType> {
        match self.require(name)? {
            AttrValue::DType(value) => Ok(*value),
            other => Err(self.wrong_kind(name, "dtype", other)),
        }
    }

    pub fn opt_float(&self, name: &str) -> Result<Option<f32>> {
        self.optional(name, Self::float)
    }

    pub fn opt_int(&self, name: &str) -> Result<Option<i64>> {
        self.optional(name, Self::int)
    }

    pub fn opt_ints(&self, name: &str) -> Result<Option<&[i64]>> {
        self.optional(name, Self::ints)
    }

    pub fn opt_dtype(&self, name: &str) -> Result<Option<DType>> {
        self.optional(name, Self::dtype)
    }

    fn optional<'s, T>(
        &'s self,
        name: &str,
        read: impl FnOnce(&'s Self, &str) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.contains(name) {
            read(self, name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn require(&self, name: &str) -> Result<&AttrValue> {
        self.values
            .get(name)
            .ok_or_else(|| OpError::missing_attr(self.op, name).into())
    }

    fn wrong_kind(&self, name: &str, expected: &str, found: &AttrValue) -> anyhow::Error {
        anyhow!(
            "{}: attribute {} read as {} but holds {}",
            self.op,
            name,
            expected,
            found.kind_name()
        )
    }
}

/// Widen `value` to `kind`. Only lossless conversions are accepted.
fn coerce(kind: OpAttrType, value: &AttrValue) -> Option<AttrValue> {
    match (kind, value) {
        (OpAttrType::Float, AttrValue::Float(_))
        | (OpAttrType::Int, AttrValue::Int(_))
        | (OpAttrType::String, AttrValue::Str(_))
        | (OpAttrType::Ints, AttrValue::Ints(_))
        | (OpAttrType::Floats, AttrValue::Floats(_))
        | (OpAttrType::DType, AttrValue::DType(_)) => Some(value.clone()),
        (OpAttrType::Float, AttrValue::Int(v)) => Some(AttrValue::Float(*v as f32)),
        (OpAttrType::Floats, AttrValue::Ints(values)) => Some(AttrValue::Floats(
            values.iter().map(|v| *v as f32).collect(),
        )),
        (OpAttrType::DType, AttrValue::Int(code)) => DType::from_onnx(*code).ok().map(AttrValue::DType),
        (OpAttrType::DType, AttrValue::Str(ident)) => {
            DType::from_ident(ident).ok().map(AttrValue::DType)
        }
        _ => None,
    }
}

fn default_value(op: &OpDef, def: &OpAttrDef) -> Result<Option<AttrValue>, OpError> {
    let value = match def.default {
        AttrDefault::Required => return Err(OpError::missing_attr(op.name, def.name)),
        AttrDefault::Optional => return Ok(None),
        AttrDefault::Float(v) => AttrValue::Float(v),
        AttrDefault::Int(v) => AttrValue::Int(v),
        AttrDefault::Str(v) => AttrValue::Str(v.to_string()),
        AttrDefault::Ints(v) => AttrValue::Ints(v.to_vec()),
        AttrDefault::DType(v) => AttrValue::DType(v),
    };
    Ok(Some(value))
}
