use crate::tensor::DType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpAttrType {
    Float,
    Int,
    String,
    Ints,
    Floats,
    DType,
}

impl OpAttrType {
    pub fn name(self) -> &'static str {
        match self {
            OpAttrType::Float => "float",
            OpAttrType::Int => "int",
            OpAttrType::String => "string",
            OpAttrType::Ints => "ints",
            OpAttrType::Floats => "floats",
            OpAttrType::DType => "dtype",
        }
    }
}

/// What happens when a node omits the attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrDefault {
    Required,
    /// May be absent; the kernel decides what absence means.
    Optional,
    Float(f32),
    Int(i64),
    Str(&'static str),
    Ints(&'static [i64]),
    DType(DType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpAttrDef {
    pub name: &'static str,
    pub kind: OpAttrType,
    pub default: AttrDefault,
}

impl OpAttrDef {
    pub const fn required(name: &'static str, kind: OpAttrType) -> Self {
        Self {
            name,
            kind,
            default: AttrDefault::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: OpAttrType) -> Self {
        Self {
            name,
            kind,
            default: AttrDefault::Optional,
        }
    }

    pub const fn float(name: &'static str, value: f32) -> Self {
        Self {
            name,
            kind: OpAttrType::Float,
            default: AttrDefault::Float(value),
        }
    }

    pub const fn int(name: &'static str, value: i64) -> Self {
        Self {
            name,
            kind: OpAttrType::Int,
            default: AttrDefault::Int(value),
        }
    }

    pub const fn string(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            kind: OpAttrType::String,
            default: AttrDefault::Str(value),
        }
    }

    pub const fn dtype(name: &'static str, value: DType) -> Self {
        Self {
            name,
            kind: OpAttrType::DType,
            default: AttrDefault::DType(value),
        }
    }
}

pub const BROADCAST_ATTR: OpAttrDef = OpAttrDef::int("broadcast", 0);
pub const BROADCAST_AXIS_ATTR: OpAttrDef = OpAttrDef::optional("axis", OpAttrType::Int);

pub const AXES_ATTR: OpAttrDef = OpAttrDef::optional("axes", OpAttrType::Ints);
pub const KEEPDIMS_ATTR: OpAttrDef = OpAttrDef::int("keepdims", 1);

pub const SEED_ATTR: OpAttrDef = OpAttrDef::optional("seed", OpAttrType::Float);
pub const SHAPE_ATTR: OpAttrDef = OpAttrDef::required("shape", OpAttrType::Ints);
pub const MEAN_ATTR: OpAttrDef = OpAttrDef::float("mean", 0.0);
pub const SCALE_ATTR: OpAttrDef = OpAttrDef::float("scale", 1.0);
pub const LOW_ATTR: OpAttrDef = OpAttrDef::float("low", 0.0);
pub const HIGH_ATTR: OpAttrDef = OpAttrDef::float("high", 1.0);

// Exact f32 values of the SELU constants.
pub const SELU_ALPHA: f32 = 1.673_263_2;
pub const SELU_GAMMA: f32 = 1.050_701;
