use crate::ops::cpu::{activation, arithmetic, pad, random, reduce, shape, slice};
use crate::ops::Kernel;
use crate::tensor::DType;

use super::op_attrs::{
    OpAttrDef, OpAttrType, AXES_ATTR, BROADCAST_ATTR, BROADCAST_AXIS_ATTR, HIGH_ATTR,
    KEEPDIMS_ATTR, LOW_ATTR, MEAN_ATTR, SCALE_ATTR, SEED_ATTR, SELU_ALPHA, SELU_GAMMA, SHAPE_ATTR,
};

/// Accepted number of inputs or outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// `required` leading slots followed by up to `optional` trailing slots.
    Optional { required: usize, optional: usize },
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == n,
            Arity::Optional { required, optional } => {
                count >= required && count <= required + optional
            }
            Arity::Variadic { min } => count >= min,
        }
    }

    pub fn describe(self) -> String {
        match self {
            Arity::Fixed(n) => format!("exactly {}", n),
            Arity::Optional { required, optional } => {
                format!("{} to {}", required, required + optional)
            }
            Arity::Variadic { min } => format!("at least {}", min),
        }
    }
}

/// Registry entry: kernel plus everything the dispatcher validates up front.
#[derive(Clone, Copy)]
pub struct OpDef {
    pub name: &'static str,
    pub inputs: Arity,
    pub outputs: Arity,
    /// First positional input holding integer parameters (axes, bounds,
    /// sizes) instead of data.
    pub param_inputs_from: Option<usize>,
    pub attrs: &'static [OpAttrDef],
    pub kernel: Kernel,
}

impl OpDef {
    const fn unary(name: &'static str, attrs: &'static [OpAttrDef], kernel: Kernel) -> Self {
        Self {
            name,
            inputs: Arity::Fixed(1),
            outputs: Arity::Fixed(1),
            param_inputs_from: None,
            attrs,
            kernel,
        }
    }

    const fn binary(name: &'static str, attrs: &'static [OpAttrDef], kernel: Kernel) -> Self {
        Self {
            name,
            inputs: Arity::Fixed(2),
            outputs: Arity::Fixed(1),
            param_inputs_from: None,
            attrs,
            kernel,
        }
    }

    const fn variadic(name: &'static str, attrs: &'static [OpAttrDef], kernel: Kernel) -> Self {
        Self {
            name,
            inputs: Arity::Variadic { min: 1 },
            outputs: Arity::Fixed(1),
            param_inputs_from: None,
            attrs,
            kernel,
        }
    }

    const fn source(name: &'static str, attrs: &'static [OpAttrDef], kernel: Kernel) -> Self {
        Self {
            name,
            inputs: Arity::Fixed(0),
            outputs: Arity::Fixed(1),
            param_inputs_from: None,
            attrs,
            kernel,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&'static OpAttrDef> {
        self.attrs.iter().find(|def| def.name == name)
    }
}

impl std::fmt::Debug for OpDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpDef")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("param_inputs_from", &self.param_inputs_from)
            .field("attrs", &self.attrs)
            .finish_non_exhaustive()
    }
}

const BROADCAST_ATTRS: &[OpAttrDef] = &[BROADCAST_ATTR, BROADCAST_AXIS_ATTR];
const REDUCE_ATTRS: &[OpAttrDef] = &[AXES_ATTR, KEEPDIMS_ATTR];

pub static OPS: &[OpDef] = &[
    // elementwise unary
    OpDef::unary("Abs", &[], activation::abs),
    OpDef::unary("Neg", &[], activation::neg),
    OpDef::unary("Exp", &[], activation::exp),
    OpDef::unary("Log", &[], activation::log),
    OpDef::unary("Sqrt", &[], activation::sqrt),
    OpDef::unary("Reciprocal", &[], activation::reciprocal),
    OpDef::unary("Floor", &[], activation::floor),
    OpDef::unary("Ceil", &[], activation::ceil),
    OpDef::unary("Identity", &[], activation::identity),
    OpDef::unary("Relu", &[], activation::relu),
    OpDef::unary("Sigmoid", &[], activation::sigmoid),
    OpDef::unary("Tanh", &[], activation::tanh),
    OpDef::unary("Elu", &[OpAttrDef::float("alpha", 1.0)], activation::elu),
    OpDef::unary(
        "LeakyRelu",
        &[OpAttrDef::float("alpha", 0.01)],
        activation::leaky_relu,
    ),
    OpDef::unary(
        "Selu",
        &[
            OpAttrDef::float("alpha", SELU_ALPHA),
            OpAttrDef::float("gamma", SELU_GAMMA),
        ],
        activation::selu,
    ),
    OpDef::unary("Softmax", &[OpAttrDef::int("axis", 1)], activation::softmax),
    OpDef::binary("PRelu", &[], activation::prelu),
    // elementwise binary
    OpDef::binary("Add", BROADCAST_ATTRS, arithmetic::add),
    OpDef::binary("Sub", BROADCAST_ATTRS, arithmetic::sub),
    OpDef::binary("Mul", BROADCAST_ATTRS, arithmetic::mul),
    OpDef::binary("Div", BROADCAST_ATTRS, arithmetic::div),
    OpDef::binary("Pow", BROADCAST_ATTRS, arithmetic::pow),
    // n-ary accumulation
    OpDef::variadic("Sum", &[], arithmetic::sum),
    OpDef::variadic("Mean", &[], arithmetic::mean),
    OpDef::variadic("Max", &[], arithmetic::max),
    OpDef::variadic("Min", &[], arithmetic::min),
    // padding
    OpDef::unary(
        "Pad",
        &[
            OpAttrDef::required("paddings", OpAttrType::Ints),
            OpAttrDef::string("mode", "constant"),
            OpAttrDef::float("value", 0.0),
        ],
        pad::pad,
    ),
    // shape manipulation
    OpDef {
        name: "Reshape",
        inputs: Arity::Optional {
            required: 1,
            optional: 1,
        },
        outputs: Arity::Fixed(1),
        param_inputs_from: Some(1),
        attrs: &[OpAttrDef::optional("shape", OpAttrType::Ints)],
        kernel: shape::reshape,
    },
    OpDef::unary(
        "Transpose",
        &[OpAttrDef::optional("perm", OpAttrType::Ints)],
        shape::transpose,
    ),
    OpDef::unary("Squeeze", &[AXES_ATTR], shape::squeeze),
    OpDef::unary(
        "Unsqueeze",
        &[OpAttrDef::required("axes", OpAttrType::Ints)],
        shape::unsqueeze,
    ),
    OpDef::unary("Flatten", &[OpAttrDef::int("axis", 1)], shape::flatten),
    OpDef::variadic(
        "Concat",
        &[OpAttrDef::required("axis", OpAttrType::Int)],
        shape::concat,
    ),
    // reduction
    OpDef::unary("ReduceSum", REDUCE_ATTRS, reduce::reduce_sum),
    OpDef::unary("ReduceMean", REDUCE_ATTRS, reduce::reduce_mean),
    OpDef::unary("ReduceMax", REDUCE_ATTRS, reduce::reduce_max),
    OpDef::unary("ReduceMin", REDUCE_ATTRS, reduce::reduce_min),
    OpDef::unary("ReduceProd", REDUCE_ATTRS, reduce::reduce_prod),
    OpDef::unary("ReduceLogSumExp", REDUCE_ATTRS, reduce::reduce_log_sum_exp),
    // slicing and splitting
    OpDef {
        name: "Slice",
        inputs: Arity::Optional {
            required: 1,
            optional: 3,
        },
        outputs: Arity::Fixed(1),
        param_inputs_from: Some(1),
        attrs: &[
            OpAttrDef::optional("axes", OpAttrType::Ints),
            OpAttrDef::optional("starts", OpAttrType::Ints),
            OpAttrDef::optional("ends", OpAttrType::Ints),
        ],
        kernel: slice::slice,
    },
    OpDef {
        name: "Split",
        inputs: Arity::Optional {
            required: 1,
            optional: 1,
        },
        outputs: Arity::Variadic { min: 1 },
        param_inputs_from: Some(1),
        attrs: &[
            OpAttrDef::int("axis", 0),
            OpAttrDef::optional("split", OpAttrType::Ints),
        ],
        kernel: slice::split,
    },
    // random generation
    OpDef::source(
        "RandomNormal",
        &[
            OpAttrDef::dtype("dtype", DType::F32),
            MEAN_ATTR,
            SCALE_ATTR,
            SEED_ATTR,
            SHAPE_ATTR,
        ],
        random::random_normal,
    ),
    OpDef::source(
        "RandomUniform",
        &[
            OpAttrDef::dtype("dtype", DType::F32),
            LOW_ATTR,
            HIGH_ATTR,
            SEED_ATTR,
            SHAPE_ATTR,
        ],
        random::random_uniform,
    ),
    OpDef::unary(
        "RandomNormalLike",
        &[
            OpAttrDef::optional("dtype", OpAttrType::DType),
            MEAN_ATTR,
            SCALE_ATTR,
            SEED_ATTR,
        ],
        random::random_normal_like,
    ),
    OpDef::unary(
        "RandomUniformLike",
        &[
            OpAttrDef::optional("dtype", OpAttrType::DType),
            LOW_ATTR,
            HIGH_ATTR,
            SEED_ATTR,
        ],
        random::random_uniform_like,
    ),
];
