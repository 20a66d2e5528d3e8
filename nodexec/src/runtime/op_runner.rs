use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::error::OpError;
use crate::formatting::format_tensor;
use crate::graph::{describe_node, NodeDef};
use crate::logging::trace_full_enabled;
use crate::random::{seed_from_env, EntropyRng, RngProvider, SeededRng};
use crate::registry::{op_def, Arity, OpDef};
use crate::tensor::TensorValue;

use super::input::coerce_inputs;
use super::output::package_outputs;
use super::{AttrTable, ExecContext, NodeInput, NodeOutputs, OutputValue};

/// Per-call configuration for `run_node_with`.
#[derive(Clone)]
pub struct RunOptions {
    rng: Arc<dyn RngProvider>,
}

impl RunOptions {
    pub fn new(rng: impl RngProvider + 'static) -> Self {
        Self { rng: Arc::new(rng) }
    }

    /// Random ops draw from OS entropy.
    pub fn entropy() -> Self {
        Self::new(EntropyRng)
    }

    /// Random ops reproduce the same values for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededRng::new(seed))
    }

    /// Seeded when `NODEXEC_SEED` is set, entropy otherwise.
    pub fn from_env() -> Self {
        match seed_from_env() {
            Some(seed) => Self::seeded(seed),
            None => Self::entropy(),
        }
    }

    pub fn rng_provider(&self) -> &dyn RngProvider {
        self.rng.as_ref()
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions").finish_non_exhaustive()
    }
}

/// Execute a single node against positional inputs.
///
/// # Example
/// ```
/// # use nodexec::{run_node, NodeDef, Tensor, TensorValue};
/// # fn main() -> anyhow::Result<()> {
/// let node = NodeDef::new("Relu", ["X"], ["Y"]);
/// let x = Tensor::from_vec(vec![-1.0f32, 2.0])?;
/// let outputs = run_node(&node, [x])?;
/// let y = outputs.tensor("Y").expect("Y");
/// assert_eq!(y, &TensorValue::F32(Tensor::from_vec(vec![0.0, 2.0])?));
/// # Ok(()) }
/// ```
pub fn run_node<I>(node: &NodeDef, inputs: I) -> Result<NodeOutputs, OpError>
where
    I: IntoIterator,
    I::Item: Into<NodeInput>,
{
    run_node_with(node, inputs, &RunOptions::default())
}

/// `run_node` with explicit options.
pub fn run_node_with<I>(
    node: &NodeDef,
    inputs: I,
    options: &RunOptions,
) -> Result<NodeOutputs, OpError>
where
    I: IntoIterator,
    I::Item: Into<NodeInput>,
{
    crate::trace!("{}", describe_node(node));
    let inputs = inputs.into_iter().map(Into::into).collect::<Vec<_>>();
    let result = execute(node, inputs, options);
    if let Err(err) = &result {
        crate::error!("{}: {}", node.display_name(), err);
    }
    result
}

fn execute(
    node: &NodeDef,
    inputs: Vec<NodeInput>,
    options: &RunOptions,
) -> Result<NodeOutputs, OpError> {
    let op = op_def(&node.op_type).ok_or_else(|| OpError::UnsupportedOperator {
        op: node.op_type.clone(),
    })?;
    check_arity(op, "inputs", op.inputs, node.inputs.len())?;
    check_arity(op, "outputs", op.outputs, node.outputs.len())?;
    if inputs.len() != node.inputs.len() {
        return Err(OpError::ArityMismatch {
            op: op.name.to_string(),
            what: "input values",
            expected: node.inputs.len().to_string(),
            actual: inputs.len(),
        });
    }

    let inputs = coerce_inputs(op, inputs)?;
    if trace_full_enabled() {
        for (name, value) in node.inputs.iter().zip(&inputs) {
            crate::trace_full!("  in  {} = {}", name, format_tensor(value));
        }
    }
    let attrs = AttrTable::resolve(op, &node.attrs)?;
    let ctx = ExecContext::new(op, node, inputs, attrs, options.rng_provider());

    let started = Instant::now();
    let value = (op.kernel)(&ctx).map_err(|err| OpError::from_kernel(op.name, err))?;
    crate::trace_full!(
        "{} finished in {}us",
        node.display_name(),
        started.elapsed().as_micros()
    );
    if trace_full_enabled() {
        trace_output(&node.outputs, &value);
    }
    package_outputs(op, node, value)
}

fn check_arity(op: &OpDef, what: &'static str, arity: Arity, actual: usize) -> Result<(), OpError> {
    if arity.accepts(actual) {
        return Ok(());
    }
    Err(OpError::ArityMismatch {
        op: op.name.to_string(),
        what,
        expected: arity.describe(),
        actual,
    })
}

fn trace_output(names: &[String], value: &OutputValue) {
    let label = names.first().map(String::as_str).unwrap_or("?");
    match value {
        OutputValue::Tensor(tensor) => trace_tensor(label, tensor),
        OutputValue::Sequence(items) => {
            for (idx, tensor) in items.iter().enumerate() {
                trace_tensor(&format!("{label}[{idx}]"), tensor);
            }
        }
    }
}

fn trace_tensor(label: &str, tensor: &TensorValue) {
    crate::trace_full!("  out {} = {}", label, format_tensor(tensor));
}
