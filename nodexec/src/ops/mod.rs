pub mod cpu;

use anyhow::Result;

use crate::runtime::{ExecContext, OutputValue};

/// CPU implementation of one operator.
pub type Kernel = fn(&ExecContext<'_>) -> Result<OutputValue>;
