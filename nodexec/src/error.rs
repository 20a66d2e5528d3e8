use thiserror::Error;

/// Failure of a single `run_node` invocation.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("operator `{op}` is not supported")]
    UnsupportedOperator { op: String },
    #[error("operator `{op}` expects {expected} {what}, got {actual}")]
    ArityMismatch {
        op: String,
        what: &'static str,
        expected: String,
        actual: usize,
    },
    #[error("operator `{op}` requires attribute `{name}`")]
    MissingRequiredAttribute { op: String, name: String },
    #[error("attribute `{name}` of `{op}` must be {expected}, got {found}")]
    AttributeType {
        op: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("attribute `{name}` of `{op}` is given more than once")]
    DuplicateAttribute { op: String, name: String },
    #[error("input {index} of `{op}` cannot be used as {expected}: {reason}")]
    InputCoercion {
        op: String,
        index: usize,
        expected: &'static str,
        reason: String,
    },
    #[error("operator `{op}` shape mismatch: {detail}")]
    ShapeMismatch { op: String, detail: String },
    #[error("operator `{op}` failed: {source}")]
    Execution {
        op: String,
        #[source]
        source: anyhow::Error,
    },
}

impl OpError {
    pub fn shape_mismatch(op: impl Into<String>, detail: impl Into<String>) -> Self {
        OpError::ShapeMismatch {
            op: op.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn missing_attr(op: &str, name: &str) -> Self {
        OpError::MissingRequiredAttribute {
            op: op.to_string(),
            name: name.to_string(),
        }
    }

    /// Recover a typed error raised inside a kernel, or wrap anything else as
    /// an execution failure of `op`.
    pub(crate) fn from_kernel(op: &str, err: anyhow::Error) -> Self {
        match err.downcast::<OpError>() {
            Ok(typed) => typed,
            Err(source) => OpError::Execution {
                op: op.to_string(),
                source,
            },
        }
    }
}
