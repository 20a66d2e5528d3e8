use crate::tensor::TensorValue;

/// Format a value for compact human-readable output.
pub trait FormatValue {
    fn format_value(&self) -> String;
}

impl FormatValue for f32 {
    fn format_value(&self) -> String {
        format!("{:.2}", self)
    }
}

impl FormatValue for f64 {
    fn format_value(&self) -> String {
        format!("{:.2}", self)
    }
}

macro_rules! impl_format_display {
    ($($ty:ty),+ $(,)?) => {
        $(impl FormatValue for $ty {
            fn format_value(&self) -> String {
                self.to_string()
            }
        })+
    };
}

impl_format_display!(i32, i64);

/// Format a slice with head/tail truncation.
pub fn format_truncated<T: FormatValue>(data: &[T]) -> String {
    let len = data.len();
    if len == 0 {
        return "{}".to_string();
    }
    if len <= 4 {
        let joined = data
            .iter()
            .map(FormatValue::format_value)
            .collect::<Vec<_>>()
            .join(", ");
        return format!("{{{}}}", joined);
    }
    let head = &data[..2];
    let tail = &data[len - 2..];
    format!(
        "{{{}, {} ... {}, {}}}",
        head[0].format_value(),
        head[1].format_value(),
        tail[0].format_value(),
        tail[1].format_value()
    )
}

/// One-line summary of a tensor: dtype, shape and truncated contents.
pub fn format_tensor(value: &TensorValue) -> String {
    let body = match value {
        TensorValue::F32(tensor) => format_truncated(&tensor.data),
        TensorValue::F64(tensor) => format_truncated(&tensor.data),
        TensorValue::I32(tensor) => format_truncated(&tensor.data),
        TensorValue::I64(tensor) => format_truncated(&tensor.data),
    };
    format!("{}{:?} {}", value.dtype(), value.shape(), body)
}
