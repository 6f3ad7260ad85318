// Error types for store preconditions and value parsing

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reorder index outside the current list
    #[error("index {index} out of range for list of {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
