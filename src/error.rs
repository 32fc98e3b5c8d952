use thiserror::Error;

use crate::types::Label;

/// Convenience result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Error type returned by index construction and lookup.
///
/// This is a single error enum shared by the flat, hierarchical and categorical indices and by the
/// consumers (vectors, frames, grouping) built on top of them. Index values are built atomically,
/// so an error never leaves a partially constructed index behind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    /// A requested label (or MultiIndex tuple) is not present in the index.
    #[error("invalid label: {label} is not present in the index")]
    InvalidLabel { label: Label },

    /// A requested position lies outside `[0, size)`.
    #[error("invalid position: {position} is out of bounds for an index of size {size}")]
    InvalidPosition { position: i64, size: usize },

    /// Tuple widths disagree, a tuple is too narrow, or a position list has the wrong length.
    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// The constructor input cannot be turned into an index at all.
    #[error("construction error: {message}")]
    ConstructionError { message: String },
}

impl IndexError {
    pub(crate) fn invalid_label(label: impl Into<Label>) -> Self {
        Self::InvalidLabel {
            label: label.into(),
        }
    }

    pub(crate) fn invalid_position(position: i64, size: usize) -> Self {
        Self::InvalidPosition { position, size }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        Self::ConstructionError {
            message: message.into(),
        }
    }
}
