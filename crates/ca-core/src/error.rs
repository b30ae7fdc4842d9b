use crate::model::StateKind;
use thiserror::Error;

/// User-facing and caller-facing failures.
///
/// Malformed SVG is deliberately absent: extraction degrades to an empty
/// result instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimatorError {
    /// An upload is missing one of its two SVG files.
    #[error("Please select both Collapsed and Expanded SVG files.")]
    MissingUpload { state: StateKind },

    /// A modifier route names a project that was never created.
    #[error("project `{slug}` does not exist")]
    UnknownProject { slug: String },

    /// Exported variant text could not be read back.
    #[error("invalid variant export: {message}")]
    ExportParse { message: String },
}

pub type AnimatorResult<T> = Result<T, AnimatorError>;
