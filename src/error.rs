//! Error types for power diagram and treemap computation

use thiserror::Error;

/// Errors that can occur while computing a diagram, a simulation or a treemap
///
/// Every variant is fatal to the computation that raised it; nothing is
/// retried internally. Callers typically fall back to a simpler partition
/// (see [`VoronoiError::is_layout_dependent`] to decide whether a retry with
/// another seed is worth it first).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoronoiError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A boundary or hierarchy value cannot be used
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Fewer than 4 usable points, or all points collinear / coplanar
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// An expected topological relationship of the hull is missing
    #[error("hull invariant violated: {0}")]
    HullInvariant(String),
    /// Pairwise weight correction did not settle within its fix budget
    #[error("overweight correction did not converge after {fixes} fixes")]
    OverweightCorrection {
        /// Number of fixes applied before giving up
        fixes: usize,
    },
    /// A site lost its cell after adaptation
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl VoronoiError {
    /// Whether the failure depends on the particular site placement
    ///
    /// `true` means a new seed or another initial position strategy may
    /// succeed; `false` means the input itself is unusable and the caller
    /// should fall back unconditionally.
    pub fn is_layout_dependent(&self) -> bool {
        matches!(
            self,
            VoronoiError::HullInvariant(_)
                | VoronoiError::OverweightCorrection { .. }
                | VoronoiError::InvariantViolation(_)
        )
    }
}

/// Result type alias for diagram operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
