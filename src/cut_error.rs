//! CutError: Unified error type for cut-sieve public APIs
//!
//! Every fallible operation in the crate returns `Result<_, CutError>`. The
//! variants fall in two groups: geometric conditions that a caller may want to
//! recover from (`GeometryDegenerate`), and contract violations that should fail
//! fast (everything else).

use thiserror::Error;

use crate::data::level_set::FieldStamp;

/// Unified error type for cut-sieve operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CutError {
    /// A cut element does not admit a well-defined cut ratio without a
    /// tie-break, or its decomposition left the admissible range.
    #[error("degenerate geometry on element {element}: {reason}")]
    GeometryDegenerate { element: usize, reason: String },
    /// Dof selection or assembly invoked with data from a mismatched mesh/space.
    #[error("inconsistent space: {0}")]
    InconsistentSpace(String),
    /// A restricted facet has no incident element in the element restriction.
    #[error("facet {facet} lies outside the element restriction")]
    RestrictionMismatch { facet: usize },
    /// Derived data was computed from a different field generation.
    #[error("stale classification: computed from {found}, field is at {expected}")]
    StaleClassification {
        expected: FieldStamp,
        found: FieldStamp,
    },
    /// Two sizes that must agree do not.
    #[error("size mismatch for {what}: expected {expected}, got {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// The mesh violates a topological requirement.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    /// An entity index exceeded its range.
    #[error("{what} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl CutError {
    /// Returns true for errors a caller may recover from by changing the input
    /// geometry or the degenerate-element policy.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CutError::GeometryDegenerate { .. })
    }
}
