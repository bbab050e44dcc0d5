//! Runtime configuration for classification and cut-ratio computation.
//!
//! Configuration is a plain value type with sensible defaults; override single
//! fields with struct update syntax:
//!
//! ```rust
//! # use cut_sieve::config::{CutConfig, DegeneratePolicy};
//! let cfg = CutConfig { degenerate_policy: DegeneratePolicy::Reject, ..Default::default() };
//! assert_eq!(cfg.kappa_tolerance, 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Default tolerance on cut ratios before clamping to `[0, 1]`.
pub const DEFAULT_KAPPA_TOLERANCE: f64 = 1e-12;

/// What to do with an element whose vertex values are all exactly zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegeneratePolicy {
    /// Classify the element as POS, log a warning and record it in the
    /// classification's degenerate list.
    #[default]
    TieBreak,
    /// Fail with [`CutError::GeometryDegenerate`](crate::cut_error::CutError).
    Reject,
}

/// Settings shared by the classifier and the cut-ratio engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Admissible deviation of a computed ratio outside `[0, 1]`.
    pub kappa_tolerance: f64,
    /// Handling of all-zero elements.
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            kappa_tolerance: DEFAULT_KAPPA_TOLERANCE,
            degenerate_policy: DegeneratePolicy::TieBreak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let cfg = CutConfig {
            kappa_tolerance: 1e-10,
            degenerate_policy: DegeneratePolicy::Reject,
        };
        let s = serde_json::to_string(&cfg).unwrap();
        let back: CutConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: CutConfig = serde_json::from_str(r#"{"degenerate_policy":"Reject"}"#).unwrap();
        assert_eq!(cfg.kappa_tolerance, DEFAULT_KAPPA_TOLERANCE);
        assert_eq!(cfg.degenerate_policy, DegeneratePolicy::Reject);
    }
}
