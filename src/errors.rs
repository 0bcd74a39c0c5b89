//! Errors raised while configuring a gear or building its mesh

use crate::float_types::Real;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GearError>;

/// All the failures a gear mesh construction can surface.
///
/// None of these are transient: the computation is deterministic, so a
/// failed call fails again with the same input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GearError {
    /// (InvalidConfiguration) A parameter is out of range or the derived
    /// radii are degenerate.
    #[error("(InvalidConfiguration) {reason}")]
    InvalidConfiguration { reason: String },

    /// (RootFindingFailure) An implicit equation did not converge.
    #[error(
        "(RootFindingFailure) {context}: no convergence after {iterations} iterations (residual {residual:e})"
    )]
    RootFindingFailure {
        /// What was being solved for
        context: String,
        /// Iterations spent before giving up
        iterations: usize,
        /// Residual norm at the last accepted iterate
        residual: Real,
    },

    /// (TopologyInconsistency) The sub-domain description handed to the
    /// mesher or stitcher is not a valid planar subdivision.
    #[error("(TopologyInconsistency) {reason}")]
    TopologyInconsistency { reason: String },
}

impl GearError {
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn root_finding(context: impl Into<String>, iterations: usize, residual: Real) -> Self {
        Self::RootFindingFailure {
            context: context.into(),
            iterations,
            residual,
        }
    }

    pub fn topology(reason: impl Into<String>) -> Self {
        Self::TopologyInconsistency {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    #[must_use]
    pub const fn is_root_finding_failure(&self) -> bool {
        matches!(self, Self::RootFindingFailure { .. })
    }

    #[must_use]
    pub const fn is_topology_inconsistency(&self) -> bool {
        matches!(self, Self::TopologyInconsistency { .. })
    }
}
