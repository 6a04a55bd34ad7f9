//! Error types for the body store, the contact solver driver and their descriptions.
//!
//! The per-bundle solver math never fails; these errors only come from handle lookups and
//! from validating user-authored descriptions before they enter the solver.

use crate::physics::handles::{BodyHandle, ConstraintHandle};
use thiserror::Error;

/// Errors that can occur when registering or solving contact constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// The body handle does not refer to a live body.
    #[error("{0} does not exist")]
    UnknownBody(BodyHandle),

    /// The constraint handle does not refer to a live constraint.
    #[error("{0} does not exist")]
    UnknownConstraint(ConstraintHandle),

    /// Both bodies of a contact have zero inverse mass and inertia.
    #[error("{0} and {1} both have infinite mass; the pair cannot be solved")]
    BothBodiesInfiniteMass(BodyHandle, BodyHandle),

    /// A contact constraint references the same body twice.
    #[error("{0} cannot be in contact with itself")]
    SelfContact(BodyHandle),

    /// A contact description holds a value the solver cannot use.
    #[error("invalid contact description: {field} {reason}")]
    InvalidContact {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Spring settings need a positive frequency and a nonnegative damping ratio.
    #[error("invalid spring settings: angular frequency {angular_frequency}, twice damping ratio {twice_damping_ratio}")]
    InvalidSpringSettings {
        /// Angular frequency that was supplied.
        angular_frequency: f32,
        /// Twice the damping ratio that was supplied.
        twice_damping_ratio: f32,
    },

    /// Solve descriptions need at least one substep and one velocity iteration.
    #[error("invalid solve description: {0}")]
    InvalidSolveDescription(&'static str),
}

/// Result type for solver operations.
pub type SolverResult<T> = std::result::Result<T, SolverError>;
