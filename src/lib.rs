//! Four-contact penetration constraint solver for rigid bodies.
//!
//! Contact constraints are solved with sequential impulses over structure-of-arrays lane bundles:
//! a prestep computes jacobians, effective masses and softened bias velocities, warm starting
//! reapplies the impulses of the previous step, and each velocity iteration sweeps the four
//! contacts of every bundle in order.
//!
//! [`physics::constraints::contact::penetration_limit4::PenetrationLimit4`] is the per-bundle
//! math. [`ContactSolver`] drives it against a [`Bodies`] store.

pub mod physics;
pub mod utilities;

pub use crate::physics::bodies::Bodies;
pub use crate::physics::body_description::BodyDescription;
pub use crate::physics::body_properties::{BodyInertia, BodyVelocity};
pub use crate::physics::constraints::contact::contact_convex_common::{
    ConstraintContactData, Contact4,
};
pub use crate::physics::constraints::spring_settings::SpringSettings;
pub use crate::physics::contact_solver::ContactSolver;
pub use crate::physics::error::{SolverError, SolverResult};
pub use crate::physics::handles::{BodyHandle, ConstraintHandle};
pub use crate::physics::pose_integration::{ConstantAcceleration, VelocityIntegratorCallbacks};
pub use crate::physics::solve_description::SolveDescription;
