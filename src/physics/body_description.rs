use crate::physics::body_properties::{BodyInertia, BodyVelocity};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Describes a body's state.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyDescription {
    /// Linear and angular velocity of the body.
    pub velocity: BodyVelocity,
    /// Mass and inertia tensor of the body. Bodies carry no orientation, so the tensor is used
    /// as-is in world space.
    pub local_inertia: BodyInertia,
}

impl BodyDescription {
    /// Creates a dynamic body description.
    #[inline(always)]
    pub fn create_dynamic(velocity: impl Into<BodyVelocity>, local_inertia: BodyInertia) -> Self {
        Self {
            velocity: velocity.into(),
            local_inertia,
        }
    }

    /// Creates a kinematic body description: infinite mass, moved only by its own velocity.
    #[inline(always)]
    pub fn create_kinematic(velocity: impl Into<BodyVelocity>) -> Self {
        Self {
            velocity: velocity.into(),
            local_inertia: BodyInertia::INFINITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn kinematic_descriptions_have_infinite_mass() {
        let description = BodyDescription::create_kinematic(Vec3::X);
        assert_eq!(description.local_inertia, BodyInertia::INFINITE);
        assert_eq!(description.velocity, BodyVelocity::from_linear(Vec3::X));
    }
}
