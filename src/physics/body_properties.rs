use glam::Vec3;
use std::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::utilities::symmetric3x3::Symmetric3x3;
use crate::utilities::symmetric3x3_wide::Symmetric3x3Wide;
use crate::utilities::vector::{SimdValue, Vector};
use crate::utilities::vector3_wide::Vector3Wide;

/// Linear and angular velocity for a body.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyVelocity {
    /// Linear velocity associated with the body.
    pub linear: Vec3,
    /// Angular velocity associated with the body.
    pub angular: Vec3,
}

impl BodyVelocity {
    /// Creates a new set of body velocities. Angular velocity is set to zero.
    #[inline(always)]
    pub fn from_linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }

    /// Creates a new set of body velocities.
    #[inline(always)]
    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }
}

impl From<Vec3> for BodyVelocity {
    fn from(linear: Vec3) -> Self {
        Self::from_linear(linear)
    }
}

impl fmt::Display for BodyVelocity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.linear, self.angular)
    }
}

/// Stores the inertia for a body.
///
/// This representation stores the inverse mass and inverse inertia tensor.
/// Most of the high frequency use cases in the engine naturally use the inverse.
/// A body with zero inverse mass and zero inverse inertia behaves as if it had infinite mass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyInertia {
    /// Inverse of the body's inertia tensor.
    pub inverse_inertia_tensor: Symmetric3x3,
    /// Inverse of the body's mass.
    pub inverse_mass: f32,
}

impl BodyInertia {
    /// Inertia of a body that cannot be moved by constraints.
    pub const INFINITE: Self = Self {
        inverse_inertia_tensor: Symmetric3x3::ZERO,
        inverse_mass: 0.0,
    };

    /// Inertia of a uniform solid sphere.
    pub fn solid_sphere(mass: f32, radius: f32) -> Self {
        let inertia = 0.4 * mass * radius * radius;
        Self {
            inverse_inertia_tensor: Symmetric3x3::from_scaled_identity(1.0 / inertia),
            inverse_mass: 1.0 / mass,
        }
    }

    /// Inertia of a uniform solid box with the given full extents.
    pub fn solid_box(mass: f32, width: f32, height: f32, length: f32) -> Self {
        let (w2, h2, l2) = (width * width, height * height, length * length);
        let scale = mass / 12.0;
        let diagonal = Vec3::new(scale * (h2 + l2), scale * (w2 + l2), scale * (w2 + h2));
        Self {
            inverse_inertia_tensor: Symmetric3x3::from_diagonal(diagonal.recip()),
            inverse_mass: 1.0 / mass,
        }
    }
}

impl fmt::Display for BodyInertia {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}, {:?}",
            self.inverse_mass, self.inverse_inertia_tensor
        )
    }
}

// --- Wide types ---

#[derive(Clone, Copy, Default)]
pub struct BodyVelocityWide {
    pub linear: Vector3Wide,
    pub angular: Vector3Wide,
}

impl BodyVelocityWide {
    #[inline(always)]
    pub fn write_slot(velocity: &BodyVelocity, slot_index: usize, wide: &mut Self) {
        wide.linear.write_slot(velocity.linear, slot_index);
        wide.angular.write_slot(velocity.angular, slot_index);
    }

    #[inline(always)]
    pub fn read_slot(wide: &Self, slot_index: usize) -> BodyVelocity {
        BodyVelocity::new(
            wide.linear.read_slot(slot_index),
            wide.angular.read_slot(slot_index),
        )
    }
}

#[derive(Clone, Copy)]
pub struct BodyInertiaWide {
    pub inverse_inertia_tensor: Symmetric3x3Wide,
    pub inverse_mass: Vector,
}

impl Default for BodyInertiaWide {
    #[inline(always)]
    fn default() -> Self {
        Self {
            inverse_inertia_tensor: Symmetric3x3Wide::default(),
            inverse_mass: Vector::splat(0.0),
        }
    }
}

impl BodyInertiaWide {
    #[inline(always)]
    pub fn broadcast(inertia: &BodyInertia) -> Self {
        Self {
            inverse_inertia_tensor: Symmetric3x3Wide::broadcast(&inertia.inverse_inertia_tensor),
            inverse_mass: Vector::splat(inertia.inverse_mass),
        }
    }

    #[inline(always)]
    pub fn write_slot(inertia: &BodyInertia, slot_index: usize, wide: &mut Self) {
        Symmetric3x3Wide::write_slot(
            &inertia.inverse_inertia_tensor,
            slot_index,
            &mut wide.inverse_inertia_tensor,
        );
        wide.inverse_mass.replace(slot_index, inertia.inverse_mass);
    }

    #[inline(always)]
    pub fn read_slot(wide: &Self, slot_index: usize) -> BodyInertia {
        BodyInertia {
            inverse_inertia_tensor: Symmetric3x3Wide::read_slot(
                &wide.inverse_inertia_tensor,
                slot_index,
            ),
            inverse_mass: wide.inverse_mass.extract(slot_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::LANES;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_inertia() {
        let inertia = BodyInertia::solid_sphere(2.0, 0.5);
        assert_relative_eq!(inertia.inverse_mass, 0.5);
        assert_relative_eq!(inertia.inverse_inertia_tensor.xx, 1.0 / 0.2);
        assert_eq!(inertia.inverse_inertia_tensor.yx, 0.0);
    }

    #[test]
    fn wide_slots_hold_independent_bodies() {
        let mut velocities = BodyVelocityWide::default();
        let mut inertias = BodyInertiaWide::default();
        for lane in 0..LANES {
            let velocity = BodyVelocity::new(Vec3::splat(lane as f32), Vec3::Y * lane as f32);
            BodyVelocityWide::write_slot(&velocity, lane, &mut velocities);
            BodyInertiaWide::write_slot(
                &BodyInertia::solid_sphere(1.0 + lane as f32, 1.0),
                lane,
                &mut inertias,
            );
        }
        for lane in 0..LANES {
            let velocity = BodyVelocityWide::read_slot(&velocities, lane);
            assert_eq!(velocity.linear, Vec3::splat(lane as f32));
            assert_eq!(velocity.angular, Vec3::Y * lane as f32);
            assert_eq!(
                BodyInertiaWide::read_slot(&inertias, lane),
                BodyInertia::solid_sphere(1.0 + lane as f32, 1.0)
            );
        }
    }
}
