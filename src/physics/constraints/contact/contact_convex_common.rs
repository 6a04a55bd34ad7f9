use crate::physics::constraints::constraint_checker::ConstraintChecker;
use crate::physics::constraints::spring_settings::{SpringSettings, SpringSettingsWide};
use crate::physics::error::{SolverError, SolverResult};
use crate::utilities::vector::{SimdValue, Vector};
use crate::utilities::vector3_wide::Vector3Wide;
use glam::Vec3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Number of contacts held by a convex contact manifold constraint.
pub const CONTACT_COUNT: usize = 4;

/// Accumulated normal impulses of the four contacts of a bundle, persisted between timesteps.
pub type Contact4AccumulatedImpulses = [Vector; CONTACT_COUNT];

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConvexContactWide {
    /// Offset from body A's center of mass to the contact.
    pub offset_a: Vector3Wide,
    /// Penetration depth along the normal. Negative values are speculative contacts.
    pub depth: Vector,
}

impl Default for ConvexContactWide {
    #[inline(always)]
    fn default() -> Self {
        Self {
            offset_a: Vector3Wide::default(),
            depth: Vector::splat(0.0),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MaterialPropertiesWide {
    pub spring_settings: SpringSettingsWide,
    pub maximum_recovery_velocity: Vector,
}

impl Default for MaterialPropertiesWide {
    #[inline(always)]
    fn default() -> Self {
        Self {
            spring_settings: SpringSettingsWide::default(),
            maximum_recovery_velocity: Vector::splat(0.0),
        }
    }
}

/// Raw contact geometry and material for a bundle of four-contact manifolds.
///
/// `offset_b` is the offset from body A's center of mass to body B's center of mass. Each contact's
/// offset from B is derived as `offset_a - offset_b`, so all four contacts must be expressed relative
/// to the same pair of body positions.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct Contact4PrestepData {
    pub contacts: [ConvexContactWide; CONTACT_COUNT],
    pub offset_b: Vector3Wide,
    /// Contact normal calibrated to point from B to A.
    pub normal: Vector3Wide,
    pub material_properties: MaterialPropertiesWide,
}

/// Scalar geometry of one contact in a manifold.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConstraintContactData {
    /// Offset from body A's center of mass to the contact.
    pub offset_a: Vec3,
    /// Penetration depth along the normal; negative when the surfaces are separated.
    pub penetration_depth: f32,
}

impl ConstraintContactData {
    /// Depth given to unused contact slots. Far enough apart that no approach speed reachable in one step closes it.
    pub const INACTIVE_DEPTH: f32 = -1.0e6;

    #[inline(always)]
    pub fn new(offset_a: Vec3, penetration_depth: f32) -> Self {
        Self {
            offset_a,
            penetration_depth,
        }
    }

    /// A slot that never produces an impulse, for manifolds with fewer than four contacts.
    #[inline(always)]
    pub fn inactive() -> Self {
        Self::new(Vec3::ZERO, Self::INACTIVE_DEPTH)
    }
}

/// Scalar description of a two body, four contact convex manifold constraint.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Contact4 {
    pub contacts: [ConstraintContactData; CONTACT_COUNT],
    /// Offset from body A's center of mass to body B's center of mass.
    pub offset_b: Vec3,
    /// Unit length contact normal pointing from B to A.
    pub normal: Vec3,
    pub spring_settings: SpringSettings,
    /// Cap on the speed at which penetration is resolved.
    pub maximum_recovery_velocity: f32,
}

impl Default for Contact4 {
    fn default() -> Self {
        Self {
            contacts: [ConstraintContactData::inactive(); CONTACT_COUNT],
            offset_b: Vec3::ZERO,
            normal: Vec3::Y,
            spring_settings: SpringSettings::default(),
            maximum_recovery_velocity: 2.0,
        }
    }
}

impl Contact4 {
    /// Checks that the description can be handed to the solver.
    pub fn validate(&self) -> SolverResult<()> {
        fn invalid(field: &'static str, reason: &'static str) -> SolverResult<()> {
            Err(SolverError::InvalidContact { field, reason })
        }
        if !ConstraintChecker::is_unit_length(self.normal) {
            return invalid("normal", "must be unit length");
        }
        if !ConstraintChecker::is_finite_vector(self.offset_b) {
            return invalid("offset_b", "must be finite");
        }
        for contact in &self.contacts {
            if !ConstraintChecker::is_finite_vector(contact.offset_a) {
                return invalid("offset_a", "must be finite");
            }
            if !ConstraintChecker::is_finite_number(contact.penetration_depth) {
                return invalid("penetration_depth", "must be finite");
            }
        }
        if !ConstraintChecker::is_nonnegative_number(self.maximum_recovery_velocity) {
            return invalid(
                "maximum_recovery_velocity",
                "must be finite and nonnegative",
            );
        }
        self.spring_settings.check()
    }

    /// Scatters this scalar description into one lane of a prestep bundle.
    pub fn apply_description(&self, prestep_bundle: &mut Contact4PrestepData, inner_index: usize) {
        ConstraintChecker::assert_unit_length_vec3(self.normal, "Contact4", "normal");
        for (source, target) in self.contacts.iter().zip(prestep_bundle.contacts.iter_mut()) {
            target.offset_a.write_slot(source.offset_a, inner_index);
            target.depth.replace(inner_index, source.penetration_depth);
        }
        prestep_bundle.offset_b.write_slot(self.offset_b, inner_index);
        prestep_bundle.normal.write_slot(self.normal, inner_index);
        let material = &mut prestep_bundle.material_properties;
        SpringSettingsWide::write_slot(
            &self.spring_settings,
            inner_index,
            &mut material.spring_settings,
        );
        material
            .maximum_recovery_velocity
            .replace(inner_index, self.maximum_recovery_velocity);
    }

    /// Reads a scalar description back out of one lane of a prestep bundle.
    pub fn build_description(prestep_bundle: &Contact4PrestepData, inner_index: usize) -> Self {
        let material = &prestep_bundle.material_properties;
        Self {
            contacts: std::array::from_fn(|i| {
                let contact = &prestep_bundle.contacts[i];
                ConstraintContactData::new(
                    contact.offset_a.read_slot(inner_index),
                    contact.depth.extract(inner_index),
                )
            }),
            offset_b: prestep_bundle.offset_b.read_slot(inner_index),
            normal: prestep_bundle.normal.read_slot(inner_index),
            spring_settings: SpringSettingsWide::read_slot(&material.spring_settings, inner_index),
            maximum_recovery_velocity: material.maximum_recovery_velocity.extract(inner_index),
        }
    }
}
