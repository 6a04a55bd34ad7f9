use glam::Vec3;

/// Provides helper functions for validating constraint parameter values.
pub struct ConstraintChecker;

impl ConstraintChecker {
    /// Checks if a value is a finite number, neither infinite nor NaN.
    #[inline(always)]
    pub fn is_finite_number(value: f32) -> bool {
        value.is_finite()
    }

    /// Checks if a value is a finite value greater than zero and not NaN.
    #[inline(always)]
    pub fn is_positive_number(value: f32) -> bool {
        Self::is_finite_number(value) && value > 0.0
    }

    /// Checks if a value is a finite value greater than or equal to zero and not NaN.
    #[inline(always)]
    pub fn is_nonnegative_number(value: f32) -> bool {
        Self::is_finite_number(value) && value >= 0.0
    }

    /// Checks if every component of a vector is finite.
    #[inline(always)]
    pub fn is_finite_vector(v: Vec3) -> bool {
        v.is_finite()
    }

    /// Checks if a vector is unit length within a small tolerance.
    #[inline(always)]
    pub fn is_unit_length(v: Vec3) -> bool {
        let length_squared = v.length_squared();
        Self::is_finite_number(length_squared)
            && length_squared <= 1.0 + 1e-5
            && length_squared >= 1.0 - 1e-5
    }

    #[cfg(debug_assertions)]
    pub fn assert_unit_length_vec3(v: Vec3, type_name: &str, property_name: &str) {
        debug_assert!(
            Self::is_unit_length(v),
            "{}.{} must be unit length.",
            type_name,
            property_name
        );
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    pub fn assert_unit_length_vec3(_v: Vec3, _type_name: &str, _property_name: &str) {}
}
