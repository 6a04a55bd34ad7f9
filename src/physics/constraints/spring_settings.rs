use crate::physics::constraints::constraint_checker::ConstraintChecker;
use crate::physics::error::{SolverError, SolverResult};
use crate::utilities::vector::{SimdValue, Vector};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// SIMD-wide spring settings, aligned with execution order.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SpringSettingsWide {
    pub angular_frequency: Vector,
    pub twice_damping_ratio: Vector,
}

impl Default for SpringSettingsWide {
    #[inline(always)]
    fn default() -> Self {
        Self::broadcast(&SpringSettings::default())
    }
}

impl SpringSettingsWide {
    #[inline(always)]
    pub fn broadcast(source: &SpringSettings) -> Self {
        Self {
            angular_frequency: Vector::splat(source.angular_frequency),
            twice_damping_ratio: Vector::splat(source.twice_damping_ratio),
        }
    }

    #[inline(always)]
    pub fn write_slot(source: &SpringSettings, slot_index: usize, target: &mut SpringSettingsWide) {
        target.angular_frequency.replace(slot_index, source.angular_frequency);
        target.twice_damping_ratio.replace(slot_index, source.twice_damping_ratio);
    }

    #[inline(always)]
    pub fn read_slot(source: &SpringSettingsWide, slot_index: usize) -> SpringSettings {
        SpringSettings {
            angular_frequency: source.angular_frequency.extract(slot_index),
            twice_damping_ratio: source.twice_damping_ratio.extract(slot_index),
        }
    }

    /// Computes springiness values for a set of constraints.
    ///
    /// `position_error_to_velocity * dt` never exceeds 1, so a bias built from it cannot ask for more
    /// than the full error to be removed in a single step.
    #[inline(always)]
    pub fn compute_springiness(
        settings: &SpringSettingsWide,
        dt: f32,
        position_error_to_velocity: &mut Vector,
        effective_mass_cfm_scale: &mut Vector,
        softness_impulse_scale: &mut Vector,
    ) {
        let dt_wide = Vector::splat(dt);
        let angular_frequency_dt = settings.angular_frequency * dt_wide;
        *position_error_to_velocity =
            settings.angular_frequency / (angular_frequency_dt + settings.twice_damping_ratio);
        let extra = Vector::splat(1.0)
            / (angular_frequency_dt * (angular_frequency_dt + settings.twice_damping_ratio));
        *effective_mass_cfm_scale = Vector::splat(1.0) / (Vector::splat(1.0) + extra);
        *softness_impulse_scale = extra * *effective_mass_cfm_scale;
    }
}

/// Scalar spring settings describing the frequency and damping of a springy constraint.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SpringSettings {
    /// Target number of undamped oscillations per unit of time, scaled by 2 * PI.
    pub angular_frequency: f32,
    /// Twice the ratio of the spring's actual damping to its critical damping.
    pub twice_damping_ratio: f32,
}

impl Default for SpringSettings {
    /// 30 hertz, critically damped: stiff enough for contacts at 60 steps per second.
    fn default() -> Self {
        Self::new(30.0, 1.0)
    }
}

impl SpringSettings {
    /// Gets the target number of undamped oscillations per unit of time.
    #[inline(always)]
    pub fn frequency(&self) -> f32 {
        self.angular_frequency / (2.0 * std::f32::consts::PI)
    }

    /// Sets the target number of undamped oscillations per unit of time.
    #[inline(always)]
    pub fn set_frequency(&mut self, value: f32) {
        self.angular_frequency = value * (2.0 * std::f32::consts::PI);
    }

    /// Gets the ratio of the spring's actual damping to its critical damping.
    #[inline(always)]
    pub fn damping_ratio(&self) -> f32 {
        self.twice_damping_ratio / 2.0
    }

    /// Sets the ratio of the spring's actual damping to its critical damping.
    #[inline(always)]
    pub fn set_damping_ratio(&mut self, value: f32) {
        self.twice_damping_ratio = value * 2.0;
    }

    /// Checks if a spring settings instance contains valid values.
    #[inline(always)]
    pub fn validate(settings: &SpringSettings) -> bool {
        ConstraintChecker::is_positive_number(settings.angular_frequency)
            && ConstraintChecker::is_nonnegative_number(settings.twice_damping_ratio)
    }

    /// Returns an error describing the settings if they cannot be used by the solver.
    pub fn check(&self) -> SolverResult<()> {
        if Self::validate(self) {
            Ok(())
        } else {
            Err(SolverError::InvalidSpringSettings {
                angular_frequency: self.angular_frequency,
                twice_damping_ratio: self.twice_damping_ratio,
            })
        }
    }

    /// Constructs a new spring settings instance.
    ///
    /// * `frequency` - Target number of undamped oscillations per unit of time.
    /// * `damping_ratio` - Ratio of the spring's actual damping to its critical damping.
    ///   0 is undamped, 1 is critically damped, and higher values are overdamped.
    pub fn new(frequency: f32, damping_ratio: f32) -> Self {
        let settings = Self {
            angular_frequency: frequency * (2.0 * std::f32::consts::PI),
            twice_damping_ratio: damping_ratio * 2.0,
        };
        debug_assert!(
            Self::validate(&settings),
            "Spring settings must have positive frequency and nonnegative damping ratio."
        );
        settings
    }

    /// Builds settings from a physical stiffness and damping coefficient acting on the given mass.
    ///
    /// The spring is mass-independent once built: `angular_frequency = sqrt(k / m)` and
    /// `twice_damping_ratio = c / (m * angular_frequency)`.
    pub fn from_stiffness_and_damping(
        stiffness: f32,
        damping: f32,
        mass: f32,
    ) -> SolverResult<Self> {
        let angular_frequency = (stiffness / mass).sqrt();
        let settings = Self {
            angular_frequency,
            twice_damping_ratio: damping / (mass * angular_frequency),
        };
        settings.check().map(|_| settings)
    }
}
