use glam::Vec3;

use crate::physics::body_properties::{BodyInertia, BodyVelocity};
use crate::physics::handles::BodyHandle;

/// Defines a type that handles callbacks for body velocity integration.
///
/// Velocity integration runs once per substep, before any constraint sees the velocities.
/// Kinematic bodies are never passed to `integrate_velocity`; they keep whatever velocity they have.
pub trait VelocityIntegratorCallbacks {
    /// Callback invoked ahead of the integration of every substep.
    fn prepare_for_integration(&mut self, _dt: f32) {}

    /// Callback for a single body being integrated.
    fn integrate_velocity(
        &self,
        handle: BodyHandle,
        local_inertia: &BodyInertia,
        velocity: &mut BodyVelocity,
        dt: f32,
    );
}

/// No external forces.
impl VelocityIntegratorCallbacks for () {
    #[inline(always)]
    fn integrate_velocity(
        &self,
        _handle: BodyHandle,
        _local_inertia: &BodyInertia,
        _velocity: &mut BodyVelocity,
        _dt: f32,
    ) {
    }
}

/// Applies a constant acceleration, such as gravity, to every body with finite mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantAcceleration {
    pub acceleration: Vec3,
    acceleration_dt: Vec3,
}

impl ConstantAcceleration {
    pub fn new(acceleration: Vec3) -> Self {
        Self {
            acceleration,
            acceleration_dt: Vec3::ZERO,
        }
    }

    pub fn gravity() -> Self {
        Self::new(Vec3::new(0.0, -10.0, 0.0))
    }
}

impl VelocityIntegratorCallbacks for ConstantAcceleration {
    fn prepare_for_integration(&mut self, dt: f32) {
        self.acceleration_dt = self.acceleration * dt;
    }

    #[inline(always)]
    fn integrate_velocity(
        &self,
        _handle: BodyHandle,
        local_inertia: &BodyInertia,
        velocity: &mut BodyVelocity,
        _dt: f32,
    ) {
        if local_inertia.inverse_mass > 0.0 {
            velocity.linear += self.acceleration_dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_acceleration_skips_infinite_mass() {
        let mut callbacks = ConstantAcceleration::gravity();
        callbacks.prepare_for_integration(0.5);
        let mut dynamic = BodyVelocity::default();
        let mut frozen = BodyVelocity::default();
        callbacks.integrate_velocity(
            BodyHandle(0),
            &BodyInertia::solid_sphere(1.0, 1.0),
            &mut dynamic,
            0.5,
        );
        callbacks.integrate_velocity(BodyHandle(1), &BodyInertia::INFINITE, &mut frozen, 0.5);
        assert_eq!(dynamic.linear, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(frozen, BodyVelocity::default());
    }
}
