use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::physics::constraints::contact::contact_convex_common::{
    Contact4AccumulatedImpulses, Contact4PrestepData, CONTACT_COUNT,
};
use crate::physics::constraints::spring_settings::SpringSettingsWide;
use crate::utilities::symmetric3x3_wide::Symmetric3x3Wide;
use crate::utilities::vector::{SimdPartialOrd, SimdValue, Vector};
use crate::utilities::vector3_wide::Vector3Wide;

#[derive(Clone, Copy)]
pub struct PenetrationLimitProjection {
    //Note that these are just the raw jacobians, no precomputation with the JT*EffectiveMass.
    pub angular_a: Vector3Wide,
    pub angular_b: Vector3Wide,
    pub effective_mass: Vector,
    pub bias_velocity: Vector,
}

impl Default for PenetrationLimitProjection {
    #[inline(always)]
    fn default() -> Self {
        Self {
            angular_a: Vector3Wide::default(),
            angular_b: Vector3Wide::default(),
            effective_mass: Vector::splat(0.0),
            bias_velocity: Vector::splat(0.0),
        }
    }
}

/// Data required to project world space velocities into a constraint impulse.
///
/// The normal and inertias are shared across all four contacts and are passed alongside the projection
/// rather than stored in it.
#[derive(Clone, Copy)]
pub struct Projection {
    pub penetrations: [PenetrationLimitProjection; CONTACT_COUNT],
    pub softness_impulse_scale: Vector,
}

impl Default for Projection {
    #[inline(always)]
    fn default() -> Self {
        Self {
            penetrations: [PenetrationLimitProjection::default(); CONTACT_COUNT],
            softness_impulse_scale: Vector::splat(0.0),
        }
    }
}

/// Four convex-sourced contact penetration limits solved together with sequential impulses.
/// Batching saves on redundant data: the normal, inertias and softness are shared by every contact.
pub struct PenetrationLimit4;

impl PenetrationLimit4 {
    /// Computes the jacobians, effective masses and bias velocities of four contacts for one timestep.
    ///
    /// The contact penetration constraint takes the form
    /// `dot(positionA + offsetA, N) >= dot(positionB + offsetB, N)` with `N` pointing from B to A.
    /// Differentiating and treating the normal as constant gives the jacobians
    /// `linearA: N`, `angularA: offsetA x N`, `linearB: -N`, `angularB: N x offsetB`.
    /// The collision detection system's penetration depth stands in for the position error.
    #[inline(always)]
    pub fn prestep(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        prestep: &Contact4PrestepData,
        dt: f32,
        inverse_dt: f32,
    ) -> Projection {
        let mut position_error_to_velocity = Vector::splat(0.0);
        let mut effective_mass_cfm_scale = Vector::splat(0.0);
        let mut softness_impulse_scale = Vector::splat(0.0);
        SpringSettingsWide::compute_springiness(
            &prestep.material_properties.spring_settings,
            dt,
            &mut position_error_to_velocity,
            &mut effective_mass_cfm_scale,
            &mut softness_impulse_scale,
        );
        //Linear effective mass contribution notes:
        //1) The J * M^-1 * JT can be reordered to J * JT * M^-1 for the linear components, since M^-1 is a scalar and dot(n * scalar, n) = dot(n, n) * scalar.
        //2) dot(normal, normal) == 1, so the contribution from each body is just its inverse mass.
        let linear = inertia_a.inverse_mass + inertia_b.inverse_mass;
        let inverse_dt_wide = Vector::splat(inverse_dt);
        let maximum_recovery_velocity = prestep.material_properties.maximum_recovery_velocity;

        let mut projection = Projection {
            softness_impulse_scale,
            ..Projection::default()
        };
        for (contact, penetration) in prestep
            .contacts
            .iter()
            .zip(projection.penetrations.iter_mut())
        {
            //Note that we leave the penetration depth as is, even when it's negative. Speculative contacts!
            Vector3Wide::cross_without_overlap(
                &contact.offset_a,
                normal,
                &mut penetration.angular_a,
            );
            let mut offset_b = Vector3Wide::default();
            Vector3Wide::subtract(&contact.offset_a, &prestep.offset_b, &mut offset_b);
            Vector3Wide::cross_without_overlap(normal, &offset_b, &mut penetration.angular_b);

            let mut angular_a = Vector::splat(0.0);
            Symmetric3x3Wide::vector_sandwich(
                &penetration.angular_a,
                &inertia_a.inverse_inertia_tensor,
                &mut angular_a,
            );
            let mut angular_b = Vector::splat(0.0);
            Symmetric3x3Wide::vector_sandwich(
                &penetration.angular_b,
                &inertia_b.inverse_inertia_tensor,
                &mut angular_b,
            );
            //Note that we don't precompute the JT * effectiveMass term. Since the jacobians are shared, we have to do that multiply anyway.
            penetration.effective_mass =
                effective_mass_cfm_scale / (linear + angular_a + angular_b);

            //If depth is negative, the bias velocity will permit motion up until the depth hits zero. This works because positionErrorToVelocity * dt will always be <=1.
            penetration.bias_velocity = (contact.depth * inverse_dt_wide).simd_min(
                (contact.depth * position_error_to_velocity).simd_min(maximum_recovery_velocity),
            );
        }
        projection
    }

    /// Transforms an impulse from constraint space to world space and uses it to modify the velocities of both bodies.
    #[inline(always)]
    pub fn apply_impulse(
        projection: &PenetrationLimitProjection,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        corrective_impulse: &Vector,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let linear_velocity_change_a = *corrective_impulse * inertia_a.inverse_mass;
        let corrective_velocity_a_linear_velocity =
            Vector3Wide::scale(normal, &linear_velocity_change_a);
        let corrective_angular_impulse_a =
            Vector3Wide::scale(&projection.angular_a, corrective_impulse);
        let mut corrective_velocity_a_angular_velocity = Vector3Wide::default();
        Symmetric3x3Wide::transform_without_overlap(
            &corrective_angular_impulse_a,
            &inertia_a.inverse_inertia_tensor,
            &mut corrective_velocity_a_angular_velocity,
        );

        let linear_velocity_change_b = *corrective_impulse * inertia_b.inverse_mass;
        let corrective_velocity_b_linear_velocity =
            Vector3Wide::scale(normal, &linear_velocity_change_b);
        let corrective_angular_impulse_b =
            Vector3Wide::scale(&projection.angular_b, corrective_impulse);
        let mut corrective_velocity_b_angular_velocity = Vector3Wide::default();
        Symmetric3x3Wide::transform_without_overlap(
            &corrective_angular_impulse_b,
            &inertia_b.inverse_inertia_tensor,
            &mut corrective_velocity_b_angular_velocity,
        );

        wsv_a.linear = wsv_a.linear + corrective_velocity_a_linear_velocity;
        wsv_a.angular = wsv_a.angular + corrective_velocity_a_angular_velocity;
        //Note subtract; normal = -jacobianLinearB
        wsv_b.linear = wsv_b.linear - corrective_velocity_b_linear_velocity;
        wsv_b.angular = wsv_b.angular + corrective_velocity_b_angular_velocity;
    }

    /// Reapplies the impulses accumulated during the previous timestep, in slot order.
    #[inline(always)]
    pub fn warm_start(
        projection: &Projection,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        accumulated_impulses: &Contact4AccumulatedImpulses,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        for (penetration, accumulated_impulse) in projection
            .penetrations
            .iter()
            .zip(accumulated_impulses.iter())
        {
            Self::apply_impulse(
                penetration,
                inertia_a,
                inertia_b,
                normal,
                accumulated_impulse,
                wsv_a,
                wsv_b,
            );
        }
    }

    /// Computes the change in accumulated impulse for one contact and clamps the accumulated impulse to be nonnegative.
    #[inline(always)]
    pub fn compute_corrective_impulse(
        wsv_a: &BodyVelocityWide,
        wsv_b: &BodyVelocityWide,
        projection: &PenetrationLimitProjection,
        normal: &Vector3Wide,
        softness_impulse_scale: &Vector,
        accumulated_impulse: &mut Vector,
        corrective_csi: &mut Vector,
    ) {
        //Note that we do NOT use pretransformed jacobians here; the linear jacobian sharing (normal) meant that we had the effective mass anyway.
        let mut csva_linear = Vector::splat(0.0);
        Vector3Wide::dot(&wsv_a.linear, normal, &mut csva_linear);
        let mut csva_angular = Vector::splat(0.0);
        Vector3Wide::dot(&wsv_a.angular, &projection.angular_a, &mut csva_angular);
        let mut negated_csvb_linear = Vector::splat(0.0);
        Vector3Wide::dot(&wsv_b.linear, normal, &mut negated_csvb_linear);
        let mut csvb_angular = Vector::splat(0.0);
        Vector3Wide::dot(&wsv_b.angular, &projection.angular_b, &mut csvb_angular);
        //Compute negated version to avoid the need for an explicit negate.
        let negated_csi = *accumulated_impulse * *softness_impulse_scale
            + (csva_linear - negated_csvb_linear + csva_angular + csvb_angular
                - projection.bias_velocity)
                * projection.effective_mass;

        let previous_accumulated = *accumulated_impulse;
        *accumulated_impulse = (*accumulated_impulse - negated_csi).simd_max(Vector::splat(0.0));

        *corrective_csi = *accumulated_impulse - previous_accumulated;
    }

    /// Performs one sequential impulse sweep over the four contacts, slot 0 through 3.
    ///
    /// Each contact's impulse is applied before the next contact reads the body velocities.
    #[inline(always)]
    pub fn solve(
        projection: &Projection,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        accumulated_impulses: &mut Contact4AccumulatedImpulses,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        for (penetration, accumulated_impulse) in projection
            .penetrations
            .iter()
            .zip(accumulated_impulses.iter_mut())
        {
            let mut corrective_csi = Vector::splat(0.0);
            Self::compute_corrective_impulse(
                wsv_a,
                wsv_b,
                penetration,
                normal,
                &projection.softness_impulse_scale,
                accumulated_impulse,
                &mut corrective_csi,
            );
            Self::apply_impulse(
                penetration,
                inertia_a,
                inertia_b,
                normal,
                &corrective_csi,
                wsv_a,
                wsv_b,
            );
        }
    }

    /// Estimates how far the bodies moved along the normal at each contact over `dt` and adjusts the depths to match.
    #[inline(always)]
    pub fn update_penetration_depths(
        dt: &Vector,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
        prestep: &mut Contact4PrestepData,
    ) {
        //The normal is calibrated to point from B to A. Any movement of A along N results in a decrease in depth. Any movement of B along N results in an increase in depth.
        //estimatedPenetrationDepthChange = dot(normal, velocityDtA.Linear + velocityDtA.Angular x contactOffsetA) - dot(normal, velocityDtB.Linear + velocityDtB.Angular x contactOffsetB)
        let normal = prestep.normal;
        let offset_b = prestep.offset_b;
        for contact in prestep.contacts.iter_mut() {
            let contact_velocity_a =
                Vector3Wide::cross(&velocity_a.angular, &contact.offset_a) + velocity_a.linear;
            let mut contact_offset_b = Vector3Wide::default();
            Vector3Wide::subtract(&contact.offset_a, &offset_b, &mut contact_offset_b);
            let contact_velocity_b =
                Vector3Wide::cross(&velocity_b.angular, &contact_offset_b) + velocity_b.linear;
            let estimated_depth_change_velocity =
                Vector3Wide::dot_val(&normal, &(contact_velocity_a - contact_velocity_b));
            contact.depth = contact.depth - estimated_depth_change_velocity * *dt;
        }
    }
}
