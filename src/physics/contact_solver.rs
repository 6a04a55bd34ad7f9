use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::physics::bodies::Bodies;
use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::physics::constraints::contact::contact_convex_common::{
    Contact4, Contact4AccumulatedImpulses, Contact4PrestepData, CONTACT_COUNT,
};
use crate::physics::constraints::contact::penetration_limit4::{PenetrationLimit4, Projection};
use crate::physics::error::{SolverError, SolverResult};
use crate::physics::handles::{BodyHandle, ConstraintHandle};
use crate::physics::pose_integration::VelocityIntegratorCallbacks;
use crate::physics::solve_description::SolveDescription;
use crate::utilities::bundle_indexing::BundleIndexing;
use crate::utilities::id_pool::IdPool;
use crate::utilities::vector::{from_lanes, to_lanes, SimdValue, Vector, LANES};

/// A registered four-contact constraint between two bodies.
#[derive(Debug, Clone)]
struct ContactConstraint {
    handle: ConstraintHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,
    description: Contact4,
    /// Impulses accumulated during the last substep. These warm start the next step.
    accumulated_impulses: [f32; CONTACT_COUNT],
    /// Impulses summed over every substep of the last step.
    step_impulses: [f32; CONTACT_COUNT],
}

/// Lanes of up to `LANES` constraints that share no dynamic body, plus everything the solver needs
/// to iterate over them within one step.
struct ConstraintBundle {
    constraint_indices: Vec<usize>,
    body_indices_a: Vec<usize>,
    body_indices_b: Vec<usize>,
    prestep: Contact4PrestepData,
    inertia_a: BodyInertiaWide,
    inertia_b: BodyInertiaWide,
    projection: Projection,
    accumulated_impulses: Contact4AccumulatedImpulses,
    step_impulses: Contact4AccumulatedImpulses,
}

impl ConstraintBundle {
    #[inline(always)]
    fn gather_velocities(
        &self,
        bodies: &Bodies,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        bodies.gather_velocities(&self.body_indices_a, wsv_a);
        bodies.gather_velocities(&self.body_indices_b, wsv_b);
    }

    #[inline(always)]
    fn scatter_velocities(
        &self,
        bodies: &mut Bodies,
        wsv_a: &BodyVelocityWide,
        wsv_b: &BodyVelocityWide,
    ) {
        bodies.scatter_velocities(&self.body_indices_a, wsv_a);
        bodies.scatter_velocities(&self.body_indices_b, wsv_b);
    }
}

/// Owns the contact constraints of a simulation and solves them against a body store.
///
/// Each call to [`ContactSolver::step`] batches the constraints so that no dynamic body appears
/// twice in a bundle, then runs prestep, warm start and the velocity iterations for every substep.
/// Accumulated impulses are kept on the constraints between steps and used for warm starting.
pub struct ContactSolver {
    solve_description: SolveDescription,
    constraints: Vec<ContactConstraint>,
    /// Remaps a constraint handle integer value to the index of the constraint, or -1 if unused.
    handle_to_index: Vec<i32>,
    handle_pool: IdPool,
    /// Timestep of the last completed step, or zero before the first one.
    last_dt: f32,
}

impl ContactSolver {
    pub fn new(solve_description: impl Into<SolveDescription>) -> SolverResult<Self> {
        let solve_description = solve_description.into();
        solve_description.validate()?;
        Ok(Self {
            solve_description,
            constraints: Vec::new(),
            handle_to_index: Vec::new(),
            handle_pool: IdPool::new(),
            last_dt: 0.0,
        })
    }

    #[inline(always)]
    pub fn solve_description(&self) -> &SolveDescription {
        &self.solve_description
    }

    pub fn set_solve_description(
        &mut self,
        solve_description: SolveDescription,
    ) -> SolverResult<()> {
        solve_description.validate()?;
        self.solve_description = solve_description;
        Ok(())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    #[inline(always)]
    pub fn contains(&self, handle: ConstraintHandle) -> bool {
        handle.0 >= 0
            && (handle.0 as usize) < self.handle_to_index.len()
            && self.handle_to_index[handle.0 as usize] >= 0
    }

    fn index_of(&self, handle: ConstraintHandle) -> SolverResult<usize> {
        if self.contains(handle) {
            Ok(self.handle_to_index[handle.0 as usize] as usize)
        } else {
            Err(SolverError::UnknownConstraint(handle))
        }
    }

    /// Adds a contact constraint between two bodies. Body A is the body the contact offsets are
    /// measured from and the normal points from B to A.
    ///
    /// The constraint refers to its bodies by handle. Body handles are reused after removal, so the
    /// constraints of a body must be removed along with it, for example through
    /// [`ContactSolver::remove_body_constraints`].
    pub fn add(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        description: &Contact4,
        bodies: &Bodies,
    ) -> SolverResult<ConstraintHandle> {
        if body_a == body_b {
            return Err(SolverError::SelfContact(body_a));
        }
        let kinematic_a = Bodies::is_kinematic(bodies.inertia(body_a)?);
        let kinematic_b = Bodies::is_kinematic(bodies.inertia(body_b)?);
        if kinematic_a && kinematic_b {
            return Err(SolverError::BothBodiesInfiniteMass(body_a, body_b));
        }
        description.validate()?;

        let handle = ConstraintHandle(self.handle_pool.take());
        let slot = handle.0 as usize;
        if slot >= self.handle_to_index.len() {
            self.handle_to_index.resize(slot + 1, -1);
        }
        self.handle_to_index[slot] = self.constraints.len() as i32;
        self.constraints.push(ContactConstraint {
            handle,
            body_a,
            body_b,
            description: *description,
            accumulated_impulses: [0.0; CONTACT_COUNT],
            step_impulses: [0.0; CONTACT_COUNT],
        });
        trace!("added {} between {} and {}", handle, body_a, body_b);
        Ok(handle)
    }

    /// Removes a constraint, returning its last description.
    pub fn remove(&mut self, handle: ConstraintHandle) -> SolverResult<Contact4> {
        let index = self.index_of(handle)?;
        let removed = self.constraints.swap_remove(index);
        if let Some(moved) = self.constraints.get(index) {
            self.handle_to_index[moved.handle.0 as usize] = index as i32;
        }
        self.handle_to_index[handle.0 as usize] = -1;
        self.handle_pool.return_id(handle.0);
        Ok(removed.description)
    }

    /// Removes every constraint that refers to a body and returns their handles.
    pub fn remove_body_constraints(&mut self, body: BodyHandle) -> Vec<ConstraintHandle> {
        let removed: Vec<ConstraintHandle> = self
            .constraints
            .iter()
            .filter(|constraint| constraint.body_a == body || constraint.body_b == body)
            .map(|constraint| constraint.handle)
            .collect();
        for &handle in &removed {
            //Every handle came straight from the live constraint set.
            let _ = self.remove(handle);
        }
        removed
    }

    /// Replaces the contact geometry and material of a constraint. Accumulated impulses are kept so
    /// that refreshed contacts still warm start from the previous step.
    pub fn update_contact(
        &mut self,
        handle: ConstraintHandle,
        description: &Contact4,
    ) -> SolverResult<()> {
        description.validate()?;
        let index = self.index_of(handle)?;
        self.constraints[index].description = *description;
        Ok(())
    }

    pub fn contact(&self, handle: ConstraintHandle) -> SolverResult<&Contact4> {
        let index = self.index_of(handle)?;
        Ok(&self.constraints[index].description)
    }

    /// Gets the bodies connected by a constraint as (A, B).
    pub fn bodies_of(&self, handle: ConstraintHandle) -> SolverResult<(BodyHandle, BodyHandle)> {
        let index = self.index_of(handle)?;
        let constraint = &self.constraints[index];
        Ok((constraint.body_a, constraint.body_b))
    }

    /// Gets the impulse each contact accumulated during the last substep of the last step, in slot
    /// order. These are the impulses the next step warm starts from. Without substepping they equal
    /// [`ContactSolver::step_impulses`].
    pub fn substep_impulses(
        &self,
        handle: ConstraintHandle,
    ) -> SolverResult<[f32; CONTACT_COUNT]> {
        let index = self.index_of(handle)?;
        Ok(self.constraints[index].accumulated_impulses)
    }

    /// Gets the impulse each contact applied over all substeps of the last step, in slot order.
    pub fn step_impulses(&self, handle: ConstraintHandle) -> SolverResult<[f32; CONTACT_COUNT]> {
        let index = self.index_of(handle)?;
        Ok(self.constraints[index].step_impulses)
    }

    /// Gets the sum of the contact impulses applied over the last step.
    pub fn total_impulse(&self, handle: ConstraintHandle) -> SolverResult<f32> {
        Ok(self.step_impulses(handle)?.iter().sum())
    }

    /// Gets the constant normal force that would deliver the last step's total impulse over that
    /// step. Zero before the first step.
    pub fn average_force(&self, handle: ConstraintHandle) -> SolverResult<f32> {
        let total = self.total_impulse(handle)?;
        if self.last_dt > 0.0 {
            Ok(total / self.last_dt)
        } else {
            Ok(0.0)
        }
    }

    /// Greedily assigns constraints to batches in which no dynamic body is referenced twice.
    /// Kinematic bodies are never written by the solver and can be shared freely.
    fn build_batches(
        body_pairs: &[(usize, usize)],
        bodies: &Bodies,
        kinematic: &[bool],
    ) -> Vec<Vec<usize>> {
        debug_assert_eq!(kinematic.len(), bodies.len());
        let mut batches: Vec<Vec<usize>> = Vec::new();
        let mut referenced_bodies: Vec<HashSet<usize>> = Vec::new();
        for (constraint_index, &(a, b)) in body_pairs.iter().enumerate() {
            let fits = |referenced: &HashSet<usize>| {
                (kinematic[a] || !referenced.contains(&a))
                    && (kinematic[b] || !referenced.contains(&b))
            };
            let batch_index = match referenced_bodies.iter().position(fits) {
                Some(index) => index,
                None => {
                    batches.push(Vec::new());
                    referenced_bodies.push(HashSet::new());
                    batches.len() - 1
                }
            };
            batches[batch_index].push(constraint_index);
            for body in [a, b] {
                if !kinematic[body] {
                    referenced_bodies[batch_index].insert(body);
                }
            }
        }
        batches
    }

    fn build_bundles(&self, bodies: &Bodies) -> SolverResult<(usize, Vec<ConstraintBundle>)> {
        let mut body_pairs = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            let a = bodies.index_of(constraint.body_a)?;
            let b = bodies.index_of(constraint.body_b)?;
            body_pairs.push((a, b));
        }
        let kinematic: Vec<bool> = (0..bodies.len())
            .map(|index| bodies.is_kinematic_at(index))
            .collect();
        for (constraint, &(a, b)) in self.constraints.iter().zip(body_pairs.iter()) {
            if kinematic[a] && kinematic[b] {
                return Err(SolverError::BothBodiesInfiniteMass(
                    constraint.body_a,
                    constraint.body_b,
                ));
            }
        }

        let batches = Self::build_batches(&body_pairs, bodies, &kinematic);
        let mut bundles = Vec::new();
        for batch in &batches {
            for bundle_index in 0..BundleIndexing::get_bundle_count(batch.len()) {
                let count = BundleIndexing::get_count_in_bundle(batch.len(), bundle_index);
                let start = bundle_index * LANES;
                let constraint_indices = batch[start..start + count].to_vec();

                let mut prestep = Contact4PrestepData::default();
                let mut impulse_lanes = [[0.0; LANES]; CONTACT_COUNT];
                let mut body_indices_a = Vec::with_capacity(count);
                let mut body_indices_b = Vec::with_capacity(count);
                for (lane, &constraint_index) in constraint_indices.iter().enumerate() {
                    let constraint = &self.constraints[constraint_index];
                    constraint.description.apply_description(&mut prestep, lane);
                    for (lanes, &impulse) in impulse_lanes
                        .iter_mut()
                        .zip(constraint.accumulated_impulses.iter())
                    {
                        lanes[lane] = impulse;
                    }
                    let (a, b) = body_pairs[constraint_index];
                    body_indices_a.push(a);
                    body_indices_b.push(b);
                }

                let mut inertia_a = BodyInertiaWide::default();
                let mut inertia_b = BodyInertiaWide::default();
                bodies.gather_inertia(&body_indices_a, &mut inertia_a);
                bodies.gather_inertia(&body_indices_b, &mut inertia_b);
                bundles.push(ConstraintBundle {
                    constraint_indices,
                    body_indices_a,
                    body_indices_b,
                    prestep,
                    inertia_a,
                    inertia_b,
                    projection: Projection::default(),
                    accumulated_impulses: impulse_lanes.map(from_lanes),
                    step_impulses: [Vector::splat(0.0); CONTACT_COUNT],
                });
            }
        }
        Ok((batches.len(), bundles))
    }

    /// Advances body velocities by `dt`, solving every contact constraint along the way.
    ///
    /// Velocities of bodies with finite mass are integrated through `callbacks` at the start of every
    /// substep. A non-positive or non-finite `dt` is ignored.
    pub fn step<C: VelocityIntegratorCallbacks>(
        &mut self,
        bodies: &mut Bodies,
        dt: f32,
        callbacks: &mut C,
    ) -> SolverResult<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            warn!("ignoring contact solver step with invalid dt {}", dt);
            return Ok(());
        }
        let (batch_count, mut bundles) = self.build_bundles(bodies)?;
        let substep_count = self.solve_description.substep_count;
        let substep_dt = dt / substep_count as f32;
        let inverse_substep_dt = 1.0 / substep_dt;
        debug!(
            "solving {} contacts in {} batches, {} bundles of {} lanes, {} substeps of {}",
            self.constraints.len(),
            batch_count,
            bundles.len(),
            LANES,
            substep_count,
            substep_dt
        );

        let mut wsv_a = BodyVelocityWide::default();
        let mut wsv_b = BodyVelocityWide::default();
        for substep_index in 0..substep_count {
            let iteration_count = self
                .solve_description
                .velocity_iterations_for_substep(substep_index);
            trace!(
                "substep {} of {}: {} velocity iterations",
                substep_index + 1,
                substep_count,
                iteration_count
            );

            if substep_index > 0 {
                //The bodies moved during the previous substep with the velocities it left behind.
                let substep_dt_wide = Vector::splat(substep_dt);
                for bundle in bundles.iter_mut() {
                    bundle.gather_velocities(bodies, &mut wsv_a, &mut wsv_b);
                    PenetrationLimit4::update_penetration_depths(
                        &substep_dt_wide,
                        &wsv_a,
                        &wsv_b,
                        &mut bundle.prestep,
                    );
                }
            }

            callbacks.prepare_for_integration(substep_dt);
            {
                let callbacks = &*callbacks;
                bodies.integrate_velocities(substep_dt, |handle, inertia, velocity, dt| {
                    callbacks.integrate_velocity(handle, inertia, velocity, dt)
                });
            }

            for bundle in bundles.iter_mut() {
                bundle.projection = PenetrationLimit4::prestep(
                    &bundle.inertia_a,
                    &bundle.inertia_b,
                    &bundle.prestep.normal,
                    &bundle.prestep,
                    substep_dt,
                    inverse_substep_dt,
                );
            }

            for bundle in bundles.iter() {
                bundle.gather_velocities(bodies, &mut wsv_a, &mut wsv_b);
                PenetrationLimit4::warm_start(
                    &bundle.projection,
                    &bundle.inertia_a,
                    &bundle.inertia_b,
                    &bundle.prestep.normal,
                    &bundle.accumulated_impulses,
                    &mut wsv_a,
                    &mut wsv_b,
                );
                bundle.scatter_velocities(bodies, &wsv_a, &wsv_b);
            }

            for _ in 0..iteration_count {
                for bundle in bundles.iter_mut() {
                    bundle.gather_velocities(bodies, &mut wsv_a, &mut wsv_b);
                    PenetrationLimit4::solve(
                        &bundle.projection,
                        &bundle.inertia_a,
                        &bundle.inertia_b,
                        &bundle.prestep.normal,
                        &mut bundle.accumulated_impulses,
                        &mut wsv_a,
                        &mut wsv_b,
                    );
                    bundle.scatter_velocities(bodies, &wsv_a, &wsv_b);
                }
            }

            for bundle in bundles.iter_mut() {
                for (total, impulse) in bundle
                    .step_impulses
                    .iter_mut()
                    .zip(bundle.accumulated_impulses.iter())
                {
                    *total = *total + *impulse;
                }
            }
        }

        for bundle in &bundles {
            for slot in 0..CONTACT_COUNT {
                let substep = to_lanes(bundle.accumulated_impulses[slot]);
                let step = to_lanes(bundle.step_impulses[slot]);
                for (lane, &constraint_index) in bundle.constraint_indices.iter().enumerate() {
                    let constraint = &mut self.constraints[constraint_index];
                    constraint.accumulated_impulses[slot] = substep[lane];
                    constraint.step_impulses[slot] = step[lane];
                }
            }
        }
        self.last_dt = dt;
        Ok(())
    }
}
