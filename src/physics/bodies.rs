use crate::physics::body_description::BodyDescription;
use crate::physics::body_properties::{BodyInertia, BodyInertiaWide, BodyVelocity, BodyVelocityWide};
use crate::physics::error::{SolverError, SolverResult};
use crate::physics::handles::BodyHandle;
use crate::utilities::id_pool::IdPool;
use crate::utilities::symmetric3x3::Symmetric3x3;
use crate::utilities::vector::LANES;

/// Collection of all allocated bodies.
///
/// Body state is stored densely: removing a body moves the last body into the freed slot, so
/// indices are not stable across removals. Handles are stable and are resolved to indices through
/// `handle_to_index`. A removed body's handle is handed out again by later adds, so contact
/// constraints referring to it should be removed with it.
///
/// Bodies have no pose. Local inertias are never rotated and must already be expressed in world
/// space.
#[derive(Debug, Clone, Default)]
pub struct Bodies {
    /// Remaps a body handle integer value to the index of the body, or -1 if the handle is not in use.
    handle_to_index: Vec<i32>,
    /// Pool from which handles are pulled for new bodies.
    handle_pool: IdPool,
    /// Remaps a body index to its handle.
    index_to_handle: Vec<BodyHandle>,
    velocities: Vec<BodyVelocity>,
    /// Inverse mass and world space inverse inertia tensor of each body.
    local_inertias: Vec<BodyInertia>,
}

impl Bodies {
    /// Inertia written into lanes that do not hold a body. Any finite positive inertia keeps the
    /// padded lanes free of NaNs; their results are never written back.
    const PADDING_INERTIA: BodyInertia = BodyInertia {
        inverse_inertia_tensor: Symmetric3x3::IDENTITY,
        inverse_mass: 1.0,
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handle_to_index: Vec::with_capacity(capacity),
            handle_pool: IdPool::new(),
            index_to_handle: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            local_inertias: Vec::with_capacity(capacity),
        }
    }

    /// Gets whether the inertia matches that of a kinematic body (all inverse mass/inertia zero).
    #[inline(always)]
    pub fn is_kinematic(inertia: &BodyInertia) -> bool {
        inertia.inverse_mass == 0.0 && inertia.inverse_inertia_tensor.is_zero()
    }

    /// Adds a new body and returns the handle that refers to it until it is removed.
    pub fn add(&mut self, description: &BodyDescription) -> BodyHandle {
        let handle_index = self.handle_pool.take();
        let handle = BodyHandle(handle_index);
        let index = self.velocities.len() as i32;
        let slot = handle_index as usize;
        if slot >= self.handle_to_index.len() {
            self.handle_to_index.resize(slot + 1, -1);
        }
        self.handle_to_index[slot] = index;
        self.index_to_handle.push(handle);
        self.velocities.push(description.velocity);
        self.local_inertias.push(description.local_inertia);
        handle
    }

    /// Removes a body and returns its last state. The handle may be handed out again by a later
    /// `add`.
    pub fn remove(&mut self, handle: BodyHandle) -> SolverResult<BodyDescription> {
        let index = self.index_of(handle)?;
        let description = BodyDescription {
            velocity: self.velocities.swap_remove(index),
            local_inertia: self.local_inertias.swap_remove(index),
        };
        self.index_to_handle.swap_remove(index);
        if index < self.index_to_handle.len() {
            //A body was moved into the removed slot; point its handle at the new location.
            let moved_handle = self.index_to_handle[index];
            self.handle_to_index[moved_handle.0 as usize] = index as i32;
        }
        self.handle_to_index[handle.0 as usize] = -1;
        self.handle_pool.return_id(handle.0);
        Ok(description)
    }

    /// Checks whether a body handle is currently registered.
    #[inline(always)]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        handle.0 >= 0
            && (handle.0 as usize) < self.handle_to_index.len()
            && self.handle_to_index[handle.0 as usize] >= 0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    /// Gets the current dense index of a body.
    #[inline(always)]
    pub fn index_of(&self, handle: BodyHandle) -> SolverResult<usize> {
        if self.contains(handle) {
            Ok(self.handle_to_index[handle.0 as usize] as usize)
        } else {
            Err(SolverError::UnknownBody(handle))
        }
    }

    /// Gets whether the body stored at a dense index has infinite mass.
    #[inline(always)]
    pub fn is_kinematic_at(&self, index: usize) -> bool {
        Self::is_kinematic(&self.local_inertias[index])
    }

    /// Gets the handle of the body stored at a dense index.
    #[inline(always)]
    pub fn handle_of(&self, index: usize) -> BodyHandle {
        self.index_to_handle[index]
    }

    pub fn velocity(&self, handle: BodyHandle) -> SolverResult<&BodyVelocity> {
        let index = self.index_of(handle)?;
        Ok(&self.velocities[index])
    }

    pub fn velocity_mut(&mut self, handle: BodyHandle) -> SolverResult<&mut BodyVelocity> {
        let index = self.index_of(handle)?;
        Ok(&mut self.velocities[index])
    }

    pub fn inertia(&self, handle: BodyHandle) -> SolverResult<&BodyInertia> {
        let index = self.index_of(handle)?;
        Ok(&self.local_inertias[index])
    }

    /// Changes the inertia of a body. Setting infinite inertia turns the body kinematic.
    pub fn set_local_inertia(
        &mut self,
        handle: BodyHandle,
        local_inertia: BodyInertia,
    ) -> SolverResult<()> {
        let index = self.index_of(handle)?;
        self.local_inertias[index] = local_inertia;
        Ok(())
    }

    /// Gets the description of a body by handle.
    pub fn get_description(&self, handle: BodyHandle) -> SolverResult<BodyDescription> {
        let index = self.index_of(handle)?;
        Ok(BodyDescription {
            velocity: self.velocities[index],
            local_inertia: self.local_inertias[index],
        })
    }

    /// Runs the velocity integration callback over every body with finite mass.
    pub(crate) fn integrate_velocities<F>(&mut self, dt: f32, mut integrate: F)
    where
        F: FnMut(BodyHandle, &BodyInertia, &mut BodyVelocity, f32),
    {
        for ((handle, inertia), velocity) in self
            .index_to_handle
            .iter()
            .zip(self.local_inertias.iter())
            .zip(self.velocities.iter_mut())
        {
            if !Self::is_kinematic(inertia) {
                integrate(*handle, inertia, velocity, dt);
            }
        }
    }

    /// Gathers the inertias of up to `LANES` bodies by dense index. Lanes past the end of `indices`
    /// are filled with a benign placeholder inertia.
    pub fn gather_inertia(&self, indices: &[usize], inertias: &mut BodyInertiaWide) {
        debug_assert!(indices.len() <= LANES);
        for lane in 0..LANES {
            let inertia = match indices.get(lane) {
                Some(&index) => &self.local_inertias[index],
                None => &Self::PADDING_INERTIA,
            };
            BodyInertiaWide::write_slot(inertia, lane, inertias);
        }
    }

    /// Gathers the velocities of up to `LANES` bodies by dense index. Lanes past the end of `indices`
    /// are zeroed.
    pub fn gather_velocities(&self, indices: &[usize], velocities: &mut BodyVelocityWide) {
        debug_assert!(indices.len() <= LANES);
        for lane in 0..LANES {
            let velocity = indices
                .get(lane)
                .map_or(BodyVelocity::default(), |&index| self.velocities[index]);
            BodyVelocityWide::write_slot(&velocity, lane, velocities);
        }
    }

    /// Writes velocities back for the lanes covered by `indices`. Kinematic bodies are left untouched.
    pub fn scatter_velocities(&mut self, indices: &[usize], velocities: &BodyVelocityWide) {
        debug_assert!(indices.len() <= LANES);
        for (lane, &index) in indices.iter().enumerate() {
            if !Self::is_kinematic(&self.local_inertias[index]) {
                self.velocities[index] = BodyVelocityWide::read_slot(velocities, lane);
            }
        }
    }
}
