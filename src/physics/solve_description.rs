use crate::physics::error::{SolverError, SolverResult};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Describes how the solver should schedule substeps and velocity iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SolveDescription {
    /// Number of velocity iterations to use for any substep without an entry in `substep_velocity_iterations`.
    pub velocity_iteration_count: u32,
    /// Number of substeps to execute each time the solver runs.
    pub substep_count: u32,
    /// Optional per-substep velocity iteration counts. A zero entry falls back to `velocity_iteration_count`.
    pub substep_velocity_iterations: Option<Vec<u32>>,
}

impl Default for SolveDescription {
    fn default() -> Self {
        Self {
            velocity_iteration_count: Self::DEFAULT_VELOCITY_ITERATION_COUNT,
            substep_count: 1,
            substep_velocity_iterations: None,
        }
    }
}

impl SolveDescription {
    pub const DEFAULT_VELOCITY_ITERATION_COUNT: u32 = 8;

    /// Checks that the description can drive a solve.
    pub fn validate(&self) -> SolverResult<()> {
        if self.substep_count < 1 {
            return Err(SolverError::InvalidSolveDescription(
                "substep count must be positive",
            ));
        }
        if self.velocity_iteration_count < 1 {
            return Err(SolverError::InvalidSolveDescription(
                "velocity iteration count must be positive",
            ));
        }
        if let Some(iterations) = &self.substep_velocity_iterations {
            if iterations.len() != self.substep_count as usize {
                return Err(SolverError::InvalidSolveDescription(
                    "per-substep iteration counts must match the substep count",
                ));
            }
        }
        Ok(())
    }

    /// Creates a solve description.
    ///
    /// # Arguments
    /// * `velocity_iteration_count` - Number of velocity iterations per substep.
    /// * `substep_count` - Number of substeps in the solve.
    pub fn new(velocity_iteration_count: u32, substep_count: u32) -> SolverResult<Self> {
        let description = Self {
            velocity_iteration_count,
            substep_count,
            substep_velocity_iterations: None,
        };
        description.validate().map(|_| description)
    }

    /// Creates a solve description from a slice of per-substep velocity iterations.
    /// The substep count is the length of the slice.
    pub fn from_substep_iterations(
        substep_velocity_iterations: &[u32],
        fallback_velocity_iteration_count: u32,
    ) -> SolverResult<Self> {
        let description = Self {
            velocity_iteration_count: fallback_velocity_iteration_count,
            substep_count: substep_velocity_iterations.len() as u32,
            substep_velocity_iterations: Some(substep_velocity_iterations.to_vec()),
        };
        description.validate().map(|_| description)
    }

    /// Gets the number of velocity iterations to run in the given substep.
    pub fn velocity_iterations_for_substep(&self, substep_index: u32) -> u32 {
        self.substep_velocity_iterations
            .as_ref()
            .and_then(|iterations| iterations.get(substep_index as usize).copied())
            .filter(|&count| count > 0)
            .unwrap_or(self.velocity_iteration_count)
    }
}

/// Creates a solve description with the given number of velocity iterations and a single substep.
/// Values are not validated here; the solver validates on construction.
impl From<u32> for SolveDescription {
    fn from(velocity_iteration_count: u32) -> Self {
        Self {
            velocity_iteration_count,
            ..Self::default()
        }
    }
}

/// Creates a solve description from (iterations_per_substep, substep_count).
impl From<(u32, u32)> for SolveDescription {
    fn from((velocity_iteration_count, substep_count): (u32, u32)) -> Self {
        Self {
            velocity_iteration_count,
            substep_count,
            substep_velocity_iterations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let description = SolveDescription::default();
        assert_eq!(description.velocity_iteration_count, 8);
        assert_eq!(description.substep_count, 1);
        assert!(description.validate().is_ok());
    }

    #[test]
    fn conversions() {
        assert_eq!(SolveDescription::from(4).velocity_iteration_count, 4);
        let description = SolveDescription::from((2, 3));
        assert_eq!(description.velocity_iteration_count, 2);
        assert_eq!(description.substep_count, 3);
    }

    #[test]
    fn invalid_descriptions_are_rejected() {
        assert!(SolveDescription::new(0, 1).is_err());
        assert_eq!(
            SolveDescription::new(1, 0),
            Err(SolverError::InvalidSolveDescription(
                "substep count must be positive",
            ))
        );
        assert!(SolveDescription::from_substep_iterations(&[], 4).is_err());
    }

    #[test]
    fn per_substep_iterations() {
        let description = SolveDescription::from_substep_iterations(&[6, 0, 2], 4).unwrap();
        assert_eq!(description.substep_count, 3);
        assert_eq!(description.velocity_iterations_for_substep(0), 6);
        assert_eq!(description.velocity_iterations_for_substep(1), 4);
        assert_eq!(description.velocity_iterations_for_substep(2), 2);
    }
}
