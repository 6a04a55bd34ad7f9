pub mod bodies;
pub mod body_description;
pub mod body_properties;
pub mod constraints;
pub mod contact_solver;
pub mod error;
pub mod handles;
pub mod pose_integration;
pub mod solve_description;
