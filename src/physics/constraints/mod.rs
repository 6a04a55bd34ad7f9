pub mod constraint_checker;
pub mod contact;
pub mod spring_settings;
