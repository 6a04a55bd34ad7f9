pub mod contact_convex_common;
pub mod penetration_limit4;
