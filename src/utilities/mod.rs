pub mod bundle_indexing;
pub mod id_pool;
pub mod symmetric3x3;
pub mod symmetric3x3_wide;
pub mod vector;
pub mod vector3_wide;
