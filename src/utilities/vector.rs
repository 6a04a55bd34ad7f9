//! Lane-wide scalar type used by every `*Wide` structure.
//!
//! The lane count is fixed at build time: `simd-x8` selects eight lanes, `simd-x4` (the default)
//! selects four, and disabling both falls back to a single scalar lane. All wide math is written
//! against [`Vector`] through simba's `SimdValue`/`SimdPartialOrd`, so the same code runs at
//! every width.

pub use simba::simd::{SimdPartialOrd, SimdValue};

#[cfg(feature = "simd-x8")]
pub type Vector = simba::simd::WideF32x8;
#[cfg(feature = "simd-x8")]
pub const LANES: usize = 8;

#[cfg(all(feature = "simd-x4", not(feature = "simd-x8")))]
pub type Vector = simba::simd::WideF32x4;
#[cfg(all(feature = "simd-x4", not(feature = "simd-x8")))]
pub const LANES: usize = 4;

#[cfg(not(any(feature = "simd-x4", feature = "simd-x8")))]
pub type Vector = f32;
#[cfg(not(any(feature = "simd-x4", feature = "simd-x8")))]
pub const LANES: usize = 1;

/// Builds a vector from one value per lane.
#[inline(always)]
pub fn from_lanes(values: [f32; LANES]) -> Vector {
    let mut result = Vector::splat(0.0);
    for (lane, value) in values.into_iter().enumerate() {
        result.replace(lane, value);
    }
    result
}

/// Copies every lane of a vector out into an array.
#[inline(always)]
pub fn to_lanes(v: Vector) -> [f32; LANES] {
    std::array::from_fn(|lane| v.extract(lane))
}
