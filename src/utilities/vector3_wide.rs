use crate::utilities::vector::{SimdValue, Vector};
use glam::Vec3;
use std::ops::{Add, Sub};

#[repr(C)]
#[derive(Clone, Copy)]
/// Three dimensional vector with SIMD lanes.
pub struct Vector3Wide {
    /// First component of the vector.
    pub x: Vector,
    /// Second component of the vector.
    pub y: Vector,
    /// Third component of the vector.
    pub z: Vector,
}

impl Default for Vector3Wide {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Vector::splat(0.0))
    }
}

impl Vector3Wide {
    /// Creates a vector by populating each component with the given scalars.
    #[inline(always)]
    pub fn new(s: Vector) -> Self {
        Self { x: s, y: s, z: s }
    }

    /// Subtracts one vector from another.
    #[inline(always)]
    pub fn subtract(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x - b.x;
        result.y = a.y - b.y;
        result.z = a.z - b.z;
    }

    /// Computes the inner product between two vectors by modifying the result vector.
    #[inline(always)]
    pub fn dot(a: &Self, b: &Self, result: &mut Vector) {
        *result = a.x * b.x + a.y * b.y + a.z * b.z;
    }

    /// Computes the inner product between two vectors.
    #[inline(always)]
    pub fn dot_val(a: &Self, b: &Self) -> Vector {
        a.x * b.x + a.y * b.y + a.z * b.z
    }

    /// Scales a vector by a scalar.
    #[inline(always)]
    pub fn scale(vector: &Self, scalar: &Vector) -> Self {
        Self {
            x: vector.x * *scalar,
            y: vector.y * *scalar,
            z: vector.z * *scalar,
        }
    }

    /// Computes the cross product of two vectors. The result must not alias either input.
    #[inline(always)]
    pub fn cross_without_overlap(a: &Self, b: &Self, result: &mut Self) {
        //This will fail horribly if result is a or b.
        result.x = a.y * b.z - a.z * b.y;
        result.y = a.z * b.x - a.x * b.z;
        result.z = a.x * b.y - a.y * b.x;
    }

    #[inline(always)]
    pub fn cross(a: &Self, b: &Self) -> Self {
        Self {
            x: a.y * b.z - a.z * b.y,
            y: a.z * b.x - a.x * b.z,
            z: a.x * b.y - a.y * b.x,
        }
    }

    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> Vec3 {
        Vec3::new(
            self.x.extract(slot_index),
            self.y.extract(slot_index),
            self.z.extract(slot_index),
        )
    }

    #[inline(always)]
    pub fn write_slot(&mut self, source: Vec3, slot_index: usize) {
        self.x.replace(slot_index, source.x);
        self.y.replace(slot_index, source.y);
        self.z.replace(slot_index, source.z);
    }

    #[inline(always)]
    pub fn broadcast(source: Vec3) -> Self {
        Self {
            x: Vector::splat(source.x),
            y: Vector::splat(source.y),
            z: Vector::splat(source.z),
        }
    }
}

impl Add for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::LANES;

    #[test]
    fn cross_matches_scalar_cross_in_every_lane() {
        let mut a = Vector3Wide::default();
        let mut b = Vector3Wide::default();
        for lane in 0..LANES {
            let l = lane as f32;
            a.write_slot(Vec3::new(1.0 + l, -2.0, 0.5 * l), lane);
            b.write_slot(Vec3::new(0.25, 3.0 - l, 1.0), lane);
        }
        let mut wide = Vector3Wide::default();
        Vector3Wide::cross_without_overlap(&a, &b, &mut wide);
        for lane in 0..LANES {
            let expected = a.read_slot(lane).cross(b.read_slot(lane));
            assert!((wide.read_slot(lane) - expected).length() < 1e-6);
            assert!(
                (Vector3Wide::cross(&a, &b).read_slot(lane) - expected).length() < 1e-6
            );
        }
    }

    #[test]
    fn dot_and_broadcast() {
        let a = Vector3Wide::broadcast(Vec3::new(1.0, 2.0, 3.0));
        let b = Vector3Wide::broadcast(Vec3::new(-1.0, 0.5, 2.0));
        let mut dot = Vector::splat(0.0);
        Vector3Wide::dot(&a, &b, &mut dot);
        for lane in 0..LANES {
            assert_eq!(dot.extract(lane), 6.0);
        }
        assert_eq!(Vector3Wide::dot_val(&a, &a).extract(0), 14.0);
    }
}
