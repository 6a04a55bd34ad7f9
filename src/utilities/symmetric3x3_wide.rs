use crate::utilities::symmetric3x3::Symmetric3x3;
use crate::utilities::vector::{SimdValue, Vector};
use crate::utilities::vector3_wide::Vector3Wide;

/// Lower left triangle of a symmetric 3x3 matrix, one matrix per lane.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Symmetric3x3Wide {
    pub xx: Vector,
    pub yx: Vector,
    pub yy: Vector,
    pub zx: Vector,
    pub zy: Vector,
    pub zz: Vector,
}

impl Default for Symmetric3x3Wide {
    #[inline(always)]
    fn default() -> Self {
        let zero = Vector::splat(0.0);
        Self {
            xx: zero,
            yx: zero,
            yy: zero,
            zx: zero,
            zy: zero,
            zz: zero,
        }
    }
}

impl Symmetric3x3Wide {
    /// Computes vT * m * v, the quadratic form of the matrix along v.
    #[inline(always)]
    pub fn vector_sandwich(v: &Vector3Wide, m: &Self, sandwich: &mut Vector) {
        let x = v.x * m.xx + v.y * m.yx + v.z * m.zx;
        let y = v.x * m.yx + v.y * m.yy + v.z * m.zy;
        let z = v.x * m.zx + v.y * m.zy + v.z * m.zz;
        *sandwich = x * v.x + y * v.y + z * v.z;
    }

    #[inline(always)]
    pub fn transform_without_overlap(v: &Vector3Wide, m: &Self, result: &mut Vector3Wide) {
        result.x = v.x * m.xx + v.y * m.yx + v.z * m.zx;
        result.y = v.x * m.yx + v.y * m.yy + v.z * m.zy;
        result.z = v.x * m.zx + v.y * m.zy + v.z * m.zz;
    }

    #[inline(always)]
    pub fn broadcast(source: &Symmetric3x3) -> Self {
        Self {
            xx: Vector::splat(source.xx),
            yx: Vector::splat(source.yx),
            yy: Vector::splat(source.yy),
            zx: Vector::splat(source.zx),
            zy: Vector::splat(source.zy),
            zz: Vector::splat(source.zz),
        }
    }

    #[inline(always)]
    pub fn write_slot(scalar: &Symmetric3x3, slot_index: usize, wide: &mut Self) {
        wide.xx.replace(slot_index, scalar.xx);
        wide.yx.replace(slot_index, scalar.yx);
        wide.yy.replace(slot_index, scalar.yy);
        wide.zx.replace(slot_index, scalar.zx);
        wide.zy.replace(slot_index, scalar.zy);
        wide.zz.replace(slot_index, scalar.zz);
    }

    #[inline(always)]
    pub fn read_slot(wide: &Self, slot_index: usize) -> Symmetric3x3 {
        Symmetric3x3 {
            xx: wide.xx.extract(slot_index),
            yx: wide.yx.extract(slot_index),
            yy: wide.yy.extract(slot_index),
            zx: wide.zx.extract(slot_index),
            zy: wide.zy.extract(slot_index),
            zz: wide.zz.extract(slot_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::LANES;
    use approx::assert_relative_eq;
    use glam::{Mat3, Vec3};

    fn sample() -> Symmetric3x3 {
        Symmetric3x3 {
            xx: 2.0,
            yx: 0.5,
            yy: 1.5,
            zx: -0.25,
            zy: 0.75,
            zz: 3.0,
        }
    }

    #[test]
    fn sandwich_equals_dot_of_transform() {
        let m = Symmetric3x3Wide::broadcast(&sample());
        let v = Vector3Wide::broadcast(Vec3::new(0.3, -0.7, 1.1));
        let mut sandwich = Vector::splat(0.0);
        Symmetric3x3Wide::vector_sandwich(&v, &m, &mut sandwich);
        let mut transformed = Vector3Wide::default();
        Symmetric3x3Wide::transform_without_overlap(&v, &m, &mut transformed);
        let expected = Vector3Wide::dot_val(&transformed, &v);
        for lane in 0..LANES {
            assert_relative_eq!(
                sandwich.extract(lane),
                expected.extract(lane),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn wide_transform_matches_scalar_transform() {
        let scalar = sample();
        let mut wide = Symmetric3x3Wide::default();
        Symmetric3x3Wide::write_slot(&scalar, LANES - 1, &mut wide);
        assert_eq!(Symmetric3x3Wide::read_slot(&wide, LANES - 1), scalar);

        let v = Vec3::new(-1.0, 2.0, 0.5);
        let mut transformed = Vector3Wide::default();
        Symmetric3x3Wide::transform_without_overlap(
            &Vector3Wide::broadcast(v),
            &wide,
            &mut transformed,
        );
        let full = Mat3::from_cols(
            Vec3::new(scalar.xx, scalar.yx, scalar.zx),
            Vec3::new(scalar.yx, scalar.yy, scalar.zy),
            Vec3::new(scalar.zx, scalar.zy, scalar.zz),
        );
        let expected = full * v;
        let actual = transformed.read_slot(LANES - 1);
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-6);
    }
}
