use crate::utilities::vector::LANES;

/// Some helpers for indexing into vector bundles.
pub struct BundleIndexing;

impl BundleIndexing {
    /// Number of bundles needed to hold `element_count` lanes.
    #[inline(always)]
    pub fn get_bundle_count(element_count: usize) -> usize {
        element_count.div_ceil(LANES)
    }

    /// Number of occupied lanes in the bundle at `bundle_index` when `element_count` elements are packed from the start.
    #[inline(always)]
    pub fn get_count_in_bundle(element_count: usize, bundle_index: usize) -> usize {
        element_count
            .saturating_sub(bundle_index * LANES)
            .min(LANES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_counts() {
        assert_eq!(BundleIndexing::get_bundle_count(0), 0);
        assert_eq!(BundleIndexing::get_bundle_count(1), 1);
        assert_eq!(BundleIndexing::get_bundle_count(LANES), 1);
        assert_eq!(BundleIndexing::get_bundle_count(LANES + 1), 2);
        assert_eq!(BundleIndexing::get_count_in_bundle(LANES + 1, 0), LANES);
        assert_eq!(BundleIndexing::get_count_in_bundle(LANES + 1, 1), 1);
        assert_eq!(BundleIndexing::get_count_in_bundle(LANES + 1, 2), 0);
    }
}
