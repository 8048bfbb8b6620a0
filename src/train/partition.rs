//! Stable scatter of a node's row slice into left/right sub-slices.
//!
//! Splitting a node never copies row ids out of the shared array; it
//! reorders the parent's contiguous slice so the left child owns the
//! prefix and the right child the suffix. The scatter is stable (rows keep
//! their relative order on both sides), which keeps histogram accumulation
//! order, and with it regression float sums, reproducible across runs.

/// Stable-partition `rows` in place, left rows first.
///
/// `scratch` must be at least as long as `rows` and is used as the scatter
/// target before copying back. Returns the number of rows on the left.
pub fn stable_partition<F>(rows: &mut [u32], scratch: &mut [u32], goes_left: F) -> usize
where
    F: Fn(u32) -> bool,
{
    let n = rows.len();
    let scratch = &mut scratch[..n];

    let mut write = 0;
    for &row in rows.iter() {
        if goes_left(row) {
            scratch[write] = row;
            write += 1;
        }
    }
    let n_left = write;
    for &row in rows.iter() {
        if !goes_left(row) {
            scratch[write] = row;
            write += 1;
        }
    }
    rows.copy_from_slice(scratch);
    n_left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_and_keeps_relative_order() {
        let mut rows = [5u32, 2, 9, 4, 7, 0];
        let mut scratch = [0u32; 6];

        let n_left = stable_partition(&mut rows, &mut scratch, |r| r % 2 == 0);

        assert_eq!(n_left, 3);
        // Evens keep order 2, 4, 0; odds keep order 5, 9, 7.
        assert_eq!(rows, [2, 4, 0, 5, 9, 7]);
    }

    #[test]
    fn all_left_and_all_right() {
        let mut rows = [3u32, 1, 4];
        let mut scratch = [0u32; 3];

        let original = rows;
        assert_eq!(stable_partition(&mut rows, &mut scratch, |_| true), 3);
        assert_eq!(rows, original);

        assert_eq!(stable_partition(&mut rows, &mut scratch, |_| false), 0);
        assert_eq!(rows, original);
    }

    #[test]
    fn empty_slice_is_a_noop() {
        let mut rows: [u32; 0] = [];
        let mut scratch: [u32; 0] = [];
        assert_eq!(stable_partition(&mut rows, &mut scratch, |_| true), 0);
    }

    mod integration {
        use super::*;
        use crate::data::{BinCuts, ColMatrix};

        #[test]
        fn partition_preserves_the_multiset() {
            let mut rows: Vec<u32> = (0..100).rev().collect();
            let mut scratch = vec![0u32; 100];

            let n_left = stable_partition(&mut rows, &mut scratch, |r| r % 3 == 0);

            let mut sorted = rows.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..100).collect::<Vec<_>>());
            assert_eq!(n_left, 34); // 0, 3, ..., 99
            assert!(rows[..n_left].iter().all(|r| r % 3 == 0));
            assert!(rows[n_left..].iter().all(|r| r % 3 != 0));
        }

        /// Partitioning on a split threshold agrees with the bin mapping
        /// the histogram pass used.
        #[test]
        fn threshold_predicate_matches_bin_counts() {
            let data = [0.1, 0.9, 0.2, 0.8, 0.3, 0.7];
            let matrix = ColMatrix::from_slice(&data, 6, 1);
            let cuts = BinCuts::new(vec![0.5, 1.0], 2, 1);
            let threshold = cuts.edge(0, 0);

            let mut rows: Vec<u32> = (0..6).collect();
            let mut scratch = vec![0u32; 6];
            let n_left = stable_partition(&mut rows, &mut scratch, |r| {
                matrix.get(r as usize, 0) <= threshold
            });

            let below: usize = (0..6).filter(|&r| cuts.bin(0, matrix.get(r, 0)) == 0).count();
            assert_eq!(n_left, below);
            assert_eq!(rows[..n_left], [0, 2, 4]);
            assert_eq!(rows[n_left..], [1, 3, 5]);
        }
    }
}
