//! Sliding-window bin geometry.
//!
//! A bin with index `i` spans the half-open interval
//! `[i * increment, i * increment + size)`. With `increment == size`
//! the bins tile the axis disjointly; with a smaller increment each
//! coordinate falls in several overlapping bins.

/// Locate every bin containing `point`.
///
/// Returns `(start, end, start_id, end_id)` where `[start, end)` is the
/// minimal span covering all overlapping bins and `start_id..=end_id`
/// are their indices.
pub fn coordinate_to_sliding_bin_locations(
    point: i64,
    bin_size: i64,
    sliding_increment: i64,
) -> (i64, i64, i64, i64) {
    // first index with point < i * increment + size
    let start_id = div_floor(point - bin_size, sliding_increment) + 1;
    let start = start_id * sliding_increment;
    // last index with i * increment <= point
    let end_id = div_floor(point, sliding_increment);
    let end = end_id * sliding_increment + bin_size;
    (start, end, start_id, end_id)
}

/// Every `(bin_start, bin_end)` containing `point`, ascending by start
pub fn coordinate_to_bins(point: i64, bin_size: i64, sliding_increment: i64) -> Vec<(i64, i64)> {
    let (_, _, start_id, end_id) =
        coordinate_to_sliding_bin_locations(point, bin_size, sliding_increment);
    (start_id..=end_id)
        .map(|i| (i * sliding_increment, i * sliding_increment + bin_size))
        .collect()
}

// mathematical floor for possibly negative numerators
fn div_floor(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_bins_yield_exactly_one() {
        for point in [0, 1, 999, 1000, 1999, 123_456_789] {
            let bins = coordinate_to_bins(point, 1000, 1000);
            assert_eq!(bins.len(), 1, "point {}", point);
            let (start, end) = bins[0];
            assert!(start <= point && point < end);
            assert_eq!(start % 1000, 0);
            assert_eq!(end - start, 1000);
        }
    }

    #[test]
    fn floor_binning_matches_expectation() {
        // bin=1000: 1999 falls in [1000, 2000)
        assert_eq!(coordinate_to_bins(1999, 1000, 1000), vec![(1000, 2000)]);
        assert_eq!(coordinate_to_bins(2000, 1000, 1000), vec![(2000, 3000)]);
        assert_eq!(coordinate_to_bins(0, 1000, 1000), vec![(0, 1000)]);
    }

    #[test]
    fn sliding_bins_cover_the_point() {
        // size 1000, increment 250: every point sits in 4 bins
        for point in [999, 1000, 1001] {
            let bins = coordinate_to_bins(point, 1000, 250);
            assert_eq!(bins.len(), 4, "point {}", point);
            for (start, end) in &bins {
                assert!(*start <= point && point < *end);
                assert_eq!(end - start, 1000);
            }
            for pair in bins.windows(2) {
                assert_eq!(pair[1].0 - pair[0].0, 250);
            }
        }
    }

    #[test]
    fn bins_near_origin_can_start_negative() {
        let bins = coordinate_to_bins(100, 1000, 200);
        assert_eq!(bins.first().copied(), Some((-800, 200)));
        assert_eq!(bins.last().copied(), Some((0, 1000)));
        for (start, end) in &bins {
            assert!(*start <= 100 && 100 < *end);
        }
    }

    #[test]
    fn matches_brute_force_enumeration() {
        let bin_size = 120;
        let increment = 35;
        for point in 0..600 {
            let expected: Vec<(i64, i64)> = (-10..30)
                .map(|i| (i * increment, i * increment + bin_size))
                .filter(|(start, end)| *start <= point && point < *end)
                .collect();
            let observed = coordinate_to_bins(point, bin_size, increment);
            assert_eq!(observed, expected, "point {}", point);
        }
    }

    #[test]
    fn span_covers_all_overlapping_bins() {
        let (start, end, start_id, end_id) = coordinate_to_sliding_bin_locations(1999, 1000, 250);
        assert_eq!(start, start_id * 250);
        assert_eq!(end, end_id * 250 + 1000);
        assert!(start <= 1999 && 1999 < end);
        assert!(start_id <= end_id);
    }
}
