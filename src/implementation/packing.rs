// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the greedy packing of a weighted sequence of
//! subpartitions into contiguous ranges whose byte sums respect a limit. One
//! range is one downstream subtask, so the number of ranges *is* the
//! parallelism a given limit would yield.

use crate::IndexRange;

/// Greedily packs the subpartitions into contiguous ranges, left to right: a
/// subpartition extends the current range when the range is still empty or
/// when adding it keeps the byte sum within `limit`; otherwise it opens a new
/// range. The produced ranges cover `[0, bytes.len() - 1]` exactly once, and
/// a range only ever exceeds `limit` when it holds a single oversize
/// subpartition.
///
/// # Examples:
/// ```
/// # use abd::*;
/// let ranges = compute_subpartition_ranges(&[3, 1, 4, 1, 5], 5);
/// assert_eq!(
///     vec![IndexRange::new(0, 1), IndexRange::new(2, 3), IndexRange::new(4, 4)],
///     ranges);
/// ```
pub fn compute_subpartition_ranges(bytes: &[u64], limit: u64) -> Vec<IndexRange> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut sum = 0u64;
    for (i, &b) in bytes.iter().enumerate() {
        if sum == 0 || sum + b <= limit {
            sum += b;
        } else {
            ranges.push(IndexRange::new(start, i - 1));
            start = i;
            sum = b;
        }
    }
    if !bytes.is_empty() {
        ranges.push(IndexRange::new(start, bytes.len() - 1));
    }
    ranges
}

/// The count-only twin of [`compute_subpartition_ranges`]: returns how many
/// ranges the same greedy packing would produce, without materializing them.
/// This is what the bisection over the byte limit evaluates at every probe.
///
/// For a fixed `bytes`, the count is non-increasing in `limit`.
///
/// # Examples:
/// ```
/// # use abd::*;
/// assert_eq!(3, count_subpartition_ranges(&[3, 1, 4, 1, 5], 5));
/// assert_eq!(compute_subpartition_ranges(&[3, 1, 4, 1, 5], 5).len(),
///            count_subpartition_ranges(&[3, 1, 4, 1, 5], 5));
/// ```
pub fn count_subpartition_ranges(bytes: &[u64], limit: u64) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    let mut count = 1;
    let mut sum = 0u64;
    for &b in bytes {
        if sum == 0 || sum + b <= limit {
            sum += b;
        } else {
            count += 1;
            sum = b;
        }
    }
    count
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################


#[cfg(test)]
mod test_packing_properties {
    use crate::*;
    use rand::prelude::*;

    fn random_bytes(rng: &mut StdRng) -> Vec<u64> {
        let len = rng.random_range(1..50);
        (0..len).map(|_| rng.random_range(0..100)).collect()
    }

    #[test]
    fn count_is_consistent_with_the_materialized_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let bytes = random_bytes(&mut rng);
            for limit in [0, 1, 10, 50, 100, 500, 5000] {
                assert_eq!(
                    compute_subpartition_ranges(&bytes, limit).len(),
                    count_subpartition_ranges(&bytes, limit),
                    "bytes={bytes:?} limit={limit}"
                );
            }
        }
    }
    #[test]
    fn count_never_increases_with_the_limit() {
        let mut rng = StdRng::seed_from_u64(43);
        for _ in 0..100 {
            let bytes = random_bytes(&mut rng);
            let mut previous = usize::MAX;
            for limit in 0..200 {
                let count = count_subpartition_ranges(&bytes, limit);
                assert!(count <= previous, "bytes={bytes:?} limit={limit}");
                previous = count;
            }
        }
    }
}
