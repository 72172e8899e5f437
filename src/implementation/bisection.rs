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

//! This module provides the integer bisection searches used to coerce the
//! per-task byte budget until the resulting parallelism fits the configured
//! window.

/// Returns the largest value of `[low, high]` that satisfies `legal`,
/// assuming the set of legal values is a prefix of the interval.
///
/// When nothing in the interval is legal (or when `low > high`), the search
/// degenerates and returns `low`; a caller that cannot rule this out must
/// re-check the returned value.
///
/// # Examples:
/// ```
/// # use abd::find_max_legal_value;
/// assert_eq!(31, find_max_legal_value(|v| v * v <= 1000, 0, 100));
/// ```
pub fn find_max_legal_value(legal: impl Fn(u64) -> bool, low: u64, high: u64) -> u64 {
    let (mut low, mut high) = (low, high);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if legal(mid) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Returns the smallest value of `[low, high]` that satisfies `legal`,
/// assuming the set of legal values is a suffix of the interval.
///
/// When nothing in the interval is legal (or when `low > high`), the search
/// degenerates and returns `high.max(low)`; a caller that cannot rule this
/// out must re-check the returned value.
///
/// # Examples:
/// ```
/// # use abd::find_min_legal_value;
/// assert_eq!(32, find_min_legal_value(|v| v * v >= 1000, 0, 100));
/// ```
pub fn find_min_legal_value(legal: impl Fn(u64) -> bool, low: u64, high: u64) -> u64 {
    let (mut low, mut high) = (low, high);
    while low < high {
        let mid = low + (high - low) / 2;
        if legal(mid) {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    low
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_bisection {
    use crate::*;

    #[test]
    fn find_max_stops_at_the_threshold() {
        assert_eq!(10, find_max_legal_value(|v| v <= 10, 0, 100));
        assert_eq!(10, find_max_legal_value(|v| v <= 10, 10, 100));
        assert_eq!(7, find_max_legal_value(|v| v <= 10, 3, 7));
    }
    #[test]
    fn find_min_stops_at_the_threshold() {
        assert_eq!(10, find_min_legal_value(|v| v >= 10, 0, 100));
        assert_eq!(10, find_min_legal_value(|v| v >= 10, 0, 10));
        assert_eq!(42, find_min_legal_value(|v| v >= 10, 42, 100));
    }
    #[test]
    fn everything_legal_returns_the_bound() {
        assert_eq!(100, find_max_legal_value(|_| true, 0, 100));
        assert_eq!(0, find_min_legal_value(|_| true, 0, 100));
    }
    #[test]
    fn nothing_legal_degenerates_to_low() {
        // the caller is expected to re-check the outcome in this situation
        assert_eq!(5, find_max_legal_value(|_| false, 5, 100));
        assert_eq!(100, find_min_legal_value(|_| false, 5, 100));
    }
    #[test]
    fn empty_interval_returns_low() {
        assert_eq!(9, find_max_legal_value(|v| v <= 3, 9, 4));
        assert_eq!(9, find_min_legal_value(|v| v <= 3, 9, 4));
    }
    #[test]
    fn singleton_interval() {
        assert_eq!(7, find_max_legal_value(|v| v == 7, 7, 7));
        assert_eq!(7, find_min_legal_value(|v| v == 7, 7, 7));
    }
}
