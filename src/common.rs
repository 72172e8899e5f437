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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client scheduler is likely to work with.

use fxhash::FxHashMap;
use thiserror::Error;

// ----------------------------------------------------------------------------
// --- INDEX RANGE ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An inclusive, immutable range of non-negative indices. It is used to denote
/// both the upstream partitions and the subpartitions a downstream subtask
/// consumes.
///
/// # Examples:
/// ```
/// # use abd::IndexRange;
/// let range = IndexRange::new(3, 5);
/// assert_eq!(3, range.start());
/// assert_eq!(5, range.end());
/// assert_eq!(3, range.size());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct IndexRange {
    start: usize,
    end: usize,
}
impl IndexRange {
    /// Creates the inclusive range `[start, end]`. Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "illegal index range [{start}, {end}]");
        Self { start, end }
    }
    /// The first index covered by this range.
    #[inline]
    pub fn start(self) -> usize {
        self.start
    }
    /// The last index covered by this range (inclusive).
    #[inline]
    pub fn end(self) -> usize {
        self.end
    }
    /// The number of indices covered by this range.
    #[inline]
    pub fn size(self) -> usize {
        self.end - self.start + 1
    }
}

// ----------------------------------------------------------------------------
// --- IDENTIFIERS ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one job vertex of the batch-processing DAG. The DAG
/// itself lives outside of this library: a vertex id only ever serves to tell
/// the decisions about distinct vertices apart (typically in the logs).
///
/// # Examples:
/// ```
/// # use abd::VertexId;
/// assert_eq!(0, VertexId(0).id());
/// assert_eq!(1, VertexId(1).id());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VertexId(pub usize);
impl VertexId {
    #[inline]
    /// This function returns the id (numeric value) of the vertex.
    pub fn id(self) -> usize {
        self.0
    }
}

/// This type identifies one intermediate dataset produced by an upstream job
/// vertex. Two results are the same result iff their ids are equal.
///
/// # Examples:
/// ```
/// # use abd::ResultId;
/// assert_eq!(3, ResultId(3).id());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResultId(pub usize);
impl ResultId {
    #[inline]
    /// This function returns the id (numeric value) of the result.
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- BLOCKING RESULT INFO ---------------------------------------------------
// ----------------------------------------------------------------------------
/// The byte statistics of one finalized intermediate result, split by the way
/// the result is exchanged with its downstream consumers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ResultDetails {
    /// An all-to-all exchange: every upstream partition produces one chunk of
    /// data for every subpartition, and subpartition `i` is the unit consumed
    /// by the downstream subtask(s) in charge of index `i`.
    AllToAll {
        /// Entry `i` is the total number of bytes, summed over all upstream
        /// partitions, addressed to subpartition `i`. A broadcast result has
        /// exactly one entry.
        aggregated_subpartition_bytes: Vec<u64>,
        /// When true, the single subpartition 0 is delivered in full to every
        /// downstream subtask.
        broadcast: bool,
    },
    /// A pointwise (forward-like) exchange: each downstream subtask reads a
    /// contiguous group of upstream partitions.
    Pointwise {
        /// Entry `p` holds the byte size of each subpartition produced by
        /// upstream partition `p`.
        subpartition_bytes_by_partition: Vec<Vec<u64>>,
    },
}

/// All the information this library needs to know about one upstream result
/// consumed by the vertex whose parallelism is being decided. The values are
/// final: the caller must only invoke the decider once the upstream results
/// are fully produced.
///
/// # Examples:
/// ```
/// # use abd::*;
/// let info = BlockingResultInfo::broadcast(ResultId(7), 4, 1024);
/// assert!(info.is_broadcast());
/// assert!(!info.is_pointwise());
/// assert_eq!(1, info.num_subpartitions(0));
/// assert_eq!(1024, info.num_bytes_produced());
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BlockingResultInfo {
    result_id: ResultId,
    num_partitions: usize,
    details: ResultDetails,
}
impl BlockingResultInfo {
    /// Creates the statistics of a non-broadcast all-to-all result with the
    /// given per-subpartition byte totals (one entry per subpartition, summed
    /// over the upstream partitions).
    pub fn all_to_all(
        result_id: ResultId,
        num_partitions: usize,
        aggregated_subpartition_bytes: Vec<u64>,
    ) -> Self {
        assert!(num_partitions >= 1, "a result must have at least one partition");
        assert!(
            !aggregated_subpartition_bytes.is_empty(),
            "an all-to-all result must have at least one subpartition"
        );
        Self {
            result_id,
            num_partitions,
            details: ResultDetails::AllToAll { aggregated_subpartition_bytes, broadcast: false },
        }
    }
    /// Creates the statistics of a broadcast result. A broadcast result always
    /// exposes the single subpartition 0, holding all the produced bytes.
    pub fn broadcast(result_id: ResultId, num_partitions: usize, num_bytes: u64) -> Self {
        assert!(num_partitions >= 1, "a result must have at least one partition");
        Self {
            result_id,
            num_partitions,
            details: ResultDetails::AllToAll {
                aggregated_subpartition_bytes: vec![num_bytes],
                broadcast: true,
            },
        }
    }
    /// Creates the statistics of a pointwise result from the byte size of each
    /// subpartition of each upstream partition.
    pub fn pointwise(result_id: ResultId, subpartition_bytes_by_partition: Vec<Vec<u64>>) -> Self {
        assert!(
            !subpartition_bytes_by_partition.is_empty(),
            "a result must have at least one partition"
        );
        assert!(
            subpartition_bytes_by_partition.iter().all(|p| !p.is_empty()),
            "every partition must have at least one subpartition"
        );
        let num_partitions = subpartition_bytes_by_partition.len();
        Self {
            result_id,
            num_partitions,
            details: ResultDetails::Pointwise { subpartition_bytes_by_partition },
        }
    }

    /// The identifier of this intermediate result.
    #[inline]
    pub fn result_id(&self) -> ResultId {
        self.result_id
    }
    /// The number of upstream partitions producing this result.
    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }
    /// True iff every downstream subtask receives the whole subpartition 0.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.details, ResultDetails::AllToAll { broadcast: true, .. })
    }
    /// True iff this result is exchanged pointwise rather than all-to-all.
    pub fn is_pointwise(&self) -> bool {
        matches!(self.details, ResultDetails::Pointwise { .. })
    }
    /// The number of subpartitions produced by the given upstream partition.
    /// All partitions of an all-to-all result produce the same number of
    /// subpartitions.
    pub fn num_subpartitions(&self, partition_index: usize) -> usize {
        match &self.details {
            ResultDetails::AllToAll { aggregated_subpartition_bytes, .. } => {
                aggregated_subpartition_bytes.len()
            }
            ResultDetails::Pointwise { subpartition_bytes_by_partition } => {
                subpartition_bytes_by_partition[partition_index].len()
            }
        }
    }
    /// The total number of bytes of this result, across all partitions and
    /// subpartitions.
    pub fn num_bytes_produced(&self) -> u64 {
        match &self.details {
            ResultDetails::AllToAll { aggregated_subpartition_bytes, .. } => {
                aggregated_subpartition_bytes.iter().sum()
            }
            ResultDetails::Pointwise { subpartition_bytes_by_partition } => {
                subpartition_bytes_by_partition.iter().flatten().sum()
            }
        }
    }
    /// The per-subpartition byte totals of an all-to-all result, or `None`
    /// for a pointwise one.
    pub fn aggregated_subpartition_bytes(&self) -> Option<&[u64]> {
        match &self.details {
            ResultDetails::AllToAll { aggregated_subpartition_bytes, .. } => {
                Some(aggregated_subpartition_bytes)
            }
            ResultDetails::Pointwise { .. } => None,
        }
    }
}

// ----------------------------------------------------------------------------
// --- INPUT INFOS ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The share of one upstream result assigned to one downstream subtask: the
/// subtask reads the Cartesian product of the partition range and the
/// subpartition range.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExecutionVertexInputInfo {
    /// The index of the downstream subtask this assignment is for.
    pub subtask_index: usize,
    /// The upstream partitions the subtask reads from.
    pub partition_range: IndexRange,
    /// The subpartitions the subtask reads from each of those partitions.
    pub subpartition_range: IndexRange,
}

/// The complete assignment of one upstream result to a job vertex: one entry
/// per downstream subtask, indexed `0..parallelism`.
pub type JobVertexInputInfo = Vec<ExecutionVertexInputInfo>;

/// The outcome of a parallelism decision: the number of subtasks to create
/// for the job vertex, and for each consumed result the exact input ranges of
/// every subtask.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParallelismAndInputInfos {
    /// The number of downstream subtasks to create.
    pub parallelism: usize,
    /// The per-result input assignment. Each entry holds exactly
    /// `parallelism` elements. Empty for a source vertex.
    pub input_infos: FxHashMap<ResultId, JobVertexInputInfo>,
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The ways a parallelism decision can fail. Failing to fit the parallelism
/// into the configured window on the even-data path is *not* one of them: the
/// decider silently falls back to distributing subpartitions evenly instead.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DecideError {
    /// The caller passed an argument that violates the operation contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The consumed results are inconsistent with one another, or an internal
    /// self-check on the produced ranges failed.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The decider configuration could not be built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################


#[cfg(test)]
mod test_result_info {
    use crate::*;

    #[test]
    fn all_to_all_queries() {
        let info = BlockingResultInfo::all_to_all(ResultId(1), 3, vec![10, 20, 30]);
        assert_eq!(ResultId(1), info.result_id());
        assert_eq!(3, info.num_partitions());
        assert!(!info.is_broadcast());
        assert!(!info.is_pointwise());
        assert_eq!(3, info.num_subpartitions(0));
        assert_eq!(3, info.num_subpartitions(2));
        assert_eq!(60, info.num_bytes_produced());
        assert_eq!(Some(&[10, 20, 30][..]), info.aggregated_subpartition_bytes());
    }
    #[test]
    fn broadcast_has_a_single_subpartition() {
        let info = BlockingResultInfo::broadcast(ResultId(2), 5, 42);
        assert!(info.is_broadcast());
        assert_eq!(1, info.num_subpartitions(0));
        assert_eq!(1, info.num_subpartitions(4));
        assert_eq!(42, info.num_bytes_produced());
    }
    #[test]
    fn pointwise_queries() {
        let info =
            BlockingResultInfo::pointwise(ResultId(3), vec![vec![1, 2, 3], vec![4, 5, 6, 7]]);
        assert!(info.is_pointwise());
        assert!(!info.is_broadcast());
        assert_eq!(2, info.num_partitions());
        assert_eq!(3, info.num_subpartitions(0));
        assert_eq!(4, info.num_subpartitions(1));
        assert_eq!(28, info.num_bytes_produced());
        assert_eq!(None, info.aggregated_subpartition_bytes());
    }
    #[test]
    #[should_panic]
    fn all_to_all_needs_subpartitions() {
        BlockingResultInfo::all_to_all(ResultId(4), 1, vec![]);
    }
}
