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

//! This module provides the default decider implementation. Given the byte
//! statistics of the upstream results a vertex consumes, it picks a
//! parallelism within the configured window and the matching per-subtask
//! input ranges, spreading the bytes as evenly as it can.

use derive_builder::Builder;
use fxhash::FxHashMap;
use log::{debug, info};

use crate::{
    compute_subpartition_ranges, compute_vertex_input_infos, count_subpartition_ranges,
    create_parallelism_and_input_infos, find_max_legal_value, find_min_legal_value,
    BlockingResultInfo, DecideError, IndexRange, ParallelismAndInputInfos, ParallelismDecider,
    VertexId,
};

/// The maximum share of the per-task byte budget that broadcast data may
/// consume when sizing the parallelism: one part in this divisor.
const BROADCAST_CAP_DIVISOR: u64 = 2;

// ----------------------------------------------------------------------------
// --- CONFIGURATION ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// The configuration of a decider. It is built once per job through
/// [`DeciderConfigBuilder`] and copied into the decider at construction.
/// `data_volume_per_task` is mandatory; the three other settings default to
/// the values documented on their keys.
///
/// # Examples:
/// ```
/// # use abd::*;
/// let config = DeciderConfigBuilder::default()
///     .min_parallelism(4)
///     .data_volume_per_task(1 << 30)
///     .build()
///     .unwrap();
/// assert_eq!(4, config.min_parallelism());
/// assert_eq!(128, config.max_parallelism());
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DeciderConfig {
    /// The lower bound of the decided parallelism.
    #[builder(default = "DeciderConfig::DEFAULT_MIN_PARALLELISM")]
    min_parallelism: usize,
    /// The upper bound of the decided parallelism.
    #[builder(default = "DeciderConfig::DEFAULT_MAX_PARALLELISM")]
    max_parallelism: usize,
    /// The number of bytes each subtask should ideally process.
    data_volume_per_task: u64,
    /// The parallelism of a source vertex whose parallelism was not fixed by
    /// the user.
    #[builder(default = "DeciderConfig::DEFAULT_SOURCE_PARALLELISM")]
    default_source_parallelism: usize,
}
impl DeciderConfig {
    /// Canonical key of the `min_parallelism` setting. Defaults to 1.
    pub const MIN_PARALLELISM_KEY: &'static str = "adaptive-batch-scheduler.min-parallelism";
    /// Canonical key of the `max_parallelism` setting. Defaults to 128.
    pub const MAX_PARALLELISM_KEY: &'static str = "adaptive-batch-scheduler.max-parallelism";
    /// Canonical key of the `data_volume_per_task` setting. Mandatory.
    pub const DATA_VOLUME_PER_TASK_KEY: &'static str =
        "adaptive-batch-scheduler.avg-data-volume-per-task";
    /// Canonical key of the `default_source_parallelism` setting. Defaults to 1.
    pub const DEFAULT_SOURCE_PARALLELISM_KEY: &'static str =
        "adaptive-batch-scheduler.default-source-parallelism";

    pub const DEFAULT_MIN_PARALLELISM: usize = 1;
    pub const DEFAULT_MAX_PARALLELISM: usize = 128;
    pub const DEFAULT_SOURCE_PARALLELISM: usize = 1;

    /// The lower bound of the decided parallelism.
    #[inline]
    pub fn min_parallelism(&self) -> usize {
        self.min_parallelism
    }
    /// The upper bound of the decided parallelism.
    #[inline]
    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }
    /// The number of bytes each subtask should ideally process.
    #[inline]
    pub fn data_volume_per_task(&self) -> u64 {
        self.data_volume_per_task
    }
    /// The parallelism used for source vertices with no fixed parallelism.
    #[inline]
    pub fn default_source_parallelism(&self) -> usize {
        self.default_source_parallelism
    }
}
impl DeciderConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let min = self.min_parallelism.unwrap_or(DeciderConfig::DEFAULT_MIN_PARALLELISM);
        let max = self.max_parallelism.unwrap_or(DeciderConfig::DEFAULT_MAX_PARALLELISM);
        if min == 0 {
            return Err("the minimum parallelism must be positive".to_string());
        }
        if max < min {
            return Err(format!(
                "the maximum parallelism ({max}) must be at least the minimum parallelism ({min})"
            ));
        }
        if let Some(0) = self.data_volume_per_task {
            return Err("the data volume per task must be positive".to_string());
        }
        if let Some(0) = self.default_source_parallelism {
            return Err("the default source parallelism must be positive".to_string());
        }
        Ok(())
    }
}
impl From<DeciderConfigBuilderError> for DecideError {
    fn from(error: DeciderConfigBuilderError) -> Self {
        DecideError::InvalidConfig(error.to_string())
    }
}

// ----------------------------------------------------------------------------
// --- DEFAULT DECIDER --------------------------------------------------------
// ----------------------------------------------------------------------------
/// This is the structure implementing the default parallelism decider.
///
/// For a vertex consuming only all-to-all results (and whose parallelism was
/// not fixed), it packs the aggregated per-subpartition bytes into contiguous
/// ranges against the per-task byte budget; when the resulting parallelism
/// falls outside the configured window, it bisects over the budget to reach
/// the closest legal parallelism with the most even distribution. For every
/// other vertex it derives the parallelism from the byte totals alone and
/// spreads the subpartition indices evenly.
///
/// # Example Usage
/// ```
/// # use abd::*;
/// let config = DeciderConfigBuilder::default()
///     .data_volume_per_task(60)
///     .build()
///     .unwrap();
/// let decider = DefaultParallelismDecider::new(config);
///
/// let result = BlockingResultInfo::all_to_all(
///     ResultId(0), 2, vec![10, 15, 13, 12, 1, 10, 8, 20, 12, 17]);
/// let decision = decider.decide(VertexId(0), &[result], None).unwrap();
/// assert_eq!(3, decision.parallelism);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DefaultParallelismDecider {
    config: DeciderConfig,
}
impl DefaultParallelismDecider {
    /// Creates a decider holding its own copy of the given configuration.
    pub fn new(config: DeciderConfig) -> Self {
        Self { config }
    }

    /// Decides the parallelism and input infos of a vertex consuming only
    /// all-to-all results, packing the bytes of contiguous subpartitions into
    /// one subtask each until the per-task budget is exhausted.
    fn decide_and_evenly_distribute_data(
        &self,
        vertex: VertexId,
        consumed_results: &[BlockingResultInfo],
    ) -> Result<ParallelismAndInputInfos, DecideError> {
        debug_assert!(consumed_results.iter().all(|r| !r.is_pointwise()));
        let broadcast_bytes = self.capped_broadcast_bytes(vertex, consumed_results);
        let limit = self.config.data_volume_per_task - broadcast_bytes;
        let num_subpartitions = check_and_get_subpartition_num(consumed_results)?;

        let mut bytes = vec![0u64; num_subpartitions];
        for result in consumed_results {
            if result.is_broadcast() {
                continue;
            }
            if let Some(aggregated) = result.aggregated_subpartition_bytes() {
                for (i, &b) in aggregated.iter().enumerate() {
                    bytes[i] += b;
                }
            }
        }

        let mut subpartition_ranges = compute_subpartition_ranges(&bytes, limit);
        if !self.is_legal_parallelism(subpartition_ranges.len()) {
            match self.adjust_to_closest_legal_parallelism(limit, subpartition_ranges.len(), &bytes)
            {
                Some(adjusted) => subpartition_ranges = adjusted,
                None => {
                    info!(
                        "Could not fit the parallelism of job vertex {vertex:?} into [{}, {}] \
                         while evenly distributing data, falling back to evenly distributing \
                         subpartitions.",
                        self.config.min_parallelism, self.config.max_parallelism
                    );
                    return self.decide_and_evenly_distribute_subpartitions(
                        vertex,
                        consumed_results,
                        None,
                    );
                }
            }
        }
        if !covers_all_subpartitions(&subpartition_ranges, num_subpartitions) {
            return Err(DecideError::InvalidState(format!(
                "the subpartition ranges {subpartition_ranges:?} do not cover [0, {}] exactly once",
                num_subpartitions - 1
            )));
        }
        debug!(
            "Decided parallelism {} of job vertex {vertex:?} by evenly distributing data.",
            subpartition_ranges.len()
        );
        Ok(create_parallelism_and_input_infos(consumed_results, &subpartition_ranges))
    }

    /// Bisects over the byte limit until the greedy packing yields a legal
    /// parallelism, and returns the ranges packed with the adjusted limit.
    ///
    /// When the initial parallelism is too small, the largest limit still
    /// yielding enough ranges pins down the smallest legal parallelism; a
    /// whole interval of limits yields that same count, and the second search
    /// picks its smallest member because a tighter limit spreads the bytes
    /// more evenly. When the initial parallelism is too large, the smallest
    /// limit yielding few enough ranges is the answer.
    ///
    /// Returns `None` when no limit yields a legal parallelism (the greedy
    /// packing can jump over the window when single subpartitions exceed the
    /// limit on their own).
    fn adjust_to_closest_legal_parallelism(
        &self,
        current_limit: u64,
        current_parallelism: usize,
        bytes: &[u64],
    ) -> Option<Vec<IndexRange>> {
        let min_limit = bytes.iter().copied().min().unwrap_or(0);
        let max_limit = bytes.iter().sum::<u64>();
        let min = self.config.min_parallelism;
        let max = self.config.max_parallelism;

        let mut limit = current_limit;
        if current_parallelism < min {
            limit = find_max_legal_value(
                |v| count_subpartition_ranges(bytes, v) >= min,
                min_limit,
                current_limit,
            );
            let closest_parallelism = count_subpartition_ranges(bytes, limit);
            limit = find_min_legal_value(
                |v| count_subpartition_ranges(bytes, v) == closest_parallelism,
                min_limit,
                limit,
            );
        } else if current_parallelism > max {
            limit = find_min_legal_value(
                |v| count_subpartition_ranges(bytes, v) <= max,
                current_limit,
                max_limit,
            );
        }

        if self.is_legal_parallelism(count_subpartition_ranges(bytes, limit)) {
            Some(compute_subpartition_ranges(bytes, limit))
        } else {
            None
        }
    }

    /// Applies the fixed parallelism (or derives one from the byte totals)
    /// and spreads the subpartition indices of every consumed result evenly
    /// across the subtasks. The byte totals say nothing about subpartition
    /// counts, so the expansion can still fail with `InvalidState` when a
    /// result has too few subpartitions for that many subtasks.
    fn decide_and_evenly_distribute_subpartitions(
        &self,
        vertex: VertexId,
        consumed_results: &[BlockingResultInfo],
        initial_parallelism: Option<usize>,
    ) -> Result<ParallelismAndInputInfos, DecideError> {
        let parallelism = match initial_parallelism {
            Some(parallelism) => parallelism,
            None => self.decide_parallelism(vertex, consumed_results),
        };
        let input_infos = compute_vertex_input_infos(parallelism, consumed_results)?;
        Ok(ParallelismAndInputInfos { parallelism, input_infos })
    }

    /// Derives a parallelism from the byte totals alone: the non-broadcast
    /// bytes divided by what remains of the per-task budget once the (capped)
    /// broadcast bytes are accounted for, clamped into the configured window.
    fn decide_parallelism(&self, vertex: VertexId, consumed_results: &[BlockingResultInfo]) -> usize {
        let broadcast_bytes = self.capped_broadcast_bytes(vertex, consumed_results);
        let non_broadcast_bytes: u64 = consumed_results
            .iter()
            .filter(|r| !r.is_broadcast())
            .map(|r| r.num_bytes_produced())
            .sum();

        let volume = (self.config.data_volume_per_task - broadcast_bytes).max(1);
        let parallelism = non_broadcast_bytes.div_ceil(volume) as usize;
        let clamped = parallelism.clamp(self.config.min_parallelism, self.config.max_parallelism);
        if clamped != parallelism {
            info!(
                "The parallelism {parallelism} decided for job vertex {vertex:?} is outside \
                 [{}, {}], using {clamped} instead.",
                self.config.min_parallelism, self.config.max_parallelism
            );
        }
        debug!("Decided parallelism {clamped} of job vertex {vertex:?} from the byte totals.");
        clamped
    }

    /// The total broadcast bytes of the consumed results, capped at a fixed
    /// ratio of the per-task budget so that broadcast-heavy inputs cannot
    /// starve the budget left for the non-broadcast data.
    fn capped_broadcast_bytes(
        &self,
        vertex: VertexId,
        consumed_results: &[BlockingResultInfo],
    ) -> u64 {
        let broadcast_bytes: u64 = consumed_results
            .iter()
            .filter(|r| r.is_broadcast())
            .map(|r| r.num_bytes_produced())
            .sum();
        let cap = self.config.data_volume_per_task.div_ceil(BROADCAST_CAP_DIVISOR);
        if broadcast_bytes > cap {
            info!(
                "The broadcast bytes {broadcast_bytes} of job vertex {vertex:?} exceed the cap \
                 {cap}, using {cap} to size the parallelism."
            );
            cap
        } else {
            broadcast_bytes
        }
    }

    fn is_legal_parallelism(&self, parallelism: usize) -> bool {
        (self.config.min_parallelism..=self.config.max_parallelism).contains(&parallelism)
    }
}

impl ParallelismDecider for DefaultParallelismDecider {
    fn decide(
        &self,
        vertex: VertexId,
        consumed_results: &[BlockingResultInfo],
        initial_parallelism: Option<usize>,
    ) -> Result<ParallelismAndInputInfos, DecideError> {
        if let Some(0) = initial_parallelism {
            return Err(DecideError::InvalidArgument(format!(
                "the initial parallelism of job vertex {vertex:?} must be positive"
            )));
        }
        if consumed_results.is_empty() {
            let parallelism =
                initial_parallelism.unwrap_or(self.config.default_source_parallelism);
            debug!("Job vertex {vertex:?} is a source, using parallelism {parallelism}.");
            return Ok(ParallelismAndInputInfos { parallelism, input_infos: FxHashMap::default() });
        }
        if initial_parallelism.is_none()
            && consumed_results.iter().all(|r| !r.is_pointwise())
            && !consumed_results.iter().all(|r| r.is_broadcast())
        {
            self.decide_and_evenly_distribute_data(vertex, consumed_results)
        } else {
            self.decide_and_evenly_distribute_subpartitions(
                vertex,
                consumed_results,
                initial_parallelism,
            )
        }
    }
}

/// Returns the subpartition count shared by all the partitions of all the
/// non-broadcast results, or fails when they disagree: inputs with diverging
/// subpartition counts cannot be co-partitioned across the same subtasks.
fn check_and_get_subpartition_num(
    consumed_results: &[BlockingResultInfo],
) -> Result<usize, DecideError> {
    let mut subpartition_num = None;
    for result in consumed_results.iter().filter(|r| !r.is_broadcast()) {
        for partition in 0..result.num_partitions() {
            let num = result.num_subpartitions(partition);
            match subpartition_num {
                None => subpartition_num = Some(num),
                Some(expected) if expected != num => {
                    return Err(DecideError::InvalidState(format!(
                        "the consumed results disagree on their subpartition count \
                         ({expected} vs {num})"
                    )))
                }
                Some(_) => {}
            }
        }
    }
    subpartition_num.ok_or_else(|| {
        DecideError::InvalidState(
            "no non-broadcast result to take a subpartition count from".to_string(),
        )
    })
}

/// True iff the ranges form an ordered partition of `[0, num_subpartitions - 1]`.
fn covers_all_subpartitions(ranges: &[IndexRange], num_subpartitions: usize) -> bool {
    let mut next = 0;
    for range in ranges {
        if range.start() != next {
            return false;
        }
        next = range.end() + 1;
    }
    next == num_subpartitions
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################


#[cfg(test)]
mod test_source_vertices {
    use crate::*;

    fn decider() -> DefaultParallelismDecider {
        let config = DeciderConfigBuilder::default()
            .min_parallelism(3)
            .max_parallelism(100)
            .data_volume_per_task(1 << 30)
            .default_source_parallelism(10)
            .build()
            .unwrap();
        DefaultParallelismDecider::new(config)
    }

    #[test]
    fn a_fixed_parallelism_is_returned_verbatim() {
        let decision = decider().decide(VertexId(0), &[], Some(7)).unwrap();
        assert_eq!(7, decision.parallelism);
        assert!(decision.input_infos.is_empty());
    }
    #[test]
    fn a_fixed_parallelism_may_sit_outside_the_window() {
        let decision = decider().decide(VertexId(0), &[], Some(1)).unwrap();
        assert_eq!(1, decision.parallelism);
    }
    #[test]
    fn an_unset_parallelism_takes_the_configured_default() {
        let decision = decider().decide(VertexId(0), &[], None).unwrap();
        assert_eq!(10, decision.parallelism);
        assert!(decision.input_infos.is_empty());
    }
    #[test]
    fn a_zero_initial_parallelism_is_rejected() {
        let error = decider().decide(VertexId(0), &[], Some(0)).unwrap_err();
        assert!(matches!(error, DecideError::InvalidArgument(_)));
    }
}

#[cfg(test)]
mod test_decide_parallelism {
    use crate::*;

    const MIB: u64 = 1 << 20;
    const GIB: u64 = 1 << 30;
    const TIB: u64 = 1 << 40;

    fn decider() -> DefaultParallelismDecider {
        let config = DeciderConfigBuilder::default()
            .min_parallelism(3)
            .max_parallelism(100)
            .data_volume_per_task(GIB)
            .default_source_parallelism(10)
            .build()
            .unwrap();
        DefaultParallelismDecider::new(config)
    }

    #[test]
    fn the_non_broadcast_bytes_divide_the_remaining_budget() {
        let results = [
            BlockingResultInfo::broadcast(ResultId(0), 1, 256 * MIB),
            BlockingResultInfo::all_to_all(ResultId(1), 1, vec![256 * MIB]),
            BlockingResultInfo::all_to_all(ResultId(2), 1, vec![8 * GIB]),
        ];
        assert_eq!(11, decider().decide_parallelism(VertexId(0), &results));
    }
    #[test]
    fn the_parallelism_is_clamped_to_the_maximum() {
        let results = [
            BlockingResultInfo::broadcast(ResultId(0), 1, 256 * MIB),
            BlockingResultInfo::all_to_all(ResultId(1), 1, vec![8 * GIB]),
            BlockingResultInfo::all_to_all(ResultId(2), 1, vec![TIB]),
        ];
        assert_eq!(100, decider().decide_parallelism(VertexId(0), &results));
    }
    #[test]
    fn the_parallelism_is_clamped_to_the_minimum() {
        let results = [
            BlockingResultInfo::broadcast(ResultId(0), 1, 256 * MIB),
            BlockingResultInfo::all_to_all(ResultId(1), 1, vec![512 * MIB]),
        ];
        assert_eq!(3, decider().decide_parallelism(VertexId(0), &results));
    }
    #[test]
    fn oversize_broadcast_bytes_are_capped_at_half_the_budget() {
        let results = [
            BlockingResultInfo::broadcast(ResultId(0), 1, GIB),
            BlockingResultInfo::all_to_all(ResultId(1), 1, vec![8 * GIB]),
        ];
        // 8 GiB spread over a remaining budget of 512 MiB per task
        assert_eq!(16, decider().decide_parallelism(VertexId(0), &results));
    }
}

#[cfg(test)]
mod test_even_data_path {
    use crate::*;

    const A_BYTES: [u64; 10] = [10, 15, 13, 12, 1, 10, 8, 20, 12, 17];
    const B_BYTES: [u64; 10] = [8, 12, 21, 9, 13, 7, 19, 13, 14, 5];

    fn decider(min: usize, max: usize, volume: u64) -> DefaultParallelismDecider {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = DeciderConfigBuilder::default()
            .min_parallelism(min)
            .max_parallelism(max)
            .data_volume_per_task(volume)
            .build()
            .unwrap();
        DefaultParallelismDecider::new(config)
    }

    fn ranges_of(decision: &ParallelismAndInputInfos, id: ResultId) -> Vec<IndexRange> {
        decision.input_infos[&id].iter().map(|i| i.subpartition_range).collect()
    }

    #[test]
    fn the_aggregated_bytes_of_all_inputs_are_packed_together() {
        let a = BlockingResultInfo::all_to_all(ResultId(0), 2, A_BYTES.to_vec());
        let b = BlockingResultInfo::all_to_all(ResultId(1), 2, B_BYTES.to_vec());
        let decision = decider(1, 10, 60).decide(VertexId(0), &[a, b], None).unwrap();

        assert_eq!(5, decision.parallelism);
        let expected = vec![
            IndexRange::new(0, 1),
            IndexRange::new(2, 3),
            IndexRange::new(4, 6),
            IndexRange::new(7, 8),
            IndexRange::new(9, 9),
        ];
        assert_eq!(expected, ranges_of(&decision, ResultId(0)));
        assert_eq!(expected, ranges_of(&decision, ResultId(1)));
        for infos in decision.input_infos.values() {
            for (subtask, info) in infos.iter().enumerate() {
                assert_eq!(subtask, info.subtask_index);
                assert_eq!(IndexRange::new(0, 1), info.partition_range);
            }
        }
    }
    #[test]
    fn a_too_large_parallelism_is_legalized_by_raising_the_limit() {
        let a = BlockingResultInfo::all_to_all(ResultId(0), 2, A_BYTES.to_vec());
        let b = BlockingResultInfo::all_to_all(ResultId(1), 2, B_BYTES.to_vec());
        let decision = decider(1, 3, 60).decide(VertexId(0), &[a, b], None).unwrap();

        assert_eq!(3, decision.parallelism);
        assert_eq!(
            vec![IndexRange::new(0, 2), IndexRange::new(3, 6), IndexRange::new(7, 9)],
            ranges_of(&decision, ResultId(0))
        );
    }
    #[test]
    fn a_too_small_parallelism_is_legalized_with_the_tightest_limit() {
        let a = BlockingResultInfo::all_to_all(ResultId(0), 2, A_BYTES.to_vec());
        let b = BlockingResultInfo::all_to_all(ResultId(1), 2, B_BYTES.to_vec());
        let decision = decider(4, 10, 1000).decide(VertexId(0), &[a, b], None).unwrap();

        assert_eq!(4, decision.parallelism);
        // the tightest limit still packing 4 ranges caps the largest subtask
        // at 77 bytes, where the loosest one would allow 79
        assert_eq!(
            vec![
                IndexRange::new(0, 1),
                IndexRange::new(2, 4),
                IndexRange::new(5, 7),
                IndexRange::new(8, 9),
            ],
            ranges_of(&decision, ResultId(0))
        );
    }
    #[test]
    fn oversize_subpartitions_may_exceed_the_limit_alone() {
        let input = BlockingResultInfo::all_to_all(ResultId(0), 1, vec![50, 60, 70]);
        let decision = decider(3, 3, 10).decide(VertexId(0), &[input], None).unwrap();
        assert_eq!(3, decision.parallelism);
        assert_eq!(
            vec![IndexRange::new(0, 0), IndexRange::new(1, 1), IndexRange::new(2, 2)],
            ranges_of(&decision, ResultId(0))
        );
    }
    #[test]
    fn an_unreachable_window_falls_back_to_even_subpartitions() {
        let input = BlockingResultInfo::all_to_all(
            ResultId(0),
            1,
            vec![10, 1, 10, 1, 10, 1, 10, 1, 10, 1],
        );
        let decision = decider(8, 8, 10).decide(VertexId(0), &[input], None).unwrap();

        assert_eq!(8, decision.parallelism);
        assert_eq!(
            vec![
                IndexRange::new(0, 0),
                IndexRange::new(1, 1),
                IndexRange::new(2, 2),
                IndexRange::new(3, 4),
                IndexRange::new(5, 5),
                IndexRange::new(6, 6),
                IndexRange::new(7, 7),
                IndexRange::new(8, 9),
            ],
            ranges_of(&decision, ResultId(0))
        );
    }
    #[test]
    fn a_count_jumping_over_the_window_falls_back_too() {
        // every pair of subpartitions merges at once, so no limit yields
        // exactly 8 ranges
        let input = BlockingResultInfo::all_to_all(ResultId(0), 1, vec![100; 10]);
        let decision = decider(8, 8, 10).decide(VertexId(0), &[input], None).unwrap();
        assert_eq!(8, decision.parallelism);
    }
    #[test]
    fn diverging_subpartition_counts_are_reported() {
        let a = BlockingResultInfo::all_to_all(ResultId(0), 1, vec![1, 2, 3]);
        let b = BlockingResultInfo::all_to_all(ResultId(1), 1, vec![1, 2, 3, 4]);
        let error = decider(1, 10, 60).decide(VertexId(0), &[a, b], None).unwrap_err();
        assert!(matches!(error, DecideError::InvalidState(_)));
    }
}


#[cfg(test)]
mod test_laws {
    use crate::*;

    #[test]
    fn deciding_twice_yields_structurally_equal_outcomes() {
        let config = DeciderConfigBuilder::default()
            .min_parallelism(1)
            .max_parallelism(10)
            .data_volume_per_task(60)
            .build()
            .unwrap();
        let decider = DefaultParallelismDecider::new(config);
        let results = [
            BlockingResultInfo::all_to_all(
                ResultId(0),
                2,
                vec![10, 15, 13, 12, 1, 10, 8, 20, 12, 17],
            ),
            BlockingResultInfo::broadcast(ResultId(1), 2, 20),
        ];
        let first = decider.decide(VertexId(0), &results, None).unwrap();
        let second = decider.decide(VertexId(0), &results, None).unwrap();
        assert_eq!(first, second);
    }
}
