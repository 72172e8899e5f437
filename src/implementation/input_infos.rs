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

//! This module materializes a parallelism decision: it expands the chosen
//! subpartition ranges (or, on the even-subpartitions path, an even split of
//! the subpartition indices) into the per-subtask input infos of every
//! consumed result.

use fxhash::FxHashMap;

use crate::{
    BlockingResultInfo, DecideError, ExecutionVertexInputInfo, IndexRange, JobVertexInputInfo,
    ParallelismAndInputInfos, ResultId,
};

/// Expands the subpartition ranges chosen by the even-data path into the full
/// decision. Every subtask reads all the partitions of every result; subtask
/// `i` reads the subpartitions of `subpartition_ranges[i]`, except from the
/// broadcast results where it reads the single subpartition 0. The resulting
/// parallelism is the number of ranges.
pub fn create_parallelism_and_input_infos(
    consumed_results: &[BlockingResultInfo],
    subpartition_ranges: &[IndexRange],
) -> ParallelismAndInputInfos {
    let mut input_infos = FxHashMap::default();
    for result in consumed_results {
        let partition_range = IndexRange::new(0, result.num_partitions() - 1);
        let infos = subpartition_ranges
            .iter()
            .enumerate()
            .map(|(subtask, &range)| ExecutionVertexInputInfo {
                subtask_index: subtask,
                partition_range,
                subpartition_range: if result.is_broadcast() { IndexRange::new(0, 0) } else { range },
            })
            .collect();
        input_infos.insert(result.result_id(), infos);
    }
    ParallelismAndInputInfos { parallelism: subpartition_ranges.len(), input_infos }
}

/// Computes the input infos of every consumed result for an already-decided
/// parallelism, spreading the subpartition *indices* (not the bytes) evenly
/// across the subtasks.
///
/// Fails with `InvalidState` when a result does not have enough subpartitions
/// for the consumers that must share one of its partitions: such a
/// parallelism cannot be materialized without leaving subtasks empty-handed.
pub fn compute_vertex_input_infos(
    parallelism: usize,
    consumed_results: &[BlockingResultInfo],
) -> Result<FxHashMap<ResultId, JobVertexInputInfo>, DecideError> {
    let mut input_infos = FxHashMap::default();
    for result in consumed_results {
        let infos = if result.is_pointwise() {
            compute_input_info_for_pointwise(result.num_partitions(), parallelism, |p| {
                result.num_subpartitions(p)
            })?
        } else {
            compute_input_info_for_all_to_all(
                result.num_partitions(),
                parallelism,
                result.num_subpartitions(0),
                result.is_broadcast(),
            )?
        };
        input_infos.insert(result.result_id(), infos);
    }
    Ok(input_infos)
}

/// The even-subpartitions assignment of one all-to-all result: every subtask
/// reads all the partitions, and the subpartition indices are split evenly
/// across the subtasks (or pinned to subpartition 0 for a broadcast result).
///
/// Fails with `InvalidState` when the non-broadcast result has fewer
/// subpartitions than there are subtasks.
pub fn compute_input_info_for_all_to_all(
    num_partitions: usize,
    parallelism: usize,
    num_subpartitions: usize,
    broadcast: bool,
) -> Result<JobVertexInputInfo, DecideError> {
    let mut infos = Vec::with_capacity(parallelism);
    for subtask in 0..parallelism {
        infos.push(ExecutionVertexInputInfo {
            subtask_index: subtask,
            partition_range: IndexRange::new(0, num_partitions - 1),
            subpartition_range: consumed_subpartition_range(
                subtask,
                parallelism,
                num_subpartitions,
                broadcast,
            )?,
        });
    }
    Ok(infos)
}

/// The even-subpartitions assignment of one pointwise result. When there are
/// at least as many partitions as subtasks, each subtask reads a contiguous
/// group of whole partitions. Otherwise each partition is shared by a
/// contiguous group of subtasks, which split its subpartition indices evenly
/// among themselves.
///
/// Fails with `InvalidState` when a shared partition has fewer subpartitions
/// than the subtasks sharing it.
pub fn compute_input_info_for_pointwise(
    num_partitions: usize,
    parallelism: usize,
    num_subpartitions_of: impl Fn(usize) -> usize,
) -> Result<JobVertexInputInfo, DecideError> {
    let mut infos = Vec::with_capacity(parallelism);
    if num_partitions >= parallelism {
        for subtask in 0..parallelism {
            let start = subtask * num_partitions / parallelism;
            let end = (subtask + 1) * num_partitions / parallelism;
            infos.push(ExecutionVertexInputInfo {
                subtask_index: subtask,
                partition_range: IndexRange::new(start, end - 1),
                subpartition_range: consumed_subpartition_range(
                    subtask,
                    1,
                    num_subpartitions_of(start),
                    false,
                )?,
            });
        }
    } else {
        for partition in 0..num_partitions {
            let first = (partition * parallelism).div_ceil(num_partitions);
            let last = ((partition + 1) * parallelism).div_ceil(num_partitions);
            let num_consumers = last - first;
            for subtask in first..last {
                infos.push(ExecutionVertexInputInfo {
                    subtask_index: subtask,
                    partition_range: IndexRange::new(partition, partition),
                    subpartition_range: consumed_subpartition_range(
                        subtask,
                        num_consumers,
                        num_subpartitions_of(partition),
                        false,
                    )?,
                });
            }
        }
    }
    Ok(infos)
}

/// The share of subpartition indices one consumer gets when `num_consumers`
/// consumers split `num_subpartitions` subpartitions evenly among themselves.
/// Splitting fewer subpartitions than there are consumers would leave some of
/// them with an empty range, so this is reported as an `InvalidState` instead.
fn consumed_subpartition_range(
    consumer_subtask_index: usize,
    num_consumers: usize,
    num_subpartitions: usize,
    broadcast: bool,
) -> Result<IndexRange, DecideError> {
    let consumer_index = consumer_subtask_index % num_consumers;
    if broadcast {
        assert_eq!(1, num_subpartitions, "a broadcast result must expose a single subpartition");
        return Ok(IndexRange::new(0, 0));
    }
    if num_consumers > num_subpartitions {
        return Err(DecideError::InvalidState(format!(
            "cannot split {num_subpartitions} subpartition(s) across {num_consumers} consumers"
        )));
    }
    let start = consumer_index * num_subpartitions / num_consumers;
    let next = (consumer_index + 1) * num_subpartitions / num_consumers;
    Ok(IndexRange::new(start, next - 1))
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################


#[cfg(test)]
mod test_even_data {
    use crate::*;

    #[test]
    fn chosen_ranges_apply_to_every_non_broadcast_result() {
        let a = BlockingResultInfo::all_to_all(ResultId(0), 3, vec![10, 10, 10, 10]);
        let b = BlockingResultInfo::all_to_all(ResultId(1), 5, vec![5, 5, 5, 5]);
        let ranges = vec![IndexRange::new(0, 1), IndexRange::new(2, 3)];
        let decision = create_parallelism_and_input_infos(&[a, b], &ranges);

        assert_eq!(2, decision.parallelism);
        for (id, partitions) in [(ResultId(0), 3), (ResultId(1), 5)] {
            let infos = &decision.input_infos[&id];
            assert_eq!(2, infos.len());
            for (subtask, info) in infos.iter().enumerate() {
                assert_eq!(subtask, info.subtask_index);
                assert_eq!(IndexRange::new(0, partitions - 1), info.partition_range);
                assert_eq!(ranges[subtask], info.subpartition_range);
            }
        }
    }
    #[test]
    fn broadcast_results_are_delivered_in_full() {
        let data = BlockingResultInfo::all_to_all(ResultId(0), 1, vec![10, 10]);
        let side = BlockingResultInfo::broadcast(ResultId(1), 4, 100);
        let ranges = vec![IndexRange::new(0, 0), IndexRange::new(1, 1)];
        let decision = create_parallelism_and_input_infos(&[data, side], &ranges);

        for info in &decision.input_infos[&ResultId(1)] {
            assert_eq!(IndexRange::new(0, 0), info.subpartition_range);
            assert_eq!(IndexRange::new(0, 3), info.partition_range);
        }
    }
}
