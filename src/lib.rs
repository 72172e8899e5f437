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

//! # ABD
//! ABD (Adaptive Batch Decider) is the algorithmic core of an adaptive batch
//! scheduler: for each job vertex of a batch data-processing DAG, it chooses
//! the number of downstream subtasks to create and computes the exact input
//! assignment, that is which upstream partitions and subpartitions each of
//! the subtasks consumes, from the observed byte sizes of the already
//! produced upstream results.
//!
//! The decision juggles three constraints at once. The bytes should be spread
//! as evenly as possible across the subtasks so that no straggler dominates
//! the stage time. The chosen parallelism must respect the user-configured
//! window. And the bookkeeping must be exact: every subpartition of every
//! consumed result is read by exactly one subtask, while broadcast results
//! are delivered in full to all of them.
//!
//! Everything around that decision is someone else's job: the host scheduler
//! dispatches the vertices, allocates the slots, recovers from failures, and
//! feeds this library with finalized [`BlockingResultInfo`] statistics. The
//! decider itself is a pure function of those statistics and of its
//! configuration, so it can be shared and invoked concurrently on disjoint
//! vertices without any synchronization.
//!
//! ## Quick Example
//! The following sizes one vertex consuming a single all-to-all result of
//! ten subpartitions, with a budget of sixty bytes per subtask.
//!
//! ```
//! use abd::*;
//!
//! // 1. Configure the decider. Only the per-task data volume is mandatory;
//! //    the parallelism window defaults to [1, 128].
//! let config = DeciderConfigBuilder::default()
//!     .data_volume_per_task(60)
//!     .build()
//!     .unwrap();
//! let decider = DefaultParallelismDecider::new(config);
//!
//! // 2. Describe the upstream results the vertex consumes. Here, a single
//! //    all-to-all result produced by two upstream partitions, with the
//! //    bytes of each subpartition aggregated across those partitions.
//! let result = BlockingResultInfo::all_to_all(
//!     ResultId(0), 2, vec![10, 15, 13, 12, 1, 10, 8, 20, 12, 17]);
//!
//! // 3. Decide. `None` means the user did not fix the parallelism, so the
//! //    decider picks one that spreads the bytes evenly.
//! let decision = decider.decide(VertexId(0), &[result], None).unwrap();
//!
//! // 118 bytes fit in three subtasks of at most sixty bytes each.
//! assert_eq!(3, decision.parallelism);
//! let ranges: Vec<_> = decision.input_infos[&ResultId(0)]
//!     .iter()
//!     .map(|info| info.subpartition_range)
//!     .collect();
//! assert_eq!(
//!     vec![IndexRange::new(0, 4), IndexRange::new(5, 8), IndexRange::new(9, 9)],
//!     ranges);
//! ```
//!
//! ## Going further / Getting a grasp on the codebase
//! The `ParallelismDecider` trait defines the one operation a scheduler ever
//! calls, and `common` holds the handful of types flowing through it. The
//! `implementation` module is where the interesting parts live: the greedy
//! packing of subpartition bytes into ranges, the bisection over the per-task
//! budget that coerces the parallelism into the configured window, and the
//! expansion of the chosen ranges into per-subtask input infos.

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
