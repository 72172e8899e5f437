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

//! This module defines the `ParallelismDecider` trait.

use crate::{BlockingResultInfo, DecideError, ParallelismAndInputInfos, VertexId};

/// This is the decider abstraction. It is implemented by a structure that
/// picks, for one job vertex of a batch DAG, the number of downstream
/// subtasks to create and the exact share of every consumed upstream result
/// each of these subtasks will read.
///
/// A decider is a pure function of its inputs and of the configuration it was
/// constructed with: it holds no mutable state, performs no I/O, and may be
/// invoked concurrently on distinct vertices. Calling it twice with the same
/// inputs yields structurally equal outcomes.
pub trait ParallelismDecider {
    /// This method decides the parallelism and input assignment of the job
    /// vertex identified by `vertex`, given the finalized statistics of all
    /// the upstream results it consumes.
    ///
    /// `initial_parallelism` is the parallelism the user fixed for this
    /// vertex, or `None` when the vertex lets the decider pick one. Three
    /// situations are distinguished:
    ///
    /// * When `consumed_results` is empty, the vertex is a source: the fixed
    ///   parallelism (or the configured default source parallelism) is
    ///   returned verbatim along with an empty input-info map.
    /// * When no parallelism was fixed and every consumed result is an
    ///   all-to-all exchange (not all of them broadcast), the decider sizes
    ///   the vertex so that the *bytes* are spread as evenly as possible
    ///   across the subtasks.
    /// * Otherwise the decided (or fixed) parallelism is applied by spreading
    ///   the *subpartition indices* of every result evenly across the
    ///   subtasks.
    ///
    /// # Errors
    /// * `InvalidArgument` when `initial_parallelism` is `Some(0)`.
    /// * `InvalidState` when the non-broadcast all-to-all results disagree on
    ///   their subpartition count, when a result has too few subpartitions
    ///   for the parallelism that must be applied to it, or when the computed
    ///   ranges fail the internal coverage self-check.
    fn decide(
        &self,
        vertex: VertexId,
        consumed_results: &[BlockingResultInfo],
        initial_parallelism: Option<usize>,
    ) -> Result<ParallelismAndInputInfos, DecideError>;
}
