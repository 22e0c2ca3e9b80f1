//! Chunked execution for element-wise op work
//!
//! Ops that process many independent elements hand the index range to a
//! [`ChunkExecutor`], which partitions it into contiguous, disjoint chunks
//! and runs each chunk as an independent unit of work.
//!
//! # Chunking
//!
//! For `total` elements and `w` workers each chunk covers
//! `max(1, total / w)` consecutive elements; the last chunk also takes the
//! remainder. A sequential executor runs the whole range as one chunk.
//!
//! # Failure
//!
//! The first failing chunk's message becomes the cancellation reason of the
//! returned [`ChunkReport`]. Chunks that have not started when a failure is
//! recorded are skipped. Failures never propagate as panics or errors out of
//! the executor itself; the calling op decides what a cancelled report means.

mod plan;

pub use plan::{Chunk, ChunkPlan};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::config::OpsConfig;
use crate::{Error, Result};

/// Execution strategy for chunked work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Process the range in one chunk on the calling thread
    Sequential,
    /// Process chunks in parallel
    Parallel,
    /// Parallel at or above the configured element threshold
    #[default]
    Auto,
}

/// Outcome of a chunked run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    chunks: usize,
    cancel_reason: Option<String>,
}

impl ChunkReport {
    /// Whether a worker failed
    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason.is_some()
    }

    /// Message of the first worker failure
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// Number of chunks the range was split into
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Turn a cancelled report into [`Error::Cancelled`]
    pub fn into_result(self) -> Result<()> {
        match self.cancel_reason {
            Some(reason) => Err(Error::Cancelled(reason)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct FirstFailure {
    failed: AtomicBool,
    reason: Mutex<Option<String>>,
}

impl FirstFailure {
    fn is_set(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn record(&self, chunk: Chunk, err: Error) {
        warn!(start = chunk.start, len = chunk.len, error = %err, "chunk failed");
        let mut reason = self
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if reason.is_none() {
            *reason = Some(err.to_string());
        }
        self.failed.store(true, Ordering::Release);
    }

    fn into_report(self, chunks: usize) -> ChunkReport {
        ChunkReport {
            chunks,
            cancel_reason: self
                .reason
                .into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        }
    }
}

/// Runs chunked element-wise work, sequentially or on a rayon pool
#[derive(Clone, Debug)]
pub struct ChunkExecutor {
    strategy: ExecutionStrategy,
    parallel_threshold: usize,
    #[cfg(feature = "parallel")]
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

impl ChunkExecutor {
    /// Executor that always runs on the calling thread
    pub fn sequential() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            parallel_threshold: usize::MAX,
            #[cfg(feature = "parallel")]
            thread_pool: None,
        }
    }

    /// Executor that always splits work across rayon's global pool
    #[cfg(feature = "parallel")]
    pub fn parallel() -> Self {
        Self {
            strategy: ExecutionStrategy::Parallel,
            parallel_threshold: 0,
            thread_pool: None,
        }
    }

    /// Executor with a dedicated pool of `num_threads` workers
    #[cfg(feature = "parallel")]
    pub fn with_num_threads(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create thread pool: {e}")))?;
        Ok(Self {
            strategy: ExecutionStrategy::Parallel,
            parallel_threshold: 0,
            thread_pool: Some(std::sync::Arc::new(pool)),
        })
    }

    /// Build the executor described by `config`
    pub fn from_config(config: &OpsConfig) -> Result<Self> {
        config.validate()?;
        #[cfg(feature = "parallel")]
        {
            let mut executor = match config.num_threads {
                Some(n) => Self::with_num_threads(n)?,
                None => Self::parallel(),
            };
            executor.strategy = config.execution;
            executor.parallel_threshold = match config.execution {
                ExecutionStrategy::Sequential => usize::MAX,
                ExecutionStrategy::Parallel => 0,
                ExecutionStrategy::Auto => config.parallel_threshold,
            };
            Ok(executor)
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self::sequential())
        }
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Number of workers chunked work is spread across
    pub fn num_threads(&self) -> usize {
        if self.strategy == ExecutionStrategy::Sequential {
            return 1;
        }
        #[cfg(feature = "parallel")]
        {
            match &self.thread_pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    fn runs_parallel(&self, total: usize) -> bool {
        cfg!(feature = "parallel")
            && self.strategy != ExecutionStrategy::Sequential
            && total >= self.parallel_threshold
    }

    /// Chunk plan used for a range of `total` elements
    pub fn plan(&self, total: usize) -> ChunkPlan {
        if self.runs_parallel(total) {
            ChunkPlan::new(total, self.num_threads())
        } else {
            ChunkPlan::new(total, 1)
        }
    }

    /// Run `chunk_fn(start, step_size, len)` over every chunk of `[0, total)`
    pub fn run_chunked<F>(&self, total: usize, chunk_fn: F) -> ChunkReport
    where
        F: Fn(usize, usize, usize) -> Result<()> + Sync,
    {
        let plan = self.plan(total);
        let failure = FirstFailure::default();
        trace!(total, chunks = plan.len(), "running chunked work");

        if self.runs_parallel(total) && plan.len() > 1 {
            #[cfg(feature = "parallel")]
            self.install(|| {
                rayon::scope(|s| {
                    for &chunk in plan.chunks() {
                        let failure = &failure;
                        let chunk_fn = &chunk_fn;
                        s.spawn(move |_| {
                            if failure.is_set() {
                                return;
                            }
                            if let Err(e) = chunk_fn(chunk.start, chunk.step, chunk.len) {
                                failure.record(chunk, e);
                            }
                        });
                    }
                })
            });
        } else {
            for &chunk in plan.chunks() {
                if let Err(e) = chunk_fn(chunk.start, chunk.step, chunk.len) {
                    failure.record(chunk, e);
                    break;
                }
            }
        }

        failure.into_report(plan.len())
    }

    /// Run `chunk_fn(start, chunk)` over disjoint mutable chunks of `data`
    pub fn run_chunked_mut<T, F>(&self, data: &mut [T], chunk_fn: F) -> ChunkReport
    where
        T: Send,
        F: Fn(usize, &mut [T]) -> Result<()> + Sync,
    {
        let total = data.len();
        let plan = self.plan(total);
        let failure = FirstFailure::default();

        let mut pieces = Vec::with_capacity(plan.len());
        let mut rest = data;
        for &chunk in plan.chunks() {
            let (head, tail) = rest.split_at_mut(chunk.len);
            pieces.push((chunk, head));
            rest = tail;
        }

        if self.runs_parallel(total) && pieces.len() > 1 {
            #[cfg(feature = "parallel")]
            self.install(|| {
                rayon::scope(|s| {
                    for (chunk, piece) in pieces {
                        let failure = &failure;
                        let chunk_fn = &chunk_fn;
                        s.spawn(move |_| {
                            if failure.is_set() {
                                return;
                            }
                            if let Err(e) = chunk_fn(chunk.start, piece) {
                                failure.record(chunk, e);
                            }
                        });
                    }
                })
            });
        } else {
            for (chunk, piece) in pieces {
                if let Err(e) = chunk_fn(chunk.start, piece) {
                    failure.record(chunk, e);
                    break;
                }
            }
        }

        failure.into_report(plan.len())
    }

    #[cfg(feature = "parallel")]
    fn install<R: Send>(&self, work: impl FnOnce() -> R + Send) -> R {
        match &self.thread_pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}

impl Default for ChunkExecutor {
    fn default() -> Self {
        Self::sequential()
    }
}
