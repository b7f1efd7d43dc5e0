//! Parallel processing utilities for the simplification passes
//!
//! Candidate scans and independent clusters are data-parallel; everything
//! that mutates the mesh stays sequential. Results are always collected in
//! index order, so parallel and sequential runs produce identical output.

use meshkit_core::{Error, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Global thread pool shared by every pass
static GLOBAL_THREAD_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();

/// Parallel execution settings for a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Worker count for the global pool (None = one per core)
    pub num_threads: Option<usize>,
    /// Inputs shorter than this are processed sequentially
    pub min_parallel_len: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            num_threads: None,
            min_parallel_len: 64,
        }
    }
}

impl ParallelConfig {
    /// Always run sequentially
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the number of worker threads
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set the sequential cutoff
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }

    fn use_parallel(&self, len: usize) -> bool {
        self.enabled && len >= self.min_parallel_len
    }

    /// Map `f` over `0..len`, collecting in index order
    pub fn map_range<U, F>(&self, len: usize, f: F) -> Vec<U>
    where
        U: Send,
        F: Fn(usize) -> U + Sync + Send,
    {
        if !self.use_parallel(len) {
            return (0..len).map(f).collect();
        }
        execute_parallel(|| (0..len).into_par_iter().map(f).collect())
    }

    /// Map `f` over a slice, collecting in index order
    pub fn map_slice<T, U, F>(&self, data: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        if !self.use_parallel(data.len()) {
            return data.iter().map(f).collect();
        }
        execute_parallel(|| data.par_iter().map(f).collect())
    }
}

/// Initialize the global thread pool with a fixed number of threads.
///
/// Has no effect once the pool exists.
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<()> {
    if GLOBAL_THREAD_POOL.get().is_some() {
        return Ok(());
    }

    let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("meshkit-{}", index));
    if let Some(num_threads) = num_threads {
        builder = builder.num_threads(num_threads);
    }

    let pool = builder
        .build()
        .map_err(|e| Error::InvalidConfig(format!("Failed to create thread pool: {}", e)))?;

    // Another thread may have won the race; either pool is fine
    let _ = GLOBAL_THREAD_POOL.set(Arc::new(pool));
    Ok(())
}

/// Get the global thread pool, if one was initialized
fn thread_pool() -> Option<Arc<ThreadPool>> {
    GLOBAL_THREAD_POOL.get().cloned()
}

/// Execute a parallel operation on the global pool, or on rayon's default
/// pool when none was initialized
pub fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
