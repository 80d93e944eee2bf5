//! Bounded worker pool.
//!
//! A tokio runtime whose blocking pool is capped at a fixed number of
//! threads. Jobs are plain closures; [`WorkerPool::run`] blocks until every
//! job of one batch has finished. The first failing job aborts the rest of
//! its batch.
//!
//! `run` may be called from inside another tokio runtime: on a multi-thread
//! runtime the calling worker is handed over with `block_in_place`, on a
//! current-thread runtime the batch is driven from a scoped helper thread.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::FindError;

/// Reusable pool running batches of blocking jobs.
#[derive(Debug)]
pub struct WorkerPool {
    runtime: Option<Runtime>,
    threads: usize,
    batches: AtomicU64,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self, FindError> {
        let threads = threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads)
            .thread_name("wlocate-worker")
            .build()?;
        debug!(threads, "worker pool started");
        Ok(Self {
            runtime: Some(runtime),
            threads,
            batches: AtomicU64::new(0),
        })
    }

    /// A pool sized to the available parallelism.
    pub fn with_available_parallelism() -> Result<Self, FindError> {
        let threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(threads)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Number of batches run so far.
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    /// Runs all jobs and returns their results in completion order.
    pub fn run<T, F>(&self, jobs: Vec<F>) -> Result<Vec<T>, FindError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, FindError> + Send + 'static,
    {
        self.batches.fetch_add(1, Ordering::Relaxed);
        let count = jobs.len();

        self.drive(async move {
            let mut workers = JoinSet::new();
            for job in jobs {
                workers.spawn_blocking(job);
            }

            let mut results = Vec::with_capacity(count);
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(Ok(value)) => results.push(value),
                    Ok(Err(e)) => {
                        error!(error = %e, "job failed, aborting batch");
                        workers.abort_all();
                        return Err(e);
                    }
                    Err(e) => {
                        error!(error = %e, "worker task panicked, aborting batch");
                        workers.abort_all();
                        return Err(FindError::TaskPanicked(e.to_string()));
                    }
                }
            }
            Ok(results)
        })
    }

    /// Blocks on `batch` wherever the caller happens to be running.
    fn drive<T, B>(&self, batch: B) -> Result<T, FindError>
    where
        T: Send,
        B: Future<Output = Result<T, FindError>> + Send,
    {
        let runtime = self.runtime.as_ref().ok_or(FindError::PoolShutDown)?;
        match Handle::try_current().map(|handle| handle.runtime_flavor()) {
            Err(_) => runtime.block_on(batch),
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| runtime.block_on(batch)),
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| runtime.block_on(batch))
                    .join()
                    .map_err(|_| FindError::TaskPanicked("batch driver thread".to_string()))?
            }),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // A runtime must not be dropped from async code.
        if let Some(runtime) = self.runtime.take() {
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            }
        }
    }
}
