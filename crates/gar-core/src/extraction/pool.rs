//! Bounded worker pool for independent per-entry jobs.

use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::unbounded;
use log::debug;
use log::error;

use crate::ArchiveError;
use crate::Result;

/// Runs tasks on at most `worker_count` scoped threads.
///
/// Every task is attempted even when others fail. Workers pull tasks from a
/// shared channel, so the thread count never exceeds the configured bound
/// regardless of how many tasks there are.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: NonZeroUsize,
}

impl WorkerPool {
    /// Creates a pool.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `worker_count` is zero.
    pub fn new(worker_count: usize) -> Result<Self> {
        let worker_count =
            NonZeroUsize::new(worker_count).ok_or_else(|| ArchiveError::InvalidConfiguration {
                reason: "worker count must be at least 1".to_string(),
            })?;
        Ok(Self { worker_count })
    }

    /// Configured upper bound on concurrent workers.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    /// Runs `task_fn` over every task and collects the outputs.
    ///
    /// Each worker builds its own state with `make_state` once and reuses it
    /// for every task it picks up. Output order is unspecified.
    ///
    /// # Errors
    ///
    /// If any task fails (or panics), returns `PartialExtraction` carrying
    /// the failure count, the task total and the first error observed. Every
    /// failure is logged as it happens.
    pub fn run<T, S, O, M, F>(
        &self,
        tasks: impl IntoIterator<Item = T>,
        make_state: M,
        task_fn: F,
    ) -> Result<Vec<O>>
    where
        T: Send,
        O: Send,
        M: Fn() -> S + Sync,
        F: Fn(&mut S, T) -> Result<O> + Sync,
    {
        let (task_tx, task_rx) = unbounded::<T>();
        let mut total = 0usize;
        for task in tasks {
            // The receiver is alive in this scope, so send cannot fail.
            let _ = task_tx.send(task);
            total += 1;
        }
        drop(task_tx);

        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.worker_count().min(total);
        debug!("running {total} tasks on {workers} workers");

        let (result_tx, result_rx) = unbounded::<Result<O>>();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let make_state = &make_state;
                let task_fn = &task_fn;

                let spawned = thread::Builder::new()
                    .name(format!("gar-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        let mut state = make_state();
                        for task in task_rx {
                            let outcome = task_fn(&mut state, task);
                            if let Err(e) = &outcome {
                                error!("{e}");
                            }
                            if result_tx.send(outcome).is_err() {
                                break;
                            }
                        }
                    });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        // Remaining workers drain the queue.
                        error!("failed to spawn worker {id}: {e}");
                    }
                }
            }

            if handles.is_empty() {
                // No worker started; run inline so tasks are still attempted.
                let mut state = make_state();
                for task in &task_rx {
                    let outcome = task_fn(&mut state, task);
                    if let Err(e) = &outcome {
                        error!("{e}");
                    }
                    let _ = result_tx.send(outcome);
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    error!("worker thread panicked");
                }
            }
        });
        drop(result_tx);

        let mut outputs = Vec::with_capacity(total);
        let mut failed = 0usize;
        let mut first_error = None;
        for outcome in result_rx {
            match outcome {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        // A panicking worker loses the task it was running.
        let lost = total - outputs.len() - failed;
        failed += lost;

        if failed == 0 {
            return Ok(outputs);
        }

        let source = first_error.unwrap_or_else(|| {
            ArchiveError::Io(std::io::Error::other("worker thread panicked"))
        });
        Err(ArchiveError::PartialExtraction {
            failed,
            total,
            source: Box::new(source),
        })
    }
}
