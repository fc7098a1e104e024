//! Background job execution with control-thread result delivery.
//!
//! A `Runtime` owns a bounded pool of worker threads fed from an unbounded
//! job queue. Submitted jobs always run to completion; their results are
//! pushed onto a single result channel in completion order and collected by
//! the control thread with [`Runtime::drain_results`], once per tick. There
//! is no cancellation and no retry: a job submitted for state that has since
//! gone stale still produces a result.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};

type Job<T> = Box<dyn FnOnce() -> T + Send + 'static>;

pub struct Runtime<T> {
    job_tx: Sender<Job<T>>,
    res_rx: Receiver<T>,
    _pool: Arc<ThreadPool>,
    pending: Arc<AtomicUsize>,
    pub workers: usize,
}

/// Leave one core for the control thread when possible.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
        .saturating_sub(1)
        .max(1)
}

impl<T: Send + 'static> Runtime<T> {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<Job<T>>();
        let (res_tx, res_rx) = unbounded::<T>();
        let pending = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("relief-worker-{i}"))
                .build()
                .expect("worker pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    // A panicking producer takes this worker with it; there is
                    // no error channel back to the submitter.
                    let out = job();
                    if tx.send(out).is_err() {
                        break;
                    }
                }
            });
        }

        Self {
            job_tx,
            res_rx,
            _pool: pool,
            pending,
            workers,
        }
    }

    /// Enqueue a producer. It will run exactly once on some worker and its
    /// result will appear in a later [`Runtime::drain_results`] call.
    pub fn submit(&self, job: impl FnOnce() -> T + Send + 'static) {
        self.pending.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(Box::new(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Drain everything completed so far, in completion order, without
    /// blocking. The caller invokes this exactly once per control-thread
    /// tick and owns all state the results are applied to.
    pub fn drain_results(&self) -> Vec<T> {
        let out: Vec<T> = self.res_rx.try_iter().collect();
        self.pending.fetch_sub(out.len(), Ordering::Relaxed);
        out
    }

    /// Jobs submitted but not yet delivered through `drain_results`.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }
}
