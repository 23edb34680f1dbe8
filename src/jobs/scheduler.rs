use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use super::job::Work;
use super::table::{HandleState, JobTable};
use super::{Job, JobError, JobHandle, ParallelJob};
use crate::config::SchedulerConfig;
use crate::profiling::profile;

/// Counters describing a scheduler's lifetime so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Jobs that ran to completion, including ones that panicked.
    pub executed: u64,
    /// Jobs whose body panicked.
    pub panicked: u64,
    /// Jobs still waiting in the queue.
    pub pending: usize,
}

struct Shared {
    table: Mutex<JobTable>,
    /// Signalled when work is submitted or released, and on shutdown.
    work_ready: Condvar,
    /// Signalled whenever a job completes or is cancelled.
    job_done: Condvar,
    executed: AtomicU64,
    panicked: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, JobTable> {
        // Job bodies never run under the lock, so poisoning carries no torn state.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ordered job queue drained by one dedicated worker thread.
///
/// Construction starts the worker; dropping the scheduler (or calling
/// [`Scheduler::shutdown`]) stops it and joins it. The job that is running at
/// that moment finishes, everything still queued is cancelled.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = Scheduler::new(config.scheduler.clone())?;
///
/// let integrate = scheduler.schedule(move || integrate_bodies(), JobHandle::NONE)?;
/// let resolve = scheduler.schedule_parallel(move |pair| resolve_pair(pair), pairs, integrate)?;
/// scheduler.wait(resolve)?;
/// ```
pub struct Scheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, JobError> {
        let worker_name = config.worker_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_threads)
            .thread_name(move |i| format!("{worker_name}-par-{i}"))
            .build()?;

        let shared = Arc::new(Shared {
            table: Mutex::new(JobTable::new()),
            work_ready: Condvar::new(),
            job_done: Condvar::new(),
            executed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || worker_loop(worker_shared, pool))
            .map_err(JobError::WorkerSpawn)?;

        info!(
            "Scheduler '{}' started (parallel threads: {})",
            config.worker_name,
            if config.parallel_threads == 0 {
                "auto".to_string()
            } else {
                config.parallel_threads.to_string()
            }
        );

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Submits a single job. With [`JobHandle::NONE`] it is appended to the
    /// queue; otherwise it goes right after `depends_on` and runs only once
    /// `depends_on` has completed.
    pub fn schedule<J: Job>(&self, job: J, depends_on: JobHandle) -> Result<JobHandle, JobError> {
        self.submit(Work::Single(Box::new(job)), &[depends_on])
    }

    /// Submits a job that runs `job.execute(i)` for every `i` in `0..count`,
    /// fanned out over the parallel pool. The worker waits for the whole range
    /// before moving to the next queued job.
    pub fn schedule_parallel<J: ParallelJob>(
        &self,
        job: J,
        count: usize,
        depends_on: JobHandle,
    ) -> Result<JobHandle, JobError> {
        self.submit(Work::Parallel { job: Arc::new(job), count }, &[depends_on])
    }

    /// Like [`Scheduler::schedule`], waiting on every handle in `depends_on`.
    pub fn schedule_after_all<J: Job>(
        &self,
        job: J,
        depends_on: &[JobHandle],
    ) -> Result<JobHandle, JobError> {
        self.submit(Work::Single(Box::new(job)), depends_on)
    }

    /// Like [`Scheduler::schedule_parallel`], waiting on every handle in `depends_on`.
    pub fn schedule_parallel_after_all<J: ParallelJob>(
        &self,
        job: J,
        count: usize,
        depends_on: &[JobHandle],
    ) -> Result<JobHandle, JobError> {
        self.submit(Work::Parallel { job: Arc::new(job), count }, depends_on)
    }

    fn submit(&self, work: Work, depends_on: &[JobHandle]) -> Result<JobHandle, JobError> {
        let label = work.label();
        let handle = {
            let mut table = self.shared.lock();
            table.insert(work, depends_on)?
        };
        self.shared.work_ready.notify_all();
        debug!("Scheduled {} {} after {:?}", label, handle, depends_on);
        Ok(handle)
    }

    /// Whether the job behind `handle` has finished. `NONE` is always complete.
    pub fn is_complete(&self, handle: JobHandle) -> Result<bool, JobError> {
        if handle.is_none() {
            return Ok(true);
        }
        Ok(self.shared.lock().state(handle)? == HandleState::Complete)
    }

    /// Blocks until the job behind `handle` has completed.
    ///
    /// Returns [`JobError::Cancelled`] if the scheduler shut down before the job
    /// ran. Must not be called from inside a job on a job queued behind it.
    pub fn wait(&self, handle: JobHandle) -> Result<(), JobError> {
        if handle.is_none() {
            return Ok(());
        }
        let mut table = self.shared.lock();
        loop {
            match table.state(handle)? {
                HandleState::Complete => return Ok(()),
                HandleState::Cancelled => return Err(JobError::Cancelled(handle)),
                HandleState::Queued { .. } | HandleState::Running => {}
            }
            table = self
                .shared
                .job_done
                .wait(table)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks until nothing is queued and nothing is running.
    pub fn wait_idle(&self) {
        let mut table = self.shared.lock();
        while !table.is_idle() {
            table = self
                .shared
                .job_done
                .wait(table)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Snapshot of the queued (not yet running) jobs, in drain order.
    pub fn queued(&self) -> Vec<JobHandle> {
        self.shared.lock().queued_handles()
    }

    pub fn stats(&self) -> SchedulerStats {
        let pending = self.shared.lock().pending();
        SchedulerStats {
            executed: self.shared.executed.load(Ordering::Acquire),
            panicked: self.shared.panicked.load(Ordering::Acquire),
            pending,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops accepting work, lets the in-flight job finish and joins the worker.
    /// Queued jobs are cancelled. Calling this more than once is a no-op.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.shared.lock().close();
        self.shared.work_ready.notify_all();

        if worker.join().is_err() {
            error!("Scheduler worker thread panicked during shutdown");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>, pool: rayon::ThreadPool) {
    loop {
        let next = {
            let mut table = shared.lock();
            loop {
                if !table.is_accepting() {
                    break None;
                }
                if let Some(entry) = table.take_ready() {
                    break Some(entry);
                }
                table = shared
                    .work_ready
                    .wait(table)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let Some((handle, work)) = next else {
            break;
        };

        trace!("Running {} ({})", handle, work.label());
        if !execute(work, &pool) {
            shared.panicked.fetch_add(1, Ordering::AcqRel);
            error!("{} panicked; releasing its dependents", handle);
        }
        let executed = shared.executed.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Finished {} ({} executed so far)", handle, executed);
        crate::profile_log!(executed, "[JOBS] executed {} jobs", executed);

        shared.lock().complete(handle);
        shared.job_done.notify_all();
    }

    let dropped = shared.lock().cancel_queued();
    if dropped > 0 {
        warn!("Scheduler shut down with {} queued jobs; they were cancelled", dropped);
    }
    shared.job_done.notify_all();
    debug!("Scheduler worker exited");
}

/// Runs one job body. Returns `false` if it panicked.
#[profile]
fn execute(work: Work, pool: &rayon::ThreadPool) -> bool {
    let result = panic::catch_unwind(AssertUnwindSafe(|| match work {
        Work::Single(job) => job.execute(),
        Work::Parallel { job, count } => {
            pool.install(|| (0..count).into_par_iter().for_each(|index| job.execute(index)));
        }
    }));
    result.is_ok()
}
