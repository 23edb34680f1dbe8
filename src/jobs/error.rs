use thiserror::Error;

use super::JobHandle;

/// Errors returned by [`Scheduler`](super::Scheduler) operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// The scheduler no longer accepts work.
    #[error("scheduler has been shut down")]
    ShutDown,

    /// The handle points outside this scheduler's job table.
    #[error("{0} does not belong to this scheduler")]
    InvalidHandle(JobHandle),

    /// The job was still queued when the scheduler shut down.
    #[error("{0} was cancelled by scheduler shutdown before it ran")]
    Cancelled(JobHandle),

    #[error("failed to spawn scheduler worker thread")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("failed to build parallel-for thread pool")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}
