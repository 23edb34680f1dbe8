use std::sync::Arc;

/// A single unit of work, executed once by the scheduler's worker.
///
/// Implemented for every `FnOnce() + Send + 'static` closure.
pub trait Job: Send + 'static {
    fn execute(self: Box<Self>);
}

impl<F> Job for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        (*self)()
    }
}

/// Data-parallel work, executed once per index in `0..count`.
///
/// Indices run concurrently on the scheduler's parallel pool, in no
/// particular order. Implemented for every `Fn(usize) + Send + Sync + 'static`
/// closure.
pub trait ParallelJob: Send + Sync + 'static {
    fn execute(&self, index: usize);
}

impl<F> ParallelJob for F
where
    F: Fn(usize) + Send + Sync + 'static,
{
    fn execute(&self, index: usize) {
        self(index)
    }
}

/// What the worker actually runs for a queued entry.
pub(crate) enum Work {
    Single(Box<dyn Job>),
    Parallel { job: Arc<dyn ParallelJob>, count: usize },
}

impl Work {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Work::Single(_) => "single",
            Work::Parallel { .. } => "parallel",
        }
    }
}
