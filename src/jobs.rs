//! Dependency-ordered job scheduling.
//!
//! A [`Scheduler`] owns one dedicated worker thread that drains an ordered queue
//! of jobs, plus a bounded rayon pool that parallel-for jobs fan out across.
//!
//! # Ordering vs. completion
//!
//! Queue position and completion are tracked separately:
//!
//! - **Position:** jobs without a dependency are appended (FIFO). A job that
//!   depends on a still-queued job is inserted immediately after it.
//! - **Eligibility:** a job only runs once every job it depends on has
//!   *completed*. The worker takes the first eligible job in queue order.
//!
//! # Handles
//!
//! [`JobHandle`] is an index/generation pair into the scheduler's job table.
//! Slots are recycled once a job completes, so a stale handle simply reads as
//! "complete" and is a satisfied dependency.
//!
//! # Example
//!
//! ```rust
//! use peregrine_kernel::config::SchedulerConfig;
//! use peregrine_kernel::jobs::{JobHandle, Scheduler};
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default()).unwrap();
//! let first = scheduler.schedule(|| { /* integrate */ }, JobHandle::NONE).unwrap();
//! let resolve = scheduler
//!     .schedule_parallel(|pair: usize| { let _ = pair; }, 64, first)
//!     .unwrap();
//! scheduler.wait(resolve).unwrap();
//! ```

mod error;
mod handle;
mod job;
mod scheduler;
mod table;


pub use error::JobError;
pub use handle::JobHandle;
pub use job::{Job, ParallelJob};
pub use scheduler::{Scheduler, SchedulerStats};
