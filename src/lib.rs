//! Deterministic 2D collision kernel for lockstep and rollback simulation.
//!
//! - [`fixed_math`]: fixed-point scalar and vector algebra, segment predicates
//! - [`geometry`]: axis-aligned box overlap, penetration and raycasts
//! - [`jobs`]: dependency-ordered job scheduler for collision work
//! - [`contacts`]: pairwise penetration batches run on the scheduler
//!
//! All collision results are computed in fixed point, so they are bit-identical
//! across machines and runs.

pub mod config;
pub mod contacts;
pub mod fixed_math;
pub mod geometry;
pub mod jobs;
pub mod logging;
pub mod profiling;
