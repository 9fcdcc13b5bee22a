//! Background analysis orchestration.
//!
//! [`runner::JobRunner`] owns task scheduling and publishes state changes to
//! the registry. [`pipeline::analyze`] does the actual work for one job and
//! touches no shared state.

pub mod pipeline;
pub mod runner;

pub use runner::JobRunner;
