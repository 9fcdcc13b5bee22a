//! Domain logic for the code-analysis job service.
//!
//! Everything here is HTTP-agnostic: the job model and its state machine,
//! the in-memory job registry, on-disk workspace layout, archive
//! extraction, the analyzer subprocess runner, and the result document.

pub mod analysis;
pub mod archive;
pub mod error;
pub mod job;
pub mod registry;
pub mod report;
pub mod tool;
pub mod types;
pub mod workspace;
