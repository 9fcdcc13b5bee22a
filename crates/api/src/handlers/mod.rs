pub mod analyze;
pub mod jobs;
