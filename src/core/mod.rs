//! Core domain models
//!
//! Jobs, their outcomes, the state of a pipeline run, and the YAML
//! configuration the job list is loaded from.

pub mod config;
pub mod job;
pub mod state;

pub use job::*;
pub use state::*;
