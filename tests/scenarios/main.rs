//! Scenario-based tests for jobchain

mod helpers;

mod log_append;
mod success_chain;
