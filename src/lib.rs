//! Vehicle diagnostics simulation engine.
//!
//! Periodic simulated sensor readings are checked against editable
//! thresholds, recorded in bounded logs and histories, and served over HTTP.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
