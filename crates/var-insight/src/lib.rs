//! Scoring, ranking, explanation and scenario simulation for VAR acquisition targets.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
