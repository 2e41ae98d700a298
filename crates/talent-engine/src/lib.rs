//! Competency assessment engine: template-driven scoring, lifecycle orchestration and
//! talent-grid reporting for evaluator-scored workers.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
