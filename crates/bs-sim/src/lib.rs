//! Project orchestration for bsim.
//!
//! Provides:
//! - Global run parameters and their typed `RunSettings` form
//! - The interval-centered calendar with an optional daylight-saving window
//! - Execution ordering from the reference closure and a type priority list
//! - The per-run lifecycle state machine
//! - `Project`: component registry, structural check and the per-step
//!   fixed-point convergence loop

pub mod calendar;
pub mod error;
pub mod lifecycle;
pub mod order;
pub mod project;
pub mod settings;

// Re-exports for public API
pub use calendar::{Calendar, DaylightSaving};
pub use error::{SimError, SimResult};
pub use lifecycle::{RunPhase, Transition};
pub use order::{ExecutionPlan, execution_order};
pub use project::{Project, RunSummary, StepReport};
pub use settings::{DATE_FORMAT, DEFAULT_SIMULATION_ORDER, RunSettings, global_parameters, parse_date};
