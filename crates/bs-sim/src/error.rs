//! Error types for project runs.

use bs_model::ModelError;
use thiserror::Error;

use crate::lifecycle::{RunPhase, Transition};

/// Errors that stop a project operation.
///
/// Definition problems are not among them: `Project::check` returns those
/// as messages. Running out of iterations is not an error either.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown component type: {type_name}")]
    UnknownComponentType { type_name: String },

    #[error("Invalid run settings: {what}")]
    InvalidSettings { what: String },

    #[error("Lifecycle violation: {transition:?} is not allowed in phase {phase:?}")]
    Lifecycle {
        phase: RunPhase,
        transition: Transition,
    },

    #[error("Component {component} failed in {hook}: {source}")]
    Component {
        component: String,
        hook: &'static str,
        #[source]
        source: ModelError,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;
