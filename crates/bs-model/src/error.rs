//! Error types for component model operations.

use bs_core::{BsError, CompId};
use thiserror::Error;

/// Errors raised while a component is being simulated or queried.
///
/// Definition problems (bad values, names that do not resolve) are not
/// errors of this kind: `check()` collects them as strings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Parameter not found: {component}.{parameter}")]
    ParameterNotFound { component: String, parameter: String },

    #[error("Parameter {component}.{parameter} is not a {expected} parameter")]
    ParameterType {
        component: String,
        parameter: String,
        expected: &'static str,
    },

    #[error("Variable not found: {component}.{variable}")]
    VariableNotFound { component: String, variable: String },

    #[error("Unresolved reference: {component}.{parameter} is not bound to any component")]
    UnresolvedReference { component: String, parameter: String },

    #[error("Component {id} is not available")]
    ComponentUnavailable { id: CompId },

    #[error("Component {name} is not of type {expected}")]
    WrongComponentType { name: String, expected: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] BsError),
}

pub type ModelResult<T> = Result<T, ModelError>;
