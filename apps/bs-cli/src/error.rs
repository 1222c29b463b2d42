//! Error type for the command-line front end.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] bs_project::ProjectError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] bs_sim::SimError),

    #[error("Project check failed with {0} error(s)")]
    Check(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
