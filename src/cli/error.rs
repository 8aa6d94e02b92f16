//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::TreeError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<TreeError> for CliError {
    fn from(e: TreeError) -> Self {
        ApplicationError::Tree(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => crate::exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::NoTreeFile => crate::exitcode::USAGE,
                ApplicationError::TreeFileNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::InvalidTreeFile { .. } => crate::exitcode::DATAERR,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                ApplicationError::Tree(TreeError::Provider { .. }) => crate::exitcode::UNAVAILABLE,
                ApplicationError::Tree(_) => crate::exitcode::DATAERR,
            },
        }
    }
}
