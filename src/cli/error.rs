//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
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

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(_)
                    | ApplicationError::Expression { .. }
                    | ApplicationError::Dataset { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { source, .. } => {
                        match source.downcast_ref::<std::io::Error>() {
                            Some(io)
                                if matches!(
                                    io.kind(),
                                    std::io::ErrorKind::NotFound
                                        | std::io::ErrorKind::PermissionDenied
                                ) =>
                            {
                                crate::exitcode::NOINPUT
                            }
                            _ => crate::exitcode::IOERR,
                        }
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_domain_errors_when_mapping_exit_code_then_data_error() {
        let err: CliError = DomainError::EmptyDataset.into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);

        let err: CliError = ApplicationError::Expression {
            line: 1,
            text: "+".into(),
            source: DomainError::InsufficientOperands {
                operator: "+".into(),
                required: 2,
                available: 0,
            },
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_missing_file_when_mapping_exit_code_then_no_input() {
        let err: CliError = ApplicationError::OperationFailed {
            context: "read expressions: x".into(),
            source: Box::new(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::NOINPUT);

        let err: CliError = ApplicationError::OperationFailed {
            context: "read input pairs: x".into(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::NOINPUT);

        let err: CliError = ApplicationError::OperationFailed {
            context: "read input pairs: dir".into(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::IOERR);
    }

    #[test]
    fn given_config_and_usage_errors_when_mapping_exit_code_then_distinct_codes() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::CONFIG);
        assert_eq!(CliError::Usage("x".into()).exit_code(), exitcode::USAGE);
        let io = InfraError::io("cwd", std::io::Error::other("boom"));
        assert_eq!(CliError::from(io).exit_code(), exitcode::IOERR);
    }
}
