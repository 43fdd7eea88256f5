use crate::domain::model::CheckpointKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Checkpoint {checkpoint} failed: `{command}` exited with code {code}")]
    CheckpointFailed {
        checkpoint: CheckpointKind,
        command: String,
        code: i32,
    },

    #[error("Failed to start `{command}`: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Handoff to `{command}` failed: {source}")]
    HandoffError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot change into working directory {dir}: {source}")]
    WorkdirError {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ProvisionError {
    /// Process exit code, following the shell's conventions for failed commands.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::CheckpointFailed { code, .. } => {
                if *code == 0 {
                    1
                } else {
                    *code
                }
            }
            ProvisionError::SpawnError { source, .. }
            | ProvisionError::HandoffError { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                std::io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// The checkpoint that aborted the run, if the failure came from one.
    pub fn checkpoint(&self) -> Option<CheckpointKind> {
        match self {
            ProvisionError::CheckpointFailed { checkpoint, .. } => Some(*checkpoint),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_checkpoint_failure_propagates_code() {
        let err = ProvisionError::CheckpointFailed {
            checkpoint: CheckpointKind::DepsInstall,
            command: "pip install torch".to_string(),
            code: 42,
        };
        assert_eq!(err.exit_code(), 42);
        assert_eq!(err.checkpoint(), Some(CheckpointKind::DepsInstall));
        assert!(err.to_string().contains("deps-install"));
    }

    #[test]
    fn test_spawn_errors_map_to_shell_codes() {
        let missing = ProvisionError::SpawnError {
            command: "apt-get".to_string(),
            source: Error::new(ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(missing.exit_code(), 127);

        let denied = ProvisionError::HandoffError {
            command: "python main.py".to_string(),
            source: Error::new(ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(denied.exit_code(), 126);
    }

    #[test]
    fn test_missing_workdir_exits_one() {
        let err = ProvisionError::WorkdirError {
            dir: "/srv/course/assignment3".to_string(),
            source: Error::new(ErrorKind::NotFound, "no such directory"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_config_errors_exit_one() {
        let err = ProvisionError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.checkpoint().is_none());
    }
}
