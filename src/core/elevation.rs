use crate::domain::model::CommandSpec;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// How privileged commands are launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    helper: Option<PathBuf>,
}

impl Elevation {
    pub fn direct() -> Self {
        Self { helper: None }
    }

    pub fn with_helper(helper: impl Into<PathBuf>) -> Self {
        Self {
            helper: Some(helper.into()),
        }
    }

    /// Look the helper up on `PATH`. A missing helper is not an error.
    pub fn resolve(helper: &str) -> Self {
        let path = std::env::var_os("PATH").unwrap_or_default();
        Self::resolve_in(helper, &path)
    }

    pub fn resolve_in(helper: &str, path_var: &OsStr) -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        let found = which::which_in(helper, Some(path_var), cwd).ok();

        match found {
            Some(path) => {
                tracing::debug!("🔑 Elevation helper found: {}", path.display());
                Self::with_helper(path)
            }
            None => {
                tracing::info!("🔓 No '{}' on PATH, running privileged commands directly", helper);
                Self::direct()
            }
        }
    }

    pub fn helper(&self) -> Option<&Path> {
        self.helper.as_deref()
    }

    /// Prefix `command` with the helper. Per-invocation variables become `K=V`
    /// arguments because the helper resets the environment.
    pub fn wrap(&self, command: CommandSpec) -> CommandSpec {
        let Some(helper) = &self.helper else {
            return command;
        };

        let mut wrapped = CommandSpec::new(helper.to_string_lossy().into_owned());
        wrapped.args = command
            .env
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .chain(std::iter::once(command.program))
            .chain(command.args)
            .collect();
        wrapped.current_dir = command.current_dir;
        wrapped
    }
}
