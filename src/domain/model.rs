use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The five fatal checkpoints, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointKind {
    SystemPackages,
    VenvCreate,
    ToolingUpgrade,
    DepsInstall,
    Verify,
}

impl CheckpointKind {
    pub const ORDER: [CheckpointKind; 5] = [
        CheckpointKind::SystemPackages,
        CheckpointKind::VenvCreate,
        CheckpointKind::ToolingUpgrade,
        CheckpointKind::DepsInstall,
        CheckpointKind::Verify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointKind::SystemPackages => "system-packages",
            CheckpointKind::VenvCreate => "venv-create",
            CheckpointKind::ToolingUpgrade => "tooling-upgrade",
            CheckpointKind::DepsInstall => "deps-install",
            CheckpointKind::Verify => "verify",
        }
    }
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set for this invocation only.
    pub env: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Exec the downstream program once provisioning succeeds.
    Run,
    /// Print manual activation instructions and exit.
    NoRun,
}

impl RunMode {
    pub const NO_RUN_FLAG: &'static str = "--no-run";

    /// Only the exact `--no-run` value suppresses the handoff.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(Self::NO_RUN_FLAG) => RunMode::NoRun,
            _ => RunMode::Run,
        }
    }
}

/// Filesystem locations the provisioner works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub project_root: PathBuf,
    pub venv_dir: PathBuf,
    pub workdir: PathBuf,
    pub entrypoint: String,
}

impl Layout {
    pub fn new(
        project_root: impl Into<PathBuf>,
        venv_dir: impl AsRef<Path>,
        workdir: impl AsRef<Path>,
        entrypoint: impl Into<String>,
    ) -> Self {
        let project_root = project_root.into();
        Self {
            venv_dir: project_root.join(venv_dir),
            workdir: project_root.join(workdir),
            entrypoint: entrypoint.into(),
            project_root,
        }
    }

    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir.join("bin").join("python")
    }

    pub fn activate_script(&self) -> PathBuf {
        self.venv_dir.join("bin").join("activate")
    }

    pub fn entrypoint_path(&self) -> PathBuf {
        self.workdir.join(&self.entrypoint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointStatus {
    Completed,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct CheckpointReport {
    pub checkpoint: CheckpointKind,
    pub status: CheckpointStatus,
    pub commands_run: usize,
    pub duration: Duration,
}
