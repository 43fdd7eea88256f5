use crate::domain::model::{CommandSpec, Layout, RunMode};
use crate::utils::error::ProvisionError;

/// What happens once every checkpoint has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Replace this process with the downstream program.
    Exec(CommandSpec),
    /// Tell the user how to run it themselves.
    Instruct([String; 2]),
}

impl Handoff {
    pub fn plan(mode: RunMode, layout: &Layout) -> Self {
        match mode {
            RunMode::Run => Handoff::Exec(
                CommandSpec::new(layout.venv_python().to_string_lossy())
                    .arg(layout.entrypoint.clone())
                    .current_dir(layout.workdir.clone()),
            ),
            RunMode::NoRun => Handoff::Instruct([
                format!(
                    "To activate the environment: source {}",
                    layout.activate_script().display()
                ),
                format!(
                    "To run the assignment: cd {} && python {}",
                    layout.workdir.display(),
                    layout.entrypoint
                ),
            ]),
        }
    }
}

/// `execvp` into `command`. Only returns if the exec itself failed.
#[cfg(unix)]
pub fn exec(command: &CommandSpec) -> ProvisionError {
    use std::os::unix::process::CommandExt;

    let mut process = std::process::Command::new(&command.program);
    process.args(&command.args);
    process.envs(command.env.iter().map(|(k, v)| (k, v)));
    if let Some(dir) = &command.current_dir {
        // `cd` semantics: a missing workdir fails with status 1, not 127.
        if let Err(source) = std::env::set_current_dir(dir) {
            return ProvisionError::WorkdirError {
                dir: dir.display().to_string(),
                source,
            };
        }
    }

    tracing::info!("🏁 Handing off to: {}", command);
    let source = process.exec();
    ProvisionError::HandoffError {
        command: command.to_string(),
        source,
    }
}
