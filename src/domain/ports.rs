use crate::domain::model::{CheckpointKind, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs a command to completion and reports its exit code.
///
/// A process killed by a signal reports `128 + signal`, as a shell would.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<i32>;
}

/// A fatal provisioning step: a list of commands, each of which must exit 0.
pub trait Checkpoint: Send + Sync {
    fn kind(&self) -> CheckpointKind;

    /// Commands to run, in order.
    fn commands(&self) -> Vec<CommandSpec>;

    /// Decided right before the checkpoint runs.
    fn should_execute(&self) -> bool {
        true
    }
}
