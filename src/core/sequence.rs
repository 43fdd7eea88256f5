use crate::domain::model::{CheckpointKind, CheckpointReport, CheckpointStatus, CommandSpec};
use crate::domain::ports::{Checkpoint, CommandRunner};
use crate::utils::error::{ProvisionError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Checkpoints run in order; the first failure aborts the rest.
pub struct ProvisionSequence {
    checkpoints: Vec<Box<dyn Checkpoint>>,
    monitor: Option<SystemMonitor>,
    execution_id: String,
}

/// What a checkpoint would do, for dry runs.
#[derive(Debug, Clone)]
pub struct PlannedCheckpoint {
    pub checkpoint: CheckpointKind,
    pub skipped: bool,
    pub commands: Vec<CommandSpec>,
}

impl ProvisionSequence {
    pub fn new(execution_id: String) -> Self {
        Self {
            checkpoints: Vec::new(),
            monitor: None,
            execution_id,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| SystemMonitor::new(true));
        self
    }

    pub fn add_checkpoint(&mut self, checkpoint: Box<dyn Checkpoint>) {
        self.checkpoints.push(checkpoint);
    }

    pub fn plan(&self) -> Vec<PlannedCheckpoint> {
        self.checkpoints
            .iter()
            .map(|checkpoint| PlannedCheckpoint {
                checkpoint: checkpoint.kind(),
                skipped: !checkpoint.should_execute(),
                commands: checkpoint.commands(),
            })
            .collect()
    }

    /// Run every checkpoint in order. The first non-zero exit aborts the sequence
    /// and nothing already done is undone.
    pub async fn execute_all(&self, runner: &dyn CommandRunner) -> Result<Vec<CheckpointReport>> {
        let mut reports = Vec::with_capacity(self.checkpoints.len());

        tracing::info!("🚀 Provisioning started ({})", self.execution_id);
        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Provisioning started.");
        }

        for checkpoint in &self.checkpoints {
            let kind = checkpoint.kind();
            let start_time = Instant::now();

            if !checkpoint.should_execute() {
                tracing::info!("⏭️ Skipping checkpoint: {} (already satisfied)", kind);
                reports.push(CheckpointReport {
                    checkpoint: kind,
                    status: CheckpointStatus::Skipped,
                    commands_run: 0,
                    duration: Duration::ZERO,
                });
                continue;
            }

            tracing::info!("▶️ Checkpoint: {}", kind);
            let commands_run = Self::execute_checkpoint(checkpoint.as_ref(), runner).await?;

            let report = CheckpointReport {
                checkpoint: kind,
                status: CheckpointStatus::Completed,
                commands_run,
                duration: start_time.elapsed(),
            };
            tracing::info!(
                "✅ Checkpoint passed: {} (commands: {}, duration: {:?})",
                report.checkpoint,
                report.commands_run,
                report.duration
            );

            if let Some(monitor) = &self.monitor {
                monitor.log_stats(&format!("After {}", kind));
            }
            reports.push(report);
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        Ok(reports)
    }

    async fn execute_checkpoint(
        checkpoint: &dyn Checkpoint,
        runner: &dyn CommandRunner,
    ) -> Result<usize> {
        let commands = checkpoint.commands();
        for command in &commands {
            tracing::debug!("$ {}", command);
            let code = runner.run(command).await?;
            if code != 0 {
                return Err(ProvisionError::CheckpointFailed {
                    checkpoint: checkpoint.kind(),
                    command: command.to_string(),
                    code,
                });
            }
        }
        Ok(commands.len())
    }

    pub fn get_execution_summary(reports: &[CheckpointReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let completed = reports
            .iter()
            .filter(|r| r.status == CheckpointStatus::Completed)
            .count();
        let total_commands: usize = reports.iter().map(|r| r.commands_run).sum();
        let total_duration: Duration = reports.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_checkpoints".to_string(),
            serde_json::Value::Number(reports.len().into()),
        );
        summary.insert(
            "completed_checkpoints".to_string(),
            serde_json::Value::Number(completed.into()),
        );
        summary.insert(
            "skipped_checkpoints".to_string(),
            serde_json::Value::Number((reports.len() - completed).into()),
        );
        summary.insert(
            "total_commands".to_string(),
            serde_json::Value::Number(total_commands.into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );
        summary.insert(
            "executed_checkpoints".to_string(),
            serde_json::Value::Array(
                reports
                    .iter()
                    .filter(|r| r.status == CheckpointStatus::Completed)
                    .map(|r| serde_json::Value::String(r.checkpoint.to_string()))
                    .collect(),
            ),
        );

        summary
    }
}
