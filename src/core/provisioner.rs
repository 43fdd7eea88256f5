use crate::config::toml_config::ProvisionConfig;
use crate::core::checkpoints::build_checkpoints;
use crate::core::elevation::Elevation;
use crate::core::handoff::Handoff;
use crate::core::sequence::{PlannedCheckpoint, ProvisionSequence};
use crate::domain::model::{CheckpointReport, Layout, RunMode};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;

/// Runs the provisioning sequence and decides the handoff.
pub struct Provisioner<R: CommandRunner> {
    sequence: ProvisionSequence,
    runner: R,
    layout: Layout,
    mode: RunMode,
}

/// Result of a successful run: per-checkpoint reports and what to do next.
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub reports: Vec<CheckpointReport>,
    pub handoff: Handoff,
}

impl<R: CommandRunner> Provisioner<R> {
    pub fn new(sequence: ProvisionSequence, runner: R, layout: Layout, mode: RunMode) -> Self {
        Self {
            sequence,
            runner,
            layout,
            mode,
        }
    }

    /// Build the standard five-checkpoint sequence for `config`.
    pub fn from_config(
        config: &ProvisionConfig,
        layout: Layout,
        mode: RunMode,
        runner: R,
        monitor_enabled: bool,
    ) -> Self {
        let elevation = Elevation::resolve(&config.system.elevation_helper);

        let execution_id = format!("provision-{}", chrono::Local::now().format("%Y%m%dT%H%M%S"));
        let mut sequence = ProvisionSequence::new(execution_id).with_monitoring(monitor_enabled);
        for checkpoint in build_checkpoints(config, &layout, elevation) {
            sequence.add_checkpoint(checkpoint);
        }

        Self::new(sequence, runner, layout, mode)
    }

    pub fn plan(&self) -> (Vec<PlannedCheckpoint>, Handoff) {
        (self.sequence.plan(), Handoff::plan(self.mode, &self.layout))
    }

    pub async fn run(&self) -> Result<ProvisionOutcome> {
        let reports = self.sequence.execute_all(&self.runner).await?;

        let summary = ProvisionSequence::get_execution_summary(&reports);
        tracing::info!(
            "📋 {} checkpoints passed ({} skipped), {} commands",
            summary["completed_checkpoints"],
            summary["skipped_checkpoints"],
            summary["total_commands"]
        );
        tracing::debug!("Execution summary: {}", serde_json::to_string(&summary)?);

        Ok(ProvisionOutcome {
            reports,
            handoff: Handoff::plan(self.mode, &self.layout),
        })
    }
}
