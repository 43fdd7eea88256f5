use async_trait::async_trait;
use ml_env_provision::core::checkpoints::build_checkpoints;
use ml_env_provision::core::elevation::Elevation;
use ml_env_provision::core::sequence::ProvisionSequence;
use ml_env_provision::core::{CheckpointKind, CommandRunner, CommandSpec, Layout, RunMode};
use ml_env_provision::domain::model::CheckpointStatus;
use ml_env_provision::{Handoff, ProvisionConfig, Provisioner, Result};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records commands and fails the first one whose rendered form contains `fail_on`.
#[derive(Clone, Default)]
struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    fail_on: Option<(String, i32)>,
}

impl RecordingRunner {
    fn failing_on(pattern: &str, code: i32) -> Self {
        Self {
            calls: Arc::default(),
            fail_on: Some((pattern.to_string(), code)),
        }
    }

    fn rendered(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.to_string()).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<i32> {
        self.calls.lock().unwrap().push(command.clone());
        match &self.fail_on {
            Some((pattern, code)) if command.to_string().contains(pattern.as_str()) => Ok(*code),
            _ => Ok(0),
        }
    }
}

fn provisioner(
    root: &TempDir,
    mode: RunMode,
    runner: RecordingRunner,
) -> Provisioner<RecordingRunner> {
    let config = ProvisionConfig::default();
    let layout = config.layout(Some(root.path())).unwrap();

    let mut sequence = ProvisionSequence::new("integration".to_string());
    for checkpoint in build_checkpoints(&config, &layout, Elevation::direct()) {
        sequence.add_checkpoint(checkpoint);
    }
    Provisioner::new(sequence, runner, layout, mode)
}

#[tokio::test]
async fn test_full_run_executes_every_step_in_order() {
    let root = TempDir::new().unwrap();
    let runner = RecordingRunner::default();
    let provisioner = provisioner(&root, RunMode::Run, runner.clone());

    let outcome = provisioner.run().await.unwrap();
    let calls = runner.rendered();

    // update, install, venv, tooling, four dependency groups, verify
    assert_eq!(calls.len(), 9);
    assert_eq!(calls[0], "apt-get update");
    assert!(calls[1].starts_with("DEBIAN_FRONTEND=noninteractive apt-get install -y python3 "));
    assert!(calls[2].starts_with("python3 -m venv "));
    assert!(calls[3].ends_with("-m pip install --upgrade pip setuptools wheel"));
    assert!(calls[4].ends_with("-m pip install numpy scipy pandas"));
    assert!(calls[5].contains("--index-url https://download.pytorch.org/whl/cpu torch"));
    assert!(calls[6].contains("'transformers>=4.41.0'"));
    assert!(calls[7].contains("nltk==3.4.5"));
    assert!(calls[8].contains(" -c "));

    let kinds: Vec<CheckpointKind> = outcome.reports.iter().map(|r| r.checkpoint).collect();
    assert_eq!(kinds, CheckpointKind::ORDER.to_vec());

    let Handoff::Exec(command) = outcome.handoff else {
        panic!("run mode must end in exec");
    };
    assert_eq!(command.args, vec!["main.py"]);
    assert_eq!(command.current_dir, Some(root.path().join("assignment3")));
}

#[tokio::test]
async fn test_existing_venv_is_reused() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join(".venv")).unwrap();
    let runner = RecordingRunner::default();

    let outcome = provisioner(&root, RunMode::NoRun, runner.clone())
        .run()
        .await
        .unwrap();

    assert!(runner.rendered().iter().all(|c| !c.contains("-m venv")));
    let venv = outcome
        .reports
        .iter()
        .find(|r| r.checkpoint == CheckpointKind::VenvCreate)
        .unwrap();
    assert_eq!(venv.status, CheckpointStatus::Skipped);
    // tooling upgrade still runs on a reused environment
    assert!(runner
        .rendered()
        .iter()
        .any(|c| c.contains("install --upgrade pip")));
}

#[tokio::test]
async fn test_system_package_failure_stops_before_venv() {
    let root = TempDir::new().unwrap();
    let runner = RecordingRunner::failing_on("apt-get install", 100);

    let err = provisioner(&root, RunMode::Run, runner.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.checkpoint(), Some(CheckpointKind::SystemPackages));
    assert_eq!(err.exit_code(), 100);
    assert_eq!(runner.rendered().len(), 2);
    assert!(!root.path().join(".venv").exists());
}

#[tokio::test]
async fn test_verify_failure_prevents_handoff() {
    let root = TempDir::new().unwrap();
    let runner = RecordingRunner::failing_on(" -c ", 1);

    let result = provisioner(&root, RunMode::NoRun, runner.clone()).run().await;

    let err = result.unwrap_err();
    assert_eq!(err.checkpoint(), Some(CheckpointKind::Verify));
    assert_ne!(err.exit_code(), 0);
}

#[tokio::test]
async fn test_no_run_mode_instructs() {
    let root = TempDir::new().unwrap();
    let outcome = provisioner(&root, RunMode::NoRun, RecordingRunner::default())
        .run()
        .await
        .unwrap();

    let Handoff::Instruct(lines) = outcome.handoff else {
        panic!("no-run mode must print instructions");
    };
    let venv = root.path().join(".venv");
    assert!(lines[0].contains(&format!("source {}/bin/activate", venv.display())));
    assert!(lines[1].contains(&root.path().join("assignment3").display().to_string()));
    assert!(lines[1].ends_with("python main.py"));
}

#[test]
fn test_layout_relative_root_is_made_absolute() {
    let layout: Layout = ProvisionConfig::default()
        .layout(Some(std::path::Path::new("relative/project")))
        .unwrap();
    assert!(layout.project_root.is_absolute());
    assert!(layout.venv_dir.ends_with("relative/project/.venv"));
}
