use crate::config::toml_config::{InstallGroupConfig, ProvisionConfig};
use crate::core::elevation::Elevation;
use crate::core::packages::{self, NONINTERACTIVE_ENV};
use crate::domain::model::{CheckpointKind, CommandSpec, Layout};
use crate::domain::ports::Checkpoint;
use std::path::PathBuf;

/// Installs the system packages through the package manager.
pub struct SystemPackages {
    package_manager: String,
    packages: Vec<String>,
    refresh_index: bool,
    elevation: Elevation,
}

impl SystemPackages {
    pub fn new(
        package_manager: impl Into<String>,
        packages: Vec<String>,
        refresh_index: bool,
        elevation: Elevation,
    ) -> Self {
        Self {
            package_manager: package_manager.into(),
            packages,
            refresh_index,
            elevation,
        }
    }
}

impl Checkpoint for SystemPackages {
    fn kind(&self) -> CheckpointKind {
        CheckpointKind::SystemPackages
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let mut commands = Vec::new();
        if self.refresh_index {
            commands.push(CommandSpec::new(&self.package_manager).arg("update"));
        }
        // The frontend marker only applies to the install call.
        commands.push(
            CommandSpec::new(&self.package_manager)
                .args(["install", "-y"])
                .args(self.packages.iter().cloned())
                .env(NONINTERACTIVE_ENV.0, NONINTERACTIVE_ENV.1),
        );

        commands
            .into_iter()
            .map(|command| self.elevation.wrap(command))
            .collect()
    }
}

/// Creates the virtual environment unless the directory already exists.
pub struct VenvCreate {
    interpreter: String,
    venv_dir: PathBuf,
}

impl VenvCreate {
    pub fn new(interpreter: impl Into<String>, venv_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            venv_dir: venv_dir.into(),
        }
    }
}

impl Checkpoint for VenvCreate {
    fn kind(&self) -> CheckpointKind {
        CheckpointKind::VenvCreate
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new(&self.interpreter)
            .args(["-m", "venv"])
            .arg(self.venv_dir.to_string_lossy())]
    }

    fn should_execute(&self) -> bool {
        !self.venv_dir.exists()
    }
}

/// Upgrades pip and the build tooling inside the environment. Always runs.
pub struct ToolingUpgrade {
    venv_python: PathBuf,
    tooling: Vec<String>,
}

impl ToolingUpgrade {
    pub fn new(venv_python: impl Into<PathBuf>, tooling: Vec<String>) -> Self {
        Self {
            venv_python: venv_python.into(),
            tooling,
        }
    }
}

impl Checkpoint for ToolingUpgrade {
    fn kind(&self) -> CheckpointKind {
        CheckpointKind::ToolingUpgrade
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![pip(&self.venv_python)
            .args(["install", "--upgrade"])
            .args(self.tooling.iter().cloned())]
    }
}

/// One pip invocation per install group.
pub struct DepsInstall {
    venv_python: PathBuf,
    groups: Vec<InstallGroupConfig>,
}

impl DepsInstall {
    pub fn new(venv_python: impl Into<PathBuf>, groups: Vec<InstallGroupConfig>) -> Self {
        Self {
            venv_python: venv_python.into(),
            groups,
        }
    }
}

impl Checkpoint for DepsInstall {
    fn kind(&self) -> CheckpointKind {
        CheckpointKind::DepsInstall
    }

    fn commands(&self) -> Vec<CommandSpec> {
        self.groups
            .iter()
            .map(|group| {
                let mut command = pip(&self.venv_python).arg("install");
                if let Some(index_url) = &group.index_url {
                    command = command.args(["--index-url", index_url.as_str()]);
                }
                command.args(group.packages.iter().cloned())
            })
            .collect()
    }
}

/// Imports the key libraries inside the environment and prints their versions.
pub struct Verify {
    venv_python: PathBuf,
    modules: Vec<String>,
}

impl Verify {
    pub fn new(venv_python: impl Into<PathBuf>, modules: Vec<String>) -> Self {
        Self {
            venv_python: venv_python.into(),
            modules,
        }
    }
}

impl Checkpoint for Verify {
    fn kind(&self) -> CheckpointKind {
        CheckpointKind::Verify
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new(self.venv_python.to_string_lossy())
            .arg("-c")
            .arg(packages::verify_program(self.modules.as_slice()))]
    }
}

fn pip(venv_python: &std::path::Path) -> CommandSpec {
    CommandSpec::new(venv_python.to_string_lossy()).args(["-m", "pip"])
}

/// The five checkpoints for `config`, in execution order.
pub fn build_checkpoints(
    config: &ProvisionConfig,
    layout: &Layout,
    elevation: Elevation,
) -> Vec<Box<dyn Checkpoint>> {
    let venv_python = layout.venv_python();
    vec![
        Box::new(SystemPackages::new(
            config.system.package_manager.clone(),
            config.system.packages.clone(),
            config.system.refresh_index,
            elevation,
        )),
        Box::new(VenvCreate::new(
            config.python.interpreter.clone(),
            layout.venv_dir.clone(),
        )),
        Box::new(ToolingUpgrade::new(
            venv_python.clone(),
            config.python.tooling.clone(),
        )),
        Box::new(DepsInstall::new(
            venv_python.clone(),
            config.python.install.clone(),
        )),
        Box::new(Verify::new(venv_python, config.python.verify_modules.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_system_packages_sets_frontend_on_install_only() {
        let checkpoint = SystemPackages::new(
            "apt-get",
            strings(&["python3", "curl"]),
            true,
            Elevation::direct(),
        );
        let commands = checkpoint.commands();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].args, vec!["update"]);
        assert!(commands[0].env.is_empty());
        assert_eq!(commands[1].args, vec!["install", "-y", "python3", "curl"]);
        assert_eq!(
            commands[1].env,
            vec![("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())]
        );
    }

    #[test]
    fn test_system_packages_with_helper_and_no_refresh() {
        let checkpoint = SystemPackages::new(
            "apt-get",
            strings(&["curl"]),
            false,
            Elevation::with_helper("/usr/bin/sudo"),
        );
        let commands = checkpoint.commands();

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "/usr/bin/sudo");
        assert_eq!(
            commands[0].args,
            vec!["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y", "curl"]
        );
    }

    #[test]
    fn test_venv_create_skips_existing_directory() {
        let root = TempDir::new().unwrap();
        let venv_dir = root.path().join(".venv");

        let checkpoint = VenvCreate::new("python3", &venv_dir);
        assert!(checkpoint.should_execute());
        assert_eq!(
            checkpoint.commands()[0].args,
            vec!["-m".to_string(), "venv".to_string(), venv_dir.to_string_lossy().into_owned()]
        );

        std::fs::create_dir(&venv_dir).unwrap();
        assert!(!checkpoint.should_execute());
    }

    #[test]
    fn test_tooling_upgrade_uses_venv_pip() {
        let checkpoint = ToolingUpgrade::new("/p/.venv/bin/python", strings(&["pip", "wheel"]));
        let commands = checkpoint.commands();
        assert_eq!(commands[0].program, "/p/.venv/bin/python");
        assert_eq!(
            commands[0].args,
            vec!["-m", "pip", "install", "--upgrade", "pip", "wheel"]
        );
    }

    #[test]
    fn test_deps_install_one_invocation_per_group() {
        let config = ProvisionConfig::default();
        let checkpoint = DepsInstall::new("/p/.venv/bin/python", config.python.install.clone());
        let commands = checkpoint.commands();

        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0].args,
            vec!["-m", "pip", "install", "numpy", "scipy", "pandas"]
        );
        assert_eq!(
            commands[1].args,
            vec![
                "-m",
                "pip",
                "install",
                "--index-url",
                "https://download.pytorch.org/whl/cpu",
                "torch"
            ]
        );
        assert!(commands[2].args.contains(&"transformers>=4.41.0".to_string()));
        assert!(commands[3].args.contains(&"scikit-learn<1.6".to_string()));
        assert!(commands[3].args.contains(&"GitPython==3.1.43".to_string()));
    }

    #[test]
    fn test_verify_runs_inline_program() {
        let checkpoint = Verify::new("/p/.venv/bin/python", strings(&["gensim"]));
        let commands = checkpoint.commands();
        assert_eq!(commands[0].args[0], "-c");
        assert!(commands[0].args[1].contains("import gensim"));
    }

    #[test]
    fn test_build_checkpoints_order() {
        let layout = Layout::new("/p", ".venv", "assignment3", "main.py");
        let checkpoints =
            build_checkpoints(&ProvisionConfig::default(), &layout, Elevation::direct());
        let kinds: Vec<CheckpointKind> = checkpoints.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, CheckpointKind::ORDER.to_vec());
    }
}
