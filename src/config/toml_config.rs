use crate::core::packages;
use crate::domain::model::Layout;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Provisioning plan. Every section is optional; missing keys fall back to the built-in plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    pub layout: LayoutConfig,
    pub system: SystemConfig,
    pub python: PythonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub project_root: Option<String>,
    pub venv_dir: String,
    pub workdir: String,
    pub entrypoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub package_manager: String,
    pub elevation_helper: String,
    pub refresh_index: bool,
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    pub interpreter: String,
    pub tooling: Vec<String>,
    pub install: Vec<InstallGroupConfig>,
    pub verify_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallGroupConfig {
    pub label: String,
    pub packages: Vec<String>,
    pub index_url: Option<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            venv_dir: packages::VENV_DIR.to_string(),
            workdir: packages::WORKDIR.to_string(),
            entrypoint: packages::ENTRYPOINT.to_string(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            package_manager: packages::PACKAGE_MANAGER.to_string(),
            elevation_helper: packages::ELEVATION_HELPER.to_string(),
            refresh_index: true,
            packages: owned(packages::SYSTEM_PACKAGES),
        }
    }
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: packages::SYSTEM_INTERPRETER.to_string(),
            tooling: owned(packages::TOOLING),
            install: packages::INSTALL_GROUPS
                .iter()
                .map(|group| InstallGroupConfig {
                    label: group.label.to_string(),
                    packages: owned(group.packages),
                    index_url: group.index_url.map(str::to_string),
                })
                .collect(),
            verify_modules: owned(packages::VERIFY_MODULES),
        }
    }
}

impl ProvisionConfig {
    /// Load the plan from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProvisionError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProvisionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute `${VAR}` references from the environment; undefined variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Resolve paths against `project_root`, or the configured root when it is `None`.
    pub fn layout(&self, project_root: Option<&Path>) -> Result<Layout> {
        let root = match (project_root, self.layout.project_root.as_deref()) {
            (Some(root), _) => root.to_path_buf(),
            (None, Some(root)) => Path::new(root).to_path_buf(),
            (None, None) => std::env::current_dir()?,
        };
        // The handoff changes directory before exec, so every path must be absolute.
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Layout::new(
            root,
            &self.layout.venv_dir,
            &self.layout.workdir,
            self.layout.entrypoint.clone(),
        ))
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(root) = &self.layout.project_root {
            validation::validate_path("layout.project_root", root)?;
        }
        validation::validate_path("layout.venv_dir", &self.layout.venv_dir)?;
        validation::validate_path("layout.workdir", &self.layout.workdir)?;
        validation::validate_path("layout.entrypoint", &self.layout.entrypoint)?;

        validation::validate_non_empty_string("system.package_manager", &self.system.package_manager)?;
        validation::validate_non_empty_string(
            "system.elevation_helper",
            &self.system.elevation_helper,
        )?;
        validation::validate_system_packages("system.packages", &self.system.packages)?;

        validation::validate_non_empty_string("python.interpreter", &self.python.interpreter)?;
        validation::validate_requirements("python.tooling", &self.python.tooling)?;

        if self.python.install.is_empty() {
            return Err(ProvisionError::ConfigValidationError {
                field: "python.install".to_string(),
                message: "At least one install group is required".to_string(),
            });
        }
        for group in &self.python.install {
            validation::validate_non_empty_string("python.install.label", &group.label)?;
            validation::validate_requirements(
                &format!("python.install.{}.packages", group.label),
                &group.packages,
            )?;
            if let Some(index_url) = &group.index_url {
                validation::validate_url(
                    &format!("python.install.{}.index_url", group.label),
                    index_url,
                )?;
            }
        }

        validation::validate_non_empty_list("python.verify_modules", &self.python.verify_modules)?;
        for module in &self.python.verify_modules {
            let is_identifier = module
                .split('.')
                .all(|part| {
                    part.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                        && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                });
            if !is_identifier {
                return Err(ProvisionError::InvalidConfigValueError {
                    field: "python.verify_modules".to_string(),
                    value: module.clone(),
                    reason: "Not a valid Python module name".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for ProvisionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
