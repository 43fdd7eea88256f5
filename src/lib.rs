pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::process::ProcessRunner;
pub use config::toml_config::ProvisionConfig;
pub use crate::core::{handoff::Handoff, provisioner::Provisioner};
pub use utils::error::{ProvisionError, Result};
