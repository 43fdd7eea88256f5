pub mod checkpoints;
pub mod elevation;
pub mod handoff;
pub mod packages;
pub mod provisioner;
pub mod sequence;

pub use crate::domain::model::{CheckpointKind, CommandSpec, Layout, RunMode};
pub use crate::domain::ports::{Checkpoint, CommandRunner};
pub use crate::utils::error::Result;
