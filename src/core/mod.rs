pub mod checks;
pub mod harness;
pub mod imports;
pub mod memory;
pub mod network;
pub mod playbook;
pub mod suite;

pub use crate::domain::model::{CheckOutcome, CheckResult, CommandOutput, ContainerInfo};
pub use crate::domain::ports::{ContainerEngine, ModuleImporter};
pub use crate::utils::error::Result;
