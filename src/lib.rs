pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::ProbeConfig, OutputFormat};

pub use adapters::{DockerCli, PythonImporter};
pub use crate::core::{
    harness::{ContainerHarness, HarnessSettings},
    suite::CheckSuite,
};
pub use domain::model::ImageName;
pub use utils::error::{ProbeError, Result};
