pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use toml_config::{ContainerConfig, ProbeConfig};

/// 報告輸出格式，所有執行檔共用
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "image-probe")]
#[command(about = "Black-box checks against the Ansible container image")]
pub struct CliConfig {
    /// Image under test; overrides ANSIBLE_IMAGE and the config file
    #[arg(long)]
    pub image: Option<String>,

    /// Path to the container engine CLI (defaults to docker on PATH)
    #[arg(long)]
    pub engine: Option<PathBuf>,

    /// Directory holding test_syntax_playbook.yml
    #[arg(long)]
    pub playbook_dir: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run only the named check (repeatable)
    #[arg(long = "check")]
    pub checks: Vec<String>,

    /// Print the available checks and exit
    #[arg(long)]
    pub list_checks: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn load(&self) -> Result<ProbeConfig> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::from_file(path)?,
            None => ProbeConfig::default(),
        };

        let container = config.container.get_or_insert_with(ContainerConfig::default);
        if let Some(image) = &self.image {
            container.image = Some(image.clone());
        }
        if let Some(engine) = &self.engine {
            container.engine = Some(engine.clone());
        }
        if let Some(dir) = &self.playbook_dir {
            container.playbook_dir = Some(dir.clone());
        }

        Ok(config)
    }
}
