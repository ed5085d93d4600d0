use crate::core::harness::{self, HarnessSettings};
use crate::core::{imports, network};
use crate::domain::model::{ImageName, ServiceTarget};
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env placeholder pattern"));

/// `--config` 指定的 TOML 檔；每個區段都可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub container: Option<ContainerConfig>,
    pub network: Option<NetworkConfig>,
    pub imports: Option<ImportsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: Option<String>,
    pub engine: Option<PathBuf>,
    pub playbook_dir: Option<PathBuf>,
    pub commands: Option<Vec<String>>,
    pub modules: Option<Vec<String>>,
    pub critical_commands: Option<Vec<String>>,
    pub non_critical_commands: Option<Vec<String>>,
    pub essential_packages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub timeout_ms: Option<u64>,
    pub services: Option<Vec<ServiceTarget>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportsConfig {
    pub python: Option<String>,
    pub modules: Option<Vec<String>>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ProbeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProbeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ANSIBLE_IMAGE})；未定義的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 檔案指定的映像；沒有則交給 `ANSIBLE_IMAGE` 或預設值
    pub fn image(&self) -> Result<ImageName> {
        match self.container.as_ref().and_then(|c| c.image.as_deref()) {
            Some(name) => ImageName::parse(name),
            None => Ok(ImageName::from_env_or_default()),
        }
    }

    pub fn engine_path(&self) -> Option<PathBuf> {
        self.container.as_ref().and_then(|c| c.engine.clone())
    }

    pub fn playbook_dir(&self) -> PathBuf {
        self.container
            .as_ref()
            .and_then(|c| c.playbook_dir.clone())
            .unwrap_or_else(harness::default_playbook_dir)
    }

    pub fn probe_commands(&self) -> Vec<String> {
        self.container
            .as_ref()
            .and_then(|c| c.commands.clone())
            .unwrap_or_else(|| owned(harness::PROBE_COMMANDS))
    }

    pub fn probe_modules(&self) -> Vec<String> {
        self.container
            .as_ref()
            .and_then(|c| c.modules.clone())
            .unwrap_or_else(|| owned(harness::PROBE_MODULES))
    }

    pub fn critical_commands(&self) -> Vec<String> {
        self.container
            .as_ref()
            .and_then(|c| c.critical_commands.clone())
            .unwrap_or_else(|| owned(harness::CRITICAL_COMMANDS))
    }

    pub fn non_critical_commands(&self) -> Vec<String> {
        self.container
            .as_ref()
            .and_then(|c| c.non_critical_commands.clone())
            .unwrap_or_else(|| owned(harness::NON_CRITICAL_COMMANDS))
    }

    pub fn essential_packages(&self) -> Vec<String> {
        self.container
            .as_ref()
            .and_then(|c| c.essential_packages.clone())
            .unwrap_or_else(|| owned(harness::ESSENTIAL_PACKAGES))
    }

    pub fn network_timeout(&self) -> Duration {
        self.network
            .as_ref()
            .and_then(|n| n.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(network::DEFAULT_TIMEOUT)
    }

    pub fn services(&self) -> Vec<ServiceTarget> {
        self.network
            .as_ref()
            .and_then(|n| n.services.clone())
            .unwrap_or_else(network::default_services)
    }

    pub fn python(&self) -> String {
        self.imports
            .as_ref()
            .and_then(|i| i.python.clone())
            .unwrap_or_else(|| imports::DEFAULT_PYTHON.to_string())
    }

    pub fn import_modules(&self) -> Vec<String> {
        self.imports
            .as_ref()
            .and_then(|i| i.modules.clone())
            .unwrap_or_else(|| owned(imports::DEFAULT_MODULES))
    }

    /// 組出 container harness 需要的設定
    pub fn harness_settings(&self) -> Result<HarnessSettings> {
        Ok(HarnessSettings {
            image: self.image()?,
            playbook_dir: self.playbook_dir(),
            probe_commands: self.probe_commands(),
            probe_modules: self.probe_modules(),
            critical_commands: self.critical_commands(),
            non_critical_commands: self.non_critical_commands(),
            essential_packages: self.essential_packages(),
        })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(container) = &self.container {
            if let Some(image) = &container.image {
                validation::validate_image_name(image)?;
            }
            if let Some(engine) = &container.engine {
                validation::validate_path("container.engine", &engine.to_string_lossy())?;
            }
            if let Some(dir) = &container.playbook_dir {
                validation::validate_path("container.playbook_dir", &dir.to_string_lossy())?;
            }
        }

        for command in self
            .probe_commands()
            .iter()
            .chain(self.critical_commands().iter())
            .chain(self.non_critical_commands().iter())
            .chain(self.essential_packages().iter())
        {
            validation::validate_command_name("container.commands", command)?;
        }

        for module in self.probe_modules() {
            validation::validate_module_name("container.modules", &module)?;
        }

        if let Some(timeout_ms) = self.network.as_ref().and_then(|n| n.timeout_ms) {
            validation::validate_range("network.timeout_ms", timeout_ms, 1, 60_000)?;
        }

        for service in self.services() {
            validation::validate_non_empty_string("network.services.host", &service.host)?;
            if service.port == 0 {
                return Err(ProbeError::InvalidConfigValueError {
                    field: "network.services.port".to_string(),
                    value: service.port.to_string(),
                    reason: "Port must be between 1 and 65535".to_string(),
                });
            }
        }

        validation::validate_non_empty_string("imports.python", &self.python())?;
        for module in self.import_modules() {
            validation::validate_module_name("imports.modules", &module)?;
        }

        Ok(())
    }
}

impl Validate for ProbeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
