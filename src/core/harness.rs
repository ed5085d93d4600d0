//! Container test harness.
//!
//! Setup verifies the image exists locally and gathers [`ContainerInfo`]
//! once; every command afterwards runs in a fresh `--rm` container.

use crate::core::playbook::PlaybookMount;
use crate::domain::model::{CommandOutput, ContainerInfo, ImageName, RunRequest};
use crate::domain::ports::ContainerEngine;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const PROBE_COMMANDS: &[&str] = &["curl", "git", "ssh", "ansible", "python", "kubectl", "helm"];
pub const PROBE_MODULES: &[&str] = &["ansible", "yaml", "jinja2", "netaddr", "jmespath"];
pub const CRITICAL_COMMANDS: &[&str] = &["ansible", "python"];
pub const NON_CRITICAL_COMMANDS: &[&str] = &["kubectl", "helm", "ssh", "curl"];
pub const ESSENTIAL_PACKAGES: &[&str] = &["bash", "git"];

pub fn default_playbook_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub image: ImageName,
    pub playbook_dir: PathBuf,
    pub probe_commands: Vec<String>,
    pub probe_modules: Vec<String>,
    pub critical_commands: Vec<String>,
    pub non_critical_commands: Vec<String>,
    pub essential_packages: Vec<String>,
}

impl HarnessSettings {
    pub fn for_image(image: ImageName) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            image,
            playbook_dir: default_playbook_dir(),
            probe_commands: owned(PROBE_COMMANDS),
            probe_modules: owned(PROBE_MODULES),
            critical_commands: owned(CRITICAL_COMMANDS),
            non_critical_commands: owned(NON_CRITICAL_COMMANDS),
            essential_packages: owned(ESSENTIAL_PACKAGES),
        }
    }

    /// 關鍵指令一定會被探測，不受 probe_commands 設定影響
    pub fn commands_to_probe(&self) -> Vec<String> {
        let mut commands = self.probe_commands.clone();
        for command in &self.critical_commands {
            if !commands.contains(command) {
                commands.push(command.clone());
            }
        }
        commands
    }
}


pub struct ContainerHarness {
    engine: Box<dyn ContainerEngine>,
    settings: HarnessSettings,
    info: ContainerInfo,
}

impl ContainerHarness {
    /// 映像不存在或引擎無法使用時整個 suite 直接失敗
    pub async fn setup(engine: Box<dyn ContainerEngine>, settings: HarnessSettings) -> Result<Self> {
        let image = settings.image.clone();
        tracing::info!("🐳 Preparing harness for image {}", image);

        if !engine.image_exists(&image).await? {
            return Err(ProbeError::ImageNotFound {
                image: image.to_string(),
            });
        }

        let commands = settings.commands_to_probe();
        let info = gather_container_info(
            engine.as_ref(),
            &image,
            &commands,
            &settings.probe_modules,
        )
        .await;

        tracing::info!(
            "📋 Container facts: alpine={}, packages={}, commands={}/{}, modules={}/{}",
            info.is_alpine,
            info.installed_packages.len(),
            info.available_commands.values().filter(|v| **v).count(),
            info.available_commands.len(),
            info.available_modules.values().filter(|v| **v).count(),
            info.available_modules.len()
        );

        Ok(Self {
            engine,
            settings,
            info,
        })
    }

    pub fn image(&self) -> &ImageName {
        &self.settings.image
    }

    pub fn info(&self) -> &ContainerInfo {
        &self.info
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub async fn run_container_command<S: AsRef<str>>(&self, command: &[S]) -> Result<CommandOutput> {
        self.run_container_command_with_env(command, &BTreeMap::new())
            .await
    }

    pub async fn run_container_command_with_env<S: AsRef<str>>(
        &self,
        command: &[S],
        env: &BTreeMap<String, String>,
    ) -> Result<CommandOutput> {
        let request = RunRequest::new(self.settings.image.clone(), command).with_env(env.clone());
        self.engine.run(&request).await
    }

    /// `ansible-playbook --syntax-check -c local /playbooks/<file>`
    pub async fn syntax_check_playbook(&self, playbook: &PlaybookMount) -> Result<CommandOutput> {
        let container_path = playbook.container_path();
        let request = RunRequest::new(
            self.settings.image.clone(),
            &[
                "ansible-playbook",
                "--syntax-check",
                "-c",
                "local",
                container_path.as_str(),
            ],
        )
        .with_mount(playbook.mount());
        self.engine.run(&request).await
    }
}

/// 探測失敗一律記成 None，不往外拋
async fn probe(engine: &dyn ContainerEngine, image: &ImageName, command: &[&str]) -> Option<CommandOutput> {
    match engine.run(&RunRequest::new(image.clone(), command)).await {
        Ok(output) => Some(output),
        Err(e) => {
            tracing::warn!("⚠️ Probe `{}` failed: {}", command.join(" "), e);
            None
        }
    }
}

fn probe_succeeded(output: Option<CommandOutput>) -> bool {
    output.map(|o| o.success()).unwrap_or(false)
}

/// 每個探測都開一個新的 ephemeral container
pub async fn gather_container_info(
    engine: &dyn ContainerEngine,
    image: &ImageName,
    commands: &[String],
    modules: &[String],
) -> ContainerInfo {
    let mut info = ContainerInfo::default();

    if let Some(output) = probe(engine, image, &["cat", "/etc/os-release"]).await {
        if output.success() {
            info.is_alpine = output.stdout.contains("Alpine");
            info.os_release = Some(output.stdout);

            if info.is_alpine {
                info.installed_packages = match probe(engine, image, &["apk", "info"]).await {
                    Some(pkg) if pkg.success() => pkg.stdout.lines().map(str::to_string).collect(),
                    _ => Vec::new(),
                };
            }
        }
    }

    for command in commands {
        let available = probe_succeeded(probe(engine, image, &["which", command.as_str()]).await);
        info.available_commands.insert(command.clone(), available);
    }

    for module in modules {
        let available = if validation::validate_module_name("modules", module).is_ok() {
            let script = format!("import {}; print('{} available')", module, module);
            probe_succeeded(probe(engine, image, &["python", "-c", script.as_str()]).await)
        } else {
            tracing::warn!("⚠️ Skipping module probe for invalid name {:?}", module);
            false
        };
        info.available_modules.insert(module.clone(), available);
    }

    info
}
