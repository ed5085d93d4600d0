use crate::core::harness::ContainerHarness;
use crate::core::playbook::PlaybookMount;
use crate::domain::model::{CheckOutcome, CommandOutput, ContainerInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// 對映像做的一項黑箱斷言
#[async_trait]
pub trait ContainerCheck: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 根據已收集的 container 資訊決定是否跳過
    fn skip_reason(&self, _info: &ContainerInfo) -> Option<String> {
        None
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome>;
}

fn tail(text: &str) -> &str {
    let trimmed = text.trim();
    let start = trimmed
        .char_indices()
        .rev()
        .nth(299)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &trimmed[start..]
}

/// exit code 為 0 且 stdout 包含所有預期字串
pub fn expect_output(output: &CommandOutput, expected_stdout: &[String]) -> CheckOutcome {
    if !output.success() {
        return CheckOutcome::Failed {
            reason: format!(
                "expected exit code 0, got {:?}; stderr: {}",
                output.exit_code,
                tail(&output.stderr)
            ),
        };
    }

    for expected in expected_stdout {
        if !output.stdout.contains(expected.as_str()) {
            return CheckOutcome::Failed {
                reason: format!(
                    "stdout does not contain {:?}; stdout: {}",
                    expected,
                    tail(&output.stdout)
                ),
            };
        }
    }

    CheckOutcome::passed()
}

/// 執行單一指令並比對輸出的檢查
pub struct CommandCheck {
    name: &'static str,
    description: &'static str,
    command: Vec<String>,
    env: BTreeMap<String, String>,
    expected_stdout: Vec<String>,
}

impl CommandCheck {
    pub fn new(name: &'static str, description: &'static str, command: &[&str]) -> Self {
        Self {
            name,
            description,
            command: command.iter().map(|s| s.to_string()).collect(),
            env: BTreeMap::new(),
            expected_stdout: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn expect_stdout(mut self, needle: &str) -> Self {
        self.expected_stdout.push(needle.to_string());
        self
    }

    pub fn ansible_version() -> Self {
        Self::new(
            "ansible_version",
            "Ansible is installed and reports its version",
            &["ansible", "--version"],
        )
        .expect_stdout("ansible [core")
    }

    pub fn python_version() -> Self {
        Self::new(
            "python_version",
            "The interpreter is Python 3",
            &["python", "--version"],
        )
        .expect_stdout("Python 3.")
    }

    pub fn ansible_modules() -> Self {
        ["ping", "shell", "command", "setup"].iter().fold(
            Self::new(
                "ansible_modules",
                "Core Ansible modules are listed by ansible-doc",
                &["ansible-doc", "--list"],
            ),
            |check, module| check.expect_stdout(module),
        )
    }

    pub fn environment_variables() -> Self {
        Self::new(
            "environment_variables",
            "Environment variables reach the container and defaults are set",
            &["env"],
        )
        .with_env("TEST_ENV", "test_value")
        .with_env("ANSIBLE_STDOUT_CALLBACK", "yaml")
        .expect_stdout("TEST_ENV=test_value")
        .expect_stdout("ANSIBLE_STDOUT_CALLBACK=yaml")
        .expect_stdout("ANSIBLE_FORCE_COLOR=True")
    }

    pub fn user_permissions() -> Self {
        Self::new(
            "user_permissions",
            "The container runs as the unprivileged ansible user (uid 1000)",
            &["id"],
        )
        .expect_stdout("uid=1000")
    }

    pub fn ansible_local_execution() -> Self {
        Self::new(
            "ansible_local_execution",
            "Ansible runs a task locally without SSH",
            &["ansible", "localhost", "-c", "local", "-m", "ping"],
        )
        .expect_stdout("SUCCESS")
    }
}

#[async_trait]
impl ContainerCheck for CommandCheck {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome> {
        let output = harness
            .run_container_command_with_env(self.command.as_slice(), &self.env)
            .await?;
        Ok(expect_output(&output, &self.expected_stdout))
    }
}

/// ansible 與 python 缺一就整個 suite 失敗
pub struct CriticalCommandsCheck;

#[async_trait]
impl ContainerCheck for CriticalCommandsCheck {
    fn name(&self) -> &str {
        "critical_commands"
    }

    fn description(&self) -> &str {
        "Critical commands are available on PATH"
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome> {
        for command in &harness.settings().critical_commands {
            if !harness.info().has_command(command) {
                return Ok(CheckOutcome::Failed {
                    reason: format!("Critical command {} is not available", command),
                });
            }
        }
        Ok(CheckOutcome::passed())
    }
}

pub struct InstalledPackagesCheck;

#[async_trait]
impl ContainerCheck for InstalledPackagesCheck {
    fn name(&self) -> &str {
        "installed_packages"
    }

    fn description(&self) -> &str {
        "Essential packages are installed (Alpine images only)"
    }

    fn skip_reason(&self, info: &ContainerInfo) -> Option<String> {
        if info.is_alpine {
            None
        } else {
            Some("Not an Alpine-based container, skipping package test".to_string())
        }
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome> {
        for package in &harness.settings().essential_packages {
            let output = harness
                .run_container_command(&["which", package.as_str()])
                .await?;
            if !output.success() {
                return Ok(CheckOutcome::Failed {
                    reason: format!("Essential package {} not found", package),
                });
            }
        }

        // 非關鍵指令缺少只記錄，不判定失敗
        let missing = harness
            .info()
            .missing_commands(&harness.settings().non_critical_commands);
        let mut notes = Vec::new();
        if !missing.is_empty() {
            let note = format!("Non-critical commands not found: {}", missing.join(", "));
            tracing::info!("ℹ️ {}", note);
            notes.push(note);
        }

        Ok(CheckOutcome::Passed { notes })
    }
}

pub struct PlaybookSyntaxCheck;

#[async_trait]
impl ContainerCheck for PlaybookSyntaxCheck {
    fn name(&self) -> &str {
        "playbook_syntax"
    }

    fn description(&self) -> &str {
        "ansible-playbook --syntax-check accepts the companion playbook"
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome> {
        let playbook = PlaybookMount::in_dir(&harness.settings().playbook_dir)?;
        let output = harness.syntax_check_playbook(&playbook).await?;
        Ok(expect_output(&output, &[]))
    }
}

pub struct PythonModulesCheck;

impl PythonModulesCheck {
    pub fn import_script(modules: &[&str]) -> String {
        let joined = modules.join(", ");
        format!(
            "import sys\ntry:\n    import {joined}\n    print(\"Modules successfully imported: {joined}\")\n    sys.exit(0)\nexcept ImportError as e:\n    print(f\"Error importing: {{e}}\")\n    sys.exit(1)\n"
        )
    }
}

#[async_trait]
impl ContainerCheck for PythonModulesCheck {
    fn name(&self) -> &str {
        "python_modules"
    }

    fn description(&self) -> &str {
        "Every module detected as available imports together"
    }

    fn skip_reason(&self, info: &ContainerInfo) -> Option<String> {
        if info.available_module_names().is_empty() {
            Some("No Python modules detected as available".to_string())
        } else {
            None
        }
    }

    async fn run(&self, harness: &ContainerHarness) -> Result<CheckOutcome> {
        let script = Self::import_script(&harness.info().available_module_names());
        let output = harness
            .run_container_command(&["python", "-c", script.as_str()])
            .await?;
        Ok(expect_output(&output, &[]))
    }
}

/// 預設檢查清單，依執行順序排列
pub fn default_checks() -> Vec<Box<dyn ContainerCheck>> {
    vec![
        Box::new(CommandCheck::ansible_version()),
        Box::new(CommandCheck::python_version()),
        Box::new(CommandCheck::ansible_modules()),
        Box::new(CommandCheck::environment_variables()),
        Box::new(CriticalCommandsCheck),
        Box::new(InstalledPackagesCheck),
        Box::new(CommandCheck::user_permissions()),
        Box::new(PlaybookSyntaxCheck),
        Box::new(PythonModulesCheck),
        Box::new(CommandCheck::ansible_local_execution()),
    ]
}
