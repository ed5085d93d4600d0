use crate::utils::error::Result;
use crate::utils::validation;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const IMAGE_ENV_VAR: &str = "ANSIBLE_IMAGE";
pub const DEFAULT_IMAGE: &str = "ansible:test";

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

fn serialize_opt_secs<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

/// 一個要測試連線的服務 (host, port)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub host: String,
    pub port: u16,
}

impl ServiceTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReachabilityStatus {
    Reachable {
        #[serde(rename = "latency_secs", serialize_with = "serialize_secs")]
        latency: Duration,
    },
    Unreachable {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReachabilityResult {
    pub target: ServiceTarget,
    #[serde(flatten)]
    pub status: ReachabilityStatus,
}

impl ReachabilityResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ReachabilityStatus::Reachable { .. })
    }

    pub fn latency(&self) -> Option<Duration> {
        match &self.status {
            ReachabilityStatus::Reachable { latency } => Some(*latency),
            ReachabilityStatus::Unreachable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ReachabilityStatus::Reachable { .. } => None,
            ReachabilityStatus::Unreachable { error } => Some(error),
        }
    }
}

/// 單一模組的 import 耗時；`None` 代表無法載入
#[derive(Debug, Clone, Serialize)]
pub struct ImportTiming {
    pub module: String,
    #[serde(rename = "duration_secs", serialize_with = "serialize_opt_secs")]
    pub duration: Option<Duration>,
}

impl ImportTiming {
    pub fn is_available(&self) -> bool {
        self.duration.is_some()
    }
}

impl fmt::Display for ImportTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration {
            Some(d) => write!(f, "{}: {:.6} seconds", self.module, d.as_secs_f64()),
            None => write!(f, "{}: not available", self.module),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MemoryReport {
    /// 由 process 內省工具取得
    Process { rss_bytes: u64, vms_bytes: u64 },
    /// 由 getrusage 取得的最大常駐記憶體
    ResourceUsage { max_rss_kib: u64 },
    /// 最後手段：只回報執行檔路徑
    ExecutablePath { path: PathBuf },
}

impl MemoryReport {
    pub fn lines(&self) -> Vec<String> {
        const MIB: f64 = 1024.0 * 1024.0;
        match self {
            MemoryReport::Process {
                rss_bytes,
                vms_bytes,
            } => vec![
                format!("RSS (Resident Set Size): {:.2} MB", *rss_bytes as f64 / MIB),
                format!("VMS (Virtual Memory Size): {:.2} MB", *vms_bytes as f64 / MIB),
            ],
            MemoryReport::ResourceUsage { max_rss_kib } => {
                vec![format!("Maximum Memory Usage: {:.2} MB", *max_rss_kib as f64 / 1024.0)]
            }
            MemoryReport::ExecutablePath { path } => {
                vec![format!("Executable path: {}", path.display())]
            }
        }
    }
}

/// 經過白名單驗證的映像名稱；只能透過 `parse` 建立
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageName(String);

impl ImageName {
    pub fn parse(name: &str) -> Result<Self> {
        validation::validate_image_name(name)?;
        Ok(Self(name.to_string()))
    }

    /// 讀取 `ANSIBLE_IMAGE`；未設定、空字串或不合法時退回預設映像
    pub fn from_env_or_default() -> Self {
        Self::from_env_value(std::env::var(IMAGE_ENV_VAR).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(raw) if !raw.is_empty() => match Self::parse(raw) {
                Ok(image) => image,
                Err(_) => {
                    tracing::warn!(
                        "⚠️ {} value rejected by image-name policy, falling back to {}",
                        IMAGE_ENV_VAR,
                        DEFAULT_IMAGE
                    );
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ImageName {
    fn default() -> Self {
        Self(DEFAULT_IMAGE.to_string())
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl VolumeMount {
    pub fn to_arg(&self) -> String {
        format!("{}:{}", self.host_path.display(), self.container_path)
    }
}

/// 一次 ephemeral container 執行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub image: ImageName,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub mounts: Vec<VolumeMount>,
}

impl RunRequest {
    pub fn new<S: AsRef<str>>(image: ImageName, command: &[S]) -> Self {
        Self {
            image,
            command: command.iter().map(|c| c.as_ref().to_string()).collect(),
            env: BTreeMap::new(),
            mounts: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_mount(mut self, mount: VolumeMount) -> Self {
        self.mounts.push(mount);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 每次執行只收集一次的 container 環境資訊
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerInfo {
    pub os_release: Option<String>,
    pub is_alpine: bool,
    pub installed_packages: Vec<String>,
    pub available_commands: BTreeMap<String, bool>,
    pub available_modules: BTreeMap<String, bool>,
}

impl ContainerInfo {
    pub fn has_command(&self, command: &str) -> bool {
        self.available_commands.get(command).copied().unwrap_or(false)
    }

    /// 有檢查過且確定不存在的指令
    pub fn missing_commands<'a>(&self, commands: &'a [String]) -> Vec<&'a str> {
        commands
            .iter()
            .filter(|cmd| self.available_commands.get(cmd.as_str()) == Some(&false))
            .map(String::as_str)
            .collect()
    }

    pub fn available_module_names(&self) -> Vec<&str> {
        self.available_modules
            .iter()
            .filter(|(_, available)| **available)
            .map(|(module, _)| module.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed { notes: Vec<String> },
    Failed { reason: String },
    Skipped { reason: String },
}

impl CheckOutcome {
    pub fn passed() -> Self {
        CheckOutcome::Passed { notes: Vec::new() }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name_from_env_value() {
        assert_eq!(ImageName::from_env_value(None).as_str(), DEFAULT_IMAGE);
        assert_eq!(ImageName::from_env_value(Some("")).as_str(), DEFAULT_IMAGE);
        assert_eq!(
            ImageName::from_env_value(Some("ansible:2.17")).as_str(),
            "ansible:2.17"
        );
        assert_eq!(
            ImageName::from_env_value(Some("ansible:test; rm -rf /")).as_str(),
            DEFAULT_IMAGE
        );
    }

    #[test]
    fn test_image_name_parse_rejects_metacharacters() {
        assert!(ImageName::parse("ansible:test").is_ok());
        assert!(ImageName::parse("ansible$(id)").is_err());
    }

    #[test]
    fn test_import_timing_display() {
        let available = ImportTiming {
            module: "yaml".to_string(),
            duration: Some(Duration::from_micros(1500)),
        };
        let missing = ImportTiming {
            module: "lxml".to_string(),
            duration: None,
        };
        assert_eq!(available.to_string(), "yaml: 0.001500 seconds");
        assert_eq!(missing.to_string(), "lxml: not available");
    }

    #[test]
    fn test_memory_report_lines() {
        let report = MemoryReport::Process {
            rss_bytes: 10 * 1024 * 1024,
            vms_bytes: 512 * 1024 * 1024,
        };
        assert_eq!(
            report.lines(),
            vec![
                "RSS (Resident Set Size): 10.00 MB".to_string(),
                "VMS (Virtual Memory Size): 512.00 MB".to_string()
            ]
        );

        let rusage = MemoryReport::ResourceUsage { max_rss_kib: 2048 };
        assert_eq!(rusage.lines(), vec!["Maximum Memory Usage: 2.00 MB".to_string()]);
    }

    #[test]
    fn test_container_info_missing_commands() {
        let mut info = ContainerInfo::default();
        info.available_commands.insert("kubectl".to_string(), false);
        info.available_commands.insert("curl".to_string(), true);

        let non_critical = vec!["kubectl".to_string(), "curl".to_string(), "helm".to_string()];
        // helm 沒被檢查過，不算 missing
        assert_eq!(info.missing_commands(&non_critical), vec!["kubectl"]);
    }

    #[test]
    fn test_reachability_result_json() {
        let result = ReachabilityResult {
            target: ServiceTarget::new("redis", 6379),
            status: ReachabilityStatus::Unreachable {
                error: "Connection refused".to_string(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "unreachable");
        assert_eq!(json["error"], "Connection refused");
        assert_eq!(json["target"]["port"], 6379);
    }
}
