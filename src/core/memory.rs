//! Memory usage reporting with layered fallbacks.
//!
//! Sources are tried in order: process introspection (`sysinfo`), the OS
//! resource-usage call (`getrusage`), and finally the executable path.

use crate::domain::model::MemoryReport;

/// 一種取得記憶體資訊的方式；取不到時回傳原因
pub trait MemorySource: Send + Sync {
    fn name(&self) -> &'static str;
    fn sample(&self) -> std::result::Result<MemoryReport, String>;
}

#[cfg(feature = "sysinfo")]
pub struct SysinfoSource {
    pid: Option<u32>,
}

#[cfg(feature = "sysinfo")]
impl SysinfoSource {
    pub fn current_process() -> Self {
        Self { pid: None }
    }

    pub fn for_pid(pid: u32) -> Self {
        Self { pid: Some(pid) }
    }
}

#[cfg(feature = "sysinfo")]
impl MemorySource for SysinfoSource {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn sample(&self) -> std::result::Result<MemoryReport, String> {
        use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

        let pid = match self.pid {
            Some(raw) => Pid::from_u32(raw),
            None => sysinfo::get_current_pid().map_err(|e| e.to_string())?,
        };

        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let process = system
            .process(pid)
            .ok_or_else(|| format!("process {} not found", pid))?;

        Ok(MemoryReport::Process {
            rss_bytes: process.memory(),
            vms_bytes: process.virtual_memory(),
        })
    }
}

#[cfg(unix)]
pub struct RusageSource;

#[cfg(unix)]
impl MemorySource for RusageSource {
    fn name(&self) -> &'static str {
        "getrusage"
    }

    fn sample(&self) -> std::result::Result<MemoryReport, String> {
        use nix::sys::resource::{getrusage, UsageWho};

        let usage = getrusage(UsageWho::RUSAGE_SELF).map_err(|e| e.to_string())?;

        let max_rss = u64::try_from(usage.max_rss()).unwrap_or(0);
        // macOS 回報 bytes，Linux 回報 KiB
        let max_rss_kib = if cfg!(target_os = "macos") {
            max_rss / 1024
        } else {
            max_rss
        };

        Ok(MemoryReport::ResourceUsage { max_rss_kib })
    }
}

pub struct ExecutablePathSource;

impl MemorySource for ExecutablePathSource {
    fn name(&self) -> &'static str {
        "executable"
    }

    fn sample(&self) -> std::result::Result<MemoryReport, String> {
        std::env::current_exe()
            .map(|path| MemoryReport::ExecutablePath { path })
            .map_err(|e| e.to_string())
    }
}

pub struct MemoryReporter {
    sources: Vec<Box<dyn MemorySource>>,
}

impl MemoryReporter {
    pub fn with_sources(sources: Vec<Box<dyn MemorySource>>) -> Self {
        Self { sources }
    }

    /// 標準順序；`pid` 只有內省工具能處理，其餘來源只描述自己
    pub fn standard(pid: Option<u32>) -> Self {
        let mut sources: Vec<Box<dyn MemorySource>> = Vec::new();

        #[cfg(feature = "sysinfo")]
        sources.push(Box::new(match pid {
            Some(pid) => SysinfoSource::for_pid(pid),
            None => SysinfoSource::current_process(),
        }));
        if cfg!(not(feature = "sysinfo")) && pid.is_some() {
            tracing::warn!("⚠️ --pid needs the sysinfo feature; reporting this process instead");
        }

        #[cfg(unix)]
        sources.push(Box::new(RusageSource));

        sources.push(Box::new(ExecutablePathSource));
        Self { sources }
    }

    pub fn report(&self) -> MemoryReport {
        for source in &self.sources {
            match source.sample() {
                Ok(report) => {
                    tracing::debug!("🧠 memory sampled via {}", source.name());
                    return report;
                }
                Err(reason) => {
                    tracing::info!(
                        "{} not available ({}), trying alternative method",
                        source.name(),
                        reason
                    );
                }
            }
        }

        // 連執行檔路徑都拿不到時
        MemoryReport::ExecutablePath {
            path: std::path::PathBuf::from(
                std::env::args().next().unwrap_or_else(|| "<unknown>".to_string()),
            ),
        }
    }
}
