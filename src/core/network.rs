//! TCP reachability checks for services the image depends on.
//!
//! Failures are data, not errors: every target produces a
//! [`ReachabilityResult`].

use crate::domain::model::{ReachabilityResult, ReachabilityStatus, ServiceTarget};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

pub fn default_services() -> Vec<ServiceTarget> {
    vec![
        ServiceTarget::new("redis", 6379),
        ServiceTarget::new("nginx", 80),
        ServiceTarget::new("postgres", 5432),
    ]
}

/// 對單一目標做一次 TCP connect；逾時包含 DNS 解析時間
pub async fn check_target(target: &ServiceTarget, timeout: Duration) -> ReachabilityResult {
    let start = Instant::now();
    let attempt = tokio::time::timeout(
        timeout,
        TcpStream::connect((target.host.as_str(), target.port)),
    )
    .await;

    let status = match attempt {
        Ok(Ok(stream)) => {
            let latency = start.elapsed();
            drop(stream);
            ReachabilityStatus::Reachable { latency }
        }
        Ok(Err(e)) => ReachabilityStatus::Unreachable {
            error: non_empty_error(e.to_string(), target),
        },
        Err(_) => ReachabilityStatus::Unreachable {
            error: format!("connection timed out after {:?}", timeout),
        },
    };

    match &status {
        ReachabilityStatus::Reachable { latency } => {
            tracing::debug!("🔌 {} reachable in {:?}", target, latency)
        }
        ReachabilityStatus::Unreachable { error } => {
            tracing::debug!("🔌 {} unreachable: {}", target, error)
        }
    }

    ReachabilityResult {
        target: target.clone(),
        status,
    }
}

fn non_empty_error(message: String, target: &ServiceTarget) -> String {
    if message.trim().is_empty() {
        format!("failed to connect to {}", target)
    } else {
        message
    }
}

pub struct NetworkChecker {
    targets: Vec<ServiceTarget>,
    timeout: Duration,
}

impl NetworkChecker {
    pub fn new(targets: Vec<ServiceTarget>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }

    pub fn targets(&self) -> &[ServiceTarget] {
        &self.targets
    }

    /// 依序檢查所有目標
    pub async fn check_all(&self) -> Vec<ReachabilityResult> {
        let mut results = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            results.push(check_target(target, self.timeout).await);
        }
        results
    }
}

impl Default for NetworkChecker {
    fn default() -> Self {
        Self::new(default_services(), DEFAULT_TIMEOUT)
    }
}

pub fn all_successful(results: &[ReachabilityResult]) -> bool {
    results.iter().all(ReachabilityResult::is_success)
}

/// 預設只是資訊性輸出；strict 模式下才讓失敗反映在 exit code
pub fn exit_status(all_ok: bool, strict: bool) -> i32 {
    if !all_ok && strict {
        1
    } else {
        0
    }
}

pub fn render_report(results: &[ReachabilityResult]) -> String {
    let mut lines = vec![
        "Network Service Test Results:".to_string(),
        "----------------------------------".to_string(),
    ];

    for result in results {
        match &result.status {
            ReachabilityStatus::Reachable { latency } => lines.push(format!(
                "✅ {} - Connected in {:.3}s",
                result.target,
                latency.as_secs_f64()
            )),
            ReachabilityStatus::Unreachable { error } => {
                lines.push(format!("❌ {} - Failed: {}", result.target, error))
            }
        }
    }

    lines.push(String::new());
    if all_successful(results) {
        lines.push("All service connections successful!".to_string());
    } else {
        lines.push("Some service connections failed.".to_string());
    }

    lines.join("\n")
}
