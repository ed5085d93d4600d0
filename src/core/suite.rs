use crate::core::checks::{self, ContainerCheck};
use crate::core::harness::ContainerHarness;
use crate::domain::model::{CheckOutcome, CheckResult};
use crate::utils::error::{ProbeError, Result};
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_secs: f64,
}

impl SuiteSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// 依序執行檢查，每項各自計時
pub struct CheckSuite {
    checks: Vec<Box<dyn ContainerCheck>>,
}

impl CheckSuite {
    pub fn with_default_checks() -> Self {
        Self {
            checks: checks::default_checks(),
        }
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn ContainerCheck> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// 只保留指定名稱的檢查；空清單代表全部執行
    pub fn retain_named(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        for name in names {
            if !self.checks.iter().any(|c| c.name() == name) {
                let known: Vec<&str> = self.checks.iter().map(|c| c.name()).collect();
                return Err(ProbeError::InvalidConfigValueError {
                    field: "check".to_string(),
                    value: name.clone(),
                    reason: format!("Unknown check. Available: {}", known.join(", ")),
                });
            }
        }

        self.checks.retain(|c| names.iter().any(|n| n == c.name()));
        Ok(())
    }

    pub async fn run_all(&self, harness: &ContainerHarness) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let start_time = Instant::now();

            let outcome = match check.skip_reason(harness.info()) {
                Some(reason) => CheckOutcome::Skipped { reason },
                None => match check.run(harness).await {
                    Ok(outcome) => outcome,
                    Err(e) => CheckOutcome::Failed {
                        reason: e.to_string(),
                    },
                },
            };

            let duration = start_time.elapsed();
            match &outcome {
                CheckOutcome::Passed { .. } => {
                    tracing::info!("✅ {} passed ({:?})", check.name(), duration)
                }
                CheckOutcome::Failed { reason } => {
                    tracing::error!("❌ {} failed: {}", check.name(), reason)
                }
                CheckOutcome::Skipped { reason } => {
                    tracing::info!("⏭️ Skipping {}: {}", check.name(), reason)
                }
            }

            results.push(CheckResult {
                name: check.name().to_string(),
                outcome,
                duration,
            });
        }

        results
    }

    pub fn summary(results: &[CheckResult]) -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        let mut total = Duration::ZERO;

        for result in results {
            total += result.duration;
            match result.outcome {
                CheckOutcome::Passed { .. } => summary.passed += 1,
                CheckOutcome::Failed { .. } => summary.failed += 1,
                CheckOutcome::Skipped { .. } => summary.skipped += 1,
            }
        }

        summary.total_duration_secs = total.as_secs_f64();
        summary
    }
}

pub fn render_report(results: &[CheckResult], summary: &SuiteSummary) -> String {
    let mut lines = Vec::new();

    for result in results {
        match &result.outcome {
            CheckOutcome::Passed { notes } => {
                lines.push(format!(
                    "✅ {} ({:.2}s)",
                    result.name,
                    result.duration.as_secs_f64()
                ));
                for note in notes {
                    lines.push(format!("   INFO: {}", note));
                }
            }
            CheckOutcome::Failed { reason } => {
                lines.push(format!("❌ {} - {}", result.name, reason))
            }
            CheckOutcome::Skipped { reason } => {
                lines.push(format!("⏭️ {} - skipped: {}", result.name, reason))
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} passed, {} failed, {} skipped in {:.2}s",
        summary.passed, summary.failed, summary.skipped, summary.total_duration_secs
    ));
    lines.join("\n")
}
