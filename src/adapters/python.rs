use crate::domain::ports::ModuleImporter;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

/// 在直譯器內部用單調時鐘量測 import；模組名稱以 argv 傳入
const TIMING_SCRIPT: &str = "import importlib, sys, time
start = time.perf_counter()
importlib.import_module(sys.argv[1])
print(time.perf_counter() - start)";

pub struct PythonImporter {
    interpreter: String,
}

impl PythonImporter {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

#[async_trait]
impl ModuleImporter for PythonImporter {
    async fn time_import(&self, module: &str) -> Result<Option<Duration>> {
        validation::validate_module_name("module", module)?;

        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(TIMING_SCRIPT)
            .arg(module)
            .output()
            .await
            .map_err(|e| ProbeError::EngineError {
                operation: format!("{} -c", self.interpreter),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            tracing::debug!(
                "import {} failed: {}",
                module,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        parse_seconds(&String::from_utf8_lossy(&output.stdout)).map(Some)
    }
}

fn parse_seconds(stdout: &str) -> Result<Duration> {
    let raw = stdout.lines().last().unwrap_or("").trim();
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ProbeError::EngineError {
            operation: "parse import timing".to_string(),
            details: format!("unexpected interpreter output: {:?}", raw),
        })
}
