use crate::domain::model::ImportTiming;
use crate::domain::ports::ModuleImporter;

pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_MODULES: &[&str] = &[
    "ansible", "jmespath", "netaddr", "docker", "yaml", "json", "lxml",
];

/// 依序量測每個模組的 import 成本，任何失敗都只記成 not available
pub struct ImportProfiler<I: ModuleImporter> {
    importer: I,
    modules: Vec<String>,
}

impl<I: ModuleImporter> ImportProfiler<I> {
    pub fn new(importer: I, modules: Vec<String>) -> Self {
        Self { importer, modules }
    }

    pub async fn profile(&self) -> Vec<ImportTiming> {
        let mut results = Vec::with_capacity(self.modules.len());

        for module in &self.modules {
            let duration = match self.importer.time_import(module).await {
                Ok(duration) => duration,
                Err(e) => {
                    tracing::warn!("⚠️ Could not time import of {}: {}", module, e);
                    None
                }
            };
            tracing::debug!("📦 {} -> {:?}", module, duration);
            results.push(ImportTiming {
                module: module.clone(),
                duration,
            });
        }

        results
    }
}

pub fn render_report(results: &[ImportTiming]) -> String {
    results
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
