use ansible_image_probe::config::toml_config::ProbeConfig;
use ansible_image_probe::core::imports::{self, ImportProfiler};
use ansible_image_probe::utils::{logger, validation::Validate};
use ansible_image_probe::{report, OutputFormat, PythonImporter};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "import-profile")]
#[command(about = "Time best-effort imports of optional Python modules")]
struct Args {
    /// Module to time (repeatable; replaces the configured list)
    #[arg(long = "module")]
    modules: Vec<String>,

    /// Python interpreter to use
    #[arg(long)]
    python: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    let mut config = match &args.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    };

    // 應用命令列覆蓋設定
    let imports_section = config.imports.get_or_insert_with(Default::default);
    if let Some(python) = &args.python {
        imports_section.python = Some(python.clone());
    }
    if !args.modules.is_empty() {
        imports_section.modules = Some(args.modules.clone());
    }
    config.validate()?;

    tracing::info!("🐍 Profiling imports with {}", config.python());

    let profiler = ImportProfiler::new(PythonImporter::new(config.python()), config.import_modules());
    let results = profiler.profile().await;

    // 純診斷輸出，不論結果都以 0 結束
    report::emit(args.format, "import-profile", true, &results, || {
        imports::render_report(&results)
    })?;

    Ok(())
}
