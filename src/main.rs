use ansible_image_probe::core::suite::{self, CheckSuite};
use ansible_image_probe::utils::{logger, validation::Validate};
use ansible_image_probe::{report, CliConfig, ContainerHarness, DockerCli, ProbeError};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init(cli.verbose, cli.log_json);

    tracing::info!("Starting image-probe");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ image-probe failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(e.exit_code().max(1));
        }
    }
}

async fn run(cli: &CliConfig) -> Result<(), ProbeError> {
    let mut suite = CheckSuite::with_default_checks();

    if cli.list_checks {
        for check in suite.checks() {
            println!("{:<26} {}", check.name(), check.description());
        }
        return Ok(());
    }

    suite.retain_named(&cli.checks)?;

    let config = cli.load()?;
    config.validate()?;
    let settings = config.harness_settings()?;
    tracing::info!("🎯 Image under test: {}", settings.image);

    let engine = DockerCli::locate(config.engine_path());
    let harness = ContainerHarness::setup(Box::new(engine), settings).await?;

    let results = suite.run_all(&harness).await;
    let summary = CheckSuite::summary(&results);

    #[derive(serde::Serialize)]
    struct SuiteReport<'a> {
        image: &'a str,
        container: &'a ansible_image_probe::core::ContainerInfo,
        checks: &'a [ansible_image_probe::core::CheckResult],
        summary: &'a suite::SuiteSummary,
    }

    let data = SuiteReport {
        image: harness.image().as_str(),
        container: harness.info(),
        checks: &results,
        summary: &summary,
    };
    report::emit(cli.format, "image-probe", summary.is_success(), &data, || {
        suite::render_report(&results, &summary)
    })?;

    if !summary.is_success() {
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| r.outcome.is_failure())
            .map(|r| r.name.as_str())
            .collect();
        return Err(ProbeError::CheckFailed {
            check: failed.join(", "),
            reason: format!("{} of {} checks failed", summary.failed, results.len()),
        });
    }

    tracing::info!("✅ All container checks passed");
    Ok(())
}
