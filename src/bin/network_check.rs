use ansible_image_probe::config::toml_config::ProbeConfig;
use ansible_image_probe::core::network::{self, NetworkChecker};
use ansible_image_probe::domain::model::ServiceTarget;
use ansible_image_probe::utils::{logger, validation::Validate};
use ansible_image_probe::{report, OutputFormat};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "network-check")]
#[command(about = "TCP reachability check for services the image depends on")]
struct Args {
    /// Service to probe as host:port (repeatable; replaces the configured list)
    #[arg(long = "service", value_parser = parse_target)]
    services: Vec<ServiceTarget>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with status 1 when any service is unreachable
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

fn parse_target(raw: &str) -> Result<ServiceTarget, String> {
    let (host, port) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected host:port, got {:?}", raw))?;
    if host.is_empty() {
        return Err(format!("missing host in {:?}", raw));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| format!("invalid port in {:?}", raw))?;
    Ok(ServiceTarget::new(host, port))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    let config = match &args.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    };
    config.validate()?;

    let services = if args.services.is_empty() {
        config.services()
    } else {
        args.services.clone()
    };
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.network_timeout());

    tracing::info!(
        "🔌 Probing {} service(s) with a {:?} timeout",
        services.len(),
        timeout
    );

    let checker = NetworkChecker::new(services, timeout);
    let results = checker.check_all().await;
    let all_ok = network::all_successful(&results);

    report::emit(args.format, "network-check", all_ok, &results, || {
        network::render_report(&results)
    })?;

    let code = network::exit_status(all_ok, args.strict);
    if !all_ok && code == 0 {
        tracing::warn!("⚠️ Unreachable services ignored for exit status; pass --strict to fail on them");
    }
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
