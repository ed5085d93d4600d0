use ansible_image_probe::core::memory::MemoryReporter;
use ansible_image_probe::utils::logger;
use ansible_image_probe::{report, OutputFormat};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "memory-report")]
#[command(about = "Report resident and virtual memory usage")]
struct Args {
    /// Inspect another process instead of this one
    #[arg(long)]
    pid: Option<u32>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    let memory = MemoryReporter::standard(args.pid).report();

    report::emit(args.format, "memory-report", true, &memory, || {
        memory.lines().join("\n")
    })?;

    Ok(())
}
