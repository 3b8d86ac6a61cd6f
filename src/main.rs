//! glstatus binary: prints a memory/GPU status line on a fixed interval.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures_util::StreamExt;
use glstatus::metrics::gpu::DEFAULT_SYSFS_ROOT;
use glstatus::metrics::ram::DEFAULT_MEMINFO_PATH;
use glstatus::{
    start_stream, Component, MetricValue, MetricsProvider, Module, StatusConfig, StatusSnapshot,
    SystemCollector, DEFAULT_INTERVAL_MS, UNKNOWN_STR,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "glstatus")]
#[command(about = "Memory and GPU usage for your status bar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print each sample on its own line instead of rewriting the current one
    #[arg(short, long)]
    silent: bool,

    /// Sampling interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Comma separated components to show (mem, free, temp, gpu, vram)
    #[arg(short, long, value_delimiter = ',')]
    modules: Vec<Component>,

    /// DRM card index of the GPU
    #[arg(long, default_value_t = 0)]
    gpu_index: u32,

    /// Mount point of sysfs
    #[arg(long, default_value = DEFAULT_SYSFS_ROOT)]
    sysfs_root: PathBuf,

    /// Path of the kernel memory report
    #[arg(long, default_value = DEFAULT_MEMINFO_PATH)]
    meminfo: PathBuf,

    /// Detect the GPU vendor once instead of on every sample
    #[arg(long)]
    cache_vendor: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the status line forever (default)
    Run,

    /// Take a single sample and exit
    Snapshot(SnapshotArgs),

    /// Show the detected GPU vendor and why any metric is unavailable
    Info,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = build_config(&cli);
    config.validate().context("invalid configuration")?;

    match &cli.command {
        Some(Commands::Run) | None => run_command(&config).await,
        Some(Commands::Snapshot(args)) => snapshot_command(&config, args),
        Some(Commands::Info) => info_command(&config),
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref(), level);

    // stdout carries the status line, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// `RUST_LOG` wins when it is set and valid; otherwise the flag level applies.
fn log_filter(rust_log: Option<&str>, level: Level) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

fn build_config(cli: &Cli) -> StatusConfig {
    let mut config = StatusConfig::new()
        .with_interval_ms(cli.interval)
        .with_silent(cli.silent)
        .with_gpu_index(cli.gpu_index)
        .with_sysfs_root(&cli.sysfs_root)
        .with_meminfo_path(&cli.meminfo)
        .with_vendor_cache(cli.cache_vendor);

    if !cli.modules.is_empty() {
        config = config.with_modules(cli.modules.iter().copied().map(Module::labelled).collect());
    }

    config
}

async fn run_command(config: &StatusConfig) -> anyhow::Result<()> {
    info!(
        interval_ms = config.interval_ms,
        modules = config.modules.len(),
        sysfs = %config.sysfs_root.display(),
        "starting status loop"
    );

    let collector = SystemCollector::from_config(config);
    let mut lines = start_stream(collector, config.modules.clone(), config.interval());

    let mut stdout = io::stdout();
    while let Some(line) = lines.next().await {
        write!(stdout, "{}", frame(&line, config.silent))?;
        stdout.flush().context("failed to write status line")?;
    }

    Ok(())
}

/// Silent mode prints one line per sample; otherwise the current line is rewritten.
fn frame(line: &str, silent: bool) -> String {
    if silent {
        format!("{}\n", line)
    } else {
        format!("\r{}", line)
    }
}

fn snapshot_command(config: &StatusConfig, args: &SnapshotArgs) -> anyhow::Result<()> {
    let collector = SystemCollector::from_config(config);
    let snapshot = collector.collect_snapshot();

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&snapshot)?;
            println!("{}", json);
        }
        "pretty" => print_pretty_snapshot(&snapshot),
        other => anyhow::bail!("unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

fn info_command(config: &StatusConfig) -> anyhow::Result<()> {
    let collector = SystemCollector::from_config(config);
    let gpu = collector.gpu();

    println!("glstatus {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("GPU (card{}):", gpu.index());
    match gpu.detect() {
        Ok(vendor) => println!("  Vendor: {}", vendor),
        Err(err) => println!("  Vendor: {} ({})", UNKNOWN_STR, err),
    }
    for (label, result) in [
        ("Utilization", gpu.utilization()),
        ("VRAM", gpu.memory()),
        ("Temperature", gpu.temperature()),
    ] {
        match result {
            Ok(value) => println!("  {}: {}", label, value),
            Err(err) => println!("  {}: {} ({:?}: {})", label, UNKNOWN_STR, err.kind(), err),
        }
    }
    println!();

    println!("Memory ({}):", collector.meminfo_path().display());
    match collector.memory() {
        Ok(info) => {
            for line in info.render().lines() {
                println!("  {}", line);
            }
        }
        Err(err) => println!("  {} ({})", UNKNOWN_STR, err),
    }

    Ok(())
}

fn print_pretty_snapshot(snapshot: &StatusSnapshot) {
    println!(
        "Snapshot ({})",
        chrono::DateTime::from_timestamp_millis(snapshot.timestamp as i64)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");

    println!("Memory:");
    match &snapshot.memory {
        Some(info) => {
            println!("  Usage: {:.1}%", info.usage_percent());
            println!("  Free: {:.1} GiB", info.free_gib());
        }
        None => println!("  {}", UNKNOWN_STR),
    }

    let show = |value: Option<MetricValue>| {
        value.map_or_else(|| UNKNOWN_STR.to_string(), |v| v.to_string())
    };
    println!("GPU:");
    println!(
        "  Vendor: {}",
        snapshot
            .gpu
            .vendor
            .map_or_else(|| UNKNOWN_STR.to_string(), |v| v.to_string())
    );
    println!("  Utilization: {}", show(snapshot.gpu.utilization));
    println!("  VRAM: {}", show(snapshot.gpu.memory));
    println!("  Temperature: {}", show(snapshot.gpu.temperature));
}
