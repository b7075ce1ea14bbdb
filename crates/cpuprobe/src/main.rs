//! cpuprobe - print what the host processor reports about itself
//!
//! With no flags the output is three lines on stdout:
//! - `CPU Vendor: <vendor>`
//! - `Cycle Counter: <count>` or `unsupported`
//! - `Vector Capabilities: <widths> (<extensions>)` or `none`
//!
//! Logs go to stderr and are controlled by `--log-level` or `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cpuprobe_core::config::{BackendSelection, ProbeConfigBuilder};
use cpuprobe_core::report::DiagnosticReport;
use cpuprobe_core::CpuProbe;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Report CPU vendor, cycle counter and SIMD capabilities
#[derive(Parser, Debug)]
#[command(name = "cpuprobe")]
#[command(about = "Report CPU vendor, cycle counter and SIMD capabilities", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    format: Format,

    /// Probe backend
    #[arg(short, long, value_enum, default_value = "auto")]
    backend: Backend,

    /// Model-specific register to read (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_register)]
    msr: Option<u32>,

    /// Logical CPU whose MSR is read
    #[arg(long, default_value_t = 0, requires = "msr")]
    cpu: usize,

    /// Performance counter index to read (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_register)]
    pmc: Option<u32>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum Format {
    /// One line per diagnostic
    Text,
    /// A single JSON object
    Json,
}

/// Backend options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum Backend {
    /// Native backend for the build target
    Auto,
    /// No hardware access
    Portable,
}

impl From<Backend> for BackendSelection {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Auto => BackendSelection::Auto,
            Backend::Portable => BackendSelection::Portable,
        }
    }
}

fn parse_register(value: &str) -> Result<u32, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid register '{value}': {e}"))
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'"))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn render(report: &DiagnosticReport, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(report.to_string()),
        #[cfg(feature = "json")]
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(report).context("failed to encode report")?;
            json.push('\n');
            Ok(json)
        }
        #[cfg(not(feature = "json"))]
        Format::Json => anyhow::bail!("this build of cpuprobe has no JSON support"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    debug!(?cli, "parsed arguments");

    let config = ProbeConfigBuilder::new()
        .backend(cli.backend.into())
        .allow_privileged(cli.msr.is_some() || cli.pmc.is_some())
        .build();
    let probe = CpuProbe::with_config(&config);
    info!(backend = probe.backend().name(), "probing host");

    let mut report = DiagnosticReport::collect(&probe);
    if let Some(register) = cli.msr {
        report.read_msr(&probe, cli.cpu, register);
    }
    if let Some(counter) = cli.pmc {
        report.read_pmc(&probe, counter);
    }

    print!("{}", render(&report, cli.format)?);
    Ok(())
}
