use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod classify;
mod log;
mod model;
mod pipeline;
mod profile;
mod render;
mod stats;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "gemm-stats-report")]
#[command(about = "Correlate GEMM calls with gem5 statistics dumps", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a per-layer metrics table from an operation log and a stats dump.
    Report {
        /// Workload output with one `GEMM Layer: M: .., N: .., K: ..` line per call.
        #[arg(long)]
        ops: PathBuf,

        /// Simulator statistics dump (stats.txt).
        #[arg(long)]
        stats: PathBuf,

        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Machine profile JSON. Takes precedence over --preset.
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Bundled machine profile.
        #[arg(long, value_enum, default_value = "default")]
        preset: profile::Preset,

        /// Marker that starts an operation line.
        #[arg(long, default_value = log::DEFAULT_MARKER)]
        marker: String,

        #[arg(long, value_enum, default_value = "per-block")]
        mode: pipeline::CorrelationMode,

        /// Output format. Defaults to the output file extension (.json or csv).
        #[arg(long, value_enum)]
        format: Option<render::OutputFormat>,

        /// Override the profile's FLOPs per vector instruction.
        #[arg(long)]
        vector_width: Option<u32>,

        /// Override the profile's assumed CPU power in watts.
        #[arg(long)]
        cpu_power: Option<f64>,
    },
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gemm_stats_report={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Report {
            ops,
            stats,
            out,
            profile: profile_path,
            preset,
            marker,
            mode,
            format,
            vector_width,
            cpu_power,
        } => {
            // 1) Resolve machine profile: file, else preset, then CLI overrides.
            let overrides = profile::Overrides {
                vector_width,
                cpu_power_watts: cpu_power,
            };
            let machine = profile::resolve(profile_path.as_deref(), preset, overrides)?;
            tracing::debug!(?machine, "machine profile");

            // 2) Parse + correlate both logs.
            let runner = pipeline::Pipeline::new(machine, &marker, mode)?;
            let pipeline::Correlation { report, warnings } = runner.run(&ops, &stats)?;

            for warning in &warnings {
                tracing::warn!("{}", warning);
            }

            // 3) Write table.
            let format = format.unwrap_or_else(|| render::OutputFormat::from_path(&out));
            render::write_report(&report, &out, format)?;
            println!("Wrote {} rows to {}", report.rows.len(), out.display());
        }
    }

    Ok(())
}
