//! Report output: table formats and the file sink.

pub mod table;

pub use table::{render_csv, render_json};

use crate::Result;
use crate::model::Report;
use anyhow::Context;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// `.json` selects JSON; any other extension is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

/// Write the report to `path`.
///
/// Output goes to a temporary file next to `path` that is renamed into place
/// only after everything was written, so a failure never leaves a partial report.
pub fn write_report(report: &Report, path: &Path, format: OutputFormat) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create report {} (in {})", path.display(), dir.display()))?;

    let out = BufWriter::new(tmp.as_file_mut());
    let rendered = match format {
        OutputFormat::Csv => render_csv(report, out),
        OutputFormat::Json => render_json(report, out),
    };
    rendered.with_context(|| format!("write report {}", path.display()))?;

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("write report {}", path.display()))?;
    Ok(())
}
