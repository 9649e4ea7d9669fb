//! Correlation of logged operations with statistics blocks.

use crate::Result;
use crate::classify::LineClass;
use crate::log::{OperationDescriptor, OperationLogReader};
use crate::model::{Report, derive_metrics};
use crate::profile::Profile;
use crate::stats::{BlockSplitter, FieldExtractor, FieldMap, StatBlock};
use anyhow::Context;
use std::fmt;
use std::fs;
use std::path::Path;

/// How operations are matched to statistics blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CorrelationMode {
    /// Operation `i` is paired with block `i`.
    PerBlock,
    /// The final block is applied to every operation.
    Aggregate,
}

/// Non-fatal problems found while correlating, reported with the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelationWarning {
    /// Fewer blocks than operations; the trailing operations were dropped.
    CountMismatch { operations: usize, blocks: usize },
    /// Aggregate mode found no block to apply.
    NoStatistics { operations: usize },
}

impl fmt::Display for CorrelationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationWarning::CountMismatch { operations, blocks } => write!(
                f,
                "{} GEMM layers do not have corresponding stats blocks ({} layers, {} blocks); extra layers dropped",
                operations - blocks,
                operations,
                blocks
            ),
            CorrelationWarning::NoStatistics { operations } => write!(
                f,
                "statistics dump has no blocks; {} GEMM layers produce no rows",
                operations
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    pub report: Report,
    pub warnings: Vec<CorrelationWarning>,
}

/// Line numbers classified as `Skipped`.
fn skipped_lines<T>(lines: impl Iterator<Item = (usize, LineClass<T>)>) -> Vec<usize> {
    lines
        .filter(|(_, class)| matches!(class, LineClass::Skipped))
        .map(|(lineno, _)| lineno)
        .collect()
}

pub struct Pipeline {
    reader: OperationLogReader,
    splitter: BlockSplitter,
    extractor: FieldExtractor,
    profile: Profile,
    mode: CorrelationMode,
}

impl Pipeline {
    pub fn new(profile: Profile, marker: &str, mode: CorrelationMode) -> Result<Self> {
        Ok(Self {
            reader: OperationLogReader::new(marker)?,
            splitter: BlockSplitter::new()?,
            extractor: FieldExtractor::new()?,
            profile,
            mode,
        })
    }

    /// Read both logs and correlate them. Fails only if an input cannot be read.
    pub fn run(&self, ops_path: &Path, stats_path: &Path) -> Result<Correlation> {
        let ops_text = fs::read_to_string(ops_path)
            .with_context(|| format!("read operation log {}", ops_path.display()))?;
        let stats_text = fs::read_to_string(stats_path)
            .with_context(|| format!("read statistics dump {}", stats_path.display()))?;

        Ok(self.correlate(&ops_text, &stats_text))
    }

    pub fn correlate(&self, ops_text: &str, stats_text: &str) -> Correlation {
        let ops = self.read_operations(ops_text);
        tracing::info!("Found {} GEMM layers.", ops.len());

        let blocks = self.splitter.split(stats_text);
        tracing::info!("Found {} stats blocks.", blocks.len());

        match self.mode {
            CorrelationMode::PerBlock => self.correlate_per_block(ops, &blocks),
            CorrelationMode::Aggregate => self.correlate_aggregate(&ops, &blocks),
        }
    }

    fn read_operations(&self, ops_text: &str) -> Vec<OperationDescriptor> {
        if tracing::enabled!(tracing::Level::TRACE) {
            for line in skipped_lines(self.reader.classified_lines(ops_text)) {
                tracing::trace!(line, "skipped operation-log line");
            }
        }
        self.reader.operations(ops_text).collect()
    }

    fn read_fields(&self, idx: usize, block: &StatBlock) -> FieldMap {
        if tracing::enabled!(tracing::Level::TRACE) {
            for line in skipped_lines(self.extractor.classified_lines(block)) {
                tracing::trace!(block = idx, line, "skipped statistics line");
            }
        }
        self.extractor.extract(block)
    }

    fn correlate_per_block(
        &self,
        mut ops: Vec<OperationDescriptor>,
        blocks: &[StatBlock],
    ) -> Correlation {
        let mut warnings = Vec::new();

        if blocks.len() < ops.len() {
            warnings.push(CorrelationWarning::CountMismatch {
                operations: ops.len(),
                blocks: blocks.len(),
            });
            ops.truncate(blocks.len());
        } else if blocks.len() > ops.len() {
            tracing::info!(
                unused = blocks.len() - ops.len(),
                "stats blocks without a GEMM layer are ignored"
            );
        }

        let rows = ops
            .iter()
            .zip(blocks)
            .enumerate()
            .map(|(idx, (op, block))| {
                let fields = self.read_fields(idx, block);
                tracing::debug!(block = idx, counters = fields.len(), %op, "correlated");
                derive_metrics(op, &fields, &self.profile)
            })
            .collect();

        Correlation {
            report: Report { rows },
            warnings,
        }
    }

    fn correlate_aggregate(&self, ops: &[OperationDescriptor], blocks: &[StatBlock]) -> Correlation {
        let Some(snapshot) = blocks.last() else {
            return Correlation {
                report: Report::default(),
                warnings: vec![CorrelationWarning::NoStatistics {
                    operations: ops.len(),
                }],
            };
        };

        let fields = self.read_fields(blocks.len() - 1, snapshot);
        if fields.is_empty() {
            tracing::debug!("final stats block has no counters");
        }

        Correlation {
            report: Report {
                rows: ops
                    .iter()
                    .map(|op| derive_metrics(op, &fields, &self.profile))
                    .collect(),
            },
            warnings: Vec::new(),
        }
    }
}
