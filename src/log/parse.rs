use crate::Result;
use crate::classify::LineClass;
use crate::log::row::OperationDescriptor;
use anyhow::Context;
use regex::Regex;

/// Marker printed by the instrumented workload in front of every GEMM call.
pub const DEFAULT_MARKER: &str = "GEMM Layer:";

/// Classifies operation-log lines.
///
/// Expected shape (anything after K is ignored):
/// GEMM Layer: M: 64, N: 64, K: 64
#[derive(Debug, Clone)]
pub struct OperationLogReader {
    re: Regex,
}

impl OperationLogReader {
    pub fn new(marker: &str) -> Result<Self> {
        // Capture:
        // 1) M  2) N  3) K
        let re = Regex::new(&format!(
            r"^\s*{}.*?M:\s*(\d+),\s*N:\s*(\d+),\s*K:\s*(\d+)",
            regex::escape(marker)
        ))
        .with_context(|| format!("build operation marker pattern for {:?}", marker))?;
        Ok(Self { re })
    }

    pub fn classify(&self, line: &str) -> LineClass<OperationDescriptor> {
        let Some(caps) = self.re.captures(line) else {
            return LineClass::Skipped;
        };

        // Digits that overflow u64 are treated like any other malformed line.
        let dim = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());
        match (dim(1), dim(2), dim(3)) {
            (Some(m), Some(n), Some(k)) => LineClass::Matched(OperationDescriptor::new(m, n, k)),
            _ => LineClass::Skipped,
        }
    }

    /// Every line with its 1-based line number and classification.
    pub fn classified_lines<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (usize, LineClass<OperationDescriptor>)> + 'a {
        text.lines()
            .enumerate()
            .map(move |(lineno, line)| (lineno + 1, self.classify(line)))
    }

    /// Operations in file order. Calling again restarts from the top.
    pub fn operations<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = OperationDescriptor> + 'a {
        self.classified_lines(text)
            .filter_map(|(_, class)| class.matched())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gemm_reader() -> OperationLogReader {
        OperationLogReader::new(DEFAULT_MARKER).unwrap()
    }

    #[test]
    fn test_reads_operations_in_order_between_noise() {
        let text = "\
cpu: 0 0 64 64 64 1.000000 64 64 1.000000 64
GEMM Layer: M: 64, N: 64, K: 64

gemm_nn called 1
  GEMM Layer: M: 16, N: 32, K: 8
some unrelated output M: 1, N: 2, K: 3
GEMM Layer: M: 128, N: 1, K: 4096
";
        let reader = gemm_reader();
        let ops: Vec<_> = reader.operations(text).collect();
        assert_eq!(
            ops,
            vec![
                OperationDescriptor::new(64, 64, 64),
                OperationDescriptor::new(16, 32, 8),
                OperationDescriptor::new(128, 1, 4096),
            ]
        );

        // Restartable: a second pass yields the same sequence.
        assert_eq!(reader.operations(text).count(), 3);
    }

    #[test]
    fn test_malformed_dimensions_skip_only_that_line() {
        let text = "\
GEMM Layer: M: 99999999999999999999999, N: 1, K: 1
GEMM Layer: M: x, N: 1, K: 1
GEMM Layer: M: 2, N: 3, K: 4
";
        let reader = gemm_reader();
        let classes: Vec<_> = reader.classified_lines(text).collect();
        assert_eq!(classes[0], (1, LineClass::Skipped));
        assert_eq!(classes[1], (2, LineClass::Skipped));
        assert_eq!(
            classes[2],
            (3, LineClass::Matched(OperationDescriptor::new(2, 3, 4)))
        );
    }

    #[test]
    fn test_empty_log_is_not_an_error() {
        let reader = gemm_reader();
        assert_eq!(reader.operations("").count(), 0);
        assert_eq!(reader.operations("\n\nnothing here\n").count(), 0);
    }

    #[test]
    fn test_custom_marker_is_matched_literally() {
        let reader = OperationLogReader::new("[conv.gemm]").unwrap();
        let text = "[conv.gemm] M: 3, N: 5, K: 7\nGEMM Layer: M: 1, N: 1, K: 1\n";
        let ops: Vec<_> = reader.operations(text).collect();
        assert_eq!(ops, vec![OperationDescriptor::new(3, 5, 7)]);
    }

    #[test]
    fn test_label() {
        assert_eq!(
            OperationDescriptor::new(64, 32, 16).label(),
            "GEMM Layer (64, 32, 16)"
        );
    }
}
