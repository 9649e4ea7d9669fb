use crate::Result;
use regex::Regex;

/// Text of one simulated segment, delimiter removed and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatBlock(String);

impl StatBlock {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.as_str().lines()
    }
}

/// Splits a statistics dump into per-segment blocks.
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    re: Regex,
}

impl BlockSplitter {
    pub fn new() -> Result<Self> {
        // Spacing around the title varies between simulator versions.
        let re = Regex::new(r"-{10}\s*End Simulation Statistics\s*-{10}")?;
        Ok(Self { re })
    }

    /// Split on the end-of-segment delimiter.
    ///
    /// Empty pieces (e.g. trailing newlines after the last delimiter) are
    /// dropped. A dump without any delimiter yields one block holding the
    /// whole trimmed text, or nothing if that text is empty.
    pub fn split(&self, dump: &str) -> Vec<StatBlock> {
        self.re
            .split(dump)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(|piece| StatBlock(piece.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DELIMITER: &str = "---------- End Simulation Statistics   ----------";

    fn join(blocks: &[StatBlock]) -> String {
        blocks
            .iter()
            .map(|b| format!("{}\n{}\n", b.as_str(), DELIMITER))
            .collect()
    }

    const DUMP: &str = "
---------- Begin Simulation Statistics ----------
simSeconds                                   0.010000                       # Number of seconds simulated (Second)
system.cpu.cpi                               1.250000                       # CPI: cycles per instruction ((Cycle/Count))

---------- End Simulation Statistics   ----------

---------- Begin Simulation Statistics ----------
simSeconds                                   0.020000                       # Number of seconds simulated (Second)

---------- End Simulation Statistics   ----------
";

    #[test]
    fn test_split_two_segments() {
        let blocks = BlockSplitter::new().unwrap().split(DUMP);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].as_str().starts_with("---------- Begin Simulation Statistics"));
        assert!(blocks[0].as_str().contains("system.cpu.cpi"));
        assert!(blocks[1].as_str().ends_with("(Second)"));
        assert!(!blocks[1].as_str().contains("End Simulation"));
    }

    #[test]
    fn test_delimiter_spacing_is_tolerated() {
        let dump = "a 1\n----------End Simulation Statistics----------\nb 2\n---------- End Simulation Statistics \t ----------";
        let blocks = BlockSplitter::new().unwrap().split(dump);
        let texts: Vec<_> = blocks.iter().map(StatBlock::as_str).collect();
        assert_eq!(texts, vec!["a 1", "b 2"]);
    }

    #[test]
    fn test_no_delimiter_yields_single_block() {
        let splitter = BlockSplitter::new().unwrap();
        let blocks = splitter.split("\n  simSeconds 0.5  \n");
        assert_eq!(blocks, vec![StatBlock("simSeconds 0.5".to_string())]);

        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \n\t\n").is_empty());
    }

    #[test]
    fn test_split_of_joined_blocks_round_trips() {
        let splitter = BlockSplitter::new().unwrap();
        let blocks = splitter.split(DUMP);
        assert_eq!(splitter.split(&join(&blocks)), blocks);
    }
}
