use crate::Result;
use crate::classify::LineClass;
use crate::stats::block::StatBlock;
use regex::Regex;
use std::collections::BTreeMap;

/// One counter value with whatever followed it on the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub value: f64,
    /// Rest of the line after the value, trimmed. Usually `# description (Unit)`.
    pub unit: String,
}

/// Counters of one statistics block, keyed by dotted name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(BTreeMap<String, Field>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a counter. A repeated name replaces the earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        self.0.insert(name.into(), field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    /// Value of `name`, or `default` when the counter is absent.
    pub fn get_or_default(&self, name: &str, default: f64) -> f64 {
        self.get(name).map(|f| f.value).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Field)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, Field)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, field) in iter {
            map.insert(name, field);
        }
        map
    }
}

/// Purely syntactic `<name> <value> <rest...>` line matcher.
///
/// Example:
/// system.cpu.cpi     1.250000     # CPI: cycles per instruction ((Cycle/Count))
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    re: Regex,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        // Capture:
        // 1) name: dotted path, may contain `::` sub-keys
        // 2) value: signed decimal, optional exponent
        // 3) unit/description: rest of line (optional)
        let re = Regex::new(
            r"^([\w.:]+)\s+([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)(?:\s+(.*?))?\s*$",
        )?;
        Ok(Self { re })
    }

    pub fn classify(&self, line: &str) -> LineClass<(String, Field)> {
        let Some(caps) = self.re.captures(line.trim()) else {
            return LineClass::Skipped;
        };
        let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) else {
            return LineClass::Skipped;
        };
        let Ok(value) = value.as_str().parse::<f64>() else {
            return LineClass::Skipped;
        };
        let unit = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();

        LineClass::Matched((name.as_str().to_string(), Field { value, unit }))
    }

    /// Every line of the block with its 1-based line number and classification.
    pub fn classified_lines<'a>(
        &'a self,
        block: &'a StatBlock,
    ) -> impl Iterator<Item = (usize, LineClass<(String, Field)>)> + 'a {
        block
            .lines()
            .enumerate()
            .map(move |(lineno, line)| (lineno + 1, self.classify(line)))
    }

    pub fn extract(&self, block: &StatBlock) -> FieldMap {
        self.classified_lines(block)
            .filter_map(|(_, class)| class.matched())
            .collect()
    }
}
