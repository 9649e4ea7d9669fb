//! Tagged result shared by the line-oriented parsers.

/// Outcome of classifying one input line.
///
/// Parsers never fail on a single line: anything that does not have the
/// expected shape is `Skipped` and the caller decides whether to report it.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass<T> {
    Matched(T),
    Skipped,
}

impl<T> LineClass<T> {
    pub fn matched(self) -> Option<T> {
        match self {
            LineClass::Matched(v) => Some(v),
            LineClass::Skipped => None,
        }
    }
}
