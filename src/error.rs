use thiserror::Error;

/// Number of source bytes shown on either side of an error offset.
const SNIPPET_RADIUS: usize = 20;

/// Coarse classification of an [`Error`], for callers that branch on the
/// failure without caring about its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UnknownCommand,
    UndefinedFunction,
    ArityMismatch,
    DivisionByZero,
    UnknownOperation,
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed statement, unclosed delimiter, or a non-integer where an
    /// integer is required.
    #[error("syntax error at offset {offset}: {message} (near `{snippet}`)")]
    Syntax {
        message: String,
        offset: usize,
        snippet: String,
    },

    #[error("unknown command '{keyword}' at offset {offset} (near `{snippet}`)")]
    UnknownCommand {
        keyword: String,
        offset: usize,
        snippet: String,
    },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String, offset: usize },

    /// `expected` is rendered as-is so math operations can say "at least 2".
    #[error("'{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
        offset: usize,
    },

    #[error("division by zero in '{operation}'")]
    DivisionByZero { operation: String, offset: usize },

    #[error("unknown operation '{operation}'")]
    UnknownOperation { operation: String, offset: usize },

    #[error("integer overflow in '{operation}'")]
    Overflow { operation: String, offset: usize },
}

impl Error {
    pub(crate) fn syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
            snippet: snippet(source, offset),
        }
    }

    pub(crate) fn unknown_command(source: &str, offset: usize, keyword: &str) -> Self {
        Self::UnknownCommand {
            keyword: keyword.to_string(),
            offset,
            snippet: snippet(source, offset),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::UndefinedFunction { .. } => ErrorKind::UndefinedFunction,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::Overflow { .. } => ErrorKind::Overflow,
        }
    }

    /// Byte offset into the program source that the error concerns.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. }
            | Self::UnknownCommand { offset, .. }
            | Self::UndefinedFunction { offset, .. }
            | Self::ArityMismatch { offset, .. }
            | Self::DivisionByZero { offset, .. }
            | Self::UnknownOperation { offset, .. }
            | Self::Overflow { offset, .. } => Some(*offset),
        }
    }

    /// Render a multi-line diagnostic pointing at the offending source line.
    ///
    /// ```text
    /// error: division by zero in 'divide'
    ///  --> 3:1
    ///   |
    /// 3 | divide(10, 0)
    ///   | ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let Some(offset) = self.offset() else {
            return format!("error: {}", self);
        };
        let (line, column, text) = locate(source, offset);
        let gutter = " ".repeat(line.to_string().len());
        format!(
            "error: {}\n{gutter}--> {line}:{column}\n{gutter} |\n{line} | {text}\n{gutter} | {pad}^",
            self,
            pad = " ".repeat(column.saturating_sub(1)),
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A short single-line excerpt of `source` around `offset`.
pub(crate) fn snippet(source: &str, offset: usize) -> String {
    let offset = floor_char_boundary(source, offset.min(source.len()));
    let start = floor_char_boundary(source, offset.saturating_sub(SNIPPET_RADIUS));
    let end = floor_char_boundary(source, (offset + SNIPPET_RADIUS).min(source.len()));
    source[start..end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 1-based line and column of `offset`, plus the text of that line.
fn locate(source: &str, offset: usize) -> (usize, usize, &str) {
    let offset = floor_char_boundary(source, offset.min(source.len()));
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);
    let line = source[..offset].matches('\n').count() + 1;
    let column = source[line_start..offset].chars().count() + 1;
    (line, column, source[line_start..line_end].trim_end_matches('\r'))
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    while !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}
