//! iCalendar value parse error types.

use std::fmt;

/// Result type for value parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while parsing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte offset into the parsed value where the offending part starts.
    pub offset: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    /// Creates an invalid rule error.
    #[must_use]
    pub fn invalid_rule(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidRRule, offset, message)
    }

    /// Creates an unsupported rule part error.
    #[must_use]
    pub fn unsupported(offset: usize, part: &str) -> Self {
        Self::new(
            ParseErrorKind::Unsupported,
            offset,
            format!("rule part not supported: {part}"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}: {}: {}", self.offset, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed recurrence rule.
    InvalidRRule,
    /// Missing or unknown FREQ.
    InvalidFrequency,
    /// Unknown weekday code.
    InvalidWeekday,
    /// Invalid DATE value.
    InvalidDate,
    /// Invalid DATE-TIME value.
    InvalidDateTime,
    /// Both UNTIL and COUNT given.
    UntilCountConflict,
    /// Valid iCalendar the expander does not handle.
    Unsupported,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRRule => write!(f, "invalid recurrence rule"),
            Self::InvalidFrequency => write!(f, "invalid frequency"),
            Self::InvalidWeekday => write!(f, "invalid weekday"),
            Self::InvalidDate => write!(f, "invalid date"),
            Self::InvalidDateTime => write!(f, "invalid date/time"),
            Self::UntilCountConflict => write!(f, "UNTIL and COUNT are mutually exclusive"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}
