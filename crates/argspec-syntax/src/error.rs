use std::fmt;

/// Byte range of one token inside the spec text. Specs are single-line, so
/// an offset doubles as the column for error rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Renders a configuration-time error with a caret pointing into the spec
/// text, e.g.:
///
/// ```text
/// error: unknown option -x
///   | [OPTIONS] -x SRC
///   |           ^^
/// ```
pub fn render_spec_error(spec: &str, message: &str, span: Option<Span>) -> String {
    let mut out = String::new();
    out.push_str(&format!("error: {}\n", message));
    out.push_str(&format!("  | {}\n", spec));

    if let Some(span) = span {
        let col = spec[..span.start.min(spec.len())].chars().count();
        let width = if span.end > span.start {
            spec[span.start.min(spec.len())..span.end.min(spec.len())]
                .chars()
                .count()
                .max(1)
        } else {
            1
        };
        out.push_str(&format!("  | {}{}\n", " ".repeat(col), "^".repeat(width)));
    }

    out
}

/// A malformed token in the spec text.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedChar { ch: char, span: Span },
    /// A dash not followed by a well-formed option name.
    InvalidOption { text: String, span: Span },
    /// A dot run that is not exactly `...`.
    InvalidRepetition { text: String, span: Span },
    /// A bare word that is not an all-caps positional name.
    InvalidArgName { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::InvalidOption { span, .. } => *span,
            LexError::InvalidRepetition { span, .. } => *span,
            LexError::InvalidArgName { span, .. } => *span,
        }
    }

    /// The offending substring, as required for user-facing messages.
    pub fn text(&self) -> String {
        match self {
            LexError::UnexpectedChar { ch, .. } => ch.to_string(),
            LexError::InvalidOption { text, .. } => text.clone(),
            LexError::InvalidRepetition { text, .. } => text.clone(),
            LexError::InvalidArgName { text, .. } => text.clone(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar { ch, span } => {
                write!(f, "unexpected character '{}' at offset {}", ch, span.start)
            }
            LexError::InvalidOption { text, span } => {
                write!(f, "invalid option '{}' at offset {}", text, span.start)
            }
            LexError::InvalidRepetition { text, span } => write!(
                f,
                "invalid repetition marker '{}' at offset {} (expected '...')",
                text, span.start
            ),
            LexError::InvalidArgName { text, span } => write!(
                f,
                "invalid argument name '{}' at offset {} (must be in all caps)",
                text, span.start
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// A structurally invalid spec: the tokens do not form a grammar tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnknownOption { name: String, span: Span },
    UnknownArgument { name: String, span: Span },
    UnexpectedToken { expected: String, found: String, span: Span },
    UnexpectedEof { expected: String },
    UnbalancedGroup { found: String, span: Span },
    EmptyAlternative { span: Span },
    /// A positional declared after a repeated different positional in the
    /// same sequence could never be reached by the matcher.
    UnreachablePositional { name: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnknownOption { span, .. } => Some(*span),
            ParseError::UnknownArgument { span, .. } => Some(*span),
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
            ParseError::UnbalancedGroup { span, .. } => Some(*span),
            ParseError::EmptyAlternative { span } => Some(*span),
            ParseError::UnreachablePositional { span, .. } => Some(*span),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownOption { name, .. } => {
                write!(f, "unknown option {}", name)
            }
            ParseError::UnknownArgument { name, .. } => {
                write!(f, "unknown argument {}", name)
            }
            ParseError::UnexpectedToken {
                expected, found, ..
            } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ParseError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of spec, expected {}", expected)
            }
            ParseError::UnbalancedGroup { found, .. } => {
                write!(f, "unbalanced grouping: unexpected {}", found)
            }
            ParseError::EmptyAlternative { .. } => {
                write!(f, "alternative branch with no terms")
            }
            ParseError::UnreachablePositional { name, .. } => {
                write!(
                    f,
                    "positional {} is unreachable after a repeated positional",
                    name
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}
