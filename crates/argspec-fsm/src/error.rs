use std::error::Error;
use std::fmt;

use argspec_core::ValueError;
use argspec_syntax::{LexError, ParseError, render_spec_error};

/// Everything that can go wrong turning a spec string into a runnable
/// matcher. `Internal` is reserved for graph construction defects caught by
/// post-compile validation; it indicates a bug here, not a bad spec.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Internal(String),
}

impl CompileError {
    /// Renders the error with a caret under the offending part of `spec`,
    /// for surfacing in usage/help output.
    pub fn render(&self, spec: &str) -> String {
        match self {
            CompileError::Lex(e) => render_spec_error(spec, &e.to_string(), Some(e.span())),
            CompileError::Parse(e) => render_spec_error(spec, &e.to_string(), e.span()),
            CompileError::Internal(msg) => render_spec_error(spec, msg, None),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Internal(msg) => write!(f, "internal compile defect: {msg}"),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompileError::Lex(e) => Some(e),
            CompileError::Parse(e) => Some(e),
            CompileError::Internal(_) => None,
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

/// Why an argument vector was rejected. `position` is the zero-based index
/// of the offending token in the input vector.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// A dash-prefixed token naming no declared option.
    IllegalOption { token: String, position: usize },
    /// A token no active state could consume, including declared options in
    /// a position the spec does not allow them.
    IllegalInput { token: String, position: usize },
    /// Input ran out with an unshielded spec term still unbound; `name` is
    /// the first such term in spec order.
    MissingRequired { name: String },
    /// The shape matched but a bound raw token failed typed conversion.
    InvalidValue {
        name: String,
        value: String,
        reason: ValueError,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::IllegalOption { token, position } => {
                write!(f, "illegal option {token:?} at position {position}")
            }
            MatchError::IllegalInput { token, position } => {
                write!(f, "unexpected input {token:?} at position {position}")
            }
            MatchError::MissingRequired { name } => {
                write!(f, "missing required {name}")
            }
            MatchError::InvalidValue { name, value, reason } => {
                write!(f, "invalid value {value:?} for {name}: {reason}")
            }
        }
    }
}

impl Error for MatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MatchError::InvalidValue { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
