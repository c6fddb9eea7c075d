//! Lexer and grammar parser for argspec command specs.
//!
//! A spec is a one-line grammar in the getopt/docopt family describing the
//! options and positionals a command accepts:
//!
//! ```text
//! [OPTIONS] SRC... DST
//! (-a | -b) [FILE]
//! ```
//!
//! This crate turns that text into a [`GrammarNode`] tree:
//!
//! ```text
//! Spec text
//!     |
//! lexer::tokenize
//!     |
//! Vec<SpannedToken>
//!     |
//! parser::parse (resolving against a DescriptorSet)
//!     |
//! GrammarNode
//! ```
//!
//! Both stages fail with typed errors carrying the offending substring and
//! byte offset; [`error::render_spec_error`] draws a caret under the spec
//! text for display. Compiling the tree into a runnable matcher is the
//! `argspec-fsm` crate's job.

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use error::{LexError, ParseError, Span, render_spec_error};
pub use grammar::GrammarNode;
pub use lexer::{SpannedToken, Token, is_valid_argument_name, tokenize};
pub use parser::parse;
