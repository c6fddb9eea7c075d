//! Compile getopt/docopt-style command specs into typed argument matchers.
//!
//! Declare the options and positionals a command accepts, compile a
//! one-line spec describing how they combine, then match argument vectors
//! against it:
//!
//! ```
//! use argspec::{Arg, DescriptorSet, Opt, compile};
//!
//! let mut decls = DescriptorSet::new();
//! let force = decls.bool_opt(Opt::new("f force", "overwrite existing files"), false);
//! let srcs = decls.strings_arg(Arg::new("SRC", "files to copy"), Vec::new());
//! let dst = decls.string_arg(Arg::new("DST", "destination"), String::new());
//!
//! let mut fsm = compile("[OPTIONS] [SRC...] DST", decls).unwrap();
//! # let _ = &fsm;
//! ```
//!
//! A successful `fsm.match_args(&["-f", "a.txt", "b.txt", "out/"])` binds
//! `force`, `srcs` and `dst`; read them back with `fsm.get(handle)`. A
//! failed match reports why and leaves every value untouched.

pub use argspec_core::{
    Arg, CellRead, DeclId, DescKind, Descriptor, DescriptorSet, Handle, Opt, ValueError,
    format_duration, parse_duration,
};
pub use argspec_fsm::{CompileError, Fsm, MatchError, compile};
pub use argspec_syntax::{
    GrammarNode, LexError, ParseError, Span, is_valid_argument_name, render_spec_error,
};

pub mod prelude {
    pub use crate::{Arg, DescriptorSet, Fsm, Opt, compile};
    pub use crate::{CompileError, MatchError};
}
