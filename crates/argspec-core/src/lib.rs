//! Typed value cells and descriptors for the argspec matcher.
//!
//! A [`ValueCell`] is the typed destination one option or positional binds
//! into: eight kinds (bool, string, int, float, duration, and the three
//! sequence variants), each with parse-from-text coercion, environment
//! seeding, and default tracking. A [`Descriptor`] pairs one cell with the
//! declared names and metadata, and a [`DescriptorSet`] holds a command's
//! descriptors in declaration order with name indexes for resolution.

pub mod descriptor;
pub mod values;

pub use descriptor::{
    Arg, CellRead, DeclId, DescKind, Descriptor, DescriptorSet, Handle, Opt, is_plain_arg_name,
};
pub use values::{ScalarCell, SeqCell, ValueCell, ValueError, format_duration, parse_duration};
