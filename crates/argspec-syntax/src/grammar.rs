use crate::error::Span;
use argspec_core::DeclId;

/// One node of the parsed spec grammar. A plain ownership tree: specs are
/// always acyclic, repetition is a node wrapper rather than a back edge.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarNode {
    /// A positional argument resolved to its descriptor.
    Positional { decl: DeclId, span: Span },
    /// An option reference resolved to its descriptor; matches any of the
    /// descriptor's declared names.
    OptionRef { decl: DeclId, span: Span },
    /// Terms matched left to right.
    Sequence(Vec<GrammarNode>),
    /// Exactly one of the alternatives, tie-broken by declaration order.
    Choice(Vec<GrammarNode>),
    /// Zero or one occurrence of the inner node.
    Optional(Box<GrammarNode>),
    /// One or more occurrences of the inner node.
    Repeated(Box<GrammarNode>),
    /// The `[OPTIONS]` placeholder: every listed option, any order, any
    /// repetition count, interleaved at this position.
    OptionsGroup(Vec<DeclId>),
    /// The `--` end-of-options sentinel.
    OptionsEnd,
}

impl GrammarNode {
    /// Collects, in spec order, the obligations a successful match must
    /// satisfy: one entry per leaf not shielded by `Optional` or
    /// `[OPTIONS]`. A `Choice` contributes a single obligation met by
    /// binding any descriptor of any branch, since exactly one branch is
    /// required, not all of them. Used to name the first unmet obligation
    /// when a match ends without reaching a final state.
    pub fn required_obligations(&self, out: &mut Vec<Vec<DeclId>>) {
        match self {
            GrammarNode::Positional { decl, .. } | GrammarNode::OptionRef { decl, .. } => {
                if !out.iter().any(|group| group.contains(decl)) {
                    out.push(vec![*decl]);
                }
            }
            GrammarNode::Sequence(terms) => {
                for term in terms {
                    term.required_obligations(out);
                }
            }
            GrammarNode::Choice(branches) => {
                let mut members = Vec::new();
                for branch in branches {
                    branch.collect_decls(&mut members);
                }
                members.retain(|decl| !out.iter().any(|group| group.contains(decl)));
                if !members.is_empty() {
                    out.push(members);
                }
            }
            GrammarNode::Repeated(inner) => inner.required_obligations(out),
            GrammarNode::Optional(_) | GrammarNode::OptionsGroup(_) | GrammarNode::OptionsEnd => {}
        }
    }

    /// Every descriptor referenced under this node, in spec order, without
    /// duplicates. Optional interiors count here: binding one proves its
    /// branch was taken.
    fn collect_decls(&self, out: &mut Vec<DeclId>) {
        match self {
            GrammarNode::Positional { decl, .. } | GrammarNode::OptionRef { decl, .. } => {
                if !out.contains(decl) {
                    out.push(*decl);
                }
            }
            GrammarNode::Sequence(nodes) | GrammarNode::Choice(nodes) => {
                for node in nodes {
                    node.collect_decls(out);
                }
            }
            GrammarNode::Optional(inner) | GrammarNode::Repeated(inner) => {
                inner.collect_decls(out);
            }
            GrammarNode::OptionsGroup(_) | GrammarNode::OptionsEnd => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argspec_core::{Arg, DescriptorSet, Opt};

    #[test]
    fn test_obligations_skip_optional_and_options() {
        let mut decls = DescriptorSet::new();
        let f = decls.bool_opt(Opt::new("f", ""), false);
        let src = decls.string_arg(Arg::new("SRC", ""), "");
        let dst = decls.string_arg(Arg::new("DST", ""), "");

        let tree = GrammarNode::Sequence(vec![
            GrammarNode::OptionsGroup(vec![f.id()]),
            GrammarNode::Positional {
                decl: src.id(),
                span: Span::new(0, 3),
            },
            GrammarNode::Optional(Box::new(GrammarNode::Positional {
                decl: dst.id(),
                span: Span::new(4, 7),
            })),
        ]);

        let mut required = Vec::new();
        tree.required_obligations(&mut required);
        assert_eq!(required, vec![vec![src.id()]]);
    }

    #[test]
    fn test_obligations_spec_order() {
        let mut decls = DescriptorSet::new();
        let f = decls.bool_opt(Opt::new("f", ""), false);
        let src = decls.string_arg(Arg::new("SRC", ""), "");

        let tree = GrammarNode::Sequence(vec![
            GrammarNode::OptionRef {
                decl: f.id(),
                span: Span::new(0, 2),
            },
            GrammarNode::Repeated(Box::new(GrammarNode::Positional {
                decl: src.id(),
                span: Span::new(3, 6),
            })),
        ]);

        let mut required = Vec::new();
        tree.required_obligations(&mut required);
        assert_eq!(required, vec![vec![f.id()], vec![src.id()]]);
    }

    #[test]
    fn test_choice_is_one_obligation() {
        let mut decls = DescriptorSet::new();
        let a = decls.bool_opt(Opt::new("a", ""), false);
        let b = decls.bool_opt(Opt::new("b", ""), false);
        let src = decls.string_arg(Arg::new("SRC", ""), "");

        let tree = GrammarNode::Sequence(vec![
            GrammarNode::Choice(vec![
                GrammarNode::OptionRef {
                    decl: a.id(),
                    span: Span::new(1, 3),
                },
                GrammarNode::OptionRef {
                    decl: b.id(),
                    span: Span::new(6, 8),
                },
            ]),
            GrammarNode::Positional {
                decl: src.id(),
                span: Span::new(10, 13),
            },
        ]);

        let mut required = Vec::new();
        tree.required_obligations(&mut required);
        assert_eq!(required, vec![vec![a.id(), b.id()], vec![src.id()]]);
    }
}
