use argspec_core::{DeclId, DescriptorSet};
use argspec_syntax::{GrammarNode, SpannedToken, Span, Token, parse, tokenize};

use crate::error::CompileError;
use crate::matcher::Fsm;
use crate::state::{StateGraph, StateId, TransitionClass};

/// Compiles a spec string against a set of declarations into a runnable
/// matcher. The matcher takes ownership of the declarations; read values
/// back through it once a match succeeds.
///
/// Two conveniences mirror what most commands want without writing it out:
/// an empty spec is synthesized as `[OPTIONS] ARG1 ARG2 ...` over the
/// declarations, and a non-empty spec that never mentions an option gets a
/// leading `[OPTIONS]` when options are declared.
pub fn compile(spec: &str, decls: DescriptorSet) -> Result<Fsm, CompileError> {
    let spec = if spec.trim().is_empty() {
        default_spec(&decls)
    } else {
        spec.to_string()
    };

    let mut tokens = tokenize(&spec)?;
    if decls.has_options() && !tokens.iter().any(|t| t.token.is_option_ref()) {
        tokens.insert(0, SpannedToken::new(Token::Options, Span::new(0, 0)));
    }

    let tree = parse(tokens, &decls)?;
    let graph = compile_tree(&tree, &decls);
    graph.validate().map_err(CompileError::Internal)?;

    let mut required = Vec::new();
    tree.required_obligations(&mut required);

    Ok(Fsm::new(graph, decls, required, spec))
}

fn default_spec(decls: &DescriptorSet) -> String {
    let mut parts = Vec::new();
    if decls.has_options() {
        parts.push("[OPTIONS]".to_string());
    }
    for desc in decls.positionals() {
        parts.push(desc.label().to_string());
    }
    parts.join(" ")
}

/// Thompson-style construction: every node becomes a fragment with one
/// entry and one exit state, glued with epsilon transitions.
pub fn compile_tree(tree: &GrammarNode, decls: &DescriptorSet) -> StateGraph {
    let mut graph = StateGraph::new();
    let (entry, exit) = build(tree, &mut graph, decls);
    graph.set_start(entry);
    graph.set_final(exit);
    graph
}

fn build(node: &GrammarNode, graph: &mut StateGraph, decls: &DescriptorSet) -> (StateId, StateId) {
    match node {
        GrammarNode::Positional { decl, .. } => {
            let s = graph.add_state();
            let e = graph.add_state();
            graph.add_transition(s, TransitionClass::Positional(*decl), e);
            (s, e)
        }
        GrammarNode::OptionRef { decl, .. } => {
            let s = graph.add_state();
            let e = graph.add_state();
            option_transitions(graph, s, e, *decl, decls);
            (s, e)
        }
        GrammarNode::Sequence(terms) => {
            if terms.is_empty() {
                let s = graph.add_state();
                let e = graph.add_state();
                graph.add_transition(s, TransitionClass::Epsilon, e);
                return (s, e);
            }
            let mut entry = None;
            let mut prev_exit: Option<StateId> = None;
            for term in terms {
                let (ti, to) = build(term, graph, decls);
                if let Some(po) = prev_exit {
                    graph.add_transition(po, TransitionClass::Epsilon, ti);
                } else {
                    entry = Some(ti);
                }
                prev_exit = Some(to);
            }
            (entry.unwrap(), prev_exit.unwrap())
        }
        GrammarNode::Choice(branches) => {
            let s = graph.add_state();
            let e = graph.add_state();
            for branch in branches {
                let (bi, bo) = build(branch, graph, decls);
                graph.add_transition(s, TransitionClass::Epsilon, bi);
                graph.add_transition(bo, TransitionClass::Epsilon, e);
            }
            (s, e)
        }
        GrammarNode::Optional(inner) => {
            let s = graph.add_state();
            let e = graph.add_state();
            let (i, o) = build(inner, graph, decls);
            graph.add_transition(s, TransitionClass::Epsilon, i);
            graph.add_transition(o, TransitionClass::Epsilon, e);
            graph.add_transition(s, TransitionClass::Epsilon, e);
            (s, e)
        }
        GrammarNode::Repeated(inner) => {
            let s = graph.add_state();
            let e = graph.add_state();
            let (i, o) = build(inner, graph, decls);
            graph.add_transition(s, TransitionClass::Epsilon, i);
            // Forward exit before the loop-back so a finishing thread wins
            // ties against one that keeps consuming.
            graph.add_transition(o, TransitionClass::Epsilon, e);
            graph.add_transition(o, TransitionClass::Epsilon, i);
            (s, e)
        }
        GrammarNode::OptionsGroup(ids) => {
            // A hub state with one self-loop per option: any order, any
            // count, and skippable entirely.
            let s = graph.add_state();
            let e = graph.add_state();
            graph.add_transition(s, TransitionClass::Epsilon, e);
            for id in ids {
                let back = graph.add_state();
                option_transitions(graph, s, back, *id, decls);
                graph.add_transition(back, TransitionClass::Epsilon, s);
            }
            (s, e)
        }
        GrammarNode::OptionsEnd => {
            let s = graph.add_state();
            let e = graph.add_state();
            graph.add_transition(s, TransitionClass::OptionsEnd, e);
            graph.add_transition(s, TransitionClass::Epsilon, e);
            (s, e)
        }
    }
}

/// One or two transitions per option reference: the name, then the value
/// token when the option's cell takes one.
fn option_transitions(
    graph: &mut StateGraph,
    from: StateId,
    to: StateId,
    decl: DeclId,
    decls: &DescriptorSet,
) {
    if decls.descriptor(decl).cell().takes_value() {
        let mid = graph.add_state();
        graph.add_transition(from, TransitionClass::OptionName(decl), mid);
        graph.add_transition(mid, TransitionClass::OptionValue(decl), to);
    } else {
        graph.add_transition(from, TransitionClass::OptionName(decl), to);
    }
}
