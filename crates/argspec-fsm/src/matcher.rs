use argspec_core::{CellRead, DeclId, DescriptorSet, Handle};
use rustc_hash::FxHashSet;

use crate::error::MatchError;
use crate::state::{StateGraph, StateId, TransitionClass};

/// One raw token earmarked for a descriptor. Boolean flags record the
/// literal `true` so commit goes through the same typed write path.
#[derive(Debug, Clone)]
struct Binding {
    decl: DeclId,
    raw: String,
}

/// One live alternative during simulation: a state plus the bindings taken
/// to reach it. Thread order is the ambiguity tie-break; earlier threads
/// descend from earlier spec alternatives.
#[derive(Debug, Clone)]
struct Thread {
    state: StateId,
    binds: Vec<Binding>,
}

/// A compiled spec bound to its declarations. One instance is one command's
/// matcher; call [`Fsm::match_args`] per invocation and read results back
/// through the handles returned at registration.
#[derive(Debug)]
pub struct Fsm {
    graph: StateGraph,
    decls: DescriptorSet,
    /// Spec-order binding obligations; each group is met by binding any of
    /// its members (a choice is one group, a plain leaf a singleton).
    required: Vec<Vec<DeclId>>,
    spec: String,
}

impl Fsm {
    pub(crate) fn new(
        graph: StateGraph,
        decls: DescriptorSet,
        required: Vec<Vec<DeclId>>,
        spec: String,
    ) -> Self {
        Self {
            graph,
            decls,
            required,
            spec,
        }
    }

    /// The spec text actually compiled, after default synthesis and
    /// `[OPTIONS]` injection.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn decls(&self) -> &DescriptorSet {
        &self.decls
    }

    pub fn into_decls(self) -> DescriptorSet {
        self.decls
    }

    /// Reads the current value behind a registration handle.
    pub fn get<T: CellRead>(&self, handle: Handle<T>) -> T {
        self.decls.get(handle)
    }

    /// True when the last successful match bound this descriptor from the
    /// argument vector rather than leaving its default or env seed.
    pub fn set_by_user<T>(&self, handle: Handle<T>) -> bool {
        self.decls.set_by_user(handle)
    }

    pub fn is_default<T>(&self, handle: Handle<T>) -> bool {
        self.decls.is_default(handle)
    }

    /// Validates `args` against the compiled spec and, on success, commits
    /// the winning thread's bindings into the descriptors. On any error the
    /// descriptors are left untouched: conversion runs in a validate pass
    /// over the whole winning binding list before the first write.
    pub fn match_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), MatchError> {
        let mut active = closure(
            vec![Thread {
                state: self.graph.start(),
                binds: Vec::new(),
            }],
            &self.graph,
        );
        let mut opts_ended = false;

        for (position, arg) in args.iter().enumerate() {
            let token = arg.as_ref();

            if !opts_ended && token == "--" {
                // A value-taking option consumes the next token
                // unconditionally, so a pending value swallows the sentinel
                // as its raw text instead.
                let pending_value = active.iter().any(|t| {
                    self.graph
                        .state(t.state)
                        .transitions
                        .iter()
                        .any(|tr| matches!(tr.class, TransitionClass::OptionValue(_)))
                });
                if !pending_value {
                    opts_ended = true;
                    active = cross_options_end(&active, &self.graph);
                    continue;
                }
            }

            let subtokens = if !opts_ended {
                expand_cluster(token, &self.decls)
            } else {
                None
            };
            let subtokens = subtokens.unwrap_or_else(|| vec![token.to_string()]);

            for sub in subtokens {
                let next = step(&active, &sub, opts_ended, &self.graph, &self.decls);
                if next.is_empty() {
                    return Err(reject(sub, position, opts_ended, &self.decls));
                }
                active = next;
            }
        }

        let winner = active
            .iter()
            .find(|t| self.graph.state(t.state).is_final)
            .cloned();
        match winner {
            Some(thread) => self.commit(thread.binds),
            None => Err(self.missing_required(&active)),
        }
    }

    fn commit(&mut self, binds: Vec<Binding>) -> Result<(), MatchError> {
        for b in &binds {
            let desc = self.decls.descriptor(b.decl);
            if let Err(reason) = desc.cell().validate(&b.raw) {
                return Err(MatchError::InvalidValue {
                    name: desc.label().to_string(),
                    value: b.raw.clone(),
                    reason,
                });
            }
        }

        // Sequence cells restart from empty each run so replays bind the
        // same values instead of appending.
        let mut cleared: FxHashSet<DeclId> = FxHashSet::default();
        for b in binds {
            let cell = self.decls.cell_mut(b.decl);
            if cell.is_sequence() && cleared.insert(b.decl) {
                cell.clear();
            }
            if cell.write(&b.raw).is_err() {
                unreachable!("binding validated before commit");
            }
            self.decls.mark_set_by_user(b.decl);
        }
        Ok(())
    }

    fn missing_required(&self, active: &[Thread]) -> MatchError {
        let bound: FxHashSet<DeclId> = active
            .first()
            .map(|t| t.binds.iter().map(|b| b.decl).collect())
            .unwrap_or_default();

        // First unmet obligation in spec order.
        let unmet = self
            .required
            .iter()
            .find(|group| !group.iter().any(|id| bound.contains(id)))
            .and_then(|group| group.first())
            .copied();

        // Every obligation met but no final state: an optional group was
        // entered and left incomplete. Name whatever the surviving threads
        // would consume next.
        let frontier = || {
            active.iter().find_map(|t| {
                self.graph
                    .state(t.state)
                    .transitions
                    .iter()
                    .find_map(|tr| match tr.class {
                        TransitionClass::OptionName(decl)
                        | TransitionClass::OptionValue(decl)
                        | TransitionClass::Positional(decl) => Some(decl),
                        _ => None,
                    })
            })
        };

        let name = match unmet.or_else(frontier) {
            Some(id) => self.decls.descriptor(id).label().to_string(),
            None => "more arguments".to_string(),
        };
        MatchError::MissingRequired { name }
    }
}

/// Expands `-abc` into `-a -b -c` when every clustered character is a
/// declared single-character option that takes no value. Any other shape
/// leaves the token alone.
fn expand_cluster(token: &str, decls: &DescriptorSet) -> Option<Vec<String>> {
    let rest = token.strip_prefix('-')?;
    if rest.len() < 2 || rest.starts_with('-') {
        return None;
    }
    let mut expanded = Vec::with_capacity(rest.len());
    for ch in rest.chars() {
        let name = format!("-{ch}");
        let id = decls.lookup_option(&name)?;
        if decls.descriptor(id).cell().takes_value() {
            return None;
        }
        expanded.push(name);
    }
    Some(expanded)
}

fn accepts(class: TransitionClass, token: &str, opts_ended: bool, decls: &DescriptorSet) -> bool {
    match class {
        TransitionClass::Epsilon => false,
        TransitionClass::OptionName(decl) => {
            !opts_ended && decls.descriptor(decl).names.iter().any(|n| n == token)
        }
        // A value-taking option swallows whatever comes next.
        TransitionClass::OptionValue(_) => true,
        TransitionClass::Positional(_) => {
            opts_ended || !token.starts_with('-') || token == "-"
        }
        // The sentinel is recognized before stepping; this transition only
        // fires through `cross_options_end`.
        TransitionClass::OptionsEnd => false,
    }
}

fn step(
    active: &[Thread],
    token: &str,
    opts_ended: bool,
    graph: &StateGraph,
    decls: &DescriptorSet,
) -> Vec<Thread> {
    let mut next = Vec::new();
    for thread in active {
        for tr in &graph.state(thread.state).transitions {
            if !accepts(tr.class, token, opts_ended, decls) {
                continue;
            }
            let mut binds = thread.binds.clone();
            match tr.class {
                TransitionClass::OptionName(decl)
                    if !decls.descriptor(decl).cell().takes_value() =>
                {
                    binds.push(Binding {
                        decl,
                        raw: "true".to_string(),
                    });
                }
                TransitionClass::OptionValue(decl) | TransitionClass::Positional(decl) => {
                    binds.push(Binding {
                        decl,
                        raw: token.to_string(),
                    });
                }
                _ => {}
            }
            next.push(Thread {
                state: tr.target,
                binds,
            });
        }
    }
    closure(next, graph)
}

/// Advances threads sitting before an `OptionsEnd` transition across it and
/// keeps every thread either way; the sentinel token itself binds nothing.
fn cross_options_end(active: &[Thread], graph: &StateGraph) -> Vec<Thread> {
    let mut seeds = Vec::new();
    for thread in active {
        for tr in &graph.state(thread.state).transitions {
            if tr.class == TransitionClass::OptionsEnd {
                seeds.push(Thread {
                    state: tr.target,
                    binds: thread.binds.clone(),
                });
            }
        }
        seeds.push(thread.clone());
    }
    closure(seeds, graph)
}

/// Epsilon closure over a seed list, preserving priority order: each seed's
/// epsilon descendants are expanded depth-first in pre-order before the next
/// seed is considered, and a state reached twice keeps the earlier thread.
/// That keeps every thread of an earlier alternative ahead of any thread of
/// a later one, however deep the epsilon chain, making declaration order the
/// tie-break.
fn closure(seeds: Vec<Thread>, graph: &StateGraph) -> Vec<Thread> {
    let mut seen: FxHashSet<StateId> = FxHashSet::default();
    let mut out = Vec::new();
    for seed in seeds {
        add_thread(seed, graph, &mut seen, &mut out);
    }
    out
}

fn add_thread(
    thread: Thread,
    graph: &StateGraph,
    seen: &mut FxHashSet<StateId>,
    out: &mut Vec<Thread>,
) {
    if !seen.insert(thread.state) {
        return;
    }
    let state = thread.state;
    let binds = thread.binds.clone();
    out.push(thread);
    for tr in &graph.state(state).transitions {
        if tr.class == TransitionClass::Epsilon {
            add_thread(
                Thread {
                    state: tr.target,
                    binds: binds.clone(),
                },
                graph,
                seen,
                out,
            );
        }
    }
}

fn reject(token: String, position: usize, opts_ended: bool, decls: &DescriptorSet) -> MatchError {
    let dash_shaped = token.len() > 1 && token.starts_with('-');
    if !opts_ended && dash_shaped && !decls.is_option_name(&token) {
        MatchError::IllegalOption { token, position }
    } else {
        MatchError::IllegalInput { token, position }
    }
}
