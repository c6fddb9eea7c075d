use argspec_core::DeclId;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Index of one state inside its [`StateGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

/// What a transition consumes. Epsilon transitions consume nothing and are
/// resolved at match time; the others consume exactly one input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionClass {
    Epsilon,
    /// Any declared name of the option (`-f` and `--force` are the same
    /// transition).
    OptionName(DeclId),
    /// The token following a value-taking option name, consumed
    /// unconditionally as the raw value.
    OptionValue(DeclId),
    /// Any token that is not option-shaped: no leading dash, the bare `-`
    /// stdin convention, or anything once options have ended.
    Positional(DeclId),
    /// The literal `--` sentinel.
    OptionsEnd,
}

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub class: TransitionClass,
    pub target: StateId,
}

/// Transition order within a state is declaration order and doubles as the
/// ambiguity tie-break.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub transitions: SmallVec<[Transition; 4]>,
    pub is_final: bool,
}

/// The compiled NFA. Exactly one start state; epsilon closures are computed
/// during matching rather than precompiled, which keeps compilation linear
/// in grammar size even with `[OPTIONS]` in play.
#[derive(Debug, Clone)]
pub struct StateGraph {
    states: Vec<State>,
    start: StateId,
}

impl StateGraph {
    pub(crate) fn new() -> Self {
        Self {
            states: Vec::new(),
            start: StateId(0),
        }
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State::default());
        id
    }

    pub(crate) fn add_transition(&mut self, from: StateId, class: TransitionClass, to: StateId) {
        self.states[from.0].transitions.push(Transition { class, target: to });
    }

    pub(crate) fn set_start(&mut self, id: StateId) {
        self.start = id;
    }

    pub(crate) fn set_final(&mut self, id: StateId) {
        self.states[id.0].is_final = true;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Checks the structural invariants a well-formed compile guarantees:
    /// a start state, at least one final state, every state reachable from
    /// the start. A violation is a construction defect, not user input.
    pub fn validate(&self) -> Result<(), String> {
        if self.states.is_empty() {
            return Err("state graph has no states".to_string());
        }

        let mut seen: FxHashSet<StateId> = FxHashSet::default();
        let mut stack = vec![self.start];
        seen.insert(self.start);
        while let Some(id) = stack.pop() {
            for tr in &self.states[id.0].transitions {
                if seen.insert(tr.target) {
                    stack.push(tr.target);
                }
            }
        }

        if seen.len() != self.states.len() {
            return Err(format!(
                "{} of {} states unreachable from the start state",
                self.states.len() - seen.len(),
                self.states.len()
            ));
        }

        if !self.states.iter().any(|s| s.is_final) {
            return Err("state graph has no final state".to_string());
        }

        Ok(())
    }
}
