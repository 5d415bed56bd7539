//! # Human-Machine Interaction LTS
//!
//! An [`HmiLts`] is an [`Lts`] whose states are named [`State`]s and whose transitions
//! carry [`Action`]s. It maintains its [`Alphabet`], the set of observable actions
//! labelling its regular transitions, incrementally through the [`Listener`] hook.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use log::debug;

use crate::action::{Action, ActionKind};
use crate::error::Result;
use crate::label::Label;
use crate::lts::{EdgeKind, EdgeRef, Listener, Lts};
use crate::reference::{StateId, TransitionId};

/// State of an HMI-LTS, identified by its name.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct State {
    name: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for State {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Label for State {
    fn is_absent(&self) -> bool {
        self.name.is_empty()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Transition of an HMI-LTS.
///
/// A transition is identified by its name. The same action may label many transitions,
/// as long as their names differ. [`Transition::from`] an action uses the action name.
#[derive(Debug, Clone)]
pub struct Transition {
    name: String,
    action: Action,
}

impl Transition {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn action(&self) -> &Action {
        &self.action
    }
}

impl From<Action> for Transition {
    fn from(action: Action) -> Self {
        Self::new(action.name().to_string(), action)
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Transition {}

impl Hash for Transition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for Transition {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Label for Transition {
    fn is_absent(&self) -> bool {
        self.name.is_empty() || self.action.is_absent()
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.name == self.action.name() {
            write!(f, "{}", self.action)
        } else {
            write!(f, "{}:{}", self.name, self.action)
        }
    }
}

/// Set of observable actions of an HMI-LTS.
///
/// An action belongs to the alphabet iff it labels a regular transition and is not
/// of kind [`ActionKind::Tau`]. Actions are compared by name, so the first action
/// registered under a given name is the one kept. Names later registered with another kind
/// are recorded as clashes.
#[derive(Debug, Clone, Default)]
pub struct Alphabet {
    actions: HashSet<Action>,
    clashes: BTreeMap<String, ActionKind>,
}

impl Alphabet {
    pub fn len(&self) -> usize {
        self.actions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains(name)
    }
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Names of the actions, sorted.
    pub fn names(&self) -> BTreeSet<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_command())
    }
    pub fn observations(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_observation())
    }

    /// Names used with two different kinds, with the kind that clashed with the registered one.
    pub fn clashes(&self) -> impl Iterator<Item = (&str, ActionKind)> {
        self.clashes.iter().map(|(name, &kind)| (name.as_str(), kind))
    }
}

impl Listener<State, Transition> for Alphabet {
    fn on_transition_added(&mut self, transition: &Transition, kind: EdgeKind) {
        let action = transition.action();
        if kind != EdgeKind::Regular || !action.kind().is_observable() {
            return;
        }
        match self.actions.get(action.name()) {
            None => {
                debug!("alphabet: new {} {}", action.kind(), action);
                self.actions.insert(action.clone());
            }
            Some(known) if known.kind() != action.kind() => {
                debug!("alphabet: {} used as {} and {}", action, known.kind(), action.kind());
                self.clashes
                    .entry(action.name().to_string())
                    .or_insert(action.kind());
            }
            Some(_) => {}
        }
    }
}

/// Human-Machine Interaction Labelled Transition System.
///
/// Not thread-safe for writes: build it on one thread, then share it read-only.
#[derive(Debug, Clone)]
pub struct HmiLts {
    lts: Lts<State, Transition, Alphabet>,
}

impl HmiLts {
    /// Create a new HMI-LTS with a single (initial) state.
    pub fn new(initial: impl Into<State>) -> Result<Self> {
        let lts = Lts::with_listener(initial.into(), Alphabet::default())?;
        Ok(Self { lts })
    }

    pub fn add_state(&mut self, state: impl Into<State>) -> Result<StateId> {
        self.lts.add_state(state.into())
    }

    pub fn add_transition(
        &mut self,
        transition: impl Into<Transition>,
        from: &str,
        to: &str,
    ) -> Result<TransitionId> {
        self.lts.add_transition(transition.into(), from, to)
    }

    pub fn add_tau_transition(
        &mut self,
        transition: impl Into<Transition>,
        from: &str,
        to: &str,
    ) -> Result<TransitionId> {
        self.lts.add_tau_transition(transition.into(), from, to)
    }

    pub fn has_tau_transition(&self, from: &str, to: &str) -> Result<bool> {
        self.lts.has_tau_transition(from, to)
    }

    pub fn initial_state(&self) -> &State {
        self.lts.initial_state()
    }
    pub fn states_count(&self) -> usize {
        self.lts.states_count()
    }
    pub fn transitions_count(&self) -> usize {
        self.lts.transitions_count()
    }

    /// Get the observable alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        self.lts.listener()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Action> {
        self.alphabet().commands()
    }
    pub fn observations(&self) -> impl Iterator<Item = &Action> {
        self.alphabet().observations()
    }

    /// Get the underlying generic LTS, for read-only traversal.
    pub fn lts(&self) -> &Lts<State, Transition, Alphabet> {
        &self.lts
    }
}

/// Is the edge invisible to the operator?
///
/// Tau edges are, and so are regular edges carrying a [`ActionKind::Tau`] action.
pub fn is_internal(edge: &EdgeRef<'_, State, Transition>) -> bool {
    edge.is_tau() || edge.label.action().kind() == ActionKind::Tau
}
