//! # Generic labelled transition systems
//!
//! [`Lts`] is a finite directed multigraph whose states are identified by labels of type `S`
//! and whose transitions are identified by labels of type `T`.
//!
//! ## Storage
//!
//! States and transitions live in two arenas (`Vec`s) and are addressed by lightweight
//! [`StateId`] / [`TransitionId`] handles. Nodes keep the handles of their incoming and
//! outgoing edges; edges keep the handles of their endpoints. Nothing owns anything
//! else, so there are no reference cycles. Two hash maps translate labels back into handles.
//!
//! ## Invariants
//!
//! After every successful mutation:
//!
//! - state labels are unique, and the initial state is one of the states;
//! - transition labels are unique, whether the transition is regular or tau;
//! - there is at most one tau edge per ordered pair of states
//!   (regular edges between the same pair are unrestricted);
//! - every edge connects two states of this LTS.
//!
//! Every check runs before any mutation, so a failed call leaves the LTS untouched.
//!
//! ## Hooks
//!
//! A [`Listener`] is notified synchronously after each committed mutation.
//! This is how derived data (such as the alphabet of an [`HmiLts`][crate::hmi::HmiLts])
//! is maintained incrementally.
//!
//! ## Concurrency
//!
//! Mutation requires `&mut self`, so concurrent writes are ruled out by the borrow checker.
//! There is no interior mutability: a finished LTS can be shared freely for reading.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use log::{debug, trace};

use crate::error::{LtsError, Result};
use crate::label::Label;
use crate::reference::{StateId, TransitionId};

/// Kind of an edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EdgeKind {
    Regular,
    Tau,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Regular => write!(f, "regular"),
            EdgeKind::Tau => write!(f, "tau"),
        }
    }
}

/// Observer of the successful mutations of an [`Lts`].
///
/// Both methods do nothing by default.
pub trait Listener<S, T> {
    /// Called after the state `state` has been added (including the initial state).
    fn on_state_added(&mut self, _state: &S) {}

    /// Called after the transition `transition` of kind `kind` has been added.
    fn on_transition_added(&mut self, _transition: &T, _kind: EdgeKind) {}
}

impl<S, T> Listener<S, T> for () {}

#[derive(Debug, Clone)]
struct Node<S> {
    label: S,
    outgoing: Vec<TransitionId>,
    incoming: Vec<TransitionId>,
}

#[derive(Debug, Clone)]
enum Edge<T> {
    Regular {
        label: T,
        source: StateId,
        target: StateId,
    },
    Tau {
        label: T,
        source: StateId,
        target: StateId,
    },
}

impl<T> Edge<T> {
    fn label(&self) -> &T {
        match self {
            Edge::Regular { label, .. } | Edge::Tau { label, .. } => label,
        }
    }
    fn source(&self) -> StateId {
        match self {
            Edge::Regular { source, .. } | Edge::Tau { source, .. } => *source,
        }
    }
    fn target(&self) -> StateId {
        match self {
            Edge::Regular { target, .. } | Edge::Tau { target, .. } => *target,
        }
    }
    fn kind(&self) -> EdgeKind {
        match self {
            Edge::Regular { .. } => EdgeKind::Regular,
            Edge::Tau { .. } => EdgeKind::Tau,
        }
    }
}

/// Read-only view of a transition of an [`Lts`].
#[derive(Debug)]
pub struct EdgeRef<'a, S, T> {
    pub id: TransitionId,
    pub label: &'a T,
    pub kind: EdgeKind,
    pub source: &'a S,
    pub source_id: StateId,
    pub target: &'a S,
    pub target_id: StateId,
}

impl<S, T> Clone for EdgeRef<'_, S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for EdgeRef<'_, S, T> {}

impl<S, T> EdgeRef<'_, S, T> {
    pub fn is_tau(&self) -> bool {
        self.kind == EdgeKind::Tau
    }
}

/// Generic labelled transition system.
///
/// - `S` labels the states,
/// - `T` labels the transitions,
/// - `L` listens to the mutations.
#[derive(Clone)]
pub struct Lts<S, T, L = ()> {
    initial: StateId,
    nodes: Vec<Node<S>>,
    edges: Vec<Edge<T>>,
    states: HashMap<S, StateId>,
    transitions: HashMap<T, TransitionId>,
    listener: L,
}

impl<S, T> Lts<S, T>
where
    S: Label,
    T: Label,
{
    /// Create a new LTS with a single (initial) state and no transitions.
    pub fn new(initial: S) -> Result<Self> {
        Self::with_listener(initial, ())
    }
}

impl<S, T, L> Lts<S, T, L>
where
    S: Label,
    T: Label,
    L: Listener<S, T>,
{
    /// Create a new LTS with a single (initial) state, reporting mutations to `listener`.
    ///
    /// The listener is notified of the initial state as well.
    pub fn with_listener(initial: S, listener: L) -> Result<Self> {
        if initial.is_absent() {
            return Err(LtsError::NullState);
        }

        let mut lts = Self {
            initial: StateId::new(0),
            nodes: Vec::new(),
            edges: Vec::new(),
            states: HashMap::new(),
            transitions: HashMap::new(),
            listener,
        };
        let initial = lts.add_state(initial)?;
        assert_eq!(initial.index(), 0);
        Ok(lts)
    }

    /// Add a new state to the LTS.
    ///
    /// Fails with [`LtsError::NullState`] if the label is absent,
    /// and with [`LtsError::DuplicateState`] if it already labels a state.
    pub fn add_state(&mut self, state: S) -> Result<StateId> {
        if state.is_absent() {
            return Err(LtsError::NullState);
        }
        if self.states.contains_key(&state) {
            return Err(LtsError::DuplicateState(format!("{:?}", state)));
        }

        let id = StateId::new(self.nodes.len());
        debug!("add_state({:?}) -> {}", state, id);
        self.nodes.push(Node {
            label: state.clone(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        self.states.insert(state, id);

        self.listener.on_state_added(&self.nodes[id.index()].label);
        Ok(id)
    }

    /// Add a regular transition from `from` to `to`.
    ///
    /// Fails with [`LtsError::NullTransition`] if the label is absent,
    /// with [`LtsError::DuplicateTransition`] if it already labels a transition,
    /// and with [`LtsError::UnknownEndpoint`] if `from` or `to` is not a state.
    pub fn add_transition<Q>(&mut self, transition: T, from: &Q, to: &Q) -> Result<TransitionId>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.insert_edge(transition, from, to, EdgeKind::Regular)
    }

    /// Add a tau transition from `from` to `to`.
    ///
    /// Same checks as [`add_transition`][Self::add_transition], and additionally fails with
    /// [`LtsError::DuplicateTauEdge`] if there is already a tau transition from `from` to `to`.
    pub fn add_tau_transition<Q>(
        &mut self,
        transition: T,
        from: &Q,
        to: &Q,
    ) -> Result<TransitionId>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.insert_edge(transition, from, to, EdgeKind::Tau)
    }

    fn insert_edge<Q>(
        &mut self,
        transition: T,
        from: &Q,
        to: &Q,
        kind: EdgeKind,
    ) -> Result<TransitionId>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        if transition.is_absent() {
            return Err(LtsError::NullTransition);
        }
        if self.transitions.contains_key(&transition) {
            return Err(LtsError::DuplicateTransition(format!("{:?}", transition)));
        }
        let source = self.require_state(from)?;
        let target = self.require_state(to)?;
        if kind == EdgeKind::Tau && self.has_tau_edge(source, target) {
            return Err(LtsError::DuplicateTauEdge {
                from: format!("{:?}", from),
                to: format!("{:?}", to),
            });
        }

        let id = TransitionId::new(self.edges.len());
        debug!(
            "add_transition({:?}, {:?} -> {:?}, {}) -> {}",
            transition, from, to, kind, id
        );
        let edge = match kind {
            EdgeKind::Regular => Edge::Regular {
                label: transition.clone(),
                source,
                target,
            },
            EdgeKind::Tau => Edge::Tau {
                label: transition.clone(),
                source,
                target,
            },
        };
        self.edges.push(edge);
        self.nodes[source.index()].outgoing.push(id);
        self.nodes[target.index()].incoming.push(id);
        self.transitions.insert(transition, id);

        self.listener
            .on_transition_added(self.edges[id.index()].label(), kind);
        Ok(id)
    }
}

impl<S, T, L> Lts<S, T, L>
where
    S: Label,
    T: Label,
{
    /// Get the initial state. It never changes.
    pub fn initial_state(&self) -> &S {
        &self.nodes[self.initial.index()].label
    }
    pub fn initial_state_id(&self) -> StateId {
        self.initial
    }

    pub fn states_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn transitions_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the listener receiving the mutations of this LTS.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn state_id<Q>(&self, state: &Q) -> Option<StateId>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.states.get(state).copied()
    }
    pub fn transition_id<Q>(&self, transition: &Q) -> Option<TransitionId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.transitions.get(transition).copied()
    }

    pub fn contains_state<Q>(&self, state: &Q) -> bool
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.states.contains_key(state)
    }
    pub fn contains_transition<Q>(&self, transition: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.transitions.contains_key(transition)
    }

    /// Get the label of the state `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this LTS.
    pub fn state(&self, id: StateId) -> &S {
        &self.nodes[id.index()].label
    }

    /// Get a view of the transition `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this LTS.
    pub fn transition(&self, id: TransitionId) -> EdgeRef<'_, S, T> {
        let edge = &self.edges[id.index()];
        EdgeRef {
            id,
            label: edge.label(),
            kind: edge.kind(),
            source: self.state(edge.source()),
            source_id: edge.source(),
            target: self.state(edge.target()),
            target_id: edge.target(),
        }
    }

    /// Iterate over the states, in insertion order.
    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        self.nodes.iter().map(|node| &node.label)
    }

    /// Iterate over the transitions, in insertion order.
    pub fn transitions(&self) -> impl Iterator<Item = EdgeRef<'_, S, T>> + '_ {
        (0..self.edges.len()).map(move |i| self.transition(TransitionId::new(i)))
    }

    /// Iterate over the transitions leaving the state `id`.
    pub fn edges_from(&self, id: StateId) -> impl Iterator<Item = EdgeRef<'_, S, T>> + '_ {
        self.nodes[id.index()]
            .outgoing
            .iter()
            .map(move |&t| self.transition(t))
    }

    /// Iterate over the transitions entering the state `id`.
    pub fn edges_to(&self, id: StateId) -> impl Iterator<Item = EdgeRef<'_, S, T>> + '_ {
        self.nodes[id.index()]
            .incoming
            .iter()
            .map(move |&t| self.transition(t))
    }

    /// Iterate over the transitions leaving the state `from`.
    pub fn outgoing<Q>(&self, from: &Q) -> Result<impl Iterator<Item = EdgeRef<'_, S, T>> + '_>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self.require_state(from)?;
        Ok(self.edges_from(id))
    }

    /// Iterate over the transitions entering the state `to`.
    pub fn incoming<Q>(&self, to: &Q) -> Result<impl Iterator<Item = EdgeRef<'_, S, T>> + '_>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self.require_state(to)?;
        Ok(self.edges_to(id))
    }

    /// Check whether there is a tau transition from `from` to `to`.
    ///
    /// Fails with [`LtsError::UnknownEndpoint`] if `from` is not a state.
    /// An unknown `to` simply yields `false`.
    pub fn has_tau_transition<Q>(&self, from: &Q, to: &Q) -> Result<bool>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let source = self.require_state(from)?;
        Ok(match self.state_id(to) {
            Some(target) => self.has_tau_edge(source, target),
            None => false,
        })
    }

    fn has_tau_edge(&self, source: StateId, target: StateId) -> bool {
        self.nodes[source.index()].outgoing.iter().any(|&t| {
            matches!(
                self.edges[t.index()],
                Edge::Tau { target: to, .. } if to == target
            )
        })
    }

    /// Compute the set of states reachable from `start` through edges accepted by `follow`.
    ///
    /// The start states themselves always belong to the result.
    pub fn closure<I, F>(&self, start: I, follow: F) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
        F: Fn(&EdgeRef<'_, S, T>) -> bool,
    {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        for id in start {
            if visited.insert(id) {
                queue.push_back(id);
            }
        }

        while let Some(id) = queue.pop_front() {
            for edge in self.edges_from(id) {
                if follow(&edge) && visited.insert(edge.target_id) {
                    trace!("closure: {:?} -> {:?}", edge.source, edge.target);
                    queue.push_back(edge.target_id);
                }
            }
        }

        visited
    }

    /// Compute the states reachable from `state` using zero or more tau transitions.
    pub fn tau_closure<Q>(&self, state: &Q) -> Result<BTreeSet<StateId>>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self.require_state(state)?;
        Ok(self.closure([id], |edge| edge.is_tau()))
    }

    fn require_state<Q>(&self, state: &Q) -> Result<StateId>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.state_id(state)
            .ok_or_else(|| LtsError::UnknownEndpoint(format!("{:?}", state)))
    }
}

impl<S, T, L> Debug for Lts<S, T, L>
where
    S: Label,
    T: Label,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lts")
            .field("initial", self.initial_state())
            .field("states", &self.states_count())
            .field("transitions", &self.transitions_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn lts() -> Lts<&'static str, &'static str> {
        Lts::new("A").unwrap()
    }

    #[test]
    fn test_initial_state() {
        let mut lts = lts();
        assert_eq!(*lts.initial_state(), "A");

        lts.add_state("B").unwrap();
        assert_eq!(*lts.initial_state(), "A");
        assert_eq!(lts.initial_state_id(), lts.state_id("A").unwrap());
    }

    #[test]
    fn test_absent_initial_state() {
        let res = Lts::<&str, &str>::new("");
        assert_eq!(res.unwrap_err(), LtsError::NullState);
    }

    #[test]
    fn test_states_count() {
        let mut lts = lts();
        assert_eq!(lts.states_count(), 1);

        lts.add_state("B").unwrap();
        assert_eq!(lts.states_count(), 2);

        lts.add_state("C").unwrap();
        lts.add_state("D").unwrap();
        assert_eq!(lts.states_count(), 4);
    }

    #[test]
    fn test_transitions_count() {
        let mut lts = lts();
        assert_eq!(lts.transitions_count(), 0);

        lts.add_state("B").unwrap();
        lts.add_transition("T1", "A", "B").unwrap();
        assert_eq!(lts.transitions_count(), 1);

        lts.add_tau_transition("T2", "A", "B").unwrap();
        assert_eq!(lts.transitions_count(), 2);

        lts.add_state("C").unwrap();
        lts.add_state("D").unwrap();
        lts.add_transition("T3", "C", "D").unwrap();
        lts.add_tau_transition("T4", "A", "C").unwrap();
        lts.add_tau_transition("T5", "D", "B").unwrap();
        assert_eq!(lts.transitions_count(), 5);
    }

    #[test]
    fn test_add_state() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_state("C").unwrap();
        lts.add_state("D").unwrap();
        assert_eq!(lts.states_count(), 4);

        // Adding again the initial state
        assert_eq!(
            lts.add_state("A"),
            Err(LtsError::DuplicateState("\"A\"".to_string()))
        );
        assert_eq!(lts.states_count(), 4);

        // Adding an existing state
        assert!(matches!(
            lts.add_state("C"),
            Err(LtsError::DuplicateState(_))
        ));
        assert_eq!(lts.states_count(), 4);

        // Adding an absent state
        assert_eq!(lts.add_state(""), Err(LtsError::NullState));
        assert_eq!(lts.states_count(), 4);
    }

    #[test]
    fn test_add_transition() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_state("C").unwrap();

        lts.add_transition("T1", "A", "B").unwrap();
        assert_eq!(lts.transitions_count(), 1);

        lts.add_tau_transition("T2", "A", "C").unwrap();
        assert_eq!(lts.transitions_count(), 2);

        // Loops
        lts.add_tau_transition("T3", "A", "A").unwrap();
        lts.add_transition("T4", "A", "A").unwrap();
        assert_eq!(lts.transitions_count(), 4);

        lts.add_transition("T5", "C", "A").unwrap();
        lts.add_transition("T6", "C", "B").unwrap();
        assert_eq!(lts.transitions_count(), 6);

        // Existing transition label
        assert!(matches!(
            lts.add_transition("T1", "C", "A"),
            Err(LtsError::DuplicateTransition(_))
        ));
        assert_eq!(lts.transitions_count(), 6);

        // Second tau edge between the same states
        assert!(matches!(
            lts.add_tau_transition("T7", "A", "C"),
            Err(LtsError::DuplicateTauEdge { .. })
        ));
        assert_eq!(lts.transitions_count(), 6);
        assert!(!lts.contains_transition("T7"));
    }

    #[test]
    fn test_parallel_regular_edges() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_tau_transition("tau", "A", "B").unwrap();
        lts.add_transition("x", "A", "B").unwrap();
        lts.add_transition("y", "A", "B").unwrap();
        assert_eq!(lts.transitions_count(), 3);
        assert_eq!(lts.outgoing("A").unwrap().count(), 3);
        assert_eq!(lts.incoming("B").unwrap().count(), 3);
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut lts = lts();
        assert_eq!(
            lts.add_transition("T1", "A", "Z"),
            Err(LtsError::UnknownEndpoint("\"Z\"".to_string()))
        );
        assert!(matches!(
            lts.add_tau_transition("T1", "Z", "A"),
            Err(LtsError::UnknownEndpoint(_))
        ));
        assert_eq!(lts.transitions_count(), 0);
    }

    #[test]
    fn test_validation_order() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_tau_transition("T1", "A", "B").unwrap();

        // Absent label wins over everything else
        assert_eq!(
            lts.add_tau_transition("", "A", "Z"),
            Err(LtsError::NullTransition)
        );
        // Duplicate label wins over unknown endpoints
        assert!(matches!(
            lts.add_transition("T1", "Z", "Z"),
            Err(LtsError::DuplicateTransition(_))
        ));
        // Unknown endpoints win over the duplicate tau edge
        assert!(matches!(
            lts.add_tau_transition("T2", "A", "Z"),
            Err(LtsError::UnknownEndpoint(_))
        ));
        assert!(matches!(
            lts.add_tau_transition("T2", "A", "B"),
            Err(LtsError::DuplicateTauEdge { .. })
        ));
    }

    #[test]
    fn test_has_tau_transition() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_state("C").unwrap();
        lts.add_transition("T0", "A", "C").unwrap();
        lts.add_tau_transition("T1", "A", "B").unwrap();

        assert_eq!(lts.has_tau_transition("A", "B"), Ok(true));
        assert_eq!(lts.has_tau_transition("B", "A"), Ok(false));
        assert_eq!(lts.has_tau_transition("A", "C"), Ok(false));
        assert_eq!(lts.has_tau_transition("A", "Z"), Ok(false));
        assert!(matches!(
            lts.has_tau_transition("Z", "A"),
            Err(LtsError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn test_tau_closure() {
        let mut lts = lts();
        for s in ["B", "C", "D"] {
            lts.add_state(s).unwrap();
        }
        lts.add_tau_transition("t1", "A", "B").unwrap();
        lts.add_tau_transition("t2", "B", "C").unwrap();
        lts.add_tau_transition("t3", "C", "A").unwrap();
        lts.add_transition("x", "C", "D").unwrap();

        let closure = lts.tau_closure("A").unwrap();
        let names: Vec<_> = closure.iter().map(|&id| *lts.state(id)).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let closure = lts.tau_closure("D").unwrap();
        assert_eq!(closure.len(), 1);
    }

    #[test]
    fn test_edge_views() {
        let mut lts = lts();
        lts.add_state("B").unwrap();
        lts.add_transition("x", "A", "B").unwrap();
        lts.add_tau_transition("t", "B", "A").unwrap();

        let edges: Vec<_> = lts.transitions().collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(*edges[0].label, "x");
        assert_eq!(edges[0].kind, EdgeKind::Regular);
        assert_eq!((*edges[0].source, *edges[0].target), ("A", "B"));
        assert_eq!(*edges[1].label, "t");
        assert!(edges[1].is_tau());

        let states: Vec<_> = lts.states().copied().collect();
        assert_eq!(states, vec!["A", "B"]);
    }

    #[derive(Default)]
    struct Recorder {
        states: Vec<String>,
        transitions: Vec<(String, EdgeKind)>,
    }

    impl Listener<&'static str, &'static str> for Recorder {
        fn on_state_added(&mut self, state: &&'static str) {
            self.states.push(state.to_string());
        }
        fn on_transition_added(&mut self, transition: &&'static str, kind: EdgeKind) {
            self.transitions.push((transition.to_string(), kind));
        }
    }

    #[test]
    fn test_listener() {
        let mut lts = Lts::with_listener("A", Recorder::default()).unwrap();
        lts.add_state("B").unwrap();
        lts.add_transition("x", "A", "B").unwrap();
        lts.add_tau_transition("t", "A", "B").unwrap();

        // Failed mutations are not reported
        lts.add_state("B").unwrap_err();
        lts.add_transition("y", "A", "Z").unwrap_err();

        assert_eq!(lts.listener().states, vec!["A", "B"]);
        assert_eq!(
            lts.listener().transitions,
            vec![
                ("x".to_string(), EdgeKind::Regular),
                ("t".to_string(), EdgeKind::Tau)
            ]
        );
    }

    #[test]
    fn test_numeric_labels() {
        let mut lts: Lts<u32, u32> = Lts::new(0).unwrap();
        lts.add_state(1).unwrap();
        lts.add_transition(10, &0u32, &1u32).unwrap();
        assert!(lts.contains_transition(&10u32));
        assert_eq!(lts.has_tau_transition(&0u32, &1u32), Ok(false));
    }
}
