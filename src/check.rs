//! # Full-control analysis
//!
//! [`FullControlCheck`] decides whether an operator's *mental model* of a machine gives them
//! full control over the *system model* of that machine. Both are [`HmiLts`].
//!
//! ## Definition
//!
//! Write `C(x)` for the closure of state `x` under internal steps (tau edges, and regular edges
//! carrying a tau action). A pair of states `(s, m)` is *locally consistent* when:
//!
//! - every command enabled in `C(m)` is enabled in `C(s)`:
//!   the operator never attempts an impossible command;
//! - every observation enabled in `C(s)` is enabled in `C(m)`:
//!   the operator is never surprised;
//! - with [`CommandPolicy::Exact`], additionally every command enabled in `C(s)` is enabled
//!   in `C(m)`: the operator knows every available command.
//!
//! The mental model gives full control iff the initial pair belongs to the largest relation `R`
//! of locally consistent pairs such that, for `(s, m)` in `R`, every action `a` the operator
//! follows (commands known to the mental model, observations produced by the system) and every
//! system move `C(s) --a--> s'`, there is a mental move `C(m) --a--> m'` with `(s', m')` in `R`.
//!
//! ## Procedure
//!
//! 1. Explore, breadth-first from the initial pair, all pairs reachable through matched moves.
//!    The number of pairs is bounded by `|system.states| × |mental.states|`.
//! 2. Drop the pairs that are not locally consistent.
//! 3. Refine: drop the pairs with a system move that no surviving pair can match,
//!    until nothing changes (greatest fixpoint).
//!
//! When the initial pair is dropped, the removal reasons form a chain from the initial pair
//! down to a locally inconsistent pair, which is reported as a [`Violation`].
//!
//! An action name used both as a command and as an observation, within one model or across
//! the two, makes the models incomparable: the analysis yields [`Verdict::Incomparable`].

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::action::ActionKind;
use crate::hmi::{is_internal, Alphabet, HmiLts, State, Transition};
use crate::lts::Lts;
use crate::reference::StateId;

/// How the commands of the two models must relate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CommandPolicy {
    /// The operator only attempts commands the system allows.
    #[default]
    Included,
    /// The operator knows exactly the commands the system allows.
    Exact,
}

/// Configuration of a [`FullControlCheck`].
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    pub commands: CommandPolicy,
}

/// Why a pair of states is not locally consistent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Reason {
    /// The operator may attempt a command that the system does not allow.
    ImpossibleCommand(String),
    /// The system may produce an observation that the operator does not expect.
    UnexpectedObservation(String),
    /// The system allows a command that the operator does not know about.
    UnknownCommand(String),
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::ImpossibleCommand(a) => write!(f, "command `{}` is not available", a),
            Reason::UnexpectedObservation(a) => write!(f, "observation `{}` is not expected", a),
            Reason::UnknownCommand(a) => write!(f, "command `{}` is not known", a),
        }
    }
}

/// Witness that the mental model does not give full control.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Violation {
    /// Actions leading from the initial states to the faulty pair.
    pub trace: Vec<String>,
    pub system_state: String,
    pub mental_state: String,
    pub reason: Reason,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "after [{}], in system state {} (believed {}): {}",
            self.trace.join(", "),
            self.system_state,
            self.mental_state,
            self.reason
        )
    }
}

/// Which of the two models of an analysis.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Role {
    System,
    Mental,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "the system"),
            Role::Mental => write!(f, "the mental model"),
        }
    }
}

/// An action whose kind cannot be decided.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Conflict {
    /// The same action name is used with two kinds inside one model.
    Ambiguous {
        model: Role,
        action: String,
        first: ActionKind,
        second: ActionKind,
    },
    /// The action is classified differently by the two models.
    Mismatch {
        action: String,
        system: ActionKind,
        mental: ActionKind,
    },
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::Ambiguous {
                model,
                action,
                first,
                second,
            } => write!(
                f,
                "action `{}` is used as {} and as {} in {}",
                action, first, second, model
            ),
            Conflict::Mismatch {
                action,
                system,
                mental,
            } => write!(
                f,
                "action `{}` is a {} in the system and a {} in the mental model",
                action, system, mental
            ),
        }
    }
}

/// Outcome of a full-control analysis.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    FullControl,
    NoControl(Violation),
    Incomparable(Conflict),
}

impl Verdict {
    pub fn is_full_control(&self) -> bool {
        matches!(self, Verdict::FullControl)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::FullControl => write!(f, "full control"),
            Verdict::NoControl(v) => write!(f, "no control: {}", v),
            Verdict::Incomparable(c) => write!(f, "incomparable: {}", c),
        }
    }
}

/// Full-control analysis of a system model.
#[derive(Debug, Clone)]
pub struct FullControlCheck<'a> {
    system: &'a HmiLts,
    config: CheckConfig,
}

impl<'a> FullControlCheck<'a> {
    pub fn new(system: &'a HmiLts) -> Self {
        Self::with_config(system, CheckConfig::default())
    }

    pub fn with_config(system: &'a HmiLts, config: CheckConfig) -> Self {
        Self { system, config }
    }

    /// Get the system model under analysis.
    pub fn system(&self) -> &'a HmiLts {
        self.system
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check whether `mental` gives full control of the system.
    ///
    /// Returns `false` both when control is provably lost and when the models are
    /// incomparable; use [`analyse`][Self::analyse] to tell them apart.
    pub fn is_full_control(&self, mental: &HmiLts) -> bool {
        self.analyse(mental).is_full_control()
    }

    /// Analyse `mental` against the system. Neither model is modified.
    pub fn analyse(&self, mental: &HmiLts) -> Verdict {
        debug!(
            "analyse(system = {:?}, mental = {:?}, config = {:?})",
            self.system.lts(),
            mental.lts(),
            self.config
        );

        if let Some(conflict) = find_conflict(self.system.alphabet(), mental.alphabet()) {
            debug!("incomparable: {}", conflict);
            return Verdict::Incomparable(conflict);
        }

        let mut exploration = Exploration::new(self.system.lts(), mental.lts());
        exploration.run(self.config.commands);
        let verdict = exploration.refine();
        debug!("verdict: {}", verdict);
        verdict
    }
}

fn find_ambiguity(model: Role, alphabet: &Alphabet) -> Option<Conflict> {
    // Clashes are kept sorted by name.
    let (name, second) = alphabet.clashes().next()?;
    let first = alphabet.get(name)?.kind();
    Some(Conflict::Ambiguous {
        model,
        action: name.to_string(),
        first,
        second,
    })
}

fn find_conflict(system: &Alphabet, mental: &Alphabet) -> Option<Conflict> {
    if let Some(conflict) = find_ambiguity(Role::System, system) {
        return Some(conflict);
    }
    if let Some(conflict) = find_ambiguity(Role::Mental, mental) {
        return Some(conflict);
    }
    system
        .iter()
        .filter_map(|a| {
            let b = mental.get(a.name())?;
            (a.kind() != b.kind()).then(|| (a.name(), a.kind(), b.kind()))
        })
        .min_by_key(|&(name, _, _)| name)
        .map(|(name, system, mental)| Conflict::Mismatch {
            action: name.to_string(),
            system,
            mental,
        })
}

type Model = Lts<State, Transition, Alphabet>;

/// Observable moves available from the internal closure of a state.
#[derive(Debug, Default)]
struct Moves {
    commands: BTreeMap<String, BTreeSet<StateId>>,
    observations: BTreeMap<String, BTreeSet<StateId>>,
}

impl Moves {
    fn of(lts: &Model, state: StateId) -> Self {
        let mut moves = Moves::default();
        for s in lts.closure([state], is_internal) {
            for edge in lts.edges_from(s).filter(|e| !is_internal(e)) {
                let action = edge.label.action();
                let map = match action.kind() {
                    ActionKind::Command => &mut moves.commands,
                    ActionKind::Observation => &mut moves.observations,
                    ActionKind::Tau => continue,
                };
                map.entry(action.name().to_string())
                    .or_default()
                    .insert(edge.target_id);
            }
        }
        moves
    }

    fn check(system: &Moves, mental: &Moves, policy: CommandPolicy) -> Option<Reason> {
        if let Some(c) = mental
            .commands
            .keys()
            .find(|c| !system.commands.contains_key(*c))
        {
            return Some(Reason::ImpossibleCommand(c.clone()));
        }
        if let Some(o) = system
            .observations
            .keys()
            .find(|o| !mental.observations.contains_key(*o))
        {
            return Some(Reason::UnexpectedObservation(o.clone()));
        }
        if policy == CommandPolicy::Exact {
            if let Some(c) = system
                .commands
                .keys()
                .find(|c| !mental.commands.contains_key(*c))
            {
                return Some(Reason::UnknownCommand(c.clone()));
            }
        }
        None
    }
}

/// A system move from a pair, with the pairs able to match it.
#[derive(Debug)]
struct Obligation {
    action: String,
    candidates: Vec<usize>,
}

#[derive(Debug)]
struct Pair {
    system: StateId,
    mental: StateId,
    local: Option<Reason>,
    obligations: Vec<Obligation>,
}

#[derive(Debug)]
enum Removal {
    Local(Reason),
    LostTrack { action: String, next: usize },
}

struct Exploration<'a> {
    system: &'a Model,
    mental: &'a Model,
    pairs: Vec<Pair>,
    index: HashMap<(StateId, StateId), usize>,
    queue: VecDeque<usize>,
}

impl<'a> Exploration<'a> {
    fn new(system: &'a Model, mental: &'a Model) -> Self {
        Self {
            system,
            mental,
            pairs: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    fn intern(&mut self, system: StateId, mental: StateId) -> usize {
        if let Some(&i) = self.index.get(&(system, mental)) {
            return i;
        }
        let i = self.pairs.len();
        self.pairs.push(Pair {
            system,
            mental,
            local: None,
            obligations: Vec::new(),
        });
        self.index.insert((system, mental), i);
        self.queue.push_back(i);
        i
    }

    /// Explore the pairs reachable from the initial pair (index 0).
    fn run(&mut self, policy: CommandPolicy) {
        self.intern(self.system.initial_state_id(), self.mental.initial_state_id());

        let (system, mental) = (self.system, self.mental);
        let mut system_moves: HashMap<StateId, Moves> = HashMap::new();
        let mut mental_moves: HashMap<StateId, Moves> = HashMap::new();

        while let Some(i) = self.queue.pop_front() {
            let (s, m) = (self.pairs[i].system, self.pairs[i].mental);
            let sm = &*system_moves
                .entry(s)
                .or_insert_with(|| Moves::of(system, s));
            let mm = &*mental_moves
                .entry(m)
                .or_insert_with(|| Moves::of(mental, m));

            if let Some(reason) = Moves::check(sm, mm, policy) {
                trace!(
                    "pair ({}, {}): {}",
                    system.state(s),
                    mental.state(m),
                    reason
                );
                self.pairs[i].local = Some(reason);
                continue;
            }

            // Follow the commands the operator knows and the observations the system produces.
            let followed = mm
                .commands
                .keys()
                .map(move |c| (c, &sm.commands[c], &mm.commands[c]))
                .chain(
                    sm.observations
                        .keys()
                        .map(move |o| (o, &sm.observations[o], &mm.observations[o])),
                );

            let mut obligations = Vec::new();
            for (action, system_targets, mental_targets) in followed {
                for &s2 in system_targets {
                    let candidates = mental_targets
                        .iter()
                        .map(|&m2| self.intern(s2, m2))
                        .collect();
                    obligations.push(Obligation {
                        action: action.clone(),
                        candidates,
                    });
                }
            }
            trace!(
                "pair ({}, {}): {} obligations",
                system.state(s),
                mental.state(m),
                obligations.len()
            );
            self.pairs[i].obligations = obligations;
        }

        debug!(
            "explored {} pairs ({} system states, {} mental states)",
            self.pairs.len(),
            system_moves.len(),
            mental_moves.len()
        );
    }

    /// Compute the greatest consistent relation and turn it into a verdict.
    fn refine(&self) -> Verdict {
        let n = self.pairs.len();
        let mut removals: Vec<Option<Removal>> = self
            .pairs
            .iter()
            .map(|p| p.local.clone().map(Removal::Local))
            .collect();
        let mut alive: Vec<bool> = removals.iter().map(|r| r.is_none()).collect();

        let mut round = 0;
        loop {
            round += 1;
            let mut removed = 0;
            for i in 0..n {
                if !alive[i] {
                    continue;
                }
                let lost = self.pairs[i]
                    .obligations
                    .iter()
                    .find(|ob| !ob.candidates.iter().any(|&j| alive[j]));
                if let Some(ob) = lost {
                    alive[i] = false;
                    // Local consistency guarantees at least one matching mental move.
                    removals[i] = Some(Removal::LostTrack {
                        action: ob.action.clone(),
                        next: ob.candidates[0],
                    });
                    removed += 1;
                }
            }
            debug!("refinement round {}: removed {} pairs", round, removed);
            if removed == 0 {
                break;
            }
        }

        if alive[0] {
            return Verdict::FullControl;
        }

        // Every link of the chain was removed before the previous one, so the walk ends.
        let mut trace = Vec::new();
        let mut i = 0;
        loop {
            match &removals[i] {
                Some(Removal::LostTrack { action, next }) => {
                    trace.push(action.clone());
                    i = *next;
                }
                Some(Removal::Local(reason)) => {
                    let pair = &self.pairs[i];
                    return Verdict::NoControl(Violation {
                        trace,
                        system_state: self.system.state(pair.system).to_string(),
                        mental_state: self.mental.state(pair.mental).to_string(),
                        reason: reason.clone(),
                    });
                }
                None => unreachable!("dead pair without removal reason"),
            }
        }
    }
}
