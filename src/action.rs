use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::label::Label;

/// Classification of the actions of an HMI-LTS.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ActionKind {
    /// Performed by the operator.
    Command,
    /// Performed by the machine and perceived by the operator.
    Observation,
    /// Internal step, invisible to the operator.
    Tau,
}

impl ActionKind {
    pub const fn is_observable(self) -> bool {
        !matches!(self, ActionKind::Tau)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Command => write!(f, "command"),
            ActionKind::Observation => write!(f, "observation"),
            ActionKind::Tau => write!(f, "tau"),
        }
    }
}

/// Action labelling the transitions of an HMI-LTS.
///
/// Two actions are equal iff their names are equal; the kind is not part of
/// the identity. Actions are immutable once created.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Command)
    }
    pub fn observation(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Observation)
    }
    pub fn tau(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Tau)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn is_command(&self) -> bool {
        self.kind == ActionKind::Command
    }
    pub fn is_observation(&self) -> bool {
        self.kind == ActionKind::Observation
    }
    pub fn is_tau(&self) -> bool {
        self.kind == ActionKind::Tau
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Action {}

// Must agree with `PartialEq`: only the name is hashed.
impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for Action {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Label for Action {
    fn is_absent(&self) -> bool {
        self.name.is_empty()
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_kind() {
        let a0 = Action::new("A0", ActionKind::Command);
        let a1 = Action::new("A1", ActionKind::Observation);
        let a2 = Action::new("A2", ActionKind::Tau);

        assert_eq!(a0.kind(), ActionKind::Command);
        assert_eq!(a1.kind(), ActionKind::Observation);
        assert_eq!(a2.kind(), ActionKind::Tau);

        assert!(a0.is_command());
        assert!(a1.is_observation());
        assert!(a2.is_tau());
        assert!(!a2.kind().is_observable());
    }

    #[test]
    fn test_equality_by_name() {
        let a = Action::command("press");
        let b = Action::observation("press");
        let c = Action::command("release");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Action> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("press"));
        assert!(!set.contains("hold"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::command("start").to_string(), "start");
        assert_eq!(ActionKind::Observation.to_string(), "observation");
    }

    #[test]
    fn test_absent() {
        assert!(Action::command("").is_absent());
        assert!(!Action::tau("t").is_absent());
    }
}
