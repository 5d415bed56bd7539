use std::fmt::{Display, Formatter};

/// Handle to a state stored in an [`Lts`][crate::lts::Lts].
///
/// Handles are plain indices into the arena of the LTS that issued them.
/// They stay valid for the lifetime of that LTS, since states are never removed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the index of the state in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s@{}", self.0)
    }
}

/// Handle to a transition (edge) stored in an [`Lts`][crate::lts::Lts].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransitionId(u32);

impl TransitionId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the index of the transition in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for TransitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t@{}", self.0)
    }
}
