use thiserror::Error;

/// Errors reported by the mutating and querying operations of an LTS.
///
/// Every error is a violation of the caller's contract: the failed call
/// leaves the LTS exactly as it was before.
/// Offending labels are rendered with their `Debug` representation.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LtsError {
    #[error("cannot add an absent state to an LTS")]
    NullState,
    #[error("cannot add an absent transition to an LTS")]
    NullTransition,
    #[error("state {0} already belongs to this LTS")]
    DuplicateState(String),
    #[error("transition {0} already belongs to this LTS")]
    DuplicateTransition(String),
    #[error("state {0} does not belong to this LTS")]
    UnknownEndpoint(String),
    #[error("there is already a tau transition from {from} to {to} in this LTS")]
    DuplicateTauEdge { from: String, to: String },
}

pub type Result<T, E = LtsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = LtsError::DuplicateState(format!("{:?}", "S0"));
        assert_eq!(e.to_string(), "state \"S0\" already belongs to this LTS");

        let e = LtsError::DuplicateTauEdge {
            from: "A".to_string(),
            to: "B".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "there is already a tau transition from A to B in this LTS"
        );
    }
}
