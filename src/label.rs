//! Labels attached to states and transitions.
//!
//! The engine only needs to compare labels by value and hash them,
//! plus one extra bit of information: whether a label is *absent*.
//! An absent label plays the role of a missing value and is rejected
//! by every mutating operation of [`Lts`][crate::lts::Lts].

use std::fmt::Debug;
use std::hash::Hash;

/// A value that can label a state or a transition of an LTS.
pub trait Label: Clone + Eq + Hash + Debug {
    /// Does this label stand for "no value"?
    fn is_absent(&self) -> bool {
        false
    }
}

impl Label for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Label for &str {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Label> Label for Option<T> {
    fn is_absent(&self) -> bool {
        match self {
            None => true,
            Some(x) => x.is_absent(),
        }
    }
}

macro_rules! impl_label_for_primitives {
    ($($t:ty),*) => {
        $(impl Label for $t {})*
    };
}

impl_label_for_primitives!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_strings() {
        assert!("".is_absent());
        assert!(!"A".is_absent());
        assert!(String::new().is_absent());
        assert!(!String::from("S0").is_absent());
    }

    #[test]
    fn test_absent_options() {
        assert!(None::<u32>.is_absent());
        assert!(!Some(0u32).is_absent());
        assert!(Some("").is_absent());
    }

    #[test]
    fn test_primitives_never_absent() {
        assert!(!0u32.is_absent());
        assert!(!(-1i64).is_absent());
    }
}
