//! Validated status transitions.

use super::ValidationError;

/// A status enum with a fixed set of legal transitions.
///
/// Implementors list their outgoing edges; `transition_to` and `is_terminal`
/// follow from that.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Legal targets from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns the target state, or an error if the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
