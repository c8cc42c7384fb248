//! State machine trait for status enums.
//!
//! Opportunity and application statuses implement this so every status change
//! goes through one validated path.

use super::ValidationError;

/// Status enum with an explicit transition table.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from `self` to `target` is allowed.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// All states reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Validated transition.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// No outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Off,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Red => vec![Light::Green, Light::Off],
                Light::Green => vec![Light::Red, Light::Off],
                Light::Off => vec![],
            }
        }
    }

    #[test]
    fn allowed_transition_returns_target() {
        assert_eq!(Light::Red.transition_to(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn disallowed_transition_reports_status_field() {
        let err = Light::Off.transition_to(Light::Red).unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn state_without_exits_is_terminal() {
        assert!(Light::Off.is_terminal());
        assert!(!Light::Red.is_terminal());
    }
}
