// ABOUTME: Session state machine for a single provider sign-in surface
// ABOUTME: Tagged states prevent illegal combinations like loading-and-ready

/// Lifecycle of one provider sign-in session.
///
/// `Uninitialized → Initializing → Ready → Prompting → Exchanging →
/// Succeeded | Failed`. The credential only exists in `Succeeded`; error
/// text lives in a separate observable slot on the controller so it can
/// be cleared without a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Prompting,
    Exchanging,
    Succeeded { credential: String },
    Failed,
}

impl SessionState {
    /// Whether an asynchronous step is in flight (disable the sign-in button)
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::Initializing | Self::Prompting | Self::Exchanging
        )
    }

    /// Whether the session reached an outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed)
    }

    /// Credential captured by a successful exchange, if any
    pub fn credential(&self) -> Option<&str> {
        match self {
            Self::Succeeded { credential } => Some(credential),
            _ => None,
        }
    }
}
