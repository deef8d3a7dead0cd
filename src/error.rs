//! Error types for the collaborator surface.
//!
//! The pending-connection state machine itself never fails: stray events are
//! ignored and empty hit tests are just `None`. Errors only come from misuse of
//! the element tree or from invalid configuration.

use crate::tree::ElementId;

/// Reasons an element tree operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),
    #[error("element {0:?} is not a connector")]
    NotAConnector(ElementId),
    #[error("the root element cannot be removed")]
    CannotRemoveRoot,
}

/// Reasons a [`PendingConnectionConfig`](crate::PendingConnectionConfig) is invalid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("stroke thickness must be finite and non-negative, got {0}")]
    InvalidStrokeThickness(f32),
    #[error("dash array entry {index} must be finite and non-negative, got {value}")]
    InvalidDashEntry { index: usize, value: f32 },
}
