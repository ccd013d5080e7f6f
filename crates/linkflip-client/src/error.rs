use thiserror::Error;

/// Rejected state mutations. Nothing is changed or written when one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("No card with id {0}")]
    CardNotFound(String),

    #[error("Card order must list every card exactly once: {0}")]
    InvalidOrder(String),
}
