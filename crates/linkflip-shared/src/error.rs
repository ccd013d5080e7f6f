use thiserror::Error;

/// Why a pasted link could not be turned into a card.
///
/// The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizeError {
    #[error("Enter a link to add")]
    EmptyInput,

    #[error("This link is not from a supported platform")]
    UnsupportedPlatform,
}
