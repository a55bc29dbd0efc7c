use crate::TermId;

/// Errors surfaced by the engine.
///
/// Scheme-name variants are produced by the `FromStr` impls at the call
/// boundary, so an unrecognized name fails before any index access.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Unrecognized weighting scheme name.
    #[error("unknown weighting function: {0:?}")]
    InvalidWeighting(String),
    /// Unrecognized normalization scheme name.
    #[error("unknown normalization function: {0:?}")]
    InvalidNormalization(String),
    /// Unrecognized distance/similarity metric name.
    #[error("unknown distance function: {0:?}")]
    InvalidDistance(String),
    /// Search was invoked against an index holding no documents.
    #[error("empty inverted file")]
    EmptyIndex,
    /// A document carried a term id outside the index vocabulary.
    #[error("term {term} out of vocabulary (size {vocab})")]
    TermOutOfVocabulary { term: TermId, vocab: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
