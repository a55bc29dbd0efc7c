use crate::error::Error;
use std::str::FromStr;

/// Term weighting scheme applied to raw occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Values are already final weights; use them unmodified.
    None,
    /// Presence indicator: 1.0 for any nonzero count.
    Bin,
    /// Term frequency: the raw count itself.
    Tf,
    /// Term frequency scaled by ln(N / df).
    TfIdf,
}

impl Weighting {
    /// Weight one raw term value. `idf` is only consulted by `TfIdf`.
    #[inline]
    pub fn apply(self, raw: f32, idf: f32) -> f32 {
        match self {
            Weighting::None | Weighting::Tf => raw,
            Weighting::Bin => {
                if raw != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Weighting::TfIdf => raw * idf,
        }
    }

    /// Whether this scheme needs the per-term idf table.
    pub(crate) fn uses_idf(self) -> bool {
        matches!(self, Weighting::TfIdf)
    }
}

/// Inverse document frequency of a term, df clamped to 1 so a term absent
/// from every document stays finite.
#[inline]
pub(crate) fn idf(num_docs: u32, doc_freq: u32) -> f32 {
    (num_docs as f32 / doc_freq.max(1) as f32).ln()
}

impl FromStr for Weighting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "none" => Ok(Weighting::None),
            "bin" => Ok(Weighting::Bin),
            "tf" => Ok(Weighting::Tf),
            "tfidf" => Ok(Weighting::TfIdf),
            other => Err(Error::InvalidWeighting(other.to_string())),
        }
    }
}
