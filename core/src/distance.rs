use crate::error::Error;
use std::str::FromStr;

/// Floor substituted for a document weight of zero in KL divergence, so a
/// document missing a query term pays a large finite penalty instead of
/// producing an infinity.
pub(crate) const KL_ZERO: f32 = 1e-10;

/// Distance or similarity metric between a query and a document vector.
///
/// Every metric decomposes into per-term contributions over the terms both
/// vectors share, plus aggregate statistics of each vector on its own
/// ([`VecStats`]). The candidate walk accumulates [`Distance::accumulate`]
/// over posting-list overlap and [`Distance::finalize`] turns the
/// accumulator into the metric value; a document with no shared terms
/// finalizes from a zero accumulator, which equals the full formula for
/// disjoint vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// Sum of absolute component differences. Lower is better.
    L1,
    /// Euclidean distance. Lower is better.
    L2,
    /// Count of terms whose presence differs. Lower is better.
    Ham,
    /// KL divergence of the document from the query. Lower is better.
    Kl,
    /// Cosine similarity. Higher is better.
    Cos,
    /// Jaccard similarity of the nonzero term sets. Higher is better.
    Jac,
    /// Histogram intersection. Higher is better.
    HistInt,
}

/// Aggregate statistics of one weighted, normalized vector.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VecStats {
    /// Number of nonzero components.
    pub nnz: u32,
    /// Sum of absolute values.
    pub l1: f32,
    /// Sum of squared values.
    pub l2sq: f32,
}

impl Distance {
    /// True for metrics where larger scores are better matches; drives the
    /// ordering used by top-N selection.
    pub fn is_similarity(self) -> bool {
        matches!(self, Distance::Cos | Distance::Jac | Distance::HistInt)
    }

    /// Contribution of one term carried by both vectors.
    #[inline]
    pub(crate) fn accumulate(self, q: f32, d: f32) -> f32 {
        match self {
            Distance::L1 => q.abs() + d.abs() - (q - d).abs(),
            Distance::L2 | Distance::Cos => q * d,
            Distance::Ham | Distance::Jac => 1.0,
            Distance::Kl => {
                if q > 0.0 && d > 0.0 {
                    q * (d / KL_ZERO).ln()
                } else {
                    0.0
                }
            }
            Distance::HistInt => q.min(d),
        }
    }

    /// Finish one document's score from its overlap accumulator.
    ///
    /// `kl_base` is the query's self term `sum q_i * ln(q_i / KL_ZERO)`,
    /// precomputed once per query; other metrics ignore it.
    #[inline]
    pub(crate) fn finalize(self, acc: f32, q: &VecStats, d: &VecStats, kl_base: f32) -> f32 {
        match self {
            Distance::L1 => q.l1 + d.l1 - acc,
            Distance::L2 => (q.l2sq + d.l2sq - 2.0 * acc).max(0.0).sqrt(),
            Distance::Ham => q.nnz as f32 + d.nnz as f32 - 2.0 * acc,
            Distance::Kl => kl_base - acc,
            Distance::Cos => {
                let denom = (q.l2sq * d.l2sq).sqrt();
                if denom == 0.0 {
                    0.0
                } else {
                    acc / denom
                }
            }
            Distance::Jac => {
                let union = q.nnz as f32 + d.nnz as f32 - acc;
                if union == 0.0 {
                    0.0
                } else {
                    acc / union
                }
            }
            Distance::HistInt => acc,
        }
    }
}

impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "l1" => Ok(Distance::L1),
            "l2" => Ok(Distance::L2),
            "ham" => Ok(Distance::Ham),
            "kl" => Ok(Distance::Kl),
            "cos" => Ok(Distance::Cos),
            "jac" => Ok(Distance::Jac),
            "hist-int" => Ok(Distance::HistInt),
            other => Err(Error::InvalidDistance(other.to_string())),
        }
    }
}
