use crate::TermId;
use serde::{Deserialize, Serialize};

/// Read-only view of a feature vector over the vocabulary.
///
/// Weighting, normalization, and candidate generation are written against
/// this trait so sparse and dense inputs share one code path. `terms` must
/// yield strictly increasing term ids and only nonzero values.
pub trait Features {
    /// Number of nonzero components.
    fn nnz(&self) -> usize;
    /// Value at `term`, 0.0 when absent.
    fn get(&self, term: TermId) -> f32;
    /// Iterator over the nonzero (term, value) pairs, term-ascending.
    fn terms(&self) -> impl Iterator<Item = (TermId, f32)> + '_;
}

/// Sparse feature vector: sorted, deduplicated (term, value) pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparseVector {
    pairs: Vec<(TermId, f32)>,
}

impl SparseVector {
    /// Build from arbitrary (term, value) pairs: sorts by term, sums
    /// duplicates, and drops components that end up at zero.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TermId, f32)>) -> Self {
        let mut pairs: Vec<(TermId, f32)> = pairs.into_iter().collect();
        pairs.sort_unstable_by_key(|&(t, _)| t);
        let mut merged: Vec<(TermId, f32)> = Vec::with_capacity(pairs.len());
        for (t, v) in pairs {
            match merged.last_mut() {
                Some((last, acc)) if *last == t => *acc += v,
                _ => merged.push((t, v)),
            }
        }
        merged.retain(|&(_, v)| v != 0.0);
        Self { pairs: merged }
    }

    /// Pairs as stored, term-ascending.
    pub fn pairs(&self) -> &[(TermId, f32)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Features for SparseVector {
    fn nnz(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, term: TermId) -> f32 {
        match self.pairs.binary_search_by_key(&term, |&(t, _)| t) {
            Ok(i) => self.pairs[i].1,
            Err(_) => 0.0,
        }
    }

    fn terms(&self) -> impl Iterator<Item = (TermId, f32)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Dense feature vector addressed by term id.
///
/// The slice index is the term id, so the vector length is the vocabulary
/// size it spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenseVector {
    values: Vec<f32>,
}

impl DenseVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl Features for DenseVector {
    fn nnz(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    fn get(&self, term: TermId) -> f32 {
        self.values.get(term as usize).copied().unwrap_or(0.0)
    }

    fn terms(&self) -> impl Iterator<Item = (TermId, f32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(t, &v)| (t as TermId, v))
    }
}
