use crate::index::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked result: a document and its score under the chosen metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc: DocId,
    pub score: f32,
}

/// Ranked results for one query, best first.
pub type ScoreList = Vec<Hit>;

/// Best-first comparison: ascending score for distances, descending for
/// similarities, ties broken by ascending doc id. `total_cmp` keeps the
/// ordering total so repeated runs are bit-identical.
#[inline]
fn better(a: &Hit, b: &Hit, similarity: bool) -> Ordering {
    let by_score = if similarity {
        b.score.total_cmp(&a.score)
    } else {
        a.score.total_cmp(&b.score)
    };
    by_score.then_with(|| a.doc.cmp(&b.doc))
}

/// Select the `nret` best hits in order, or all of them when `nret == 0`.
///
/// Uses partial selection before sorting so a small `nret` against a large
/// candidate set never pays for a full sort.
pub(crate) fn top_n(mut hits: Vec<Hit>, nret: usize, similarity: bool) -> ScoreList {
    let cmp = |a: &Hit, b: &Hit| better(a, b, similarity);
    if nret > 0 && nret < hits.len() {
        hits.select_nth_unstable_by(nret - 1, cmp);
        hits.truncate(nret);
    }
    hits.sort_unstable_by(cmp);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(pairs: &[(DocId, f32)]) -> Vec<Hit> {
        pairs.iter().map(|&(doc, score)| Hit { doc, score }).collect()
    }

    #[test]
    fn zero_nret_returns_everything_ordered() {
        let out = top_n(hits(&[(0, 3.0), (1, 1.0), (2, 2.0)]), 0, false);
        let docs: Vec<_> = out.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![1, 2, 0]);
    }

    #[test]
    fn similarity_orders_descending() {
        let out = top_n(hits(&[(0, 0.2), (1, 0.9), (2, 0.5)]), 0, true);
        let docs: Vec<_> = out.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![1, 2, 0]);
    }

    #[test]
    fn nret_caps_the_result() {
        let out = top_n(hits(&[(0, 4.0), (1, 1.0), (2, 3.0), (3, 2.0)]), 2, false);
        let docs: Vec<_> = out.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![1, 3]);
    }

    #[test]
    fn nret_larger_than_candidates_returns_all_without_padding() {
        let out = top_n(hits(&[(0, 1.0), (1, 2.0)]), 10, false);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn equal_scores_tie_break_by_doc_id() {
        let out = top_n(hits(&[(3, 1.0), (1, 1.0), (2, 0.5), (0, 1.0)]), 0, true);
        let docs: Vec<_> = out.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![0, 1, 3, 2]);
    }

    #[test]
    fn tie_break_survives_partial_selection() {
        let mut pairs: Vec<(DocId, f32)> = (0..100).map(|d| (99 - d, 1.0)).collect();
        pairs.push((100, 0.0));
        let out = top_n(hits(&pairs), 5, false);
        let docs: Vec<_> = out.iter().map(|h| h.doc).collect();
        assert_eq!(docs, vec![100, 0, 1, 2, 3]);
    }
}
