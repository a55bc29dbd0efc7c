use crate::distance::{Distance, VecStats, KL_ZERO};
use crate::error::{Error, Result};
use crate::index::{DocId, InvertedFile, TermId};
use crate::norm::Norm;
use crate::rank::{top_n, Hit, ScoreList};
use crate::vector::Features;
use crate::weight::{idf, Weighting};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Search configuration, resolved to enums once at the call boundary.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub weighting: Weighting,
    pub norm: Norm,
    pub distance: Distance,
    /// When true, only documents sharing at least one nonzero term with
    /// the query are candidates; when false every document is scored.
    pub overlap_only: bool,
    /// Result cap per query; 0 means no cap.
    pub nret: usize,
    /// Emit per-query diagnostic events. Never affects result values.
    pub verbose: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            weighting: Weighting::TfIdf,
            norm: Norm::L2,
            distance: Distance::Cos,
            overlap_only: true,
            nret: 0,
            verbose: false,
        }
    }
}

/// Per-call view of the index under one (weighting, normalization) choice:
/// each document's normalization divisor and aggregate stats. Computed once
/// per `search` call and shared read-only by every query in the batch; the
/// index itself is never mutated.
struct Prepared {
    divisor: Vec<f32>,
    stats: Vec<VecStats>,
}

impl Prepared {
    fn compute(index: &InvertedFile, weighting: Weighting, norm: Norm) -> Self {
        let n = index.num_docs() as usize;
        let mut raw = vec![VecStats::default(); n];
        for term in 0..index.num_terms() as TermId {
            let plist = index.postings(term);
            if plist.is_empty() {
                continue;
            }
            let idf_t = term_idf(index, weighting, term);
            for p in plist {
                let w = weighting.apply(p.val, idf_t);
                if w == 0.0 {
                    continue;
                }
                let s = &mut raw[p.doc as usize];
                s.nnz += 1;
                s.l1 += w.abs();
                s.l2sq += w * w;
            }
        }
        let mut divisor = Vec::with_capacity(n);
        let mut stats = Vec::with_capacity(n);
        for s in raw {
            let norm_val = match norm {
                Norm::None => 1.0,
                Norm::L0 => s.nnz as f32,
                Norm::L1 => s.l1,
                Norm::L2 => s.l2sq.sqrt(),
            };
            let d = norm.divisor(norm_val);
            divisor.push(d);
            stats.push(VecStats {
                nnz: s.nnz,
                l1: s.l1 / d,
                l2sq: s.l2sq / (d * d),
            });
        }
        Self { divisor, stats }
    }
}

/// Idf of `term` under `weighting`, 0.0 for schemes that ignore it.
#[inline]
fn term_idf(index: &InvertedFile, weighting: Weighting, term: TermId) -> f32 {
    if weighting.uses_idf() {
        idf(index.num_docs(), index.doc_freq(term))
    } else {
        0.0
    }
}

/// One query after weighting and normalization, with the aggregate stats
/// metric finalization needs. Transient, never stored in the index.
struct Query {
    terms: Vec<(TermId, f32)>,
    stats: VecStats,
    kl_base: f32,
}

fn build_query<V: Features>(raw: &V, index: &InvertedFile, params: &SearchParams) -> Query {
    let mut terms: Vec<(TermId, f32)> = Vec::with_capacity(raw.nnz());
    for (term, val) in raw.terms() {
        let w = params.weighting.apply(val, term_idf(index, params.weighting, term));
        if w != 0.0 {
            terms.push((term, w));
        }
    }
    let div = params
        .norm
        .divisor(params.norm.of(terms.iter().map(|&(_, w)| w)));
    if div != 1.0 {
        for (_, w) in terms.iter_mut() {
            *w /= div;
        }
    }
    let mut stats = VecStats::default();
    let mut kl_base = 0.0;
    for &(_, w) in &terms {
        stats.nnz += 1;
        stats.l1 += w.abs();
        stats.l2sq += w * w;
        if params.distance == Distance::Kl && w > 0.0 {
            kl_base += w * (w / KL_ZERO).ln();
        }
    }
    Query {
        terms,
        stats,
        kl_base,
    }
}

/// Walk the posting lists of the query's nonzero terms, reporting each
/// visited document's per-term contribution under the chosen metric.
fn walk_postings(
    index: &InvertedFile,
    prep: &Prepared,
    params: &SearchParams,
    query: &Query,
    mut visit: impl FnMut(DocId, f32),
) {
    for &(term, q_w) in &query.terms {
        let plist = index.postings(term);
        if plist.is_empty() {
            continue;
        }
        let idf_t = term_idf(index, params.weighting, term);
        for p in plist {
            let d_w = params.weighting.apply(p.val, idf_t) / prep.divisor[p.doc as usize];
            if d_w == 0.0 {
                continue;
            }
            visit(p.doc, params.distance.accumulate(q_w, d_w));
        }
    }
}

fn search_one<V: Features>(
    index: &InvertedFile,
    prep: &Prepared,
    params: &SearchParams,
    raw: &V,
) -> ScoreList {
    let query = build_query(raw, index, params);
    let dist = params.distance;
    let finalize = |doc: DocId, acc: f32| Hit {
        doc,
        score: dist.finalize(acc, &query.stats, &prep.stats[doc as usize], query.kl_base),
    };

    let hits: Vec<Hit> = if params.overlap_only {
        let mut acc: HashMap<DocId, f32> = HashMap::new();
        walk_postings(index, prep, params, &query, |doc, contrib| {
            *acc.entry(doc).or_insert(0.0) += contrib;
        });
        acc.into_iter().map(|(doc, a)| finalize(doc, a)).collect()
    } else {
        // Full scan: untouched documents finalize from a zero accumulator,
        // which equals the metric value for disjoint vectors.
        let mut acc = vec![0.0f32; index.num_docs() as usize];
        walk_postings(index, prep, params, &query, |doc, contrib| {
            acc[doc as usize] += contrib;
        });
        acc.iter()
            .enumerate()
            .map(|(doc, &a)| finalize(doc as DocId, a))
            .collect()
    };

    let candidates = hits.len();
    let out = top_n(hits, params.nret, dist.is_similarity());
    if params.verbose {
        debug!(
            query_terms = query.terms.len(),
            candidates,
            returned = out.len(),
            "query scored"
        );
    }
    out
}

/// Rank every query against the index, returning one score list per query.
///
/// Fails fast with `EmptyIndex` before any scoring when the index holds no
/// documents. Queries are independent and are dispatched in parallel; the
/// index and the per-call prepared view are only read.
pub fn search<V>(index: &InvertedFile, queries: &[V], params: &SearchParams) -> Result<Vec<ScoreList>>
where
    V: Features + Sync,
{
    if index.is_empty() {
        return Err(Error::EmptyIndex);
    }
    let start = Instant::now();
    let prep = Prepared::compute(index, params.weighting, params.norm);
    let lists: Vec<ScoreList> = queries
        .par_iter()
        .map(|q| search_one(index, &prep, params, q))
        .collect();
    if params.verbose {
        info!(
            queries = queries.len(),
            docs = index.num_docs(),
            took_s = start.elapsed().as_secs_f64(),
            "search complete"
        );
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::SparseVector;

    fn sparse(pairs: &[(TermId, f32)]) -> SparseVector {
        SparseVector::from_pairs(pairs.iter().copied())
    }

    fn index_of(docs: &[&[(TermId, f32)]], num_terms: usize) -> InvertedFile {
        let mut iv = InvertedFile::new(num_terms);
        for d in docs {
            iv.add(&sparse(d)).unwrap();
        }
        iv
    }

    #[test]
    fn empty_index_fails_before_scoring() {
        let iv = InvertedFile::new(8);
        let err = search(&iv, &[sparse(&[(0, 1.0)])], &SearchParams::default()).unwrap_err();
        assert_eq!(err, Error::EmptyIndex);
    }

    #[test]
    fn all_zero_query_yields_empty_overlap_set() {
        let iv = index_of(&[&[(0, 1.0)], &[(1, 1.0)]], 2);
        let params = SearchParams {
            weighting: Weighting::Bin,
            norm: Norm::None,
            ..Default::default()
        };
        let lists = search(&iv, &[sparse(&[])], &params).unwrap();
        assert!(lists[0].is_empty());
    }

    #[test]
    fn full_scan_scores_every_document_even_for_empty_query() {
        let iv = index_of(&[&[(0, 1.0)], &[(1, 1.0)], &[(2, 1.0)]], 3);
        let params = SearchParams {
            weighting: Weighting::Tf,
            norm: Norm::None,
            distance: Distance::L1,
            overlap_only: false,
            ..Default::default()
        };
        let lists = search(&iv, &[sparse(&[])], &params).unwrap();
        // distance to each unit document is its own mass
        assert_eq!(lists[0].len(), 3);
        assert!(lists[0].iter().all(|h| h.score == 1.0));
    }

    #[test]
    fn overlap_walk_and_full_scan_agree_on_shared_documents() {
        let docs: &[&[(TermId, f32)]] = &[
            &[(0, 2.0), (3, 1.0)],
            &[(1, 4.0), (3, 2.0), (5, 1.0)],
            &[(2, 1.0)],
            &[(0, 1.0), (5, 3.0)],
        ];
        let iv = index_of(docs, 6);
        let query = sparse(&[(0, 1.0), (3, 2.0), (5, 1.0)]);
        for distance in [
            Distance::L1,
            Distance::L2,
            Distance::Ham,
            Distance::Kl,
            Distance::Cos,
            Distance::Jac,
            Distance::HistInt,
        ] {
            let base = SearchParams {
                weighting: Weighting::Tf,
                norm: Norm::L1,
                distance,
                overlap_only: true,
                ..Default::default()
            };
            let overlap_lists = search(&iv, std::slice::from_ref(&query), &base).unwrap();
            let full_lists = search(
                &iv,
                std::slice::from_ref(&query),
                &SearchParams {
                    overlap_only: false,
                    ..base
                },
            )
            .unwrap();
            let (overlap, full) = (&overlap_lists[0], &full_lists[0]);
            for hit in overlap {
                let twin = full.iter().find(|h| h.doc == hit.doc).unwrap();
                assert!(
                    (twin.score - hit.score).abs() < 1e-5,
                    "{distance:?}: doc {} scored {} vs {}",
                    hit.doc,
                    hit.score,
                    twin.score
                );
            }
        }
    }

    #[test]
    fn repeated_searches_are_bit_identical() {
        let docs: &[&[(TermId, f32)]] = &[
            &[(0, 1.0), (1, 2.0)],
            &[(1, 1.0), (2, 1.0)],
            &[(0, 3.0), (2, 2.0)],
        ];
        let iv = index_of(docs, 3);
        let queries = vec![sparse(&[(0, 1.0), (2, 1.0)])];
        let params = SearchParams {
            nret: 2,
            ..Default::default()
        };
        let a = search(&iv, &queries, &params).unwrap();
        let b = search(&iv, &queries, &params).unwrap();
        assert_eq!(a, b);
    }
}
