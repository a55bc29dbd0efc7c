use crate::error::{Error, Result};
use crate::vector::Features;
use serde::{Deserialize, Serialize};

pub type TermId = u32;
pub type DocId = u32;

/// One entry in a term's posting list.
///
/// `val` is the raw term value as inserted; weighting schemes are applied
/// at query time, so switching schemes never requires a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocId,
    pub val: f32,
}

/// In-memory inverted file over a fixed vocabulary.
///
/// Built once by appending documents in dense id order, then read-only for
/// every search: posting lists stay sorted by ascending `doc`, and the
/// document frequency of a term is the length of its posting list.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedFile {
    postings: Vec<Vec<Posting>>,
    num_docs: u32,
}

impl InvertedFile {
    /// Empty index over a vocabulary of `num_terms` dense term ids.
    pub fn new(num_terms: usize) -> Self {
        Self {
            postings: vec![Vec::new(); num_terms],
            num_docs: 0,
        }
    }

    /// Append one document, assigning it the next dense id.
    ///
    /// Zero-valued components are skipped; a term id outside the
    /// vocabulary fails with `TermOutOfVocabulary` and leaves the index
    /// unchanged.
    pub fn add<V: Features>(&mut self, doc: &V) -> Result<DocId> {
        let vocab = self.postings.len();
        if let Some((term, _)) = doc.terms().find(|&(t, _)| t as usize >= vocab) {
            return Err(Error::TermOutOfVocabulary { term, vocab });
        }
        let id = self.num_docs;
        for (term, val) in doc.terms() {
            if val != 0.0 {
                self.postings[term as usize].push(Posting { doc: id, val });
            }
        }
        self.num_docs += 1;
        Ok(id)
    }

    /// Number of indexed documents.
    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// Vocabulary size.
    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    /// Document frequency of `term`: the length of its posting list.
    pub fn doc_freq(&self, term: TermId) -> u32 {
        self.postings(term).len() as u32
    }

    /// Posting list for `term`, sorted by ascending doc id. Empty for a
    /// term outside the vocabulary.
    pub fn postings(&self, term: TermId) -> &[Posting] {
        self.postings
            .get(term as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of postings across all terms.
    pub fn num_postings(&self) -> usize {
        self.postings.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::SparseVector;

    #[test]
    fn add_assigns_dense_ids_and_keeps_postings_sorted() {
        let mut iv = InvertedFile::new(4);
        let a = iv.add(&SparseVector::from_pairs([(0, 1.0), (2, 2.0)])).unwrap();
        let b = iv.add(&SparseVector::from_pairs([(2, 1.0)])).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(iv.num_docs(), 2);
        let plist = iv.postings(2);
        assert_eq!(plist.len(), 2);
        assert!(plist.windows(2).all(|w| w[0].doc < w[1].doc));
    }

    #[test]
    fn doc_freq_equals_posting_list_length() {
        let mut iv = InvertedFile::new(3);
        iv.add(&SparseVector::from_pairs([(0, 1.0), (1, 1.0)])).unwrap();
        iv.add(&SparseVector::from_pairs([(1, 2.0)])).unwrap();
        assert_eq!(iv.doc_freq(0), 1);
        assert_eq!(iv.doc_freq(1), 2);
        assert_eq!(iv.doc_freq(2), 0);
        assert_eq!(iv.num_postings(), 3);
    }

    #[test]
    fn out_of_vocabulary_term_is_rejected() {
        let mut iv = InvertedFile::new(2);
        let err = iv
            .add(&SparseVector::from_pairs([(0, 1.0), (9, 1.0)]))
            .unwrap_err();
        assert_eq!(err, Error::TermOutOfVocabulary { term: 9, vocab: 2 });
        // rejected document must not claim an id or leave partial postings
        assert_eq!(iv.num_docs(), 0);
        assert_eq!(iv.num_postings(), 0);
    }

    #[test]
    fn empty_document_still_gets_an_id() {
        let mut iv = InvertedFile::new(2);
        let id = iv.add(&SparseVector::from_pairs([])).unwrap();
        assert_eq!(id, 0);
        assert_eq!(iv.num_docs(), 1);
        assert_eq!(iv.num_postings(), 0);
    }
}
