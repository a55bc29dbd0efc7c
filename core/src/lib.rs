//! In-memory inverted-file retrieval engine for sparse feature vectors.
//!
//! Documents are vectors of (term, value) pairs over a fixed vocabulary,
//! indexed into per-term posting lists. A search applies a weighting scheme
//! and a normalization to both sides, generates candidates by walking the
//! posting lists of the query's nonzero terms (or scanning every document),
//! scores them under one of seven distance/similarity metrics, and returns
//! the top-N per query. The index is immutable during search, so batches of
//! queries run in parallel against it.

pub mod distance;
pub mod error;
pub mod index;
pub mod norm;
pub mod rank;
pub mod search;
pub mod vector;
pub mod weight;

pub use distance::Distance;
pub use error::{Error, Result};
pub use index::{DocId, InvertedFile, Posting, TermId};
pub use norm::Norm;
pub use rank::{Hit, ScoreList};
pub use search::{search, SearchParams};
pub use vector::{DenseVector, Features, SparseVector};
pub use weight::Weighting;
