use anyhow::{bail, Context, Result};
use ivfile::{search, InvertedFile, SearchParams, SparseVector, TermId};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// One document or query as read from JSON/JSONL input.
#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: String,
    /// Sparse (term, value) pairs over the collection vocabulary.
    pub terms: Vec<(TermId, f32)>,
}

#[derive(Debug, Serialize)]
pub struct OutHit {
    /// External id of the matched document.
    pub id: String,
    /// Internal dense doc id, 0-based.
    pub doc: u32,
    pub score: f32,
}

/// Ranked output for one query, printed as one JSON line.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub hits: Vec<OutHit>,
}

/// Read documents from a JSON/JSONL file, or every such file under a
/// directory.
pub fn load_docs(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} not found", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc =
            serde_json::from_str(&line).with_context(|| format!("parsing {}", file.display()))?;
        out.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        v => out.push(serde_json::from_value(v)?),
    }
    Ok(())
}

/// An index together with the external ids of its documents, in dense
/// doc-id order.
pub struct Collection {
    pub index: InvertedFile,
    pub ids: Vec<String>,
}

/// Build the in-memory index from loaded documents. The vocabulary size is
/// taken from `vocab` when given, otherwise from the highest term id seen.
pub fn build_collection(docs: &[InputDoc], vocab: Option<usize>) -> Result<Collection> {
    let vocab = vocab.unwrap_or_else(|| {
        docs.iter()
            .flat_map(|d| d.terms.iter().map(|&(t, _)| t as usize + 1))
            .max()
            .unwrap_or(0)
    });
    let mut index = InvertedFile::new(vocab);
    let mut ids = Vec::with_capacity(docs.len());
    for doc in docs {
        let v = SparseVector::from_pairs(doc.terms.iter().copied());
        index
            .add(&v)
            .with_context(|| format!("indexing document {:?}", doc.id))?;
        ids.push(doc.id.clone());
    }
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.num_terms(),
        num_postings = index.num_postings(),
        "collection indexed"
    );
    Ok(Collection { index, ids })
}

/// Index `docs` and rank every query against them.
pub fn run_search(
    docs: &[InputDoc],
    queries: &[InputDoc],
    params: &SearchParams,
    vocab: Option<usize>,
) -> Result<Vec<QueryResult>> {
    let coll = build_collection(docs, vocab)?;
    let vectors: Vec<SparseVector> = queries
        .iter()
        .map(|q| SparseVector::from_pairs(q.terms.iter().copied()))
        .collect();

    let start = Instant::now();
    let lists = search(&coll.index, &vectors, params)?;
    tracing::info!(
        queries = queries.len(),
        took_s = start.elapsed().as_secs_f64(),
        "search complete"
    );

    Ok(queries
        .iter()
        .zip(lists)
        .map(|(q, hits)| QueryResult {
            query: q.id.clone(),
            hits: hits
                .into_iter()
                .map(|h| OutHit {
                    id: coll.ids[h.doc as usize].clone(),
                    doc: h.doc,
                    score: h.score,
                })
                .collect(),
        })
        .collect())
}
