use anyhow::Result;
use clap::{Parser, Subcommand};
use ivfile::{Distance, Norm, SearchParams, Weighting};
use ivquery::{load_docs, run_search};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ivquery")]
#[command(about = "Rank feature-vector queries against an in-memory inverted file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a document collection and rank queries against it
    Search {
        /// Documents: JSON/JSONL file or directory of such files
        #[arg(long)]
        docs: PathBuf,
        /// Queries: JSON/JSONL file or directory of such files
        #[arg(long)]
        queries: PathBuf,
        /// Term weighting: none, bin, tf, tfidf
        #[arg(long, default_value = "tfidf")]
        weighting: String,
        /// Vector normalization: none, l0, l1, l2
        #[arg(long, default_value = "l2")]
        norm: String,
        /// Distance/similarity: l1, l2, ham, kl, cos, jac, hist-int
        #[arg(long, default_value = "cos")]
        distance: String,
        /// Only score documents sharing a term with the query
        #[arg(long, default_value_t = true)]
        overlap_only: bool,
        /// Results per query; 0 returns the full ranking
        #[arg(long, default_value_t = 10)]
        nret: usize,
        /// Vocabulary size; inferred from the documents when omitted
        #[arg(long)]
        vocab_size: Option<usize>,
        /// Per-query diagnostic logging
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            docs,
            queries,
            weighting,
            norm,
            distance,
            overlap_only,
            nret,
            vocab_size,
            verbose,
        } => {
            let params = SearchParams {
                weighting: weighting.parse::<Weighting>()?,
                norm: norm.parse::<Norm>()?,
                distance: distance.parse::<Distance>()?,
                overlap_only,
                nret,
                verbose,
            };
            let docs = load_docs(&docs)?;
            let queries = load_docs(&queries)?;
            for result in run_search(&docs, &queries, &params, vocab_size)? {
                println!("{}", serde_json::to_string(&result)?);
            }
            Ok(())
        }
    }
}
