use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fabler_core::extraction::extract_path;
use fabler_core::persist::{load_collection_or_default, load_stop_words, save_collection, save_stop_words, DataPaths};
use fabler_core::stopwords::FrequencyThresholds;
use fabler_core::{
    filter_collection, stem_collection, DocId, Document, Engine, GroundTruth, Hit, ModelKind, SearchOptions,
    SignatureParams, StopWords, DEFAULT_K,
};
use std::io::ErrorKind;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fabler")]
#[command(about = "Boolean, signature and vector retrieval over a fable collection", long_about = None)]
struct Cli {
    /// Directory holding collection.json and stopwords.json
    #[arg(long, global = true, default_value = "./data")]
    data: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the collection from a raw fable text file or a directory of them
    Extract {
        #[arg(long)]
        input: String,
    },
    /// Rebuild the stop-word list and refilter the collection
    Stopwords {
        #[arg(long, value_enum, default_value_t = StopWordMethod::List)]
        method: StopWordMethod,
        /// Word list for `--method list`; the built-in English list when omitted
        #[arg(long)]
        file: Option<String>,
        /// Crouch: terms in more than this share of documents are stop words
        #[arg(long, default_value_t = 0.5)]
        max_document_ratio: f64,
        /// Crouch: terms occurring at most this often are stop words
        #[arg(long, default_value_t = 1)]
        min_occurrences: usize,
    },
    /// List document ids and titles
    List,
    /// Print one document
    Show { id: DocId },
    /// Run a query
    Search {
        query: String,
        #[command(flatten)]
        model: ModelArgs,
        /// Print hits as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Report precision and recall against this ground truth file
        #[arg(long)]
        ground_truth: Option<String>,
    },
    /// Run every ground truth term as a query and report precision and recall
    Evaluate {
        #[arg(long)]
        ground_truth: String,
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StopWordMethod {
    List,
    Crouch,
}

#[derive(Args)]
struct ModelArgs {
    #[arg(long, default_value = "vector")]
    model: ModelKind,
    #[arg(long, default_value_t = false)]
    stop_words: bool,
    #[arg(long, default_value_t = false)]
    stemming: bool,
    /// Number of results for the vector model
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,
    /// Signature width in bits
    #[arg(long, default_value_t = 64)]
    bits: usize,
    /// Bits set per term signature
    #[arg(long, default_value_t = 3)]
    weight: usize,
    /// Terms per signature block
    #[arg(long, default_value_t = 4)]
    block_size: usize,
    /// Confirm signature candidates against the real terms
    #[arg(long, default_value_t = false)]
    verify: bool,
}

impl ModelArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions { stop_word_filtering: self.stop_words, stemming: self.stemming, k: self.k }
    }

    fn signature(&self) -> SignatureParams {
        SignatureParams { bits: self.bits, weight: self.weight, block_size: self.block_size, verify: self.verify }
    }

    fn engine(&self, collection: &[Document]) -> Result<Engine> {
        Ok(Engine::build(self.model, collection, self.options(), self.signature())?)
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let paths = DataPaths::new(&cli.data);

    match cli.command {
        Commands::Extract { input } => extract(&paths, &input),
        Commands::Stopwords { method, file, max_document_ratio, min_occurrences } => {
            let thresholds = FrequencyThresholds { max_document_ratio, min_occurrences };
            rebuild_stop_words(&paths, method, file.as_deref(), thresholds)
        }
        Commands::List => {
            let collection = load_collection_or_default(&paths.collection())?;
            if collection.is_empty() {
                println!("No documents.");
            }
            for doc in &collection {
                println!("{:>4}  {}", doc.id, doc.title);
            }
            Ok(())
        }
        Commands::Show { id } => {
            let collection = load_collection_or_default(&paths.collection())?;
            let doc = collection.iter().find(|d| d.id == id).with_context(|| format!("no document with id {id}"))?;
            println!("{}\n\n{}", doc.title, doc.raw_text);
            Ok(())
        }
        Commands::Search { query, model, json, ground_truth } => {
            let collection = load_collection_or_default(&paths.collection())?;
            let engine = model.engine(&collection)?;
            let (hits, took_ms) = timed_search(&engine, &query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
                eprintln!("Time taken for query processing: {took_ms:.3} ms");
            } else {
                print_hits(&collection, &hits);
                println!("Time taken for query processing: {took_ms:.3} ms");
            }
            if let Some(path) = ground_truth {
                let truth = GroundTruth::load(&path)?;
                let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
                println!("precision: {}", fmt_metric(truth.precision(&query, &ids)));
                println!("recall:    {}", fmt_metric(truth.recall(&query, &ids)));
            }
            Ok(())
        }
        Commands::Evaluate { ground_truth, model } => {
            let collection = load_collection_or_default(&paths.collection())?;
            evaluate(&collection, &model, &GroundTruth::load(&ground_truth)?)
        }
    }
}

/// Extract, stem and filter with the stored stop words, then persist.
fn extract(paths: &DataPaths, input: &str) -> Result<()> {
    let mut collection = extract_path(input)?;
    if collection.is_empty() {
        bail!("no fables found in {input}");
    }
    stem_collection(&mut collection);
    match load_stop_words(&paths.stop_words()) {
        Ok(stop_words) => filter_collection(&mut collection, &stop_words),
        Err(fabler_core::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("no stop-word list yet; run `fabler stopwords` to filter the collection");
        }
        Err(e) => return Err(e.into()),
    }
    save_collection(&paths.collection(), &collection)?;
    tracing::info!(input, num_docs = collection.len(), "collection extracted");
    println!("Extracted {} documents.", collection.len());
    Ok(())
}

fn rebuild_stop_words(
    paths: &DataPaths,
    method: StopWordMethod,
    file: Option<&str>,
    thresholds: FrequencyThresholds,
) -> Result<()> {
    let mut collection = load_collection_or_default(&paths.collection())?;
    let stop_words = match (method, file) {
        (StopWordMethod::List, Some(file)) => StopWords::load(file)?,
        (StopWordMethod::List, None) => StopWords::english(),
        (StopWordMethod::Crouch, _) => StopWords::by_frequency(&collection, thresholds),
    };
    save_stop_words(&paths.stop_words(), &stop_words)?;
    filter_collection(&mut collection, &stop_words);
    save_collection(&paths.collection(), &collection)?;
    println!("Saved {} stop words.", stop_words.len());
    Ok(())
}

fn evaluate(collection: &[Document], model: &ModelArgs, truth: &GroundTruth) -> Result<()> {
    let engine = model.engine(collection)?;
    let (mut precision_sum, mut recall_sum, mut n) = (0.0, 0.0, 0usize);
    for query in truth.queries() {
        let ids: Vec<DocId> = engine.search(query)?.iter().map(|h| h.doc_id).collect();
        let precision = truth.precision(query, &ids);
        let recall = truth.recall(query, &ids);
        println!("{query:<20} precision {:<8} recall {}", fmt_metric(precision), fmt_metric(recall));
        if let (Some(p), Some(r)) = (precision, recall) {
            precision_sum += p;
            recall_sum += r;
            n += 1;
        }
    }
    if n > 0 {
        println!("mean precision {:.3}, mean recall {:.3} over {n} queries", precision_sum / n as f64, recall_sum / n as f64);
    }
    Ok(())
}

/// Run one query on a built engine; the elapsed milliseconds cover the
/// search alone.
fn timed_search(engine: &Engine, query: &str) -> Result<(Vec<Hit>, f64)> {
    let start = Instant::now();
    let hits = engine.search(query)?;
    let took_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(query, hits = hits.len(), took_ms, "query processed");
    Ok((hits, took_ms))
}

fn print_hits(collection: &[Document], hits: &[Hit]) {
    if hits.is_empty() {
        println!("No results.");
    }
    for hit in hits {
        let title = collection.iter().find(|d| d.id == hit.doc_id).map_or("", |d| d.title.as_str());
        println!("{:.3}  {:>4}  {}", hit.score, hit.doc_id, title);
    }
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FABLES: &str = "FABLES\n\n\n\nThe Fox and the Grapes\n\nThe fox was jumping for the grapes.\n\n\n\
The Ant and the Grasshopper\n\nThe ant was working while the grasshopper sang.\n";

    #[test]
    fn extract_then_filter_with_stop_words() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("fables.txt");
        std::fs::write(&input, FABLES).unwrap();
        let paths = DataPaths::new(dir.path().join("data"));

        extract(&paths, input.to_str().unwrap()).unwrap();
        let docs = load_collection_or_default(&paths.collection()).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].stemmed_terms.is_some());
        assert!(docs[0].filtered_terms.is_none());

        rebuild_stop_words(&paths, StopWordMethod::List, None, FrequencyThresholds::default()).unwrap();
        let docs = load_collection_or_default(&paths.collection()).unwrap();
        assert_eq!(
            docs[0].filtered_terms.as_deref(),
            Some(&["fox".to_string(), "jumping".to_string(), "grapes".to_string()][..])
        );
        assert!(load_stop_words(&paths.stop_words()).unwrap().contains("the"));
    }

    #[test]
    fn extract_rejects_inputs_without_fables() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        std::fs::write(&input, "nothing here").unwrap();
        assert!(extract(&DataPaths::new(dir.path()), input.to_str().unwrap()).is_err());
    }

    #[test]
    fn timed_search_returns_hits_and_elapsed_time() {
        let docs = vec![Document::new(0, "a", "the fox runs"), Document::new(1, "b", "a cat sleeps")];
        let engine = Engine::build(ModelKind::Linear, &docs, SearchOptions::default(), SignatureParams::default()).unwrap();
        let (hits, took_ms) = timed_search(&engine, "-fox").unwrap();
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![1]);
        assert!(took_ms >= 0.0 && took_ms.is_finite());
        assert!(timed_search(&engine, "(fox").is_err());
    }

    #[test]
    fn metrics_format_missing_values() {
        assert_eq!(fmt_metric(None), "n/a");
        assert_eq!(fmt_metric(Some(0.5)), "0.500");
    }
}
