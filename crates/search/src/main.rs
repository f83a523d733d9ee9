//! Citechain CLI
//!
//! Builds the citation graph from a JSON file of paragraph rows and prints
//! query results as JSON:
//! - `paths`: canonical citation paths from one or more root paragraphs
//! - `upstream`: labeled graph of everything citing a paragraph
//! - `stats`: corpus counts

use anyhow::Context;
use citechain_common::config::{AppConfig, ObservabilityConfig};
use citechain_common::lookup::{create_lookup, CaseResolver};
use citechain_common::metrics::register_metrics;
use citechain_common::models::{CitationPath, ParagraphId, PathSet};
use citechain_common::VERSION;
use citechain_ingestion::{load_records, CitationParser};
use citechain_search::citation::{
    canonicalize, union_alternate, CitationGraph, CitationGraphBuilder, ContinuationSource,
    GraphContinuations, LabeledGraph, NoContinuations, PathEnumerator,
};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Citechain - paragraph citation chains in case law
#[derive(Parser, Debug)]
#[command(name = "citechain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default, config/{APP_ENV}, config/local)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate and canonicalize citation paths
    Paths {
        /// Paragraph rows: [{"case": ..., "number": ..., "text": ...}]
        #[arg(long)]
        input: PathBuf,

        /// Root paragraph as <case>_<number>; every citing paragraph when omitted
        #[arg(long = "root", value_name = "PARAGRAPH")]
        roots: Vec<ParagraphId>,

        /// Precomputed continuations: {"<case>_<number>": [[...], ...]}
        #[arg(long, conflicts_with = "alternate")]
        continuations: Option<PathBuf>,

        /// Paragraph rows of another language version, used for continuations
        /// and for paths missing from this version
        #[arg(long)]
        alternate: Option<PathBuf>,

        /// Maximum citation edges per path
        #[arg(long)]
        max_depth: Option<usize>,

        /// Maximum paths per root
        #[arg(long)]
        max_paths: Option<usize>,

        /// Print a labeled graph per root instead of path lists
        #[arg(long)]
        labeled: bool,
    },

    /// Labeled graph of every paragraph citing the given one
    Upstream {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_name = "PARAGRAPH")]
        paragraph: ParagraphId,
    },

    /// Corpus statistics
    Stats {
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy()),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&config.observability, cli.debug);
    register_metrics();
    info!("Starting Citechain v{}", VERSION);

    match cli.command {
        Command::Paths {
            input,
            roots,
            continuations,
            alternate,
            max_depth,
            max_paths,
            labeled,
        } => {
            let mut config = config;
            config.traversal.max_depth = max_depth.or(config.traversal.max_depth);
            config.traversal.max_paths = max_paths.or(config.traversal.max_paths);

            let graph = Arc::new(build_graph(&config, &input).await?);
            let roots = if roots.is_empty() {
                graph
                    .paragraphs()
                    .filter(|record| record.has_citations())
                    .map(|record| record.id.clone())
                    .collect()
            } else {
                roots
            };

            let enumerator = PathEnumerator::new(graph.clone(), &config.traversal);
            let sets = enumerator.enumerate_many(roots.clone()).await?;

            let sets = match (continuations, alternate) {
                (Some(path), _) => {
                    let source = load_continuations(&path)?;
                    canonicalize_all(sets, &source)
                }
                (None, Some(path)) => {
                    let other = Arc::new(build_graph(&config, &path).await?);
                    let other = PathEnumerator::new(other, &config.traversal);
                    let alternate_sets = other.enumerate_many(roots).await?;

                    let source = GraphContinuations::new(other);
                    canonicalize_all(sets, &source)
                        .into_iter()
                        .zip(alternate_sets)
                        .map(|(set, alt)| PathSet {
                            paths: union_alternate(set.paths, alt.paths),
                            ..set
                        })
                        .collect()
                }
                (None, None) => canonicalize_all(sets, &NoContinuations),
            };

            if labeled {
                let views: Vec<LabeledGraph> = sets
                    .iter()
                    .map(|set| LabeledGraph::from_paths(&graph, set))
                    .collect();
                print_json(&views)?;
            } else {
                print_json(&sets)?;
            }
        }

        Command::Upstream { input, paragraph } => {
            let graph = build_graph(&config, &input).await?;
            print_json(&LabeledGraph::upstream_of(&graph, &paragraph))?;
        }

        Command::Stats { input } => {
            let graph = build_graph(&config, &input).await?;
            print_json(&graph.stats())?;
        }
    }

    Ok(())
}

fn init_tracing(config: &ObservabilityConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn build_graph(config: &AppConfig, input: &Path) -> anyhow::Result<CitationGraph> {
    let parser = CitationParser::new(&config.parser, &config.resolver)?;
    let lookup = create_lookup(&config.lookup)?;
    let resolver = Arc::new(CaseResolver::from_config(lookup, &config.lookup));

    let records = load_records(input)
        .with_context(|| format!("failed to read paragraphs from {}", input.display()))?;

    let mut builder = CitationGraphBuilder::new(parser, resolver);
    builder.ingest(records).await;
    Ok(builder.build())
}

fn load_continuations(path: &Path) -> anyhow::Result<HashMap<ParagraphId, Vec<CitationPath>>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read continuations from {}", path.display()))?;
    let continuations: HashMap<ParagraphId, Vec<CitationPath>> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid continuations file {}", path.display()))?;
    info!(roots = continuations.len(), "Loaded continuations");
    Ok(continuations)
}

fn canonicalize_all<S: ContinuationSource + ?Sized>(sets: Vec<PathSet>, source: &S) -> Vec<PathSet> {
    sets.into_iter().map(|set| canonicalize(set, source)).collect()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
