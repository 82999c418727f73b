//! CLI interface for the vector store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vecstore::{
    content_hash, DistanceMetric, Filter, IndexConfig, IndexType, Metadata, MetadataValue,
    SearchResult, StoreConfig, Vector, VectorStore,
};

#[derive(Parser)]
#[command(name = "vecstore")]
#[command(about = "An in-memory vector store with exact similarity search", long_about = None)]
struct Cli {
    /// Store file to operate on
    #[arg(long, global = true, default_value = "vecstore.vsto")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty store file
    Init {
        /// Vector dimension
        #[arg(short, long)]
        dimension: usize,
        /// Metric: cosine or euclidean
        #[arg(short, long, default_value = "cosine")]
        metric: DistanceMetric,
        /// Recorded index type (search is always brute force)
        #[arg(long, default_value = "flat")]
        index_type: IndexType,
        #[arg(long, default_value = "16")]
        m: usize,
        #[arg(long, default_value = "200")]
        ef_construction: usize,
        /// Overwrite an existing store file
        #[arg(long)]
        force: bool,
    },
    /// Add a vector
    Add {
        /// Vector ID
        id: String,
        /// Vector data as comma-separated values (e.g., "1.0,2.0,3.0")
        #[arg(short, long, allow_hyphen_values = true)]
        vector: Vector,
        /// Metadata field as key=value, repeatable
        #[arg(long = "meta", value_parser = parse_field)]
        meta: Vec<(String, MetadataValue)>,
    },
    /// Search for similar vectors
    Search {
        /// Query vector as comma-separated values (e.g., "1.0,2.0,3.0")
        #[arg(allow_hyphen_values = true)]
        query: Vector,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Only consider records whose field equals the value, repeatable
        #[arg(long = "filter", value_parser = parse_field)]
        filter: Vec<(String, MetadataValue)>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find the nearest neighbors of a stored vector
    Neighbors {
        id: String,
        #[arg(short, long, default_value = "5")]
        k: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show a stored record
    Get { id: String },
    /// Delete a vector
    Delete {
        /// Vector ID to delete
        id: String,
    },
    /// List all vector IDs
    List,
    /// Show store configuration and size
    Info,
    /// Print the content hash of a vector
    Hash {
        #[arg(allow_hyphen_values = true)]
        vector: Vector,
    },
}

fn parse_field(raw: &str) -> std::result::Result<(String, MetadataValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in {:?}", raw));
    }
    Ok((key.to_string(), MetadataValue::parse_loose(value)))
}

fn open(path: &Path) -> Result<VectorStore> {
    VectorStore::load(path).with_context(|| format!("opening store {}", path.display()))
}

fn print_results(results: &[SearchResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No results found");
        return Ok(());
    }
    println!("Top {} results:", results.len());
    for (i, result) in results.iter().enumerate() {
        let fields: Vec<String> = result
            .metadata
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!(
            "{}. {} (score: {:.4}) {}",
            i + 1,
            result.id,
            result.score,
            fields.join(" ")
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.store.as_path();
    match cli.command {
        Commands::Init {
            dimension,
            metric,
            index_type,
            m,
            ef_construction,
            force,
        } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let config = StoreConfig::new(dimension, metric).with_index(IndexConfig {
                index_type,
                m,
                ef_construction,
            });
            VectorStore::with_config(config)?.save(path)?;
            println!("Created {}-d {} store at {}", dimension, metric, path.display());
        }
        Commands::Add { id, vector, meta } => {
            let mut store = open(path)?;
            let metadata: Metadata = meta.into_iter().collect();
            store.add(id.clone(), vector, metadata)?;
            store.save(path)?;
            println!("Added vector with ID: {}", id);
        }
        Commands::Search {
            query,
            k,
            filter,
            json,
        } => {
            let store = open(path)?;
            let filter = filter
                .into_iter()
                .fold(Filter::new(), |f, (key, value)| f.equals(key, value));
            let filter = (!filter.is_empty()).then_some(filter);
            let results = store.search(query.as_slice(), k, filter.as_ref())?;
            print_results(&results, json)?;
        }
        Commands::Neighbors { id, k, json } => {
            let store = open(path)?;
            let results = store.neighbors(&id, k, None)?;
            print_results(&results, json)?;
        }
        Commands::Get { id } => {
            let store = open(path)?;
            let record = store.get(&id)?;
            println!("id: {}", record.id);
            println!("vector: {:?}", record.vector.as_slice());
            for (key, value) in record.metadata.iter() {
                println!("{}: {}", key, value);
            }
        }
        Commands::Delete { id } => {
            let mut store = open(path)?;
            store.delete(&id)?;
            store.save(path)?;
            println!("Deleted vector with ID: {}", id);
        }
        Commands::List => {
            let store = open(path)?;
            let ids = store.ids();
            if ids.is_empty() {
                println!("No vectors in store");
            } else {
                println!("Vector IDs ({} total):", ids.len());
                for id in ids {
                    println!("  - {}", id);
                }
            }
        }
        Commands::Info => {
            let store = open(path)?;
            println!("{}", serde_json::to_string_pretty(store.config())?);
            println!("records: {}", store.len());
        }
        Commands::Hash { vector } => {
            println!("{}", content_hash(vector.as_slice()));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
