use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use config::{ConfigArgs, EmbedMode, ModelType, SearchConfig};
use product_vector_index::{EmbeddingProvider, SimilarityIndex, StubEmbedder, VectorStore};
use remote::HttpEmbedder;
use repl::{render_ranked, SearchOutput, SearchSession};
use std::io;
use std::path::PathBuf;

pub mod config;
pub mod corpus_source;
pub mod remote;
pub mod repl;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "product-search")]
#[command(about = "Exact semantic product search over precomputed embeddings", long_about = None)]
#[command(version)]
struct Cli {
    /// Embedding set to search (subdirectory of --embeddings-root)
    #[arg(long, value_enum)]
    model_type: Option<ModelType>,

    /// Root directory holding one subdirectory of .npy files per model type
    #[arg(long, default_value = "./embeddings")]
    embeddings_root: PathBuf,

    /// Directory holding the .csv label file for each .npy file
    #[arg(long, default_value = "./random_samples_1M")]
    labels_dir: PathBuf,

    /// CSV column holding the product name
    #[arg(long, default_value = "product_name")]
    label_column: String,

    /// Embedding service endpoint (overrides PRODUCT_SEARCH_EMBED_URL)
    #[arg(long)]
    embed_url: Option<String>,

    /// Embedding request timeout in seconds
    #[arg(long, default_value_t = 30)]
    embed_timeout_secs: u64,

    /// Override embedding backend in this process
    #[arg(long, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Number of results per query
    #[arg(short = 'k', long, default_value_t = 5)]
    top_k: usize,

    /// Run a single query and exit instead of prompting
    #[arg(short, long)]
    query: Option<String>,

    /// Print the single query result as JSON (requires --query)
    #[arg(long, requires = "query")]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn config_args(&self) -> ConfigArgs {
        ConfigArgs {
            model_type: self.model_type,
            embeddings_root: self.embeddings_root.clone(),
            labels_dir: self.labels_dir.clone(),
            label_column: self.label_column.clone(),
            embed_url: self.embed_url.clone(),
            embed_timeout_secs: self.embed_timeout_secs,
            embed_mode: self.embed_mode,
            top_k: self.top_k,
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    if !cli.verbose {
        builder.filter_module("reqwest", log::LevelFilter::Warn);
        builder.filter_module("hyper_util", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = SearchConfig::from_env(cli.config_args())?;
    log::debug!("Resolved configuration: {config:?}");

    let index = build_index(&config)?;
    let provider = make_provider(&config, index.dimension())?;
    let session = SearchSession::new(&index, provider.as_ref(), config.top_k);

    match cli.query.as_deref() {
        Some(query) => run_once(&session, query, config.top_k, cli.json).await,
        None => {
            let stdin = io::stdin().lock();
            let mut stdout = io::stdout().lock();
            session.run_interactive(stdin, &mut stdout).await
        }
    }
}

/// Load the configured corpus and normalize it into a ready index.
pub fn build_index(config: &SearchConfig) -> Result<SimilarityIndex> {
    let batches = corpus_source::discover_batches(
        &config.embeddings_dir(),
        &config.labels_dir,
        &config.label_column,
    )?;
    let store = VectorStore::load(batches).with_context(|| {
        format!(
            "Failed to load corpus from {}",
            config.embeddings_dir().display()
        )
    })?;

    log::info!("Number of products: {}", store.size());
    log::info!("Number of pre-computed embeddings: {}", store.embeddings().nrows());

    Ok(SimilarityIndex::build(&store))
}

fn make_provider(config: &SearchConfig, dimension: usize) -> Result<Box<dyn EmbeddingProvider>> {
    log::info!("Embedding mode: {}", config.embed_mode.as_str());
    let provider: Box<dyn EmbeddingProvider> = match config.embed_mode {
        EmbedMode::Remote => Box::new(HttpEmbedder::new(
            config.embed_url.clone(),
            config.embed_timeout,
        )?),
        EmbedMode::Stub => Box::new(StubEmbedder::new(dimension)),
    };
    Ok(provider)
}

async fn run_once(
    session: &SearchSession<'_>,
    query: &str,
    top_k: usize,
    json: bool,
) -> Result<()> {
    let (result, elapsed) = session
        .search(query)
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;

    if json {
        let output = SearchOutput {
            query,
            top_k,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            results: &result,
        };
        let mut text = serde_json::to_string_pretty(&output)?;
        text.push('\n');
        print_stdout(&text)
    } else {
        let mut text = format!("Took {:.4} seconds to search\n", elapsed.as_secs_f64());
        text.push_str(&render_ranked(&result));
        print_stdout(&text)
    }
}
