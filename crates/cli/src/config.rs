use anyhow::{anyhow, ensure, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EMBED_URL: &str = "http://localhost:5000/api/embed";
pub const MODEL_TYPE_ENV: &str = "PRODUCT_SEARCH_MODEL_TYPE";
pub const EMBED_URL_ENV: &str = "PRODUCT_SEARCH_EMBED_URL";
pub const EMBED_MODE_ENV: &str = "PRODUCT_SEARCH_EMBEDDING_MODE";

/// Which precomputed embedding set to search. Each lives in its own subdirectory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModelType {
    #[default]
    #[value(name = "semantic_model", alias = "semantic-model")]
    SemanticModel,
    Ckipbert,
}

impl ModelType {
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::SemanticModel => "semantic_model",
            Self::Ckipbert => "ckipbert",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbedMode {
    /// POST query texts to the embedding service
    #[default]
    Remote,
    /// Deterministic local vectors (offline runs and tests)
    Stub,
}

impl EmbedMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Stub => "stub",
        }
    }
}

/// Options as given on the command line; unset ones fall back to the environment.
#[derive(Debug, Clone)]
pub struct ConfigArgs {
    pub model_type: Option<ModelType>,
    pub embeddings_root: PathBuf,
    pub labels_dir: PathBuf,
    pub label_column: String,
    pub embed_url: Option<String>,
    pub embed_timeout_secs: u64,
    pub embed_mode: Option<EmbedMode>,
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub model_type: ModelType,
    pub embeddings_root: PathBuf,
    pub labels_dir: PathBuf,
    pub label_column: String,
    pub embed_url: String,
    pub embed_timeout: Duration,
    pub embed_mode: EmbedMode,
    pub top_k: usize,
}

impl SearchConfig {
    pub fn from_env(args: ConfigArgs) -> Result<Self> {
        Self::resolve(args, |var| std::env::var(var).ok())
    }

    /// Merge `args` with values looked up through `env`. Flags win over the environment.
    pub fn resolve(args: ConfigArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        ensure!(
            args.top_k > 0,
            "Invalid top_k {}: must be at least 1",
            args.top_k
        );
        let model_type = match args.model_type {
            Some(model_type) => model_type,
            None => parse_env_enum(&env, MODEL_TYPE_ENV)?.unwrap_or_default(),
        };
        let embed_mode = match args.embed_mode {
            Some(mode) => mode,
            None => parse_env_enum(&env, EMBED_MODE_ENV)?.unwrap_or_default(),
        };
        let embed_url = args
            .embed_url
            .or_else(|| env(EMBED_URL_ENV))
            .unwrap_or_else(|| DEFAULT_EMBED_URL.to_string());

        Ok(Self {
            model_type,
            embeddings_root: args.embeddings_root,
            labels_dir: args.labels_dir,
            label_column: args.label_column,
            embed_url,
            embed_timeout: Duration::from_secs(args.embed_timeout_secs),
            embed_mode,
            top_k: args.top_k,
        })
    }

    /// Directory holding the `.npy` files of the selected model.
    #[must_use]
    pub fn embeddings_dir(&self) -> PathBuf {
        self.embeddings_root.join(self.model_type.dir_name())
    }
}

fn parse_env_enum<T: ValueEnum>(
    env: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>> {
    let Some(raw) = env(var) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    T::from_str(raw, true)
        .map(Some)
        .map_err(|err| anyhow!("Invalid {var} '{raw}': {err}"))
}
