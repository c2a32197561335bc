use anyhow::Result;
use product_vector_index::{search_text, EmbeddingProvider, QueryResult, SimilarityIndex};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

pub const PROMPT: &str = "Enter query (type \"exit\" to quit): ";
const EXIT_COMMAND: &str = "exit";

/// A ready index plus the provider that embeds query text for it.
pub struct SearchSession<'a> {
    index: &'a SimilarityIndex,
    provider: &'a dyn EmbeddingProvider,
    top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub query: &'a str,
    pub top_k: usize,
    pub elapsed_ms: f64,
    pub results: &'a QueryResult,
}

impl<'a> SearchSession<'a> {
    pub fn new(
        index: &'a SimilarityIndex,
        provider: &'a dyn EmbeddingProvider,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            provider,
            top_k,
        }
    }

    /// Embed `query` and rank the corpus against it, timing the whole round trip.
    pub async fn search(
        &self,
        query: &str,
    ) -> product_vector_index::Result<(QueryResult, Duration)> {
        let started = Instant::now();
        let result = search_text(self.index, self.provider, query, self.top_k).await?;
        Ok((result, started.elapsed()))
    }

    /// Prompt on `output`, answer each line of `input`, stop at `exit` or end of input.
    ///
    /// A failed search is logged and the loop moves on to the next query.
    pub async fn run_interactive<R, W>(&self, mut input: R, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();
        loop {
            output.write_all(PROMPT.as_bytes())?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }
            let query = line.trim();
            if query.eq_ignore_ascii_case(EXIT_COMMAND) {
                break;
            }
            if query.is_empty() {
                continue;
            }

            match self.search(query).await {
                Ok((result, elapsed)) => {
                    writeln!(output, "Took {:.4} seconds to search", elapsed.as_secs_f64())?;
                    output.write_all(render_ranked(&result).as_bytes())?;
                }
                Err(err) => log::error!("Search for '{query}' failed: {err}"),
            }
        }
        Ok(())
    }
}

/// One `[Rank i | Score: s] name` line per match.
#[must_use]
pub fn render_ranked(result: &QueryResult) -> String {
    let mut out = String::new();
    for (rank, item) in result.iter().enumerate() {
        let _ = writeln!(
            out,
            "[Rank {} | Score: {:.4}] {}",
            rank + 1,
            item.score,
            item.identifier
        );
    }
    out
}
