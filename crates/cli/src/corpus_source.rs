use anyhow::{anyhow, bail, Context as AnyhowContext, Result};
use ndarray::Array2;
use ndarray_npy::{read_npy, ReadNpyError};
use product_vector_index::CorpusBatch;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect every `<stem>.npy` in `embeddings_dir` that has a `<stem>.csv` in `labels_dir`.
///
/// Files are visited in file-name order so the corpus layout is reproducible. An `.npy`
/// without labels is skipped; a pair that cannot be read is an error.
pub fn discover_batches(
    embeddings_dir: &Path,
    labels_dir: &Path,
    label_column: &str,
) -> Result<Vec<CorpusBatch>> {
    if !embeddings_dir.is_dir() {
        bail!(
            "Embeddings directory '{}' not found",
            embeddings_dir.display()
        );
    }

    let mut embedding_files: Vec<PathBuf> = fs::read_dir(embeddings_dir)
        .with_context(|| format!("Failed to list {}", embeddings_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "npy"))
        .collect();
    embedding_files.sort();

    let mut batches = Vec::with_capacity(embedding_files.len());
    for embedding_file in embedding_files {
        let Some(stem) = embedding_file.file_stem() else {
            continue;
        };
        let mut labels_name = stem.to_os_string();
        labels_name.push(".csv");
        let labels_file = labels_dir.join(labels_name);
        if !labels_file.is_file() {
            log::warn!(
                "Skipping {}: no labels at {}",
                embedding_file.display(),
                labels_file.display()
            );
            continue;
        }

        let identifiers = read_labels(&labels_file, label_column)?;
        let embeddings = read_embeddings(&embedding_file)?;
        log::debug!(
            "Read {} labels and {} embeddings from {}",
            identifiers.len(),
            embeddings.nrows(),
            embedding_file.display()
        );
        batches.push(CorpusBatch::new(identifiers, embeddings));
    }

    log::info!(
        "Found {} embedding/label pairs in {}",
        batches.len(),
        embeddings_dir.display()
    );
    Ok(batches)
}

/// Read a 2-D `.npy` matrix. `float64` files are narrowed to `f32`.
pub fn read_embeddings(path: &Path) -> Result<Array2<f32>> {
    match read_npy::<_, Array2<f32>>(path) {
        Ok(embeddings) => Ok(embeddings),
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let wide: Array2<f64> = read_npy(path)
                .with_context(|| format!("Failed to read embeddings from {}", path.display()))?;
            #[allow(clippy::cast_possible_truncation)]
            let narrowed = wide.mapv(|value| value as f32);
            Ok(narrowed)
        }
        Err(err) => Err(err)
            .with_context(|| format!("Failed to read embeddings from {}", path.display())),
    }
}

/// Read one column of a headed CSV file, in row order.
pub fn read_labels(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open labels {}", path.display()))?;
    let column_idx = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| anyhow!("Column '{column}' not found in {}", path.display()))?;

    let mut labels = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Failed to parse row {} of {}", row + 1, path.display()))?;
        labels.push(record.get(column_idx).unwrap_or_default().to_string());
    }
    Ok(labels)
}
