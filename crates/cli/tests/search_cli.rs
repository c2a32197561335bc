use assert_cmd::Command;
use ndarray::Array2;
use ndarray_npy::write_npy;
use predicates::prelude::*;
use product_vector_index::StubEmbedder;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DIM: usize = 16;

fn stub_rows(names: &[&str]) -> Array2<f32> {
    let stub = StubEmbedder::new(DIM);
    let rows: Vec<f32> = names.iter().flat_map(|name| stub.embed_one(name)).collect();
    Array2::from_shape_vec((names.len(), DIM), rows).unwrap()
}

fn write_pair(root: &Path, model_dir: &str, stem: &str, names: &[&str]) {
    let embeddings = root.join("embeddings").join(model_dir);
    let labels = root.join("random_samples_1M");
    fs::create_dir_all(&embeddings).unwrap();
    fs::create_dir_all(&labels).unwrap();

    write_npy(embeddings.join(format!("{stem}.npy")), &stub_rows(names)).unwrap();
    let mut csv = String::from("product_id,product_name\n");
    for (i, name) in names.iter().enumerate() {
        csv.push_str(&format!("{i},{name}\n"));
    }
    fs::write(labels.join(format!("{stem}.csv")), csv).unwrap();
}

/// Two labelled batches plus one unlabelled `.npy` of a different width that must be
/// skipped.
fn setup_corpus() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_pair(root, "semantic_model", "part_a", &["green tea", "rice cooker"]);
    write_pair(root, "semantic_model", "part_b", &["desk lamp", "yoga mat", "green tea"]);
    write_npy(
        root.join("embeddings/semantic_model/unlabelled.npy"),
        &Array2::<f32>::ones((2, DIM + 3)),
    )
    .unwrap();
    temp
}

#[allow(deprecated)]
fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("product-search").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("PRODUCT_SEARCH_MODEL_TYPE")
        .env_remove("PRODUCT_SEARCH_EMBED_URL")
        .env("PRODUCT_SEARCH_EMBEDDING_MODE", "stub");
    cmd
}

#[test]
fn one_shot_json_query_ranks_exact_match_first() {
    let temp = setup_corpus();
    let output = cli(temp.path())
        .args(["--query", "rice cooker", "--top-k", "3", "--json"])
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["query"], "rice cooker");
    assert_eq!(body["top_k"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["identifier"], "rice cooker");
    assert_eq!(results[0]["position"], 1);
    assert!((results[0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-5);
    let scores: Vec<f64> = results.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn duplicate_identifiers_keep_their_positions() {
    let temp = setup_corpus();
    let output = cli(temp.path())
        .args(["--query", "green tea", "--top-k", "2", "--json"])
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let results = body["results"].as_array().unwrap();
    // Same vector stored twice: both score 1.0, earlier position first.
    assert_eq!(results[0]["identifier"], "green tea");
    assert_eq!(results[0]["position"], 0);
    assert_eq!(results[1]["identifier"], "green tea");
    assert_eq!(results[1]["position"], 4);
}

#[test]
fn top_k_larger_than_corpus_returns_everything() {
    let temp = setup_corpus();
    let output = cli(temp.path())
        .args(["--query", "anything", "--top-k", "100", "--json"])
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["results"].as_array().unwrap().len(), 5);
}

#[test]
fn interactive_loop_prints_ranked_lines_until_exit() {
    let temp = setup_corpus();
    let assert = cli(temp.path())
        .write_stdin("desk lamp\n\nEXIT\nyoga mat\n")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("Took "));
    assert!(stdout.contains("[Rank 1 | Score: 1.0000] desk lamp"));
    assert!(stdout.contains("[Rank 5 | Score: "));
    assert!(!stdout.contains("[Rank 6"));
    // Prompted for "desk lamp", the blank line and "EXIT"; "yoga mat" is never read.
    assert_eq!(
        stdout.matches("Enter query (type \"exit\" to quit): ").count(),
        3
    );
    assert_eq!(stdout.matches("Took ").count(), 1);
}

#[test]
fn model_type_selects_embedding_directory() {
    let temp = setup_corpus();
    write_pair(temp.path(), "ckipbert", "part_a", &["paper towels"]);

    let output = cli(temp.path())
        .args(["--model-type", "ckipbert", "--query", "paper towels", "--json"])
        .output()
        .expect("command run");
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["identifier"], "paper towels");
}

#[test]
fn missing_embeddings_directory_fails() {
    let temp = tempdir().unwrap();
    cli(temp.path())
        .args(["--query", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn empty_corpus_fails() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("embeddings/semantic_model")).unwrap();
    cli(temp.path())
        .args(["--query", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corpus is empty"));
}

#[test]
fn mismatched_label_count_fails() {
    let temp = setup_corpus();
    write_npy(
        temp.path().join("embeddings/semantic_model/part_c.npy"),
        &stub_rows(&["a", "b", "c"]),
    )
    .unwrap();
    fs::write(
        temp.path().join("random_samples_1M/part_c.csv"),
        "product_name\na\nb\n",
    )
    .unwrap();

    cli(temp.path())
        .args(["--query", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 identifiers but 3 embedding rows"));
}

#[test]
fn zero_top_k_is_rejected() {
    let temp = setup_corpus();
    cli(temp.path())
        .args(["--query", "green tea", "--top-k", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("top_k"));
}

#[test]
fn zero_top_k_fails_before_the_interactive_loop() {
    let temp = setup_corpus();
    let assert = cli(temp.path())
        .args(["--top-k", "0"])
        .write_stdin("green tea\nexit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid top_k 0"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("Enter query"));
}

#[test]
fn negative_top_k_is_rejected() {
    let temp = setup_corpus();
    cli(temp.path())
        .args(["--query", "green tea", "--top-k=-1"])
        .assert()
        .failure();
}

#[test]
fn unreachable_embedding_service_is_reported() {
    let temp = setup_corpus();
    cli(temp.path())
        .env("PRODUCT_SEARCH_EMBEDDING_MODE", "remote")
        .args([
            "--embed-url",
            "http://127.0.0.1:9/api/embed",
            "--embed-timeout-secs",
            "2",
            "--query",
            "green tea",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Embedding provider error"));
}
