//! `ocflv verify`: run a verification directly against the object store.
//!
//! The input file is the same JSON object the HTTP endpoints take: logical
//! paths mapped to expected digests. On failure the per-path error map is
//! printed as JSON and the command exits with status 1.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ocflv_core::{ObjectId, ObjectStore, Verifier, VerifyError, VerifyMode, DEFAULT_CONCURRENCY};

/// Verify subcommand arguments.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Numeric object id.
    #[arg(long)]
    pub id: u64,

    /// JSON file mapping logical paths to expected digests.
    #[arg(long)]
    pub input: PathBuf,

    /// Check only the supplied paths (update mode) instead of the full head state.
    #[arg(long)]
    pub update: bool,

    /// Bound on concurrently running checks.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

impl VerifyArgs {
    pub fn mode(&self) -> VerifyMode {
        if self.update {
            VerifyMode::Update
        } else {
            VerifyMode::Ingest
        }
    }
}

/// Execute the verify subcommand against `store`.
pub async fn run_verify(args: &VerifyArgs, store: Arc<dyn ObjectStore>) -> Result<u8> {
    let expected = read_input(&args.input)?;
    let id = ObjectId(args.id);
    let mode = args.mode();
    let verifier = Verifier::new(store).with_concurrency(args.concurrency);

    match verifier.verify(mode, id, expected).await {
        Ok(()) => {
            println!("object {id} verified ({mode})");
            Ok(0)
        }
        Err(VerifyError::Failed(errors)) => {
            println!("{}", serde_json::to_string_pretty(&errors)?);
            eprintln!("object {id} failed {mode} verification with {} error(s)", errors.len());
            Ok(1)
        }
        Err(err) => Err(err).with_context(|| format!("{mode} verification of object {id} did not run")),
    }
}

/// Read the path-to-digest map from `path`.
pub fn read_input(path: &Path) -> Result<HashMap<String, String>> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("{} must be a JSON object of path to digest", path.display()))
}
