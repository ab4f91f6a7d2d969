//! Synthesis pipeline — build collaborator seam and atomic JSON emission.
//!
//! Composition itself is pure; this is the one layer that touches the
//! filesystem. It checks the artifact source exists, drives the external
//! build collaborator, and writes the canonical graph JSON atomically
//! (temp file + rename) for the synthesis engine to pick up.

use crate::core::error::{BuildError, ComposeError};
use crate::core::types::{ArtifactReference, StackGraph};
use crate::synth::fingerprint::{canonical_json, fingerprint_graph};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The external build collaborator: receives the artifact specification
/// and must place exactly one artifact at the well-known output path.
pub trait ArtifactBuilder {
    fn build(&self, artifact: &ArtifactReference) -> Result<PathBuf, BuildError>;
}

/// Builder that records the declared output path without running anything.
/// Used when the real build is deferred to the deployment engine.
pub struct NoopBuilder;

impl ArtifactBuilder for NoopBuilder {
    fn build(&self, artifact: &ArtifactReference) -> Result<PathBuf, BuildError> {
        Ok(artifact.output_path())
    }
}

/// Synthesis failure: a composition error, or I/O while emitting.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a successful synthesis.
#[derive(Debug, Clone)]
pub struct SynthOutput {
    /// Where the graph JSON was written
    pub json_path: PathBuf,

    /// Artifact path reported by the build collaborator
    pub artifact_path: PathBuf,

    /// Fingerprint of the canonical graph form
    pub fingerprint: String,
}

/// Emit a composed graph: verify source paths, drive the builder, write
/// `<out_dir>/<name>.stack.json` atomically, and fingerprint the result.
pub fn synthesize(
    graph: &StackGraph,
    builder: &dyn ArtifactBuilder,
    out_dir: &Path,
) -> Result<SynthOutput, SynthError> {
    // Source paths must exist at synthesis time.
    let mut artifact_path = PathBuf::new();
    for compute in &graph.compute {
        if !compute.artifact.source_path.exists() {
            return Err(ComposeError::config(
                "artifact.source",
                format!(
                    "{} does not exist",
                    compute.artifact.source_path.display()
                ),
            )
            .into());
        }
        artifact_path = builder
            .build(&compute.artifact)
            .map_err(ComposeError::from)?;
    }

    let json = canonical_json(graph)?;
    let fingerprint = fingerprint_graph(graph)?;

    std::fs::create_dir_all(out_dir).map_err(|e| SynthError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    let json_path = out_dir.join(format!("{}.stack.json", graph.name));

    // Atomic write: temp file + rename
    let tmp_path = json_path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json).map_err(|e| SynthError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, &json_path).map_err(|e| SynthError::Io {
        path: json_path.clone(),
        source: e,
    })?;

    Ok(SynthOutput {
        json_path,
        artifact_path,
        fingerprint,
    })
}
