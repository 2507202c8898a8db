//! Subtitle alignment: run the external aligner, then read back the JSON artifact it leaves
//! next to the canonical audio.

use crate::config::AlignerConfig;
use crate::error::{PipelineError, Result};
use crate::model::AlignmentArtifact;
use crate::runner::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Artifact location for a canonical audio file: same stem, `.json`, in `output_root`.
pub fn artifact_path(normalized: &Path, output_root: &Path) -> PathBuf {
    let mut name = normalized
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".json");
    output_root.join(name)
}

pub struct Aligner<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a AlignerConfig,
    output_root: &'a Path,
}

impl<'a> Aligner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a AlignerConfig, output_root: &'a Path) -> Self {
        Self {
            runner,
            config,
            output_root,
        }
    }

    /// The aligner gets no argument naming its input; it locates the audio by its own convention.
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.config.program, self.config.timeout())
            .args(self.config.args.iter().cloned())
            .current_dir(self.config.working_dir.clone())
    }

    pub async fn align(&self, normalized: &Path) -> Result<AlignmentArtifact> {
        let spec = self.command();
        let output = self.runner.run(&spec).await.map_err(|e| {
            error!(command = %spec.display(), error = %e, "aligner did not run");
            PipelineError::AlignmentProcess(format!("{}: {}", spec.display(), e))
        })?;
        if !output.stdout.trim().is_empty() {
            info!(stdout = %output.stdout.trim(), "aligner output");
        }
        if !output.success() {
            error!(
                command = %spec.display(),
                code = ?output.code,
                stderr = %output.stderr_tail(20),
                "aligner failed"
            );
            return Err(PipelineError::AlignmentProcess(format!(
                "{} exited with {:?}",
                spec.display(),
                output.code
            )));
        }
        if !output.stderr.trim().is_empty() {
            warn!(stderr = %output.stderr_tail(20), "aligner wrote to stderr");
        }

        let path = artifact_path(normalized, self.output_root);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "alignment artifact missing");
            PipelineError::ArtifactRead {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        let content: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            error!(path = %path.display(), error = %e, "alignment artifact is not JSON");
            PipelineError::ArtifactRead {
                path: path.clone(),
                message: format!("invalid JSON: {}", e),
            }
        })?;

        info!(path = %path.display(), "read alignment artifact");
        Ok(AlignmentArtifact {
            subtitle_path: path,
            content,
        })
    }
}
