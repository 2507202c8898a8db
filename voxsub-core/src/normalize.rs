//! Format normalization: compressed audio is transcoded to canonical wav in the output root.

use crate::config::TranscoderConfig;
use crate::error::{PipelineError, Result};
use crate::model::AudioFormat;
use crate::runner::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const CANONICAL_EXTENSION: &str = "wav";

/// Where the canonical copy of `source` lands: same stem, `.wav`, in `output_root`.
pub fn canonical_path(source: &Path, output_root: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(CANONICAL_EXTENSION);
    output_root.join(name)
}

pub struct Normalizer<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a TranscoderConfig,
    output_root: &'a Path,
}

impl<'a> Normalizer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a TranscoderConfig, output_root: &'a Path) -> Self {
        Self {
            runner,
            config,
            output_root,
        }
    }

    /// Transcoder invocation for `source` → `dest`.
    pub fn command(&self, source: &Path, dest: &Path) -> CommandSpec {
        CommandSpec::new(&self.config.program, self.config.timeout()).args([
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-ar".to_string(),
            self.config.sample_rate.to_string(),
            dest.to_string_lossy().to_string(),
            "-y".to_string(),
        ])
    }

    /// Returns the path alignment should use. Sources that need no transcoding
    /// are returned unchanged.
    pub async fn normalize(&self, source: &Path) -> Result<PathBuf> {
        let needs = AudioFormat::from_path(source).is_some_and(|f| f.requires_normalization());
        if !needs {
            info!(path = %source.display(), "audio already canonical, skipping transcode");
            return Ok(source.to_path_buf());
        }

        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            error!(path = %source.display(), "source audio not found");
            return Err(PipelineError::Transcoding(format!(
                "source audio not found: {}",
                source.display()
            )));
        }
        tokio::fs::create_dir_all(self.output_root).await.map_err(|e| {
            PipelineError::Transcoding(format!(
                "cannot create output directory {}: {}",
                self.output_root.display(),
                e
            ))
        })?;

        let dest = canonical_path(source, self.output_root);
        let spec = self.command(source, &dest);
        let output = self.runner.run(&spec).await.map_err(|e| {
            error!(command = %spec.display(), error = %e, "transcoder did not run");
            PipelineError::Transcoding(format!("{}: {}", self.config.program, e))
        })?;
        if !output.success() {
            error!(
                command = %spec.display(),
                code = ?output.code,
                stderr = %output.stderr_tail(20),
                "transcoder failed"
            );
            return Err(PipelineError::Transcoding(format!(
                "{} exited with {:?} converting {}",
                self.config.program,
                output.code,
                source.display()
            )));
        }

        info!(source = %source.display(), dest = %dest.display(), "converted to canonical wav");
        Ok(dest)
    }
}
