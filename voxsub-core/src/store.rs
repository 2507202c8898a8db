//! Content store for synthesized audio under the configured upload root.

use crate::error::{PipelineError, Result};
use crate::model::{AudioFormat, StoredAudioReference};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Writes audio as `tts_<millis>.<ext>`. Stamps are strictly increasing within the process
/// and files are opened create-new, so two writes never share a name.
#[derive(Debug)]
pub struct AudioStore {
    root: PathBuf,
    last_stamp: AtomicI64,
}

impl AudioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Next stamp: the wall clock in milliseconds, bumped past the previous stamp if needed.
    fn next_stamp(&self) -> i64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last_stamp
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    pub async fn persist(&self, audio: &[u8], format: AudioFormat) -> Result<StoredAudioReference> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| PipelineError::Storage {
                path: self.root.clone(),
                source,
            })?;

        loop {
            let file_name = format!("tts_{}.{}", self.next_stamp(), format.extension());
            let path = self.root.join(&file_name);
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match file {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "name taken, retrying with next stamp");
                    continue;
                }
                Err(source) => return Err(PipelineError::Storage { path, source }),
            };

            let written = async {
                file.write_all(audio).await?;
                file.flush().await
            }
            .await;
            if let Err(source) = written {
                return Err(PipelineError::Storage { path, source });
            }

            info!(path = %path.display(), bytes = audio.len(), "stored audio");
            return Ok(StoredAudioReference {
                public_path: file_name.clone(),
                file_name,
                format,
                path,
            });
        }
    }

    /// Map a public audio reference back to a path under the root.
    /// Absolute references and `..` components are rejected.
    pub fn resolve(&self, audio_url: &str) -> Result<PathBuf> {
        let trimmed = audio_url.trim();
        let relative = Path::new(trimmed);
        if trimmed.is_empty() || relative.file_name().is_none() {
            return Err(PipelineError::Validation(format!(
                "audioUrl does not name a file: {:?}",
                audio_url
            )));
        }
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(PipelineError::Validation(format!(
                "audioUrl must be relative to the upload root: {:?}",
                audio_url
            )));
        }
        Ok(self.root.join(relative))
    }
}
