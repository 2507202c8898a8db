//! Pipeline orchestration: synthesize -> persist -> normalize -> align.
//!
//! Each invocation walks the states strictly in order and stops at the first failure.
//! Completed steps are never rolled back: audio stored before a later failure stays on disk.

use crate::align::Aligner;
use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};
use crate::model::{AlignmentArtifact, StoredAudioReference, SynthesisRequest};
use crate::normalize::Normalizer;
use crate::runner::CommandRunner;
use crate::store::AudioStore;
use crate::synth::Synthesizer;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Synthesizing,
    Persisting,
    Normalizing,
    Aligning,
    Complete,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed)
    }
}

/// What a full run starts from.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    Text(SynthesisRequest),
    /// Reference to audio already in the upload root; synthesis and persistence are skipped.
    StoredAudio(String),
}

/// Result of a synthesis-only invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TextToAudioResult {
    pub audio: StoredAudioReference,
    pub duration: String,
    pub stages: Vec<PipelineState>,
}

/// Result of a run that reached alignment.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Present when this run synthesized the audio.
    pub audio: Option<StoredAudioReference>,
    pub duration: Option<String>,
    pub normalized_path: PathBuf,
    pub alignment: AlignmentArtifact,
    pub stages: Vec<PipelineState>,
}

impl PipelineResult {
    pub fn normalized_file_name(&self) -> String {
        self.normalized_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Per-invocation state tracker.
struct Invocation {
    id: uuid::Uuid,
    state: PipelineState,
    stages: Vec<PipelineState>,
}

impl Invocation {
    fn start(kind: &'static str) -> Self {
        let id = uuid::Uuid::new_v4();
        info!(invocation = %id, kind, "pipeline started");
        Self {
            id,
            state: PipelineState::Idle,
            stages: vec![PipelineState::Idle],
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            !self.state.is_terminal() && next > self.state,
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        info!(invocation = %self.id, from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
        self.stages.push(next);
    }

    /// Log the failure against the state it happened in and pass the error through.
    fn fail(&mut self, err: PipelineError) -> PipelineError {
        error!(
            invocation = %self.id,
            state = ?self.state,
            kind = %err.kind(),
            error = %err,
            "pipeline failed"
        );
        self.state = PipelineState::Failed;
        self.stages.push(PipelineState::Failed);
        err
    }

    fn complete(mut self) -> Vec<PipelineState> {
        self.enter(PipelineState::Complete);
        self.stages
    }
}

/// Pipeline shared by all requests. Holds only immutable config and stateless collaborators.
pub struct Pipeline {
    config: ServiceConfig,
    synthesizer: Arc<dyn Synthesizer>,
    runner: Arc<dyn CommandRunner>,
    store: AudioStore,
}

impl Pipeline {
    pub fn new(
        config: ServiceConfig,
        synthesizer: Arc<dyn Synthesizer>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let store = AudioStore::new(config.storage.upload_root.clone());
        Self {
            config,
            synthesizer,
            runner,
            store,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Synthesize `request` and store the audio.
    pub async fn text_to_audio(&self, request: &SynthesisRequest) -> Result<TextToAudioResult> {
        let mut inv = Invocation::start("text_to_audio");
        let (audio, duration) = match self.synthesize_and_store(&mut inv, request).await {
            Ok(v) => v,
            Err(e) => return Err(inv.fail(e)),
        };
        Ok(TextToAudioResult {
            audio,
            duration,
            stages: inv.complete(),
        })
    }

    /// Normalize and align audio already in the upload root.
    pub async fn gen_audio_sub(&self, audio_url: &str) -> Result<PipelineResult> {
        self.run(PipelineInput::StoredAudio(audio_url.to_string())).await
    }

    pub async fn run(&self, input: PipelineInput) -> Result<PipelineResult> {
        let mut inv = Invocation::start(match input {
            PipelineInput::Text(_) => "text_to_sub",
            PipelineInput::StoredAudio(_) => "gen_audio_sub",
        });

        let (source, audio, duration) = match input {
            PipelineInput::Text(request) => {
                match self.synthesize_and_store(&mut inv, &request).await {
                    Ok((audio, duration)) => (audio.path.clone(), Some(audio), Some(duration)),
                    Err(e) => return Err(inv.fail(e)),
                }
            }
            PipelineInput::StoredAudio(url) => match self.store.resolve(&url) {
                Ok(path) => (path, None, None),
                Err(e) => return Err(inv.fail(e)),
            },
        };

        let output_root = &self.config.storage.output_root;

        inv.enter(PipelineState::Normalizing);
        let normalized = match Normalizer::new(self.runner.as_ref(), &self.config.transcoder, output_root)
            .normalize(&source)
            .await
        {
            Ok(p) => p,
            Err(e) => return Err(inv.fail(e)),
        };

        inv.enter(PipelineState::Aligning);
        let alignment = match Aligner::new(self.runner.as_ref(), &self.config.aligner, output_root)
            .align(&normalized)
            .await
        {
            Ok(a) => a,
            Err(e) => return Err(inv.fail(e)),
        };

        Ok(PipelineResult {
            audio,
            duration,
            normalized_path: normalized,
            alignment,
            stages: inv.complete(),
        })
    }

    async fn synthesize_and_store(
        &self,
        inv: &mut Invocation,
        request: &SynthesisRequest,
    ) -> Result<(StoredAudioReference, String)> {
        inv.enter(PipelineState::Synthesizing);
        let synthesized = self.synthesizer.synthesize(request).await?;
        info!(
            invocation = %inv.id,
            request_id = %synthesized.request_id,
            bytes = synthesized.audio.len(),
            duration = %synthesized.duration,
            "synthesized audio"
        );

        inv.enter(PipelineState::Persisting);
        let stored = self
            .store
            .persist(&synthesized.audio, self.config.tts.encoding)
            .await?;
        Ok((stored, synthesized.duration))
    }
}
