//! Fakes shared by unit tests.

use crate::error::{PipelineError, Result};
use crate::model::{SynthesisRequest, SynthesisResult};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::synth::Synthesizer;
use async_trait::async_trait;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&CommandSpec) -> std::io::Result<CommandOutput> + Send + Sync>;

/// Records every command and answers through a handler instead of spawning.
pub(crate) struct FakeRunner {
    handler: Handler,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn exiting(code: i32) -> Self {
        Self::new(move |_| Ok(exit(code)))
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        (self.handler)(spec)
    }
}

pub(crate) fn exit(code: i32) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        ..CommandOutput::default()
    }
}

/// Synthesizer returning canned audio, or a canned rejection.
pub(crate) struct FakeSynthesizer {
    pub(crate) reject_with: Option<String>,
    pub(crate) requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeSynthesizer {
    pub(crate) fn ok() -> Self {
        Self {
            reject_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rejecting(payload: &str) -> Self {
        Self {
            reject_with: Some(payload.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(payload) = &self.reject_with {
            return Err(PipelineError::Synthesis {
                message: "TTS failed with code 3001".to_string(),
                payload: Some(payload.clone()),
            });
        }
        Ok(SynthesisResult {
            audio: format!("audio:{}", request.text).into_bytes(),
            duration: "1960".to_string(),
            request_id: uuid::Uuid::new_v4(),
        })
    }
}
