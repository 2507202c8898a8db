//! Speech synthesis client for the remote TTS API.

use crate::config::TtsConfig;
use crate::error::{PipelineError, Result};
use crate::model::{SynthesisRequest, SynthesisResult};
use crate::protocol::{TtsApiRequest, TtsApiResponse};
use async_trait::async_trait;
use base64::Engine;
use tracing::{debug, warn};

/// Turns text into audio bytes. The pipeline only talks to this trait.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult>;
}

/// `reqwest` client for the remote TTS endpoint. One attempt per call, bounded by `tts.timeout_secs`.
pub struct SynthesisClient {
    http: reqwest::Client,
    config: TtsConfig,
}

impl SynthesisClient {
    pub fn new(config: TtsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl Synthesizer for SynthesisClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        let request_id = uuid::Uuid::new_v4();
        let body = TtsApiRequest::new(&self.config, request, request_id);
        debug!(
            %request_id,
            voice = %request.voice,
            speed = request.speed,
            chars = request.text.chars().count(),
            "sending synthesis request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer;{}", self.config.token),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(%request_id, error = %e, "synthesis transport failure");
                let message = if e.is_timeout() {
                    format!("request {} timed out", request_id)
                } else {
                    format!("request {} failed: {}", request_id, e)
                };
                PipelineError::synthesis(message, None)
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            PipelineError::synthesis(format!("reading response for {}: {}", request_id, e), None)
        })?;
        debug!(%request_id, %status, bytes = raw.len(), "synthesis response received");

        decode_response(&raw, request_id)
    }
}

/// Validate a raw response body and decode its audio. The HTTP status is not consulted:
/// the remote API reports failures through `code`.
pub fn decode_response(raw: &str, request_id: uuid::Uuid) -> Result<SynthesisResult> {
    let parsed: TtsApiResponse = serde_json::from_str(raw).map_err(|e| {
        warn!(%request_id, error = %e, payload = raw, "malformed synthesis response");
        PipelineError::synthesis(format!("malformed response: {}", e), Some(raw.to_string()))
    })?;

    if !parsed.is_success() {
        warn!(%request_id, code = parsed.code, payload = raw, "synthesis rejected");
        return Err(PipelineError::synthesis(
            format!("TTS failed with code {}: {}", parsed.code, parsed.message),
            Some(raw.to_string()),
        ));
    }

    let data = parsed
        .data
        .as_deref()
        .ok_or_else(|| PipelineError::synthesis("response has no audio data", Some(raw.to_string())))?;
    let audio = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| PipelineError::synthesis(format!("audio is not base64: {}", e), Some(raw.to_string())))?;
    if audio.is_empty() {
        return Err(PipelineError::synthesis("response audio is empty", Some(raw.to_string())));
    }

    let duration = parsed
        .addition
        .map(|a| a.duration)
        .ok_or_else(|| PipelineError::synthesis("response has no duration", Some(raw.to_string())))?;
    if duration.trim().parse::<f64>().is_err() {
        return Err(PipelineError::synthesis(
            format!("duration is not numeric: {:?}", duration),
            Some(raw.to_string()),
        ));
    }

    Ok(SynthesisResult {
        audio,
        duration,
        request_id,
    })
}
