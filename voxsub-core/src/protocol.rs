//! Wire format of the remote TTS API (`POST api/v1/tts`, operation "query").

use crate::config::TtsConfig;
use crate::model::SynthesisRequest;
use serde::{Deserialize, Serialize};

/// Response code the remote API uses for a successful synthesis.
pub const CODE_SUCCESS: i64 = 3000;

/// Request body. `user.uid` and `request.reqid` are fresh per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsApiRequest {
    pub app: AppIdentity,
    pub user: User,
    pub audio: AudioParams,
    pub request: RequestParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppIdentity {
    pub appid: String,
    pub token: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioParams {
    pub voice_type: String,
    pub encoding: String,
    pub speed_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParams {
    pub reqid: String,
    pub text: String,
    pub operation: String,
}

impl TtsApiRequest {
    pub fn new(config: &TtsConfig, req: &SynthesisRequest, reqid: uuid::Uuid) -> Self {
        Self {
            app: AppIdentity {
                appid: config.appid.clone(),
                token: config.token.clone(),
                cluster: config.cluster.clone(),
            },
            user: User {
                uid: uuid::Uuid::new_v4().to_string(),
            },
            audio: AudioParams {
                voice_type: req.voice.as_str().to_string(),
                encoding: config.encoding.as_str().to_string(),
                speed_ratio: req.speed,
            },
            request: RequestParams {
                reqid: reqid.to_string(),
                text: req.text.clone(),
                operation: "query".to_string(),
            },
        }
    }
}

/// Response body. Failure responses usually omit `data` and `addition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsApiResponse {
    #[serde(default)]
    pub reqid: String,
    pub code: i64,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sequence: i64,
    /// Base64-encoded audio.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub addition: Option<Addition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addition {
    pub duration: String,
}

impl TtsApiResponse {
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}
