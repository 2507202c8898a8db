//! Service configuration (voxsub.toml): server, storage roots, TTS identity, transcoder, aligner.
//! Every field has a default so an empty file is a valid config.

use crate::model::{AudioFormat, VoiceType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TTS_ENDPOINT: &str = "https://openspeech.bytedance.com/api/v1/tts";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tts: TtsConfig,
    pub transcoder: TranscoderConfig,
    pub aligner: AlignerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Content store roots: synthesized/uploaded audio, and canonical output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_root: PathBuf,
    pub output_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: PathBuf::from("upload"),
            output_root: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TtsConfig {
    pub endpoint: String,
    pub appid: String,
    pub token: String,
    pub cluster: String,
    pub encoding: AudioFormat,
    pub default_voice: VoiceType,
    pub default_speed: f32,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TTS_ENDPOINT.to_string(),
            appid: String::new(),
            token: String::new(),
            cluster: "volcano_tts".to_string(),
            encoding: AudioFormat::Mp3,
            default_voice: VoiceType::default(),
            default_speed: 1.25,
            timeout_secs: 60,
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscoderConfig {
    pub program: String,
    pub sample_rate: u32,
    pub timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            sample_rate: 16000,
            timeout_secs: 120,
        }
    }
}

impl TranscoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External alignment command. It receives no per-file arguments and finds its input itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            args: vec!["sub.mjs".to_string()],
            working_dir: None,
            timeout_secs: 600,
        }
    }
}

impl AlignerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServiceConfig {
    /// Load from TOML string.
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let c: ServiceConfig = toml::from_str(s)?;
        Ok(c)
    }

    /// Load from file path.
    pub fn load_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {:?}: {}", path, e))?;
        Self::from_toml(&s)
    }

    /// Apply `VOXSUB_*` overrides from the given lookup (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("VOXSUB_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("VOXSUB_PORT is not a port number: {}", port))?;
        }
        if let Some(root) = lookup("VOXSUB_UPLOAD_ROOT") {
            self.storage.upload_root = PathBuf::from(root);
        }
        if let Some(root) = lookup("VOXSUB_OUTPUT_ROOT") {
            self.storage.output_root = PathBuf::from(root);
        }
        if let Some(appid) = lookup("VOXSUB_TTS_APPID") {
            self.tts.appid = appid;
        }
        if let Some(token) = lookup("VOXSUB_TTS_TOKEN") {
            self.tts.token = token;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.tts.default_speed.is_finite() && self.tts.default_speed > 0.0) {
            anyhow::bail!("tts.default_speed must be positive, got {}", self.tts.default_speed);
        }
        if self.transcoder.sample_rate == 0 {
            anyhow::bail!("transcoder.sample_rate must be non-zero");
        }
        for (name, secs) in [
            ("tts", self.tts.timeout_secs),
            ("transcoder", self.transcoder.timeout_secs),
            ("aligner", self.aligner.timeout_secs),
        ] {
            if secs == 0 {
                anyhow::bail!("{}.timeout_secs must be non-zero", name);
            }
        }
        if self.transcoder.program.trim().is_empty() {
            anyhow::bail!("transcoder.program is empty");
        }
        if self.aligner.program.trim().is_empty() {
            anyhow::bail!("aligner.program is empty");
        }
        if self.tts.endpoint.trim().is_empty() {
            anyhow::bail!("tts.endpoint is empty");
        }
        Ok(())
    }
}
