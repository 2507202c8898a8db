//! Data model: voices, audio formats, synthesis request/result, stored audio and alignment artifacts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Voice identifiers accepted by the remote synthesis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoiceType {
    #[serde(rename = "zh_female_tiexinnvsheng_mars_bigtts")]
    ZhFemaleTiexin,
    #[default]
    #[serde(rename = "zh_female_shuangkuaisisi_emo_v2_mars_bigtts")]
    ZhFemaleShuangkuaiEmo,
    #[serde(rename = "zh_female_cancan_mars_bigtts")]
    ZhFemaleCancan,
    #[serde(rename = "en_female_anna_mars_bigtts")]
    EnFemaleAnna,
    #[serde(rename = "en_male_dryw_mars_bigtts")]
    EnMaleDryw,
    #[serde(rename = "en_male_smith_mars_bigtts")]
    EnMaleSmith,
    #[serde(rename = "en_male_jackson_mars_bigtts")]
    EnMaleJackson,
    #[serde(rename = "zh_male_jieshuonansheng_mars_bigtts")]
    ZhMaleJieshuo,
}

impl VoiceType {
    pub const ALL: [VoiceType; 8] = [
        VoiceType::ZhFemaleTiexin,
        VoiceType::ZhFemaleShuangkuaiEmo,
        VoiceType::ZhFemaleCancan,
        VoiceType::EnFemaleAnna,
        VoiceType::EnMaleDryw,
        VoiceType::EnMaleSmith,
        VoiceType::EnMaleJackson,
        VoiceType::ZhMaleJieshuo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceType::ZhFemaleTiexin => "zh_female_tiexinnvsheng_mars_bigtts",
            VoiceType::ZhFemaleShuangkuaiEmo => "zh_female_shuangkuaisisi_emo_v2_mars_bigtts",
            VoiceType::ZhFemaleCancan => "zh_female_cancan_mars_bigtts",
            VoiceType::EnFemaleAnna => "en_female_anna_mars_bigtts",
            VoiceType::EnMaleDryw => "en_male_dryw_mars_bigtts",
            VoiceType::EnMaleSmith => "en_male_smith_mars_bigtts",
            VoiceType::EnMaleJackson => "en_male_jackson_mars_bigtts",
            VoiceType::ZhMaleJieshuo => "zh_male_jieshuonansheng_mars_bigtts",
        }
    }

    /// Legacy preset names used by older clients.
    fn from_preset(s: &str) -> Option<Self> {
        let v = match s {
            "P_1" | "P_10" => VoiceType::ZhFemaleTiexin,
            "P_2" | "P_8" => VoiceType::ZhFemaleShuangkuaiEmo,
            "P_3" => VoiceType::ZhFemaleCancan,
            "P_4" => VoiceType::EnFemaleAnna,
            "P_5" => VoiceType::EnMaleDryw,
            "P_6" => VoiceType::EnMaleSmith,
            "P_7" => VoiceType::EnMaleJackson,
            "P_9" => VoiceType::ZhMaleJieshuo,
            _ => return None,
        };
        Some(v)
    }
}

impl FromStr for VoiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceType::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .or_else(|| VoiceType::from_preset(s))
            .ok_or_else(|| format!("unsupported voice: {}", s))
    }
}

impl std::fmt::Display for VoiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio container/encoding, as named by the synthesis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    Mp3,
    Wav,
    OggOpus,
    Pcm,
}

impl AudioFormat {
    /// Encoding name sent to the synthesis API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::OggOpus => "ogg_opus",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::OggOpus => "ogg",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "ogg" | "opus" => Some(AudioFormat::OggOpus),
            "pcm" => Some(AudioFormat::Pcm),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Compressed formats are transcoded to canonical wav before alignment.
    pub fn requires_normalization(&self) -> bool {
        matches!(self, AudioFormat::Mp3 | AudioFormat::OggOpus)
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            "ogg_opus" => Ok(AudioFormat::OggOpus),
            "pcm" => Ok(AudioFormat::Pcm),
            _ => Err(format!("unsupported encoding: {}", s)),
        }
    }
}

/// One synthesis call. Built fresh per request; never shared or mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceType,
    pub speed: f32,
}

/// Decoded audio returned by a successful synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    /// Duration exactly as reported by the remote API (milliseconds, numeric string).
    pub duration: String,
    pub request_id: uuid::Uuid,
}

/// Audio written to the content store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAudioReference {
    pub file_name: String,
    /// Reference handed to clients; resolves under the upload root.
    pub public_path: String,
    pub format: AudioFormat,
    #[serde(skip)]
    pub path: PathBuf,
}

/// One timed subtitle segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(alias = "startTime")]
    pub start: f64,
    #[serde(alias = "endTime")]
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

/// Timing artifact produced by the external aligner, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentArtifact {
    pub subtitle_path: PathBuf,
    pub content: serde_json::Value,
}

impl AlignmentArtifact {
    /// Segments in declared order, if the artifact is (or holds under `segments`) a segment list.
    pub fn segments(&self) -> Vec<Segment> {
        let list = match &self.content {
            serde_json::Value::Array(_) => Some(&self.content),
            serde_json::Value::Object(map) => map.get("segments"),
            _ => None,
        };
        list.and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}
