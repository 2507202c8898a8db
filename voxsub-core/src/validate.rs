//! Request validation: turn loosely typed JSON bodies into pipeline inputs.
//! Runs before any remote call or process is started.

use crate::config::TtsConfig;
use crate::error::{PipelineError, Result};
use crate::model::{SynthesisRequest, VoiceType};
use serde_json::Value;

/// Body of `text_to_audio`: `{ text, voiceModel? | audioModel?, speedRatio? }`.
/// Omitted voice/speed fall back to the configured defaults.
pub fn synthesis_request(body: &Value, defaults: &TtsConfig) -> Result<SynthesisRequest> {
    let text = match body.get("text") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(PipelineError::Validation("No text provided".to_string())),
    };

    let voice = match body.get("voiceModel").or_else(|| body.get("audioModel")) {
        None | Some(Value::Null) => defaults.default_voice,
        Some(Value::String(s)) => s
            .parse::<VoiceType>()
            .map_err(PipelineError::Validation)?,
        Some(other) => {
            return Err(PipelineError::Validation(format!(
                "voiceModel must be a string, got {}",
                other
            )))
        }
    };

    let speed = match body.get("speedRatio") {
        None | Some(Value::Null) => defaults.default_speed,
        Some(Value::Number(n)) => {
            let v = n.as_f64().unwrap_or(f64::NAN) as f32;
            if !(v.is_finite() && v > 0.0) {
                return Err(PipelineError::Validation(format!(
                    "speedRatio must be a positive number, got {}",
                    n
                )));
            }
            v
        }
        Some(other) => {
            return Err(PipelineError::Validation(format!(
                "speedRatio must be a number, got {}",
                other
            )))
        }
    };

    Ok(SynthesisRequest { text, voice, speed })
}

/// Body of `gen_audio_sub`: `{ audioUrl }`. Path safety is checked by the store.
pub fn audio_reference(body: &Value) -> Result<String> {
    match body.get("audioUrl") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(PipelineError::Validation("No audio URL provided".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_omitted() {
        let r = synthesis_request(&json!({"text": "hello world"}), &TtsConfig::default()).unwrap();
        assert_eq!(r.text, "hello world");
        assert_eq!(r.voice, VoiceType::ZhFemaleShuangkuaiEmo);
        assert_eq!(r.speed, 1.25);
    }

    #[test]
    fn explicit_voice_and_speed() {
        let r = synthesis_request(
            &json!({"text": "hi", "voiceModel": "en_male_smith_mars_bigtts", "speedRatio": 1}),
            &TtsConfig::default(),
        )
        .unwrap();
        assert_eq!(r.voice, VoiceType::EnMaleSmith);
        assert_eq!(r.speed, 1.0);

        let legacy = synthesis_request(
            &json!({"text": "hi", "audioModel": "P_4", "speedRatio": null}),
            &TtsConfig::default(),
        )
        .unwrap();
        assert_eq!(legacy.voice, VoiceType::EnFemaleAnna);
        assert_eq!(legacy.speed, 1.25);
    }

    #[test]
    fn missing_or_bad_text_is_validation_error() {
        for body in [
            json!({}),
            json!({"text": ""}),
            json!({"text": null}),
            json!({"text": 42}),
            json!({"text": ["a"]}),
            json!("just a string"),
        ] {
            let err = synthesis_request(&body, &TtsConfig::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{}", body);
        }
    }

    #[test]
    fn whitespace_text_is_still_text() {
        for text in ["   ", "\n"] {
            let r = synthesis_request(&json!({ "text": text }), &TtsConfig::default()).unwrap();
            assert_eq!(r.text, text);
        }
    }

    #[test]
    fn bad_voice_or_speed_is_validation_error() {
        let d = TtsConfig::default();
        assert!(synthesis_request(&json!({"text": "a", "voiceModel": "robot"}), &d).is_err());
        assert!(synthesis_request(&json!({"text": "a", "voiceModel": 3}), &d).is_err());
        assert!(synthesis_request(&json!({"text": "a", "speedRatio": 0}), &d).is_err());
        assert!(synthesis_request(&json!({"text": "a", "speedRatio": -1.5}), &d).is_err());
        assert!(synthesis_request(&json!({"text": "a", "speedRatio": "fast"}), &d).is_err());
    }

    #[test]
    fn audio_reference_requires_string() {
        assert_eq!(audio_reference(&json!({"audioUrl": "tts_123.mp3"})).unwrap(), "tts_123.mp3");
        assert!(audio_reference(&json!({})).is_err());
        assert!(audio_reference(&json!({"audioUrl": 1})).is_err());
        assert!(audio_reference(&json!({"audioUrl": ""})).is_err());
    }
}
