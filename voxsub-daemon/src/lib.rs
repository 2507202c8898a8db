//! voxsub daemon library: app builder for testing and serving.

mod error;
mod state;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use voxsub_core::{validate, PipelineInput, PipelineResult};

pub use error::ApiError;
pub use state::AppState;

/// Build the axum Router with the given state (used by main and tests).
/// Pipeline routes are served both at the root and under `/api`.
pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/text_to_audio", post(text_to_audio))
        .route("/gen_audio_sub", post(gen_audio_sub))
        .route("/text_to_sub", post(text_to_sub))
        .route("/v1/users", post(create_user));

    Router::new()
        .route("/health", get(health))
        .merge(api.clone())
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(state.upload_root()))
        .nest_service("/upload", ServeDir::new(state.upload_root()))
        .nest_service("/public", ServeDir::new(state.output_root()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Success envelope: `{ code: 200, data, ts }`.
#[derive(Serialize)]
struct Envelope<T> {
    code: u16,
    data: T,
    ts: i64,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: 200,
        data,
        ts: now_millis(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioData {
    duration: String,
    audio_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubtitleData {
    filename: String,
    saved_path: String,
    sub_json: Value,
}

impl From<PipelineResult> for SubtitleData {
    fn from(r: PipelineResult) -> Self {
        Self {
            filename: r.normalized_file_name(),
            saved_path: r.normalized_path.display().to_string(),
            sub_json: r.alignment.content,
        }
    }
}

#[derive(Serialize)]
struct TextToSubData {
    #[serde(flatten)]
    audio: AudioData,
    #[serde(flatten)]
    subtitles: SubtitleData,
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn text_to_audio(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<AudioData>>, ApiError> {
    let Json(body) = body?;
    let request = validate::synthesis_request(&body, &state.config().tts)?;
    let result = state.pipeline.text_to_audio(&request).await?;
    Ok(ok(AudioData {
        duration: result.duration,
        audio_url: result.audio.public_path,
    }))
}

async fn gen_audio_sub(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<SubtitleData>>, ApiError> {
    let Json(body) = body?;
    let audio_url = validate::audio_reference(&body)?;
    tracing::info!(%audio_url, "subtitle request");
    let result = state.pipeline.gen_audio_sub(&audio_url).await?;
    Ok(ok(SubtitleData::from(result)))
}

async fn text_to_sub(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<TextToSubData>>, ApiError> {
    let Json(body) = body?;
    let request = validate::synthesis_request(&body, &state.config().tts)?;
    let mut result = state.pipeline.run(PipelineInput::Text(request)).await?;
    let audio = AudioData {
        duration: result.duration.take().unwrap_or_default(),
        audio_url: result
            .audio
            .take()
            .map(|a| a.public_path)
            .unwrap_or_default(),
    };
    Ok(ok(TextToSubData {
        audio,
        subtitles: SubtitleData::from(result),
    }))
}

/// Placeholder registration: echoes the submitted name and email.
async fn create_user(body: Result<Json<Value>, JsonRejection>) -> Result<Json<Envelope<Value>>, ApiError> {
    let Json(body) = body?;
    tracing::info!(name = ?body.get("name"), email = ?body.get("email"), "user registration");
    Ok(ok(serde_json::json!({
        "name": body.get("name").cloned().unwrap_or(Value::Null),
        "email": body.get("email").cloned().unwrap_or(Value::Null),
    })))
}
