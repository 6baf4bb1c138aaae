use axum::{Json, extract::State};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;
use std::time::Instant;
use crate::error::ApiError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{Recognition, RecognizeRequest};
use crate::state::AppState;

const DEFAULT_MIME: &str = "image/jpeg";

// Photo bytes and mime type taken from the upload
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Accepts plain base64 or a `data:<mime>;base64,<payload>` URL.
/// A mime type inside the data URL wins over `mime_type`.
pub fn decode_image(req: &RecognizeRequest, max_bytes: usize) -> Result<DecodedImage, ApiError> {
    let raw = req.image.trim();
    let (url_mime, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| ApiError::BadRequest("data URL has no payload".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| ApiError::BadRequest("data URL must be base64 encoded".to_string()))?;
            (Some(mime.to_string()), payload)
        }
        None => (None, raw),
    };

    let mime_type = url_mime
        .or_else(|| req.mime_type.clone())
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MIME.to_string());
    if !mime_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!("unsupported mime type {}", mime_type)));
    }

    // reject before decoding: base64 is 4 chars per 3 bytes
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.len() / 4 * 3 > max_bytes.saturating_add(3) {
        return Err(ApiError::BadRequest(format!("image is larger than {} bytes", max_bytes)));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("image is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("image is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(ApiError::BadRequest(format!("image is larger than {} bytes", max_bytes)));
    }

    Ok(DecodedImage { bytes, mime_type })
}

pub async fn recognize_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecognizeRequest>,
) -> Result<Json<Recognition>, ApiError> {
    REQUEST_TOTAL.inc();
    let image = decode_image(&payload, state.max_image_bytes)?;

    let start_time = Instant::now();
    let result = state.vision.recognize(&image.bytes, &image.mime_type).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let recognition = result?;

    tracing::info!(
        model = state.vision.model(),
        destination = %recognition.name,
        confidence = recognition.confidence,
        "recognized destination"
    );
    Ok(Json(recognition))
}
