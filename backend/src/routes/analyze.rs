//! Live frame analysis endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use sentio_common::{AnalyzeRequest, AnalyzeResponse};

use crate::error::ApiError;
use crate::vision::FrameAnalysis;
use crate::AppState;

/// POST /analyze - classify the emotion on a single webcam frame.
///
/// Frames arriving while another frame is in flight, or sooner than the
/// configured interval after the last processed frame, are answered with the
/// neutral "No Face" payload. The browser streams frames continuously, so
/// dropping is cheaper than queueing.
async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let permit = match state.throttle.try_admit(Utc::now()) {
        Ok(permit) => permit,
        Err(reason) => {
            tracing::trace!(?reason, "frame dropped");
            return Ok(Json(AnalyzeResponse::no_face()));
        }
    };

    let bytes = decode_payload(&request.image)?;
    let frame = image::load_from_memory(&bytes).map_err(|err| {
        tracing::debug!(error = %err, "frame is not a decodable image");
        ApiError::UndecodableImage
    })?;

    let analysis = state
        .vision
        .analyze(&frame)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    permit.mark_processed();

    let response = match analysis {
        FrameAnalysis::NoFace => AnalyzeResponse::no_face(),
        FrameAnalysis::Degraded { face_box } => AnalyzeResponse::analyzing(face_box),
        FrameAnalysis::Classified { label, face_box } => {
            AnalyzeResponse::classified(label, face_box)
        }
    };

    Ok(Json(response))
}

/// Strip an optional `data:...;base64,` prefix and decode the payload.
fn decode_payload(payload: &str) -> Result<Vec<u8>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::MissingImage);
    }

    let encoded = payload
        .rsplit_once(',')
        .map(|(_, data)| data)
        .unwrap_or(payload);

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|err| {
            tracing::debug!(error = %err, "frame payload is not valid base64");
            ApiError::UndecodableImage
        })?;

    if bytes.is_empty() {
        return Err(ApiError::EmptyImage);
    }

    Ok(bytes)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .with_state(state)
}
