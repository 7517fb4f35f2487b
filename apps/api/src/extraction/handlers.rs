use std::time::Instant;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::error::ExtractionError;
use crate::extraction::models::{ParseResponse, RawDocument, ResponseMetadata};
use crate::extraction::progress::TracingProgress;
use crate::state::AppState;

/// Multipart field names accepted as the uploaded CV.
const FILE_FIELDS: &[&str] = &["file", "cv", "resume"];

/// POST /api/v1/cv/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let permit = state
        .parse_limiter
        .clone()
        .try_acquire_owned()
        .map_err(|_| AppError::Busy)?;

    let doc = read_upload(&mut multipart).await?;
    debug!(filename = %doc.filename, size = doc.size(), mime = ?doc.mime_type, "upload received");

    let started = Instant::now();
    let pipeline = state.pipeline.clone();

    // CPU-bound parse: spawn_blocking to avoid blocking the async executor.
    let (doc, result) = tokio::task::spawn_blocking(move || {
        let progress = TracingProgress {
            filename: doc.filename.clone(),
        };
        let result = pipeline.run_with_progress(&doc, &progress);
        drop(permit);
        (doc, result)
    })
    .await
    .map_err(|e| ExtractionError::Unknown(format!("parse task failed: {e}")))?;

    let parsed = result?;
    let elapsed = started.elapsed();
    info!(
        filename = %doc.filename,
        quality = parsed.quality,
        elapsed_ms = elapsed.as_millis() as u64,
        "parse request completed"
    );

    let metadata = ResponseMetadata {
        filename: doc.filename.clone(),
        file_size: doc.size(),
        mime_type: doc.mime_type.clone(),
        strategy: parsed.strategy,
        extraction: parsed.metadata.clone(),
        processing_time_ms: elapsed.as_millis() as u64,
        processed_at: chrono::Utc::now(),
    };
    Ok(Json(ParseResponse::success(parsed, metadata)))
}

/// First part named `file`, `cv` or `resume`; other parts are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<RawDocument, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            debug!(field = %name, "skipping multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().map(str::to_string);
        let data: Bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(RawDocument::new(data, filename, mime_type));
    }

    Err(AppError::Validation(format!(
        "No file uploaded. Send the document in a multipart field named one of: {}",
        FILE_FIELDS.join(", ")
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}
