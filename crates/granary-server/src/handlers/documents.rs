use crate::error::ApiError;
use crate::models::{DocumentUploadResponse, UrlUploadRequest};
use crate::state::AppState;

use granary_ingest::loaders::SourceDocument;
use granary_ingest::{from_pdf, from_text, from_url, IngestError};

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;

/// POST /upload-url - fetch a web page and index it for a user.
pub async fn upload_url(
    State(state): State<AppState>,
    Json(request): Json<UrlUploadRequest>,
) -> Result<Json<DocumentUploadResponse>, ApiError> {
    log::info!("uploading document from URL: {}", request.url);

    let documents = from_url(&state.http, &request.url, request.title.clone()).await?;

    respond(
        &state,
        documents,
        &request.user_id,
        "Successfully uploaded and processed document from URL".to_string(),
    )
    .await
}

/// POST /upload-file - multipart upload of a PDF or text file.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentUploadResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title: Option<String> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((filename, data));
            }
            Some("title") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid title field: {}", e)))?;
                if !value.is_empty() {
                    title = Some(value);
                }
            }
            Some("user_id") => {
                user_id = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Invalid user_id field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    let user_id =
        user_id.ok_or_else(|| ApiError::BadRequest("Missing user_id field".to_string()))?;

    log::info!("uploading file: {}", filename);

    let lower = filename.to_lowercase();
    let documents = if lower.ends_with(".pdf") {
        from_pdf(&data, &filename, title)?
    } else if lower.ends_with(".txt") || lower.ends_with(".md") {
        let text = String::from_utf8(data.to_vec())
            .map_err(|_| ApiError::BadRequest("File is not valid UTF-8".to_string()))?;
        from_text(text, &filename, title)?
    } else {
        return Err(IngestError::UnsupportedType.into());
    };

    respond(
        &state,
        documents,
        &user_id,
        format!("Successfully uploaded and processed {}", filename),
    )
    .await
}

async fn respond(
    state: &AppState,
    documents: Vec<SourceDocument>,
    user_id: &str,
    message: String,
) -> Result<Json<DocumentUploadResponse>, ApiError> {
    let title = documents
        .first()
        .map(|d| d.metadata.title.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let document_ids = state.processor.process_and_store(documents, user_id).await?;
    let document_id = document_ids
        .first()
        .cloned()
        .ok_or_else(|| ApiError::InternalError("No documents were stored".to_string()))?;

    log::info!("stored {} document(s) for {}", document_ids.len(), user_id);

    Ok(Json(DocumentUploadResponse {
        document_id,
        title,
        status: "success".to_string(),
        message,
    }))
}
