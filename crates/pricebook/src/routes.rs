use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pricebook_core::{export_archive, import_archive, ExportError, ImportError, ImportSummary};
use tracing::{error, warn};

use crate::state::AppState;

pub const PRICES_PATH: &str = "/api/v0/prices";

/// Multipart form field carrying the uploaded archive.
pub const UPLOAD_FIELD: &str = "file";

const UPLOAD_LIMIT_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PRICES_PATH, get(export_prices).post(import_prices))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    Upload(String),
    Import(ImportError),
    Export(ExportError),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Import(err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Upload(reason) => {
                warn!(%reason, "rejected upload");
                (StatusCode::BAD_REQUEST, "Error reading file")
            }
            ApiError::Import(err) if err.is_client_error() => {
                warn!(error = %err, "rejected archive");
                (StatusCode::BAD_REQUEST, "Error unzipping file")
            }
            ApiError::Import(err) => {
                error!(error = %err, "import failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error inserting data")
            }
            ApiError::Export(err) => {
                error!(error = %err, "export failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting data")
            }
        };
        (status, message).into_response()
    }
}

async fn import_prices(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let archive = read_upload(&mut multipart).await?;
    let summary = import_archive(state.store(), &archive).await?;
    Ok(Json(summary))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Upload(err.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::Upload(err.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::Upload(format!(
        "multipart form has no '{UPLOAD_FIELD}' field"
    )))
}

async fn export_prices(State(state): State<AppState>) -> Result<Response, ApiError> {
    let archive = export_archive(state.store()).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=response.zip",
            ),
        ],
        archive,
    )
        .into_response())
}
