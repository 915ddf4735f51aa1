use axum::{
    extract::State,
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::model::{CodeModel, ErrorDocument, Language};
use crate::Error;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

const INLINE_FILE: &str = "<input>";

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub source: String,
    /// Used as the document's `file` and, without `language`, to pick one
    pub path: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub languages: Vec<Language>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, body: impl Serialize) -> ApiError {
    let value = serde_json::to_value(body).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
    (status, Json(value))
}

fn resolve_language(state: &AppState, req: &ExtractRequest) -> Result<Language, ApiError> {
    if let Some(name) = &req.language {
        return Language::from_str(name)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, ErrorResponse { error: e.to_string() }));
    }
    req.path
        .as_deref()
        .and_then(|p| state.engine.language_for_path(Path::new(p)))
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                ErrorResponse { error: "cannot determine language; pass `language` or a `path` with a known extension".to_string() },
            )
        })
}

pub async fn handle_extract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<CodeModel>, ApiError> {
    let language = resolve_language(&state, &req)?;
    let file = req.path.clone().unwrap_or_else(|| INLINE_FILE.to_string());

    let worker = Arc::clone(&state);
    let name = file.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        worker.engine.extract_source(&name, language, &req.source)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorDocument::fault(&file, e.to_string())))?;

    match outcome {
        Ok(model) => Ok(Json(model)),
        Err(err @ (Error::Parse { .. } | Error::Encoding { .. })) => {
            tracing::debug!("Rejected {}: {}", file, err);
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, ErrorDocument::new(&file, &err)))
        }
        Err(err @ Error::UnsupportedLanguage(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, ErrorResponse { error: err.to_string() }))
        }
        Err(err) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorDocument::new(&file, &err))),
    }
}

pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        languages: state.engine.registry().languages(),
    })
}
