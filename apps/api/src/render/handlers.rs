//! Axum route handler for the Render API.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub latex_content: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub pdf_base64: String,
    pub size_bytes: usize,
}

/// POST /api/v1/render
///
/// Typesets a full LaTeX document. A document that fails to compile is a 422
/// carrying the tail of the TeX log, never a crash.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    if request.latex_content.trim().is_empty() {
        return Err(AppError::Validation(
            "latex_content cannot be empty".to_string(),
        ));
    }

    let pdf = state.renderer.render(&request.latex_content).await?;

    Ok(Json(RenderResponse {
        size_bytes: pdf.len(),
        pdf_base64: BASE64.encode(&pdf),
    }))
}
