//! Read-only JSON endpoints for operators.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use ussdflow_core::screen::ScreenKind;
use ussdflow_types::session::SessionId;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScreenSummary {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    pub inputs: Vec<String>,
    pub root: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub screen: String,
    pub cursor: usize,
}

fn kind_name(kind: ScreenKind) -> &'static str {
    match kind {
        ScreenKind::Menu => "menu",
        ScreenKind::Input => "input",
        ScreenKind::Notice => "notice",
    }
}

/// GET /api/v1/screens - Every screen of the graph, sorted by id.
pub async fn list_screens(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ScreenSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();
    let graph = state.orchestrator.graph();

    let mut screens = Vec::with_capacity(graph.len());
    for id in graph.ids() {
        let screen = graph.get(id).map_err(|e| AppError::Internal(e.to_string()))?;
        screens.push(ScreenSummary {
            id: id.to_string(),
            kind: kind_name(screen.kind()),
            title: screen.title().to_string(),
            inputs: screen.inputs().iter().map(|input| input.name.clone()).collect(),
            root: id == graph.root(),
        });
    }

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(screens, request_id, elapsed)))
}

/// GET /api/v1/sessions/{id} - Current screen and cursor of a session.
///
/// Collected values are never exposed.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_state = state
        .orchestrator
        .inspect(&SessionId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session '{id}' not found")))?;

    let summary = SessionSummary {
        session_id: id,
        screen: session_state.screen.to_string(),
        cursor: session_state.cursor,
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(summary, request_id, elapsed)))
}
