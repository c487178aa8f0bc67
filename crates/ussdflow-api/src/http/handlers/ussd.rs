//! USSD gateway callback.
//!
//! The gateway posts the whole dialogue so far: `text` holds every answer the
//! user has sent, joined with `*` (empty on dial-in). Only the last segment
//! is new, and that is what the orchestrator receives. The reply body starts
//! with `CON` to keep the session open or `END` to close it.

use axum::extract::{FromRequest, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::Instrument;

use ussdflow_observe::attrs;
use ussdflow_types::response::{Response, ResponseKind};
use ussdflow_types::session::{InboundMessage, SessionId};

use crate::http::error::AppError;
use crate::state::AppState;

/// Gateway request, sent as a form or as JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UssdRequest {
    pub session_id: String,
    #[serde(default)]
    pub service_code: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub text: String,
}

impl UssdRequest {
    /// The newest answer: everything after the last `*`.
    pub fn message(&self) -> &str {
        self.text.rsplit('*').next().unwrap_or_default()
    }

    /// Number of answers in `text`.
    pub fn segments(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.split('*').count()
        }
    }
}

/// Extracts a [`UssdRequest`] from either body encoding.
///
/// JSON when the content type says so, form-encoded otherwise.
pub struct UssdBody(pub UssdRequest);

impl<S: Send + Sync> FromRequest<S> for UssdBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let request = if is_json {
            let Json(request) = Json::<UssdRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            request
        } else {
            let Form(request) = Form::<UssdRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            request
        };

        if request.session_id.trim().is_empty() {
            return Err(AppError::Validation("sessionId must not be empty".to_string()));
        }
        Ok(Self(request))
    }
}

/// `CON <text>` or `END <text>`.
pub fn render_reply(response: &Response) -> String {
    let prefix = match response.kind {
        ResponseKind::Continue => "CON",
        ResponseKind::End => "END",
    };
    format!("{prefix} {}", response.text)
}

fn plain_text(body: String) -> HttpResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// POST /api/v1/ussd - Advance one session by one message.
///
/// Always answers 200: gateways treat anything else as a dropped session, so
/// failures end the session with the configured service-unavailable text.
pub async fn handle_ussd(
    State(state): State<AppState>,
    UssdBody(request): UssdBody,
) -> HttpResponse {
    let span = tracing::info_span!(
        "ussd.request",
        ussd.session_id = %request.session_id,
        ussd.service_code = %request.service_code,
        ussd.text_segments = request.segments(),
        ussd.response_kind = tracing::field::Empty,
        ussd.error_kind = tracing::field::Empty,
    );

    let message = InboundMessage::new(
        SessionId::new(request.session_id.clone()),
        request.message(),
    );
    let result = state
        .orchestrator
        .handle(message)
        .instrument(span.clone())
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            let error_kind = format!("{:?}", e.kind()).to_lowercase();
            span.record(attrs::ERROR_KIND, error_kind.as_str());
            span.in_scope(|| tracing::error!(error = %e, "ussd request failed"));
            Response::end(state.config.flow.service_unavailable_text.clone())
        }
    };

    let kind = if response.is_end() { "end" } else { "con" };
    span.record(attrs::RESPONSE_KIND, kind);
    plain_text(render_reply(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use ussdflow_core::orchestrator::Orchestrator;
    use ussdflow_core::storage::HashStore;
    use ussdflow_infra::crypto::VaultCipher;
    use ussdflow_types::config::GlobalConfig;
    use ussdflow_types::error::RepositoryError;

    use crate::demo::demo_graph;

    /// A store whose backend is unreachable.
    struct DownStore;

    impl HashStore for DownStore {
        async fn hget(&self, _key: &str, _field: &str) -> Result<Option<String>, RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn hset(&self, _key: &str, _field: &str, _value: &str) -> Result<(), RepositoryError> {
            Err(RepositoryError::Connection)
        }
    }

    fn test_state() -> AppState {
        AppState::ephemeral(GlobalConfig::default(), PathBuf::from(".")).unwrap()
    }

    fn request(session_id: &str, text: &str) -> UssdRequest {
        UssdRequest {
            session_id: session_id.to_string(),
            service_code: "*384*1#".to_string(),
            phone_number: "+254700000000".to_string(),
            text: text.to_string(),
        }
    }

    async fn call(state: &AppState, session_id: &str, text: &str) -> (StatusCode, String) {
        let response = handle_ussd(State(state.clone()), UssdBody(request(session_id, text))).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_message_is_last_segment() {
        assert_eq!(request("s", "").message(), "");
        assert_eq!(request("s", "1").message(), "1");
        assert_eq!(request("s", "1*Alice*1234").message(), "1234");
        assert_eq!(request("s", "1*").message(), "");
        assert_eq!(request("s", "").segments(), 0);
        assert_eq!(request("s", "1*Alice").segments(), 2);
    }

    #[test]
    fn test_render_reply_prefixes() {
        assert_eq!(render_reply(&Response::con("Menu")), "CON Menu");
        assert_eq!(render_reply(&Response::end("Bye")), "END Bye");
    }

    #[tokio::test]
    async fn test_dial_in_renders_main_menu() {
        let state = test_state();
        let (status, body) = call(&state, "ATUid_1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "CON Welcome to ussdflow\n1. Register\n2. Pick a fruit\n3. My profile\n4. Exit"
        );
    }

    #[tokio::test]
    async fn test_fruit_flow_with_invalid_selection() {
        let state = test_state();
        call(&state, "s1", "").await;

        let (_, prompt) = call(&state, "s1", "2").await;
        assert_eq!(
            prompt,
            "CON Fruit\nChoose fruit:\n1. Apple\n2. Banana\n3. Mango"
        );

        let (_, again) = call(&state, "s1", "2*7").await;
        assert_eq!(again, prompt);

        let (_, done) = call(&state, "s1", "2*7*3").await;
        assert_eq!(done, "END You picked mango. Enjoy!");
    }

    #[tokio::test]
    async fn test_registration_then_profile() {
        let state = test_state();
        call(&state, "reg", "").await;
        assert_eq!(
            call(&state, "reg", "1").await.1,
            "CON Registration\nEnter your name:"
        );
        assert_eq!(
            call(&state, "reg", "1*Alice").await.1,
            "CON Registration\nEnter a 4-digit PIN:"
        );
        assert_eq!(
            call(&state, "reg", "1*Alice*1234").await.1,
            "END Registered\nWelcome aboard, Alice."
        );

        // Profiles are per session.
        call(&state, "other", "").await;
        assert_eq!(
            call(&state, "other", "3").await.1,
            "END Profile\nYou are not registered yet."
        );
    }

    #[tokio::test]
    async fn test_bad_pin_ends_session() {
        let state = test_state();
        call(&state, "pin", "").await;
        call(&state, "pin", "1").await;
        call(&state, "pin", "1*Bob").await;
        assert_eq!(
            call(&state, "pin", "1*Bob*12").await.1,
            "END Registration failed: the PIN must be 4 digits."
        );
    }

    #[tokio::test]
    async fn test_exit_ends_session() {
        let state = test_state();
        call(&state, "bye", "").await;
        assert_eq!(
            call(&state, "bye", "4").await.1,
            "END Goodbye\nThanks for using ussdflow."
        );
    }

    #[tokio::test]
    async fn test_store_failure_ends_with_service_unavailable() {
        let config = GlobalConfig::default();
        let state = AppState {
            orchestrator: Orchestrator::new(
                demo_graph().unwrap(),
                DownStore,
                VaultCipher::ephemeral(),
                config.flow.clone(),
            ),
            config: Arc::new(config),
            data_dir: PathBuf::from("."),
        };

        let (status, body) = call(&state, "s1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "END Service temporarily unavailable. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_json_and_form_bodies_are_accepted() {
        let json = axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                r#"{"sessionId":"j1","serviceCode":"*384#","phoneNumber":"+1","text":"1*Alice"}"#,
            ))
            .unwrap();
        let UssdBody(parsed) = UssdBody::from_request(json, &()).await.unwrap();
        assert_eq!(parsed.session_id, "j1");
        assert_eq!(parsed.message(), "Alice");

        let form = axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(
                "sessionId=f1&serviceCode=%2A384%23&phoneNumber=%2B1&text=2%2A3",
            ))
            .unwrap();
        let UssdBody(parsed) = UssdBody::from_request(form, &()).await.unwrap();
        assert_eq!(parsed.session_id, "f1");
        assert_eq!(parsed.service_code, "*384#");
        assert_eq!(parsed.message(), "3");
    }

    #[tokio::test]
    async fn test_missing_session_id_is_rejected() {
        let req = axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"sessionId":" ","text":""}"#))
            .unwrap();
        let err = UssdBody::from_request(req, &()).await.err().unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
