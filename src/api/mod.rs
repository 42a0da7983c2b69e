// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{DenyAction, DenyResponse, IssuanceRequest, IssuanceResponse, VerificationResponse},
    state::AppState,
};

pub mod health;
pub mod otp_token;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/otp-token", post(otp_token::issue_otp_token))
        .route("/otp-token/verify", get(otp_token::verify_otp_token));

    Router::new()
        .nest("/v1", v1_routes)
        // Path used by the signup frontend.
        .route("/api/setOtpToken", post(otp_token::issue_otp_token))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

/// Turn a handler panic into the generic failure body. The panic message
/// goes to the log only.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Request handler panicked");
    ApiError::internal().into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        otp_token::issue_otp_token,
        otp_token::verify_otp_token,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            IssuanceRequest,
            IssuanceResponse,
            VerificationResponse,
            DenyResponse,
            DenyAction,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "OTP Token", description = "Signup token issuance and verification"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
            Request, StatusCode,
        },
    };
    use tower::ServiceExt;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn issue_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn token_from_set_cookie(response: &Response) -> String {
        let raw = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        raw.split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("token="))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn issue_then_verify_round_trip() {
        let state = test_state();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(issue_request("/v1/otp-token", r#"{"userId":"user123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-request-id").is_some());

        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=600"));
        let token = token_from_set_cookie(&response);

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Token created successfully");

        let verify = Request::builder()
            .uri("/v1/otp-token/verify")
            .header(COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(verify).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["subject"], "user123");
        assert_eq!(
            body["expires_at"].as_i64().unwrap() - body["issued_at"].as_i64().unwrap(),
            600
        );
        assert_eq!(state.self_check.anomalies(), 0);
    }

    #[tokio::test]
    async fn frontend_path_issues_tokens() {
        let response = router(test_state())
            .oneshot(issue_request("/api/setOtpToken", r#"{"userId":"user123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn body_without_content_type_still_issues() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/setOtpToken")
            .body(Body::from(r#"{"userId":"user123"}"#))
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());
        assert_eq!(json_body(response).await["success"], true);
    }

    #[tokio::test]
    async fn plain_text_content_type_still_issues() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/otp-token")
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(Body::from(r#"{"userId":"user123"}"#))
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn numeric_user_id_is_rejected() {
        let response = router(test_state())
            .oneshot(issue_request("/v1/otp-token", r#"{"userId":42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(json_body(response).await["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let response = router(test_state())
            .oneshot(issue_request("/v1/otp-token", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn missing_user_id_is_rejected_without_cookie() {
        let response = router(test_state())
            .oneshot(issue_request("/v1/otp-token", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "UserId is required");
    }

    #[tokio::test]
    async fn unparseable_body_is_rejected() {
        let response = router(test_state())
            .oneshot(issue_request("/v1/otp-token", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(json_body(response).await["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn verify_without_cookie_asks_for_signup() {
        let request = Request::builder()
            .uri("/v1/otp-token/verify")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "missing_token");
        assert_eq!(body["action"], "signup");
    }

    #[tokio::test]
    async fn verify_expired_token_asks_for_resend() {
        let state = test_state();
        let stale = chrono::Utc::now().timestamp() - 601;
        let token = state.issuer.issue_at("user123", stale).unwrap().token;

        let request = Request::builder()
            .uri("/v1/otp-token/verify")
            .header(COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "token_expired");
        assert_eq!(body["action"], "resend");
    }

    #[tokio::test]
    async fn verify_tampered_token_is_denied_and_cleared() {
        let state = test_state();
        let token = state.issuer.issue("user123").unwrap().token;
        let tampered = format!("{}x", &token[..token.len() - 1]);
        let tampered = if tampered == token {
            format!("{}y", &token[..token.len() - 1])
        } else {
            tampered
        };

        let request = Request::builder()
            .uri("/v1/otp-token/verify")
            .header(COOKIE, format!("token={tampered}"))
            .body(Body::empty())
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "invalid_signature");
        assert_eq!(body["action"], "deny");
    }

    async fn exploding_handler() -> ApiError {
        panic!("signing backend exploded")
    }

    #[tokio::test]
    async fn panics_become_generic_server_errors() {
        let app: Router = Router::new()
            .route("/boom", get(exploding_handler))
            .layer(CatchPanicLayer::custom(panic_response));

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], crate::error::GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn readiness_stays_ok_after_self_check_anomalies() {
        let state = test_state();
        state.self_check.record_anomaly();

        for uri in ["/health/ready", "/health"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router(state.clone()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["status"], "degraded");
            assert_eq!(body["checks"]["self_check_anomalies"], 1);
        }
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let request = Request::builder()
            .uri("/api-doc/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"]["/v1/otp-token"].is_object());
    }
}
