//! Playdates server
//!
//! Hosts the playdate directory over HTTP: profile and roster maintenance,
//! day listings, playdate lifecycle and participation.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use auth::{JwtConfig, JwtManager};
use axum::Router;
use playdates::PlaydateStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{AppState, SharedState};

/// Creates the application router with all routes configured.
pub fn create_app<S: PlaydateStore + 'static>(state: SharedState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: PlaydateStore>(config: Config, store: S) -> SharedState<S> {
    let jwt_manager =
        JwtManager::new(JwtConfig::new(&config.jwt_secret).with_issuer(&config.jwt_issuer));
    Arc::new(AppState::new(config, store, jwt_manager))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use auth::Identity;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use playdate_store::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    const SECRET: &str = "test-secret";

    fn app() -> (Router, JwtManager) {
        let state = create_state(Config::new(SECRET), MemoryStore::new());
        let tokens = JwtManager::new(JwtConfig::new(SECRET));
        (create_app(state), tokens)
    }

    fn token(tokens: &JwtManager, id: &str, name: &str) -> String {
        let identity = Identity::new(id, format!("{id}@example.com")).with_name(name);
        tokens.generate_token(&identity).unwrap()
    }

    async fn call(app: &Router, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn playdate_body(title: &str) -> Value {
        json!({
            "title": title,
            "location": {
                "name": "Kaivopuisto",
                "address": "Puistokatu 1",
                "coordinates": {"latitude": 60.157, "longitude": 24.956}
            },
            "date": "2026-06-15T07:00:00Z",
            "start_time": "10:00",
            "end_time": "12:00",
            "min_age": 2,
            "max_age": 5
        })
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (app, _) = app();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_rejects_missing_or_bad_token() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/profile/me")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, "not-a-jwt", "/api/profile/me", json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "authentication_required");
    }

    #[tokio::test]
    async fn test_profile_flow() {
        let (app, tokens) = app();
        let maria = token(&tokens, "u1", "Maria");

        let (status, _) = call(&app, &maria, "/api/profile/me", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, &maria, "/api/profile/register", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Maria");

        let (status, body) = call(
            &app,
            &maria,
            "/api/profile/add-child",
            json!({"name": "Matti", "age": 3}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["children"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            &maria,
            "/api/profile/add-child",
            json!({"name": "Matti", "age": -1}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");

        let (status, body) =
            call(&app, &maria, "/api/profile/remove-child", json!({"index": 4})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "index_out_of_range");

        let (status, body) =
            call(&app, &maria, "/api/profile/remove-child", json!({"index": -1})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "index_out_of_range");

        let (status, body) = call(
            &app,
            &maria,
            "/api/profile/update",
            json!({"name": "Maria K", "phone_number": "040 123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["phone_number"], "040 123");
    }

    #[tokio::test]
    async fn test_playdate_join_flow() {
        let (app, tokens) = app();
        let olli = token(&tokens, "org", "Olli");
        let pia = token(&tokens, "user-1", "Pia");
        call(&app, &olli, "/api/profile/register", json!({})).await;

        let (status, body) =
            call(&app, &olli, "/api/playdate/create", playdate_body("Sandbox")).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["playdate"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            &pia,
            "/api/playdate/join",
            json!({"playdate_id": id, "children_count": 2}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "participant");
        assert_eq!(body["stats"]["family_count"], 1);
        assert_eq!(body["stats"]["children_count"], 2);

        let (status, body) = call(
            &app,
            &pia,
            "/api/playdate/join",
            json!({"playdate_id": id, "children_count": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "already_joined");

        let (status, body) = call(
            &app,
            &pia,
            "/api/playdate/join",
            json!({"playdate_id": id, "children_count": -3}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");

        let (status, body) = call(
            &app,
            &olli,
            "/api/playdate/join",
            json!({"playdate_id": id, "children_count": u32::MAX}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");

        let (_, body) = call(&app, &olli, "/api/playdate/stats", json!({"playdate_id": id})).await;
        assert_eq!(body, json!({"family_count": 1, "children_count": 2}));

        let (status, _) =
            call(&app, &pia, "/api/playdate/delete", json!({"playdate_id": id})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_for_day_uses_requested_zone() {
        let (app, tokens) = app();
        let olli = token(&tokens, "org", "Olli");
        call(&app, &olli, "/api/profile/register", json!({})).await;

        let mut late = playdate_body("Late evening");
        late["date"] = json!("2026-06-15T22:30:00Z");
        call(&app, &olli, "/api/playdate/create", late).await;

        let (_, body) = call(
            &app,
            &olli,
            "/api/playdate/list-for-day",
            json!({"date": "2026-06-15", "timezone": "UTC"}),
        )
        .await;
        assert_eq!(body["playdates"].as_array().unwrap().len(), 1);

        // 22:30 UTC is already the 16th in Helsinki
        let (_, body) = call(
            &app,
            &olli,
            "/api/playdate/list-for-day",
            json!({"date": "2026-06-16", "timezone": "Europe/Helsinki"}),
        )
        .await;
        assert_eq!(body["playdates"].as_array().unwrap().len(), 1);

        let (status, _) = call(
            &app,
            &olli,
            "/api/playdate/list-for-day",
            json!({"timezone": "Mars/Olympus"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
