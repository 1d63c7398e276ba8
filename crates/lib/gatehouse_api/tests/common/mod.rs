//! Shared helpers for router tests: in-memory stores, JSON requests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use gatehouse_api::{AppState, config::ApiConfig};
use gatehouse_core::clock::{ManualClock, SharedClock};
use gatehouse_core::login_tokens::MemoryLoginTokenStore;
use gatehouse_core::users::MemoryUserStore;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub clock: ManualClock,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Like `new`, with `adjust` applied to the configuration first.
    pub fn with_config(adjust: impl FnOnce(&mut ApiConfig)) -> Self {
        let clock = ManualClock::new(chrono::Utc::now());
        let shared: SharedClock = Arc::new(clock.clone());
        let mut config = ApiConfig::for_secret("test-secret");
        config.password_cost = 4;
        adjust(&mut config);
        let state = AppState::from_stores(
            config,
            Arc::new(MemoryUserStore::with_clock(shared.clone())),
            Arc::new(MemoryLoginTokenStore::with_clock(shared.clone())),
            shared,
        );
        Self { state, clock }
    }

    pub fn router(&self) -> Router {
        gatehouse_api::router(self.state.clone())
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = self.router().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json)
    }

    /// Register a user and return the token response.
    pub async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/auth/register",
                None,
                Some(serde_json::json!({"email": email, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body
    }

    /// Link a remote-device chat to the bearer's account.
    pub async fn link_chat(&self, bearer: &str, chat_id: &str) {
        let (status, body) = self
            .send(
                "POST",
                "/auth/remote/channel",
                Some(bearer),
                Some(serde_json::json!({"identifier": chat_id})),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT, "link failed: {body}");
    }

    /// Register a user, grant it `admin` and log in again.
    pub async fn admin(&self, email: &str) -> Value {
        let registered = self.register(email).await;
        let id = registered["user"]["id"].as_str().unwrap().parse().unwrap();
        self.state
            .service
            .set_roles(id, &["admin".to_string()])
            .await
            .unwrap();
        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

pub fn access(token_response: &Value) -> &str {
    token_response["accessToken"].as_str().expect("accessToken")
}

pub fn refresh(token_response: &Value) -> &str {
    token_response["refreshToken"].as_str().expect("refreshToken")
}
