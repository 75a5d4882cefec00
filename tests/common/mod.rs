#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use contact_desk_api::auth::TokenGenerator;
use contact_desk_api::database::{MemoryStore, Repositories};
use contact_desk_api::services::{Fixture, FixtureRecords};
use contact_desk_api::{app, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub const MANNHEIM: &str = "00000000-0000-4000-8000-0000000000d1";
pub const DARMSTADT: &str = "00000000-0000-4000-8000-0000000000d2";
pub const TANJA_CASE: &str = "00000000-0000-4000-8000-0000000000c1";
pub const MARKUS_CASE: &str = "00000000-0000-4000-8000-0000000000c2";
pub const SANDRA_CASE: &str = "00000000-0000-4000-8000-0000000000c3";
pub const PAUL_CASE: &str = "00000000-0000-4000-8000-0000000000c4";

static RECORDS: OnceLock<FixtureRecords> = OnceLock::new();

/// Fixture records are hashed once and shared; every test gets a fresh store
fn records() -> &'static FixtureRecords {
    RECORDS.get_or_init(|| {
        Fixture::from_yaml(include_str!("../fixtures/cases.yaml"))
            .and_then(Fixture::into_records)
            .expect("test fixture must be valid")
    })
}

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub tokens: TokenGenerator,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestApp {
    pub async fn seeded() -> Result<Self> {
        let repos = Repositories::from_store(Arc::new(MemoryStore::new()));
        records().save(&repos).await?;

        let tokens = TokenGenerator::new(SECRET, 1)?;
        let router = app(AppState::new(repos.clone(), tokens.clone()));
        Ok(Self { router, repos, tokens })
    }

    /// Token for a fixture account, issued without going through the login endpoint
    pub async fn token_for(&self, username: &str) -> Result<String> {
        let account = self
            .repos
            .accounts
            .find_by_username(username)
            .await?
            .with_context(|| format!("no fixture account {}", username))?;
        Ok(self.tokens.generate_token_for(&account)?)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(TestResponse { status, headers, text, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(
            Request::builder()
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: &Value) -> Result<TestResponse> {
        self.send(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body)?))?,
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Result<TestResponse> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body)?))?,
        )
        .await
    }
}

pub fn id(value: &str) -> Uuid {
    Uuid::parse_str(value).expect("valid uuid constant")
}
