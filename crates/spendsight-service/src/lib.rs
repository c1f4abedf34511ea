//! REST surface for the spend agent: one health endpoint and one chat
//! endpoint. The agent owns the ledger; requests serialize through a mutex
//! so each message sees the store state the previous message left behind.

#![deny(unsafe_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use spendsight_agent::{Agent, AgentConfig};
use spendsight_script::{ScriptEngine, ScriptLimits};
use spendsight_store::{StoreError, TransactionStore};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub store_path: PathBuf,
    pub passphrase: String,
    pub export_dir: PathBuf,
    pub script_limits: ScriptLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("spendsight/data/ledger.spnd"),
            passphrase: "spendsight-dev".to_string(),
            export_dir: PathBuf::from("spendsight/exports"),
            script_limits: ScriptLimits::default(),
        }
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub agent: Arc<Mutex<Agent>>,
}

impl ServiceState {
    pub fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        let ServiceConfig {
            store_path,
            passphrase,
            export_dir,
            script_limits,
        } = config;

        let store = TransactionStore::load(store_path, passphrase)?;
        let engine = ScriptEngine::new(script_limits);
        let agent_config = AgentConfig {
            export_dir,
            ..AgentConfig::default()
        };
        let agent = Agent::new(store, engine, agent_config);

        Ok(Self {
            agent: Arc::new(Mutex::new(agent)),
        })
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/chat", post(chat))
        .with_state(state)
}

/// Run one chat message through the agent.
pub async fn reply_to(state: &ServiceState, message: &str) -> String {
    let mut agent = state.agent.lock().await;
    agent.handle_message(message)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Http { status, message } => {
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    transactions: usize,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let agent = state.agent.lock().await;
    Json(HealthResponse {
        status: "ok",
        service: "spendsight-service",
        transactions: agent.store().len(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

async fn chat(
    State(state): State<ServiceState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }
    let reply = reply_to(&state, &request.message).await;
    Ok(Json(ChatReply { reply }))
}
