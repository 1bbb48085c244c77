//! HTTP invocation endpoint
//!
//! Each request is one independent invocation of a workflow. Requests share
//! nothing but the configuration.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::types::{InvocationFailure, InvocationPayload, InvocationResult};
use crate::workflow::{RetrievalWorkflow, TriggerWorkflow};

/// Workflows served by the endpoint
#[derive(Clone, Default)]
pub struct ServerState {
    /// Present when the product supports triggering
    pub trigger: Option<Arc<TriggerWorkflow>>,
    /// Present when a destination is configured
    pub retrieval: Option<Arc<RetrievalWorkflow>>,
}

impl ServerState {
    /// Build every workflow the config allows
    pub async fn from_config(config: RelayConfig) -> Result<Self> {
        let trigger = if config.product.trigger_path().is_some() {
            Some(Arc::new(TriggerWorkflow::from_config(config.clone()).await?))
        } else {
            None
        };

        let retrieval = if config.destination.is_some() {
            Some(Arc::new(RetrievalWorkflow::from_config(config).await?))
        } else {
            None
        };

        if trigger.is_none() && retrieval.is_none() {
            return Err(Error::config(
                "nothing to serve: product cannot trigger and no destination is configured",
            ));
        }

        Ok(Self { trigger, retrieval })
    }
}

/// Build the router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke/trigger", post(invoke_trigger))
        .route("/invoke/retrieve", post(invoke_retrieve))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(state: ServerState, port: u16) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "trigger": state.trigger.is_some(),
        "retrieve": state.retrieval.is_some(),
    }))
}

/// Run the trigger workflow; an empty body is the default payload
async fn invoke_trigger(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let Some(workflow) = state.trigger.clone() else {
        return not_configured("trigger");
    };

    let payload = match std::str::from_utf8(&body)
        .map_err(|e| Error::config(format!("payload is not UTF-8: {e}")))
        .and_then(InvocationPayload::from_json)
    {
        Ok(payload) => payload,
        Err(e) => return failure(StatusCode::BAD_REQUEST, &e),
    };

    respond(workflow.run(&payload).await)
}

/// Run the retrieval workflow
async fn invoke_retrieve(State(state): State<Arc<ServerState>>) -> Response {
    let Some(workflow) = state.retrieval.clone() else {
        return not_configured("retrieve");
    };
    respond(workflow.run().await)
}

fn respond(outcome: Result<InvocationResult>) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!("Invocation failed: {e}");
            failure(status_for(&e), &e)
        }
    }
}

fn failure(status: StatusCode, err: &Error) -> Response {
    (status, Json(InvocationFailure::from(err))).into_response()
}

fn not_configured(workflow: &str) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        &Error::config(format!("{workflow} is not configured on this endpoint")),
    )
}

/// HTTP status reported for a workflow failure
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::BackupIncomplete { .. } => StatusCode::CONFLICT,
        Error::TriggerRejected { .. }
        | Error::UpstreamRequestFailed { .. }
        | Error::MalformedResponse { .. }
        | Error::DownloadFailed { .. }
        | Error::UploadFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
