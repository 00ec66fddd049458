use crate::handler::{Outcome, RejectReason, TriggerHandler};
use crate::types::{IncomingTrigger, TriggerParams};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

#[derive(Clone)]
struct ServerState {
    handler: TriggerHandler,
}

/// Build the application router around a ready handler.
pub fn router(handler: TriggerHandler) -> Router {
    Router::new()
        .route(
            "/trigger/{webhook_name}/with/key/{webhook_key}",
            get(handle_trigger).post(handle_trigger),
        )
        .route("/health", get(health))
        .with_state(ServerState { handler })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn start(addr: &str, handler: TriggerHandler) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "webhook-relay: HTTP server listening");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("webhook-relay: shutting down");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_trigger(
    Path((webhook_name, webhook_key)): Path<(String, String)>,
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let span = tracing::info_span!(
        "trigger",
        request_id = %uuid::Uuid::new_v4(),
        webhook = %webhook_name
    );

    let params = TriggerParams::from_pairs(pairs);

    // Only a body declared as JSON takes part in the message.
    let body = declares_json(&headers).then(|| body.to_vec());

    let trigger = IncomingTrigger {
        webhook_name,
        webhook_key,
        params,
        body,
    };

    let outcome = state.handler.handle(trigger).instrument(span).await;
    outcome_response(outcome)
}

fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Delivered {
            event_name,
            composed_message,
        } => Json(serde_json::json!({
            "message": format!("Congratulations! You've fired the {event_name} event"),
            "data": composed_message,
            "fired_at": Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Outcome::Rejected(RejectReason::InvalidCredentials) => {
            message_response(StatusCode::OK, "Errors! You sent an invalid key")
        }
        Outcome::Rejected(RejectReason::NoContent) => {
            message_response(StatusCode::OK, "Errors! No data to send")
        }
        // Details are already logged by the handler; the caller gets nothing sensitive.
        Outcome::DeliveryFailed(_) => message_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Errors! Failed to deliver the message",
        ),
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

/// Send panics through `tracing`, with the message, location and a backtrace
/// taken at the panic site.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(log_panic));
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let backtrace = Backtrace::force_capture();
    tracing::error!(panic = %info, backtrace = %backtrace, "panic");
}

// The hook above has already logged the stack; this only shapes the response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "request handler panicked");

    message_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Errors! Internal server error",
    )
}

/// True when the media type of `Content-Type` is `application/json`, ignoring parameters.
fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
