use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::agent::{DummyLegacyApi, PolicyAgent};
use crate::config::AppConfig;
use crate::llm::ChatCompletionsDriver;
use crate::widget::render::render_page;
use crate::widget::{ChatReply, ChatRequest, ChatWidget};

/// Path of the chat endpoint the widget posts to.
pub const CHAT_PATH: &str = "/chat";

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = config.llm_settings();
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        "LLM configuration loaded"
    );

    let agent = PolicyAgent::new(
        Arc::new(ChatCompletionsDriver::new(settings)?),
        Arc::new(DummyLegacyApi::default()),
    );
    let state = AppState {
        agent,
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // A very long timeout stands in for "disabled" so the layer stack keeps one type.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60)
    } else {
        Duration::from_secs(state.config.resilience.request_timeout_secs)
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(CHAT_PATH, post(chat_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => {
                        tracing::warn!(timeout_secs = timeout_duration.as_secs(), "Request timed out");
                        (
                            StatusCode::REQUEST_TIMEOUT,
                            Json(ChatReply {
                                reply: "Error: request timed out".to_string(),
                            }),
                        )
                            .into_response()
                    }
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - The chat widget page.
async fn index_handler() -> impl IntoResponse {
    Html(render_page(&ChatWidget::new(), CHAT_PATH))
}

/// GET /health - Liveness check.
async fn health_handler() -> &'static str {
    "ok"
}

/// POST /chat - Run the agent on one message.
async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatReply>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    info!(
        name: "chat.request.received",
        request_id = %request_id,
        message_length = req.message.len(),
        "Received chat request"
    );

    match state.agent.answer(req.message).await {
        Ok(reply) => {
            info!(
                name: "chat.request.completed",
                request_id = %request_id,
                reply_length = reply.len(),
                "Chat request completed"
            );
            (StatusCode::OK, Json(ChatReply { reply }))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = ?e, "Chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply {
                    reply: format!("Error: {e}"),
                }),
            )
        }
    }
}
