//! HTTP server for document analysis.

use crate::analyze::{load_pages, validate_extension, AnalyzeResponse};
use crate::config::ServerConfig;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use doc_lens::client::ModelKind;
use doc_lens::core::DocLensError;
use doc_lens::doclens::DocLens;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Uploads above this size are rejected before buffering.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across handlers
struct AppState {
    doclens: DocLens,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing analysis pipeline...");
    let doclens = DocLens::new(config.analysis.clone())?;
    let state = Arc::new(AppState { doclens });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route("/api/v1/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {e}"))?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health         - Health check");
    info!("  POST /analyze        - Document analysis (multipart upload)");
    info!("  POST /api/v1/analyze - Document analysis (versioned API)");

    // Create listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Document analysis endpoint.
///
/// Accepts a multipart form with a `file` part (the document bytes) and
/// an optional `model` part naming the model selector.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnalyzeResponse::error(message)),
            )
        }
    };

    // Selector and extension are checked before any work happens.
    let model = match upload.model.parse::<ModelKind>() {
        Ok(model) => model,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnalyzeResponse::error(e.to_string())),
            )
        }
    };
    if !upload.file_name.is_empty() {
        if let Err(e) = validate_extension(Path::new(&upload.file_name)) {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnalyzeResponse::error(e.to_string())),
            );
        }
    }

    let pages = match load_pages(&upload.bytes) {
        Ok(pages) => pages,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to prepare upload");
            return (
                StatusCode::BAD_REQUEST,
                Json(AnalyzeResponse::error(e.to_string())),
            );
        }
    };

    info!(
        request_id = %request_id,
        file = %upload.file_name,
        model = %model,
        bytes = upload.bytes.len(),
        pages = pages.len(),
        "Processing analysis request"
    );

    let result = match state.doclens.analyze(&upload.bytes, &pages, model).await {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Analysis failed");
            let status = match e {
                DocLensError::Service { .. }
                | DocLensError::Analysis { .. }
                | DocLensError::Timeout { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (status, Json(AnalyzeResponse::error(e.to_string())));
        }
    };

    let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    match AnalyzeResponse::from_result(result, processing_time_ms) {
        Ok(response) => {
            info!(
                request_id = %request_id,
                pages = response.page_count,
                total_ms = processing_time_ms,
                "Analysis completed"
            );
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to encode response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalyzeResponse::error(e.to_string())),
            )
        }
    }
}

/// A parsed multipart upload.
struct Upload {
    bytes: Vec<u8>,
    file_name: String,
    model: String,
}

/// Drains the multipart form into an [`Upload`].
async fn read_upload(mut multipart: Multipart) -> Result<Upload, String> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut model = ModelKind::Layout.as_str().to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed multipart body: {e}"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("failed to read file part: {e}"))?;
                bytes = Some(data.to_vec());
            }
            Some("model") => {
                model = field
                    .text()
                    .await
                    .map_err(|e| format!("failed to read model part: {e}"))?;
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| "missing file part".to_string())?;
    Ok(Upload {
        bytes,
        file_name,
        model,
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
