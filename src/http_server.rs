//! HTTP server implementation using Axum.

use crate::config::{CorsConfig, ServerConfig};
use crate::error::{GatewayError, ServerError};
use crate::handler::find_config_handler;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any as AnyValue, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

/// Build the router with its middleware stack: panic recovery, request
/// tracing and CORS, innermost first.
pub fn build_router(state: AppState, cors: &CorsConfig) -> Result<Router, ServerError> {
    let cors = build_cors_layer(cors)?;

    Ok(Router::new()
        .route("/find_config", post(find_config_handler))
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state))
}

/// Build the CORS layer.
///
/// Browsers refuse a literal `*` on credentialed requests, so "any origin"
/// with credentials echoes the request's origin and headers back.
pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(config.allow_credentials);

    let origin = if config.allows_any_origin() {
        if config.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(AnyValue)
        }
    } else {
        let origins = config
            .origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|source| ServerError::InvalidCorsOrigin {
                        origin: o.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let headers = if config.allow_credentials {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::from(AnyValue)
    };

    Ok(layer.allow_origin(origin).allow_headers(headers))
}

/// Run the HTTP server until SIGINT or SIGTERM.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if !config.optimizer_path.exists() {
        warn!(path = %config.optimizer_path.display(),
              "Optimizer executable not found; requests will fail until it is installed");
    }

    let state = AppState::from_config(&config);
    let app = build_router(state, &config.cors)?;

    let addr = config.socket_addr();
    info!(optimizer = %config.optimizer_path.display(), timeout = ?config.timeout,
          any_origin = config.cors.allows_any_origin(), "Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    GatewayError::Unexpected("request handler panicked".to_string()).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
