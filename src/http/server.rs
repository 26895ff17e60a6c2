//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (tracing, timeout, body and concurrency limits, request ID)
//! - Hand every inbound call to the dispatcher
//! - Stop accepting on shutdown and drain in-flight calls

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        DefaultBodyLimit, Form, Query, State,
    },
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::{merge_parameters, script_uri, MakeCallId};
use crate::lifecycle::shutdown;
use crate::routing::Router;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
}

/// HTTP front of the dispatcher.
pub struct HttpServer {
    app: axum::Router,
}

impl HttpServer {
    pub fn new(router: Arc<Router>) -> Self {
        let app = Self::build_router(router.config(), AppState { router: router.clone() });
        Self { app }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeCallId))
    }

    /// The assembled Axum router.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Serve until `shutdown` fires, then drain in-flight calls.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// One inbound call: merge parameters, dispatch, map the outcome.
async fn dispatch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let params = merge_parameters(query.ok().map(|q| q.0), form.ok().map(|f| f.0));
    let request = script_uri(&headers, &uri);

    state.router.handle(&params, Some(&request)).await.into_response()
}
