//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatcher behind every path
//! - Wire up middleware (CORS, request ID, trace, timeout, body limit)
//! - Apply the internal-route filter and the request span
//! - Serve until the shutdown signal fires
//!
//! # Layer order (outermost first)
//! ```text
//! CORS → set request ID → trace → propagate request ID → timeout
//!     → body limit → internal filter → span → dispatcher
//! ```

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::CorsConfig;
use crate::config::GatewayConfig;
use crate::http::dispatch::{dispatch, BuildError, Dispatcher};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::tracing::{span_middleware, LogTracer, NoopTracer, RequestTracer};
use crate::security::internal_filter::internal_route_filter;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server; spans go to the log unless disabled in config.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        let tracer: Arc<dyn RequestTracer> = if config.observability.spans_enabled {
            Arc::new(LogTracer)
        } else {
            Arc::new(NoopTracer)
        };
        Self::with_tracer(config, tracer)
    }

    /// Create a server reporting spans to `tracer`.
    pub fn with_tracer(
        config: GatewayConfig,
        tracer: Arc<dyn RequestTracer>,
    ) -> Result<Self, BuildError> {
        let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
        tracing::info!(routes = dispatcher.routes().rules().len(), "Route table built");

        let router = Self::build_router(&config, dispatcher, tracer);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        dispatcher: Arc<Dispatcher>,
        tracer: Arc<dyn RequestTracer>,
    ) -> Router {
        let router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(dispatcher)
            .layer(middleware::from_fn_with_state(tracer, span_middleware))
            .layer(middleware::from_fn(internal_route_filter))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());

        if config.cors.enabled {
            router.layer(cors_layer(&config.cors))
        } else {
            router
        }
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Origins come from config; invalid entries are skipped with a warning.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
