//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Route every request by its Host header against the current session
//! - Forward the request to the chosen service, tagged with the entry point
//! - Publish rebuilt sessions received from the config watcher

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderName, HeaderValue, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DevConfig;
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::RouteDecision;
use crate::session::{Session, SessionHandle};

/// Header naming the entry point a forwarded request targets.
/// Absent when the request goes to the service's default export.
pub static ENTRYPOINT_HEADER: HeaderName = HeaderName::from_static("x-devhost-entrypoint");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionHandle,
    pub client: Client<HttpConnector, Body>,
}

/// Where one request is going, detached from the session snapshot.
#[derive(Debug)]
struct Target {
    service: String,
    entry_point: Option<String>,
    addr: SocketAddr,
}

/// HTTP server for the development proxy.
pub struct HttpServer {
    router: Router,
    sessions: SessionHandle,
}

impl HttpServer {
    /// Create a new HTTP server serving the sessions published in `sessions`.
    pub fn new(config: &DevConfig, sessions: SessionHandle) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            sessions: sessions.clone(),
            client,
        };

        let router = Self::build_router(config, state);
        Self { router, sessions }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Sessions arriving on `updates` replace the current one wholesale.
    pub async fn run(
        self,
        listener: TcpListener,
        mut updates: mpsc::UnboundedReceiver<Session>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sessions = self.sessions.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    next = updates.recv() => {
                        let Some(session) = next else { break };
                        let services = session.table().service_labels().count();
                        sessions.publish(session);
                        tracing::info!(services, "Published new session");
                    }
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Host the client asked for: the Host header, else the URI authority.
fn requested_host(request: &Request<Body>) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Route `host` against the current session and detach the result.
fn select_target(sessions: &SessionHandle, host: &str) -> Option<Target> {
    let session = sessions.load();
    let decision = session.table().route(host);
    metrics::record_route(&decision);

    let (service, entry_point) = match decision {
        RouteDecision::Entrypoint {
            service,
            entry_point,
        } => (service, Some(entry_point.to_string())),
        RouteDecision::Default { service } => (service, None),
        RouteDecision::NotFound => return None,
    };

    let Some(addr) = session.upstream(service) else {
        tracing::warn!(service = %service, "Routed service has no upstream address");
        return None;
    };
    Some(Target {
        service: service.to_string(),
        entry_point,
        addr,
    })
}

/// Rewrite `request` so it can be sent to `target`.
fn upstream_request(request: Request<Body>, target: &Target) -> Option<Request<Body>> {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(Authority::from_str(&target.addr.to_string()).ok()?);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts).ok()?;

    // Never trust a client-supplied entry point.
    parts.headers.remove(&ENTRYPOINT_HEADER);
    if let Some(entry_point) = &target.entry_point {
        let value = HeaderValue::from_str(entry_point).ok()?;
        parts.headers.insert(ENTRYPOINT_HEADER.clone(), value);
    }

    Some(Request::from_parts(parts, body))
}

/// Main dispatch handler.
/// Classifies the Host header and forwards to the matching service.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let host = requested_host(&request);

    let Some(target) = select_target(&state.sessions, &host) else {
        tracing::debug!(request_id = %request_id, host = %host, "No route for host");
        metrics::record_request(404, start_time);
        return (StatusCode::NOT_FOUND, "No entry point found for this host").into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        host = %host,
        service = %target.service,
        entry_point = target.entry_point.as_deref().unwrap_or("default"),
        upstream = %target.addr,
        "Dispatching request"
    );

    let Some(req) = upstream_request(request, &target) else {
        tracing::error!(request_id = %request_id, host = %host, "Failed to build upstream request");
        metrics::record_request(502, start_time);
        return (StatusCode::BAD_GATEWAY, "Invalid upstream request").into_response();
    };

    match state.client.request(req).await {
        Ok(response) => {
            metrics::record_request(response.status().as_u16(), start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                service = %target.service,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(502, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
