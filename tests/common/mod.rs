//! Shared utilities for integration tests: mock backends and a gateway on an ephemeral port.

#![allow(dead_code)]

use booking_gateway::auth::{Claims, Role, TokenKeys};
use booking_gateway::config::schema::ServiceName;
use booking_gateway::observability::tracing::NoopTracer;
use booking_gateway::{GatewayConfig, HttpServer, Shutdown};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-secret";

/// One request as seen by a mock HTTP backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct MockHttpBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend received no request")
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Start an HTTP backend that records every request and answers `status` with `body`.
pub async fn start_http_backend(status: u16, body: &'static str) -> MockHttpBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                    return;
                }
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut headers = Vec::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        let value = value.trim().to_string();
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.parse().unwrap_or(0);
                        }
                        headers.push((name.to_string(), value));
                    }
                }

                let mut body_bytes = vec![0u8; content_length];
                reader.read_exact(&mut body_bytes).await.unwrap();

                recorded.lock().unwrap().push(RecordedRequest {
                    method,
                    target,
                    headers,
                    body: String::from_utf8_lossy(&body_bytes).into_owned(),
                });

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                let _ = write.write_all(response.as_bytes()).await;
                let _ = write.shutdown().await;
            });
        }
    });

    MockHttpBackend { addr, requests }
}

/// How a mock RPC backend answers.
#[derive(Debug, Clone, Copy)]
pub enum RpcReply {
    /// Write these bytes, then close.
    Bytes(&'static str),
    /// Close without writing anything.
    Close,
    /// Keep the connection open and never answer.
    Hang,
}

pub struct MockRpcBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockRpcBackend {
    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    pub fn calls(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a line-framed RPC backend that records each request frame.
pub async fn start_rpc_backend(reply: RpcReply) -> MockRpcBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut line = String::new();
                BufReader::new(read).read_line(&mut line).await.unwrap();
                if let Ok(frame) = serde_json::from_str::<Value>(&line) {
                    recorded.lock().unwrap().push(frame);
                }
                match reply {
                    RpcReply::Bytes(bytes) => {
                        let _ = write.write_all(bytes.as_bytes()).await;
                        let _ = write.shutdown().await;
                    }
                    RpcReply::Close => {
                        let _ = write.shutdown().await;
                    }
                    RpcReply::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });

    MockRpcBackend { addr, requests }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config with every backend unreachable; tests point the ones they use at mocks.
pub async fn test_config() -> GatewayConfig {
    let dead = closed_addr().await;
    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.cors.enabled = false;
    config.observability.spans_enabled = false;
    for service in ServiceName::ALL {
        *config.services.url_mut(service) = format!("http://{}", dead);
    }
    config.rpc.stakeholder = dead.to_string();
    config.rpc.blog = dead.to_string();
    config.rpc.purchase = dead.to_string();
    config.rpc.call_timeout_ms = 2_000;
    config.timeouts.upstream_secs = 5;
    config
}

pub struct TestGateway {
    pub url: String,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn at(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `config` on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::with_tracer(config, Arc::new(NoopTracer)).unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestGateway {
        url: format!("http://{}", addr),
        shutdown,
    }
}

fn keys() -> TokenKeys {
    TokenKeys::new(SECRET.as_bytes(), 0)
}

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

pub fn token(username: &str, role: Role) -> String {
    keys().issue(username, role, 3600).unwrap()
}

pub fn bearer(username: &str, role: Role) -> String {
    format!("Bearer {}", token(username, role))
}

/// Correctly signed, but without a role claim.
pub fn token_without_role(username: &str) -> String {
    keys()
        .sign(&Claims {
            username: Some(username.to_string()),
            role: None,
            exp: now() + 3600,
            iat: Some(now()),
        })
        .unwrap()
}

pub fn expired_token(username: &str, role: Role) -> String {
    keys()
        .sign(&Claims {
            username: Some(username.to_string()),
            role: Some(role.as_str().to_string()),
            exp: now() - 3600,
            iat: Some(now() - 7200),
        })
        .unwrap()
}

pub fn foreign_token(username: &str, role: Role) -> String {
    TokenKeys::new(b"someone-else", 0)
        .issue(username, role, 3600)
        .unwrap()
}
