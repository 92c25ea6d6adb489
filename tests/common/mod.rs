//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use devhost_router::config::parse_config;
use devhost_router::{DevConfig, HttpServer, Session, SessionHandle, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Pull the entry point header out of a raw HTTP/1.1 request head.
fn entry_point_of(head: &str) -> String {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("x-devhost-entrypoint"))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_else(|| "default".to_string())
}

/// Start a mock service that answers `"<name>:<entry point or default>"`.
pub async fn start_service_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let body = format!("{}:{}", name, entry_point_of(&head));
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A running proxy plus the handles a test needs to drive it.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub sessions: SessionHandle,
    pub updates: mpsc::UnboundedSender<Session>,
}

/// Parse `toml` (which must not set a bind address) and start a proxy on an ephemeral port.
pub async fn start_proxy(toml: &str) -> TestProxy {
    let config: DevConfig = parse_config(toml).unwrap();
    let session = Session::build(&config).unwrap();
    let sessions = SessionHandle::new(session);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, update_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(&config, sessions.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, update_rx, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestProxy {
        addr,
        shutdown,
        sessions,
        updates,
    }
}

/// GET `/` from the proxy with the given Host header; returns (status, body).
pub async fn get(proxy: &TestProxy, host: &str) -> (u16, String) {
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    let res = client
        .get(format!("http://{}/", proxy.addr))
        .header("Host", format!("{}:{}", host, proxy.addr.port()))
        .send()
        .await
        .expect("Proxy unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}
