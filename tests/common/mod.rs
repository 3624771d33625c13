//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Router,
};
use relay_proxy::config::ProxyConfig;
use relay_proxy::lifecycle::Shutdown;
use relay_proxy::HttpServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

/// Public IP every test proxy reports unless a test overrides it.
pub const TEST_PROXY_IP: &str = "203.0.113.7";

/// Proxy configuration pointing at `target_url`, with a static public IP so
/// no test ever reaches the real lookup service.
pub fn proxy_config(target_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.target_url = target_url.to_string();
    config.upstream.proxy_server_ip = Some(TEST_PROXY_IP.to_string());
    config.upstream.ip_lookup_timeout_secs = 2;
    config
}

/// Start the proxy on an ephemeral port. Triggering or dropping the
/// returned coordinator stops it.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();

    tokio::spawn(server.run(listener, shutdown.signalled()));

    (addr, shutdown)
}

/// Client that talks to the proxy directly and never follows redirects.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Backend that describes the request it received as plain text:
/// request line, one `name: value` line per header value, blank line, body.
///
/// `/teapot` answers 418 and `/redirect` answers 302; everything else 200
/// with two `set-cookie` values.
pub async fn start_echo_backend() -> SocketAddr {
    serve(Router::new().fallback(echo)).await
}

async fn echo(request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let mut lines = vec![format!("{} {}", parts.method, parts.uri)];
    for (name, value) in &parts.headers {
        lines.push(format!("{}: {}", name, value.to_str().unwrap_or("<binary>")));
    }
    lines.push(String::new());
    lines.push(String::from_utf8_lossy(&body).into_owned());
    let text = lines.join("\n");

    match parts.uri.path() {
        "/teapot" => (StatusCode::IM_A_TEAPOT, text).into_response(),
        "/redirect" => (
            StatusCode::FOUND,
            [(header::LOCATION, "/elsewhere")],
            text,
        )
            .into_response(),
        _ => (
            StatusCode::OK,
            AppendHeaders([(header::SET_COOKIE, "a=1"), (header::SET_COOKIE, "b=2")]),
            text,
        )
            .into_response(),
    }
}

/// Plain-text public IP lookup service.
pub async fn start_ip_service(ip: &'static str) -> SocketAddr {
    serve(Router::new().fallback(move || async move { ip })).await
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

async fn write_chunk(socket: &mut TcpStream, data: &[u8]) -> std::io::Result<()> {
    socket.write_all(format!("{:x}\r\n", data.len()).as_bytes()).await?;
    socket.write_all(data).await?;
    socket.write_all(b"\r\n").await?;
    socket.flush().await
}

const CHUNKED_HEAD: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";

/// Chunked backend that sends `chunks` one by one, waiting on `gate` between
/// them, then terminates the body cleanly.
pub async fn start_gated_stream_backend(chunks: Vec<&'static str>, gate: Arc<Notify>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        socket.write_all(CHUNKED_HEAD).await.unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                gate.notified().await;
            }
            write_chunk(&mut socket, chunk.as_bytes()).await.unwrap();
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        let _ = socket.shutdown().await;
    });

    addr
}

/// Chunked backend that sends one chunk and then drops the connection
/// without terminating the body.
pub async fn start_broken_stream_backend(first: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        socket.write_all(CHUNKED_HEAD).await.unwrap();
        write_chunk(&mut socket, first.as_bytes()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(socket);
    });

    addr
}

/// Chunked backend that streams forever until a write fails, then sets the
/// returned flag.
pub async fn start_endless_stream_backend() -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let write_failed = Arc::new(AtomicBool::new(false));
    let flag = write_failed.clone();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        if socket.write_all(CHUNKED_HEAD).await.is_err() {
            flag.store(true, Ordering::SeqCst);
            return;
        }
        loop {
            if write_chunk(&mut socket, b"data: tick\n\n").await.is_err() {
                flag.store(true, Ordering::SeqCst);
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    (addr, write_failed)
}

/// Backend that reads each request head and closes the connection without
/// writing a single response byte.
pub async fn start_dropping_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request_head(&mut socket).await;
            drop(socket);
        }
    });

    addr
}
