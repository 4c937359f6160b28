//! Shared fixtures: a mockito server for scripted replies and raw TCP listeners for
//! endpoints that never answer, answer late, stall mid-body or refuse connections.

#![allow(dead_code)]

use agent_webhook::AgentClient;
use mockito::{Matcher, Mock, ServerGuard};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const HOOK_PATH: &str = "/webhook/chat";

pub struct MockAgent {
    pub server: ServerGuard,
}

impl MockAgent {
    pub async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
        }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.server.url(), HOOK_PATH)
    }

    /// Reply to a chat POST carrying `message` with `status` and `body`.
    pub async fn reply_to(&mut self, message: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", HOOK_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({ "message": message })))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    /// Reply to any POST with `status` and `body`.
    pub async fn reply(&mut self, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", HOOK_PATH)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }
}

/// Endpoint that accepts connections and never writes a byte back.
pub async fn silent_endpoint() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (format!("http://{}{}", addr, HOOK_PATH), handle)
}

/// `200 OK` with a JSON body and an exact `Content-Length`.
pub fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

/// `200 OK` headers promising 100 bytes, followed by only a few of them.
pub const STALLED_BODY_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial";

/// Endpoint that reads each request, waits `delay`, writes `response` verbatim and then
/// keeps the connection open.
pub async fn scripted_endpoint(delay: Duration, response: String) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            held.push(socket);
        }
    });
    (format!("http://{}{}", addr, HOOK_PATH), handle)
}

/// Consume one request: headers plus `Content-Length` bytes of body.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }
}

/// Address nothing listens on.
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, HOOK_PATH)
}

pub fn client(chat: Duration, probe: Duration) -> AgentClient {
    AgentClient::builder()
        .chat_deadline(chat)
        .probe_deadline(probe)
        .build()
        .unwrap()
}

pub fn default_client() -> AgentClient {
    client(Duration::from_secs(10), Duration::from_secs(5))
}
