//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use resource_api_client::error::{HttpError, NetworkError, SdkResult};
use resource_api_client::http::{HttpResponse, PreparedRequest, ReqwestTransport, Transport};
use resource_api_client::resilience::NoBackoff;
use resource_api_client::{ClientBuilder, RetryableHttpClient};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub path: String,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Response written by the mock backend.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".into(), "application/json".into())],
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".into(), "text/plain".into())],
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request is recorded before `f` decides the response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = Arc::clone(&f);
                    let recorded = Arc::clone(&recorded);
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        recorded.lock().unwrap().push(request.clone());
                        let response = f(request).await;
                        write_response(&mut socket, &response).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

async fn write_response(socket: &mut TcpStream, response: &MockResponse) {
    let reason = match response.status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason);
    for (name, value) in &response.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.body.len(),
        response.body
    ));
    let _ = socket.write_all(out.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// What a [`MockTransport`] answers for one request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(u16, Value),
    JsonWithHeaders(u16, Value, Vec<(&'static str, &'static str)>),
    Network,
}

type ReplyFn = Box<dyn Fn(&PreparedRequest) -> MockReply + Send + Sync>;

/// In-memory [`Transport`] that counts and records every call.
pub struct MockTransport {
    handler: ReplyFn,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&PreparedRequest) -> MockReply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Replies in order; `500` once the script runs out.
    pub fn scripted(replies: Vec<MockReply>) -> Arc<Self> {
        let script = Mutex::new(VecDeque::from(replies));
        Self::new(move |_| {
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(MockReply::Json(500, Value::String("unscripted".into())))
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, SdkResult<HttpResponse>> {
        let reply = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move {
            let (status, data, extra) = match reply {
                MockReply::Json(status, data) => (status, data, Vec::new()),
                MockReply::JsonWithHeaders(status, data, headers) => (status, data, headers),
                MockReply::Network => {
                    return Err(NetworkError::Connect("connection refused".into()).into())
                }
            };
            let mut headers = HeaderMap::new();
            for (name, value) in extra {
                headers.insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                );
            }
            if (200..300).contains(&status) {
                Ok(HttpResponse {
                    status,
                    headers,
                    data,
                })
            } else {
                Err(HttpError::new(status, data, headers).into())
            }
        })
    }
}

/// Builder against a mock backend, without backoff delays.
pub fn client_for(backend: &MockBackend) -> ClientBuilder {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RetryableHttpClient::builder(backend.base_url())
        .transport(Arc::new(ReqwestTransport::with_client(http)))
        .backoff(Arc::new(NoBackoff))
}

/// Builder over an in-memory transport, without backoff delays.
pub fn client_with(transport: &Arc<MockTransport>) -> ClientBuilder {
    RetryableHttpClient::builder("https://api.example.com/api/v1/projects/demo")
        .transport(Arc::clone(transport) as Arc<dyn Transport>)
        .backoff(Arc::new(NoBackoff))
}
