use eyre::Result;
use hazdist_lib::config::{Config, ExitCodePolicy, RetryConfig};
use hazdist_lib::progress::ProgressSink;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

pub const SERVICE_PATH: &str = "/hazdistributionservice.aspx";

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// `None` omits the header; the connection is closed after the body.
    pub content_length: Option<u64>,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self {
            status: 200,
            content_length: Some(body.len() as u64),
            body,
            delay: None,
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::ok(value.to_string())
    }

    pub fn version(version: &str) -> Self {
        Self::json(serde_json::json!({ "version": version }))
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok(reason_phrase(status))
        }
    }

    pub fn without_content_length(mut self) -> Self {
        self.content_length = None;
        self
    }

    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

type Handler = dyn Fn(&str, usize) -> MockResponse + Send + Sync;

/// Minimal HTTP/1.1 server answering every request through `handler`, which
/// receives the request target (path and query) and the zero-based index of
/// the request.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> Result<Self>
    where
        F: Fn(&str, usize) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let task = {
            let requests = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let handler = handler.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        if let Err(err) = serve_connection(stream, handler, requests).await {
                            tracing::debug!("Mock connection failed: {}", err);
                        }
                    });
                }
            })
        };

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, SERVICE_PATH))
            .expect("mock server URL must be valid")
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    let request = String::from_utf8_lossy(&buffer);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let index = {
        let mut requests = requests.lock().unwrap_or_else(PoisonError::into_inner);
        requests.push(target.clone());
        requests.len() - 1
    };
    let response = handler(&target, index);

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        reason_phrase(response.status)
    );
    if let Some(len) = response.content_length {
        head.push_str(&format!("Content-Length: {len}\r\n"));
    }
    head.push_str("Content-Type: application/octet-stream\r\nConnection: close\r\n\r\n");

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&response.body).await?;
    stream.shutdown().await
}

/// Returns an address nothing listens on.
pub async fn unused_base_url() -> Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Url::parse(&format!("http://{addr}{SERVICE_PATH}"))?)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(Option<u64>),
    Advance(u64),
    Finish,
    Abandon,
}

#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    fn record(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn starts(&self) -> Vec<Option<u64>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Start(total) => Some(total),
                _ => None,
            })
            .collect()
    }

    pub fn advanced(&self) -> u64 {
        self.events()
            .into_iter()
            .map(|event| match event {
                ProgressEvent::Advance(bytes) => bytes,
                _ => 0,
            })
            .sum()
    }
}

impl ProgressSink for RecordingProgress {
    fn start(&self, total: Option<u64>) {
        self.record(ProgressEvent::Start(total));
    }

    fn advance(&self, bytes: u64) {
        self.record(ProgressEvent::Advance(bytes));
    }

    fn finish(&self) {
        self.record(ProgressEvent::Finish);
    }

    fn abandon(&self) {
        self.record(ProgressEvent::Abandon);
    }
}

pub fn create_test_config(base_url: &Url, output_dir: &Path) -> Config {
    Config {
        base_url: base_url.to_string(),
        output_dir: output_dir.to_path_buf(),
        version_timeout_secs: 5,
        download_timeout_secs: 5,
        retry: RetryConfig {
            max_attempts: 3,
            delay_secs: 0,
        },
        exit_code_policy: ExitCodePolicy::Nonzero,
    }
}

/// Creates a temporary directory holding `config.json` for `base_url`, with
/// downloads going to `<temp>/downloads`.
pub fn setup_test_environment(base_url: &Url) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;

    let config = create_test_config(base_url, &temp_dir.path().join("downloads"));
    let config_path = temp_dir.path().join("config.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    Ok((temp_dir, config_path))
}

/// Deterministic archive-like payload.
pub fn sample_archive(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
