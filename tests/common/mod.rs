//! Minimal JSON-RPC node for integration tests.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// A running mock node and the methods it has been asked for.
pub struct MockNode {
    pub url: String,
    pub methods: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    pub fn calls(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

/// Serve canned `result` values keyed by RPC method.
///
/// Methods without an entry get a JSON-RPC "method not found" error.
pub async fn spawn_mock_node(responses: HashMap<&'static str, Value>) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let methods = Arc::new(Mutex::new(Vec::new()));
    let responses = Arc::new(responses);

    let recorded = methods.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let responses = responses.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let _ = serve(stream, responses, recorded).await;
            });
        }
    });

    MockNode {
        url: format!("http://{}", addr),
        methods,
    }
}

/// An address nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(
    stream: TcpStream,
    responses: Arc<HashMap<&'static str, Value>>,
    recorded: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    // One request per iteration; the client keeps the connection alive
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let mut content_length = 0usize;
        loop {
            line.clear();
            reader.read_line(&mut line).await?;
            let header = line.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        let request: Value = serde_json::from_slice(&body)?;

        let method = request["method"].as_str().unwrap_or_default().to_string();
        recorded.lock().unwrap().push(method.clone());

        let reply = match responses.get(method.as_str()) {
            Some(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            None => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": -32601, "message": format!("method {} not found", method) }
            }),
        };

        let payload = reply.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
            payload.len(),
            payload
        );
        write.write_all(response.as_bytes()).await?;
    }
}
