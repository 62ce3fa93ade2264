//! A minimal HTTP server that records webhook deliveries
//!
//! Each request body is stored and answered with a fixed status. Only what
//! the notifier sends is supported: one POST per connection with a
//! `Content-Length` body.

use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

pub struct WebhookRecorder {
    addr: SocketAddr,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl WebhookRecorder {
    /// Start a recorder answering `200 OK`
    pub fn start() -> Self {
        Self::with_status(200)
    }

    /// Start a recorder answering every request with `status`
    pub fn with_status(status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind webhook listener");
        let addr = listener.local_addr().expect("Failed to read listener address");
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&bodies);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, status, &recorded);
            }
        });

        Self { addr, bodies }
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    /// Raw request bodies in arrival order
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().clone()
    }

    /// The `text` field of every JSON body
    pub fn messages(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .filter_map(|body| serde_json::from_str::<serde_json::Value>(body).ok())
            .filter_map(|value| value["text"].as_str().map(str::to_string))
            .collect()
    }
}

/// Read one request; the body is recorded before the response is written
fn handle(mut stream: TcpStream, status: u16, bodies: &Mutex<Vec<String>>) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    bodies.lock().push(String::from_utf8_lossy(&body).into_owned());

    let response = format!(
        "HTTP/1.1 {} Recorded\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}
