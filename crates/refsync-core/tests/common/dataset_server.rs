//! Minimal HTTP/1.1 server with scripted per-path responses for integration tests.
//!
//! Each path gets a sequence of replies; the last one repeats once the
//! sequence is exhausted. Unknown paths get 404. Every request is counted per
//! path (query string excluded) and its full target is recorded. Replies can
//! be delayed; the server tracks how many requests it is answering at once.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub location: Option<String>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            location: None,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {}", status).into_bytes(),
            location: None,
            delay: Duration::ZERO,
        }
    }

    /// 302 to `location` (absolute URL or path).
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::status(302)
        }
    }

    /// Hold the reply for `delay` before sending it.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Vec<Reply>>,
    hits: HashMap<String, usize>,
    targets: Vec<String>,
    in_flight: usize,
    peak_in_flight: usize,
}

pub struct DatasetServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl DatasetServer {
    /// Starts serving `routes` (path → reply sequence) on an ephemeral port.
    /// The server runs until the process exits.
    pub fn start(routes: Vec<(&str, Vec<Reply>)>) -> Self {
        let state = State {
            routes: routes
                .into_iter()
                .map(|(path, replies)| (path.to_string(), replies))
                .collect(),
            ..State::default()
        };
        let state = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Absolute URL for `path_and_query` (must start with `/`).
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base, path_and_query)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    /// Most requests this server was answering at the same moment.
    pub fn peak_in_flight(&self) -> usize {
        self.state.lock().unwrap().peak_in_flight
    }

    /// Request targets (path plus query) in arrival order.
    pub fn targets(&self) -> Vec<String> {
        self.state.lock().unwrap().targets.clone()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();

    let reply = {
        let mut state = state.lock().unwrap();
        let seen = {
            let count = state.hits.entry(path.clone()).or_insert(0);
            *count += 1;
            *count
        };
        state.targets.push(target);
        state.in_flight += 1;
        state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
        match state.routes.get(&path) {
            Some(replies) if !replies.is_empty() => {
                replies[(seen - 1).min(replies.len() - 1)].clone()
            }
            _ => Reply::status(404),
        }
    };

    if !reply.delay.is_zero() {
        thread::sleep(reply.delay);
    }
    let location = reply
        .location
        .as_deref()
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\n{}Connection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        location
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&reply.body);
    state.lock().unwrap().in_flight -= 1;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
