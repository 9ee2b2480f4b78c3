//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves static bodies keyed by request path, answers unknown paths with
//! 404, supports one-hop redirects, and counts GET requests per path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 OK with this body.
    Body(Vec<u8>),
    /// Given status line (e.g. "503 Service Unavailable") with this body.
    Status(&'static str, Vec<u8>),
    /// 302 Found pointing at another path on this server.
    Redirect(&'static str),
}

#[derive(Clone)]
pub struct TestServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestServer {
    /// Full URL for `path` (which must start with '/').
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of GET requests seen for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(routes: Vec<(&'static str, Route)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let server = TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits: Arc::default(),
    };
    let hits = Arc::clone(&server.hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    server
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    let path = path.split('?').next().unwrap_or(path);

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    *hits.lock().unwrap().entry(path.to_string()).or_insert(0) += 1;

    let (status, extra, body): (&str, String, &[u8]) = match routes.get(path) {
        Some(Route::Body(body)) => ("200 OK", String::new(), body.as_slice()),
        Some(Route::Status(status, body)) => (*status, String::new(), body.as_slice()),
        Some(Route::Redirect(to)) => ("302 Found", format!("Location: {}\r\n", to), &[][..]),
        None => ("404 Not Found", String::new(), &b"no such file"[..]),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
