//! One-shot HTTP server for tests

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;

pub struct OneShotServer {
    addr: SocketAddr,
    handle: JoinHandle<String>,
}

impl OneShotServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw request text (head and body) received by the server
    pub fn request(self) -> String {
        self.handle.join().unwrap()
    }
}

/// Answer exactly one request with `status` and `body`, then shut down
pub fn serve_once(status: u16, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);

        let reason = if status < 400 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });

    OneShotServer { addr, handle }
}

fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&data).into_owned();
        }
        data.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_head_end(&data) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < head_end + 4 + content_length {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&data).into_owned()
}

fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}
