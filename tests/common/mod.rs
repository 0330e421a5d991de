#![allow(dead_code)]

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

const SCRUBBED_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "GEMINI_WEB_SEARCH",
    "SYSTEM_INSTRUCTION",
    "MODEL_TIMEOUT_SECS",
    "RUST_LOG",
    "LOG_FORMAT",
    "LOG_OUTPUT",
    "LOG_FILE_PATH",
];

pub fn unique_temp_dir(suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "gemini-agent-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}

/// Runs the binary from an empty directory so no stray `.env` file is picked up.
pub fn run_agent(envs: &[(&str, &str)], stdin: &str) -> Output {
    run_agent_bytes(envs, stdin.as_bytes())
}

pub fn run_agent_bytes(envs: &[(&str, &str)], stdin: &[u8]) -> Output {
    let workdir = unique_temp_dir("cwd");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gemini-agent"));
    cmd.current_dir(&workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for var in SCRUBBED_VARS {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());

    let mut child = cmd.spawn().expect("failed to run gemini-agent binary");
    if let Some(mut pipe) = child.stdin.take() {
        // The process may exit before reading everything (missing key).
        let _ = pipe.write_all(stdin);
    }
    let output = child
        .wait_with_output()
        .expect("failed to wait for gemini-agent binary");
    let _ = fs::remove_dir_all(&workdir);
    output
}

/// A bound listener that never answers; used to prove no request was made.
pub struct SilentEndpoint {
    listener: TcpListener,
}

impl SilentEndpoint {
    pub fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        Self { listener }
    }

    pub fn base_url(&self) -> String {
        let addr = self.listener.local_addr().expect("address should be available");
        format!("http://{addr}/v1beta")
    }

    pub fn assert_untouched(&self) {
        self.listener
            .set_nonblocking(true)
            .expect("listener should switch to non-blocking");
        match self.listener.accept() {
            Err(err) if err.kind() == ErrorKind::WouldBlock => {}
            Ok(_) => panic!("expected no network calls, but a connection was made"),
            Err(err) => panic!("unexpected accept error: {err}"),
        }
    }
}

pub fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}/v1beta")
}

fn read_http_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).expect("read should succeed");
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);

        let Some(header_end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers one request with `200 OK` and `body`, returning the raw request.
pub fn serve_json_once(body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        let request = read_http_request(&mut stream);
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .expect("write should succeed");
        request
    });
    (format!("http://{addr}/v1beta"), server)
}
