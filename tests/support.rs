use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Token the test server accepts on `/auth/`.
pub const TEST_TOKEN: &str = "secret-token";
/// Credential variable the CLI tests point `--api-key-env` at.
pub const TEST_KEY_ENV: &str = "CONCPROBE_TEST_API_KEY";

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    hits: Arc<AtomicUsize>,
}

impl ServerHandle {
    /// Requests accepted so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server for tests.
///
/// Routes by path prefix: `/throttled` answers 429 with a JSON detail,
/// `/plain-error` answers 502 with an HTML body, `/slow` waits a second before
/// answering, `/auth` requires `Authorization: Token <TEST_TOKEN>`, and
/// anything else answers 200.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let hits = Arc::new(AtomicUsize::new(0));
    let server_hits = Arc::clone(&hits);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    server_hits.fetch_add(1, Ordering::SeqCst);
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            hits,
        },
    ))
}

/// Like [`spawn_http_server`], but skips when the sandbox forbids sockets.
///
/// # Errors
///
/// Returns an error if the server fails for any other reason.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Returns a loopback URL with nothing listening behind it.
///
/// # Errors
///
/// Returns an error if a port cannot be reserved.
pub fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind probe port failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("probe addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn handle_client(mut stream: TcpStream) {
    let mut buffer = [0u8; 4096];
    let read = match stream.read(&mut buffer) {
        Ok(read) => read,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default()).into_owned();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();

    let (status, content_type, body) = route(&path, &request);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn route(path: &str, request: &str) -> (&'static str, &'static str, String) {
    if path.starts_with("/throttled") {
        return (
            "429 Too Many Requests",
            "application/json",
            r#"{"detail":"Request was throttled. Expected available in 1 second."}"#.to_owned(),
        );
    }
    if path.starts_with("/plain-error") {
        return (
            "502 Bad Gateway",
            "text/html",
            "<html><body>Bad Gateway</body></html>".to_owned(),
        );
    }
    if path.starts_with("/slow") {
        thread::sleep(Duration::from_secs(1));
        return ("200 OK", "application/json", "{}".to_owned());
    }
    if path.starts_with("/auth") {
        let expected = format!("authorization: token {}", TEST_TOKEN).to_ascii_lowercase();
        if request.to_ascii_lowercase().contains(&expected) {
            return ("200 OK", "application/json", r#"{"count":0}"#.to_owned());
        }
        return (
            "401 Unauthorized",
            "application/json",
            r#"{"detail":"Invalid token."}"#.to_owned(),
        );
    }
    ("200 OK", "application/json", r#"{"results":[]}"#.to_owned())
}

/// Run the `concprobe` binary in `dir` with only the given credential set.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_concprobe<I, S>(args: I, dir: &Path, api_key: Option<&str>) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = concprobe_bin()?;
    let mut command = Command::new(bin);
    command
        .args(args)
        .current_dir(dir)
        .env_remove(TEST_KEY_ENV)
        .env_remove("CONCPROBE_LOG")
        .env("RUST_LOG", "error");
    if let Some(key) = api_key {
        command.env(TEST_KEY_ENV, key);
    }
    command
        .output()
        .map_err(|err| format!("run concprobe failed: {}", err))
}

fn concprobe_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_concprobe").map_or_else(
        || Err("CARGO_BIN_EXE_concprobe missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
