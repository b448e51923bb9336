//! Shared harness for the specs

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Upper bound for any polled condition
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// Fuzz tool stand-in. Blocks until the harness drops a `release-<slug>`
/// file, then writes a result artifact the way the real tool does.
const FUZZ_SCRIPT: &str = r#"#!/bin/sh
slug="$1"
while [ ! -f "release-$slug" ]; do sleep 0.05; done
mkdir -p data/plugin_fuzz_results
printf '{"command_results":[{"cmd":"wp plugin activate %s","object_name":"%s","return_code":0,"stdout":"ok, done","stderr":""}]}' \
  "$slug" "$slug" > "data/plugin_fuzz_results/${slug}_run.json"
"#;

/// Poll `f` every 50ms until it holds or `max_ms` elapses
pub fn wait_for(max_ms: u64, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if f() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// `wf` with no daemon address configured beyond the defaults
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    fn new() -> Self {
        let mut cmd = assert_cmd::Command::cargo_bin("wf").expect("wf binary is built");
        cmd.env_remove("WF_HTTP_PORT").env_remove("WF_BIND_ADDR");
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().expect("wf runs");
        let run = RunAssert { output };
        assert!(run.output.status.success(), "expected success\n{}", run.describe());
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().expect("wf runs");
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout lacks {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr lacks {needle:?}\n{}", self.describe());
        self
    }

    pub fn code_is(self, code: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(code), "{}", self.describe());
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).expect("stdout is JSON")
    }

    fn describe(&self) -> String {
        format!("status: {}\nstdout:\n{}\nstderr:\n{}", self.output.status, self.stdout(), self.stderr())
    }
}

/// A temporary installation: state dir, fuzz tool checkout, and catalog
pub struct Project {
    dir: TempDir,
    catalog: SocketAddr,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::create_dir_all(dir.path().join("wpgarlic")).unwrap();
        std::fs::write(dir.path().join("wpgarlic/fuzz.sh"), FUZZ_SCRIPT).unwrap();
        let catalog = serve_catalog();
        Self { dir, catalog }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.state_dir().join("archive")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.path().join("wpgarlic/data/plugin_fuzz_results")
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Let the scripted fuzz run for `slug` finish
    pub fn release(&self, slug: &str) {
        self.file(&format!("wpgarlic/release-{}", slug), "");
    }

    /// `wfd` configured for this project
    pub fn daemon_command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("wfd"));
        cmd.env("WF_STATE_DIR", self.state_dir())
            .env("WF_HTTP_PORT", "0")
            .env("WF_BIND_ADDR", "127.0.0.1")
            .env("WF_FUZZER_DIR", self.path().join("wpgarlic"))
            .env("WF_FUZZER_CMD", "sh fuzz.sh")
            .env("WF_POSTPROCESS_CMD", "true")
            .env("WF_TEARDOWN_CMD", "true")
            .env("WF_CATALOG_URL", format!("http://{}/plugins/info/1.2/", self.catalog))
            .env_remove("WF_RESULTS_DIR")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Start `wfd` and wait for its `READY` line
    pub fn start_daemon(&self) -> Daemon {
        let mut child = self.daemon_command().spawn().expect("wfd spawns");
        let stdout = child.stdout.take().expect("piped stdout");
        let mut line = String::new();
        BufReader::new(stdout).read_line(&mut line).unwrap();

        let Some(addr) = line.trim().strip_prefix("READY ") else {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let _ = child.kill();
            panic!("wfd did not become ready: {line:?}\n{stderr}");
        };
        let addr = addr.parse().expect("READY carries a socket address");
        Daemon { child, addr }
    }
}

/// A running `wfd`; killed on drop
pub struct Daemon {
    child: Child,
    addr: SocketAddr,
}

impl Daemon {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// `wf` pointed at this daemon
    pub fn wf(&self) -> CliBuilder {
        let addr = self.addr.to_string();
        cli().args(&["--addr", &addr])
    }

    /// Send SIGTERM and wait for a clean exit
    pub fn terminate(mut self) -> ExitStatus {
        Command::new("kill")
            .args(["-TERM", &self.pid().to_string()])
            .status()
            .expect("kill runs");
        let mut status = None;
        wait_for(SPEC_WAIT_MAX_MS, || {
            status = self.child.try_wait().ok().flatten();
            status.is_some()
        });
        status.expect("wfd exits after SIGTERM")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Minimal stand-in for the WordPress.org plugin information API. Every
/// slug exists except `nonexistent`.
fn serve_catalog() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if header.trim().is_empty() => break,
                    Ok(_) => {}
                }
            }
            let body = if request_line.contains("nonexistent") {
                r#"{"error":"Plugin not found."}"#.to_string()
            } else {
                r#"{"slug":"plugin","name":"Plugin","version":"1.0"}"#.to_string()
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = reader.get_mut().write_all(response.as_bytes());
        }
    });
    addr
}
