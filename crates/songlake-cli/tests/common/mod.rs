use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Run the CLI binary against an isolated store directory.
pub fn run_cli(args: &[&str], store: &Path) -> Output {
    run_cli_with_stdin(args, store, "")
}

/// Run the CLI binary, feeding `stdin` to the process.
pub fn run_cli_with_stdin(args: &[&str], store: &Path, stdin: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_songlake"));
    cmd.args(args);
    cmd.env("SONGLAKE_STORE", store);
    cmd.env_remove("SONGLAKE_ENV");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().expect("Failed to execute CLI");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(args: &[&str], store: &Path) -> String {
    let output = run_cli(args, store);
    assert_success(args, &output);
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn assert_success(args: &[&str], output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
}

/// Parse one JSON song per stdout line.
pub fn songs(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

/// Ingest one song from flags and return its id.
pub fn ingest(store: &Path, uri: &str, tags: &[&str]) -> String {
    let mut args = vec!["ingest", "--uri", uri];
    for tag in tags {
        args.push("--tag");
        args.push(tag);
    }
    run_cli_success(&args, store).trim().to_string()
}
