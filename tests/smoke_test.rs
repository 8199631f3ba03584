/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn specan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_specan"))
}

#[test]
fn binary_shows_help() {
    let output = specan()
        .arg("--help")
        .output()
        .expect("Failed to execute specan");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("specan"), "Help output should mention specan");
    assert!(stdout.contains("tone"), "Help output should list the tone command");
}

#[test]
fn binary_shows_version() {
    let output = specan()
        .arg("--version")
        .output()
        .expect("Failed to execute specan");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = specan()
        .arg("nonexistent-command")
        .output()
        .expect("Failed to execute specan");

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn headless_tone_reports_peak() {
    let output = specan()
        .args([
            "tone", "--freq", "1000", "--seed", "7", "--chunk", "1024", "--interval", "5",
            "--headless", "3",
        ])
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute specan");

    assert!(
        output.status.success(),
        "Headless tone run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "Expected one line per tick, got: {}", stdout);
    assert!(lines.iter().all(|l| l.contains("[RUNNING]") && l.contains("Peak:")));
}

#[test]
fn bad_chunk_size_is_rejected() {
    let output = specan()
        .args(["tone", "--chunk", "1000", "--headless", "1"])
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute specan");

    assert!(!output.status.success(), "Non power-of-two chunk should be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("power of two"), "Unexpected error: {}", stderr);
    assert!(!stderr.contains("panicked at"));
}
