//! Runs the simulator binary briefly and checks its trace output.

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

#[test]
fn simulator_traces_priming_and_first_delivery() {
    let bin = env!("CARGO_BIN_EXE_bottle_line");
    let mut child = Command::new(bin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start simulator");

    // First delivery is due after 2s; no fill can finish before 4s.
    thread::sleep(Duration::from_millis(3500));
    child.kill().expect("failed to stop simulator");
    let output = child.wait_with_output().expect("failed to collect output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("Full bottles removed, take full bottles from machines"),
        "priming line missing:\n{stdout}"
    );
    assert!(
        stdout.contains("New empty bottles arrived, sending to machines"),
        "delivery line missing:\n{stdout}"
    );
    assert!(
        stdout.contains(": receives empty bottles"),
        "machine pickup line missing:\n{stdout}"
    );
    assert!(
        !stdout.contains("finished filling bottles"),
        "fill finished too early:\n{stdout}"
    );

    // Every trace line carries the timestamp and thread prefix.
    let delivery = stdout
        .lines()
        .find(|line| line.contains("New empty bottles arrived"))
        .expect("delivery line");
    assert!(delivery.starts_with('['));
    assert!(delivery.contains("][arrival] "));
}

#[test]
fn extra_arguments_are_ignored() {
    let bin = env!("CARGO_BIN_EXE_bottle_line");
    let mut child = Command::new(bin)
        .args(["--help", "bench"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start simulator");

    thread::sleep(Duration::from_millis(500));
    // Still running: the arguments neither printed usage nor ended the process.
    assert!(child.try_wait().expect("poll simulator").is_none());
    child.kill().expect("failed to stop simulator");
    let output = child.wait_with_output().expect("failed to collect output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("Full bottles removed, take full bottles from machines"),
        "priming line missing:\n{stdout}"
    );
    assert!(!stdout.contains("Usage:"));
}
