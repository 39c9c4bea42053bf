//! Process exit status of the `beacon-logger` binary

use std::path::Path;
use std::process::{Command, Output};

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let config = format!(
        r#"
[serial]
port_template = "{root}/no-such-tty{{n}}"
last_port = 2
timeout_ms = 100

[telemetry]
csv_path = "{root}/sdr.csv"

[beacon]
log_path = "{root}/beacon_data.txt"
{extra}"#,
        root = dir.display().to_string().replace('\\', "/"),
        extra = extra,
    );
    let path = dir.join("beacon.toml");
    std::fs::write(&path, config).unwrap();
    path
}

fn run(config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_beacon-logger"))
        .arg("--config")
        .arg(config)
        .output()
        .unwrap()
}

#[test]
fn test_no_receiver_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = run(&config);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No GPS receiver found"));
    assert!(!dir.path().join("beacon_data.txt").exists());
}

#[test]
fn test_unusable_diagnostics_directory_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let logging = format!(
        "\n[logging]\ndirectory = \"{}/sub\"\n",
        blocker.display().to_string().replace('\\', "/")
    );
    let config = write_config(dir.path(), &logging);

    let output = run(&config);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open diagnostics directory"));
}

#[test]
fn test_invalid_configuration_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "format = \"xml\"\n");

    let output = run(&config);
    assert_eq!(output.status.code(), Some(1));
}
