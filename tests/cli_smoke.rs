use assert_cmd::prelude::*;
use reqwest::blocking::Client;
use serde_json::Value;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const JOURNAL_ENV: [&str; 4] = [
    "JOURNAL_DATA_DIR",
    "JOURNAL_SITE_DIR",
    "JOURNAL_PORT",
    "JOURNAL_CORRUPT_POLICY",
];

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.yaml");
    let yaml = format!(
        "data_dir: {}\nsite_dir: {}\n",
        dir.path().join("backend").display(),
        dir.path().join("site").display()
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

fn journal(config: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("journal");
    let mut cmd = Command::new(bin);
    for key in JOURNAL_ENV {
        cmd.env_remove(key);
    }
    cmd.args(["--config", config.to_str().unwrap()]);
    cmd
}

fn journal_cmd(config: &Path) -> assert_cmd::Command {
    assert_cmd::Command::from_std(journal(config))
}

#[test]
fn manage_adds_and_lists_reflections() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let assert = journal_cmd(&config)
        .arg("manage")
        .write_stdin("1\nAnn\nLearned ownership\n2\n6\n")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("LEARNING JOURNAL - REFLECTION MANAGER"));
    assert!(stdout.contains("Reflection added successfully!"));
    assert!(stdout.contains("REFLECTIONS (1 entries)"));
    assert!(stdout.contains("Learned ownership"));

    let saved: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("backend/reflections.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved[0]["name"], "Ann");
}

#[test]
fn manage_exits_cleanly_on_end_of_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    journal_cmd(&config).arg("manage").write_stdin("9\n").assert().success();
    assert!(!dir.path().join("backend/reflections.json").exists());
}

#[test]
fn data_dir_env_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let other = dir.path().join("elsewhere");

    journal_cmd(&config)
        .env("JOURNAL_DATA_DIR", &other)
        .arg("manage")
        .write_stdin("1\n\nFrom env\n6\n")
        .assert()
        .success();

    assert!(other.join("reflections.json").exists());
    assert!(!dir.path().join("backend/reflections.json").exists());
}

#[test]
fn info_reports_collections_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    std::fs::create_dir_all(dir.path().join("backend")).unwrap();
    std::fs::write(
        dir.path().join("backend/snake_scores.json"),
        r#"[{"name":"Ann","score":12,"date":"2024-05-01 10:00:00"}]"#,
    )
    .unwrap();

    let assert = journal(&config)
        .args(["info", "--format", "json"])
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["config_loaded"], true);
    assert_eq!(report["max_scores"], 10);
    assert_eq!(report["corrupt_policy"], "lenient");
    assert!(report["reflections"].is_null());
    assert_eq!(report["snake_scores"]["entries"], 1);
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    journal(&dir.path().join("absent.yaml"))
        .arg("info")
        .assert()
        .failure();
}

fn find_free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0))
        .expect("bind probe port")
        .local_addr()
        .expect("local addr")
        .port()
}

fn wait_for_health(client: &Client, port: u16) {
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..60 {
        if let Ok(resp) = client.get(&url).send() {
            if resp.status().is_success() {
                return;
            }
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("journal server did not become ready on port {}", port);
}

#[test]
fn serve_accepts_reflections_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let port = find_free_port();

    let mut child = journal(&config)
        .args(["serve", "--port", &port.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn serve");

    let client = Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client");
    wait_for_health(&client, port);

    let response = client
        .post(format!("http://127.0.0.1:{}/api/reflections", port))
        .json(&serde_json::json!({"name": "Ann", "reflection": "Learned X"}))
        .send()
        .expect("request success");
    assert_eq!(response.status().as_u16(), 201);

    let listed: Value = client
        .get(format!("http://127.0.0.1:{}/api/reflections", port))
        .send()
        .expect("request success")
        .json()
        .expect("json body");
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let ready = client
        .get(format!("http://127.0.0.1:{}/readyz", port))
        .send()
        .expect("request success");
    assert!(ready.status().is_success());

    let _ = child.kill();
    let _ = child.wait();
}
