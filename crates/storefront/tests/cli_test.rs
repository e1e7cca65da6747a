//! Integration tests for the `storefront` CLI binary.
//!
//! Argument parsing, output formats, exit codes and the product flows
//! against a wiremock products server. Config is isolated per test in a
//! temp directory.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `storefront` binary with env isolation.
///
/// Clears all `STOREFRONT_*` env vars and points the config file into
/// `config_dir` so tests never touch the user's real configuration.
fn storefront_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("storefront");
    cmd.env("STOREFRONT_CONFIG", config_dir.join("config.toml"))
        .env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .env("NO_COLOR", "1")
        .env_remove("STOREFRONT_PROFILE")
        .env_remove("STOREFRONT_API_URL")
        .env_remove("STOREFRONT_OUTPUT")
        .env_remove("STOREFRONT_INSECURE")
        .env_remove("STOREFRONT_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api/products", server.uri())
}

fn product_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "description": "A very fine thing",
        "price": 19.99,
        "category": "electronics",
        "images": [format!("http://localhost:5000/uploads/{id}.png")],
        "createdAt": "2024-06-01T12:00:00Z"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = storefront_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("products")
                .and(predicate::str::contains("categories"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("storefront"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = storefront_cmd(dir.path())
        .args(["--output", "invalid", "products", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about output format:\n{text}"
    );
}

// ── Categories ──────────────────────────────────────────────────────

#[test]
fn test_categories_table_and_plain() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Home & Garden"));

    storefront_cmd(dir.path())
        .args(["-o", "plain", "categories"])
        .assert()
        .success()
        .stdout("electronics\nclothing\nhome\nbooks\n");
}

// ── Products ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_products_list_table_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json("1", "Widget")])),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "products", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget").and(predicate::str::contains("$19.99")));

    let output = storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "-o", "json", "products", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["id"], "1");
    assert_eq!(listed[0]["category"], "electronics");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_get_missing_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "gone" })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "products", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Product not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_get_shows_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json("1", "Widget")))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "products", "get", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Widget")
                .and(predicate::str::contains("A very fine thing"))
                .and(predicate::str::contains("Category: Electronics")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_with_invalid_price_never_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json("x", "Widget")))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("widget.png");
    std::fs::write(&image, b"fake png bytes").unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "products", "create"])
        .args(["--name", "Widget", "--price=-5", "--category", "electronics"])
        .arg("--image")
        .arg(&image)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please enter a valid price"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_posts_and_prints_refreshed_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products/"))
        .and(body_string_contains("filename=\"widget.png\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json("new-1", "Widget")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json("new-1", "Widget")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("widget.png");
    std::fs::write(&image, b"fake png bytes").unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "-o", "plain", "products", "create"])
        .args(["--name", "Widget", "--price", "19.99", "--category", "electronics"])
        .arg("--image")
        .arg(&image)
        .assert()
        .success()
        .stdout("new-1\n")
        .stderr(predicate::str::contains("Created product 'Widget'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_reports_server_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": { "name": ["already taken"] }
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("widget.png");
    std::fs::write(&image, b"fake png bytes").unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "products", "create"])
        .args(["--name", "Widget", "--price", "3", "--category", "books"])
        .arg("--image")
        .arg(&image)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already taken"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes_skips_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &api_url(&server), "-y", "products", "delete", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Product deleted"));
}

#[test]
fn test_unreachable_server_exits_with_connection_code() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-u", &format!("http://{addr}/api/products"), "products", "list"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the products API"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    storefront_cmd(dir.path())
        .args(["config", "use", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'missing' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_init_profile_is_used_for_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json("7", "Lamp")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    storefront_cmd(dir.path())
        .args(["-y", "-u", &api_url(&server), "config", "init", "--name", "local"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("default_profile = \"local\""), "{written}");

    storefront_cmd(dir.path())
        .args(["-o", "plain", "products", "list"])
        .assert()
        .success()
        .stdout("7\n");
}
