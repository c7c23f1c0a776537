use std::fs;
use std::process::Output;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mdfetch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mdfetch"))
        .args(args)
        .env_remove("MDFETCH_CONFIG")
        .output()
        .await
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test]
async fn invalid_url_fails_with_error_line() {
    let output = mdfetch(&["fetch", "ftp://example.com/file"]).await;
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(
        stderr(&output).starts_with("Error: invalid URL"),
        "{}",
        stderr(&output)
    );
}

#[tokio::test]
async fn unknown_browser_is_reported() {
    let output = mdfetch(&["fetch", "example.com", "--browser", "netscape"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Error: unsupported browser type: netscape\n");
}

#[tokio::test]
async fn page_is_printed_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(
                    "<html><body><nav>Menu</nav><h2>Guide</h2><p>Read me.</p></body></html>",
                ),
        )
        .mount(&server)
        .await;

    let out_dir = TempDir::new().unwrap();
    let url = format!("{}/guide", server.uri());
    let output = mdfetch(&[
        "fetch",
        &url,
        "--browser",
        "http",
        "--output-dir",
        out_dir.path().to_str().unwrap(),
    ])
    .await;

    assert!(output.status.success(), "{}", stderr(&output));
    let printed = stdout(&output);
    assert!(printed.contains("Guide"), "{printed}");
    assert!(printed.contains("Read me."));
    assert!(!printed.contains("Menu"));

    let saved: Vec<_> = fs::read_dir(out_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].extension().is_some_and(|ext| ext == "md"));

    let document = fs::read_to_string(&saved[0]).unwrap();
    assert!(document.starts_with(&format!("---\nurl: {url}\nbackend: HTTP\nkind: html\n")));
    assert!(document.contains("Read me."));
}

#[tokio::test]
async fn keep_flag_reaches_the_cleaner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nav"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><nav>Menu</nav><p>Body</p></body></html>"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/nav", server.uri());
    let output = mdfetch(&["fetch", &url, "--browser", "http", "--keep-nav"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Menu"));
}

#[tokio::test]
async fn backends_lists_the_registry() {
    let output = mdfetch(&["backends"]).await;
    assert!(output.status.success());
    let listing = stdout(&output);
    assert_eq!(listing.lines().count(), 7);
    assert!(listing.lines().next().unwrap().starts_with("* chrome"));
    let http = listing
        .lines()
        .find(|line| line.contains(" http "))
        .unwrap();
    assert!(http.ends_with("built in"));
}

#[tokio::test]
async fn config_priority_is_honoured() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mdfetch.ron");
    fs::write(&config, r#"(priority: ["http"])"#).unwrap();

    let output = mdfetch(&["backends", "--config", config.to_str().unwrap()]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).lines().next().unwrap().starts_with("* http"));
}

#[tokio::test]
async fn bad_config_aborts() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mdfetch.ron");
    fs::write(&config, r#"(priority: ["mosaic"])"#).unwrap();

    let output = mdfetch(&["backends", "--config", config.to_str().unwrap()]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("Error: unknown backend \"mosaic\""));
}
