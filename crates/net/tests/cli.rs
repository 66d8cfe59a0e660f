// ABOUTME: Integration tests for the domimages CLI binary.
// ABOUTME: Tests file and stdin scanning, live page loading, scopes and preload reporting.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn domimages_cmd() -> Command {
    Command::cargo_bin("domimages").unwrap()
}

const GALLERY: &str = r#"<!DOCTYPE html>
<html>
<body>
  <img src="/assets/gallery/landscape.jpeg" alt="">
  <img src="/assets/gallery/landscape.jpeg" alt="">
  <img src='/assets/gallery/portrait.jpg'>
  <div style="background-image: url('/assets/textures/paper.png')"></div>
</body>
</html>"#;

#[test]
fn lists_images_from_html_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("gallery.html");
    fs::write(&html_path, GALLERY).unwrap();

    domimages_cmd()
        .arg(&html_path)
        .assert()
        .success()
        .stdout(
            "/assets/gallery/landscape.jpeg\n/assets/gallery/portrait.jpg\n/assets/textures/paper.png\n",
        );
}

#[test]
fn scope_limits_reported_surface() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("gallery.html");
    fs::write(&html_path, GALLERY).unwrap();

    domimages_cmd()
        .arg(&html_path)
        .arg("--scope")
        .arg("inline")
        .assert()
        .success()
        .stdout("/assets/textures/paper.png\n");
}

#[test]
fn stylesheet_scope_needs_live_page() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("gallery.html");
    fs::write(&html_path, GALLERY).unwrap();

    domimages_cmd()
        .arg(&html_path)
        .arg("--scope")
        .arg("stylesheets")
        .assert()
        .failure()
        .stderr(predicate::str::contains("browser-like context"));
}

#[test]
fn reads_css_from_stdin() {
    let css = r#".header { background-image: url('/img/header-bg.png'); }
.footer { background: #222 url("/img/footer-pattern.svg") repeat-x; }"#;

    let assert = assert_cmd::Command::cargo_bin("domimages")
        .unwrap()
        .arg("-")
        .write_stdin(css)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines, vec!["/img/header-bg.png", "/img/footer-pattern.svg"]);
}

#[test]
fn writes_json_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("gallery.html");
    let out_path = temp_dir.path().join("images.json");
    fs::write(&html_path, GALLERY).unwrap();

    domimages_cmd()
        .arg(&html_path)
        .arg("--json")
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(json["images"].as_array().unwrap().len(), 3);
    assert!(json.get("preload").is_none());
}

#[test]
fn live_page_includes_linked_stylesheet_images() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><head><link rel="stylesheet" href="/site.css"></head>
<body><img src="/img/a.png"></body></html>"#);
    });
    let css = server.mock(|when, then| {
        when.method(GET).path("/site.css");
        then.status(200)
            .header("content-type", "text/css")
            .body("body { background: url(/img/bg.png) }");
    });

    domimages_cmd()
        .arg("--url")
        .arg(server.url("/"))
        .arg("--allow-private-networks")
        .assert()
        .success()
        .stdout("/img/a.png\n/img/bg.png\n");

    css.assert();
}

#[test]
fn selector_limits_live_page_scan() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><body>
<div id="gallery"><img src="/img/in.png"></div>
<footer><img src="/img/out.png"></footer>
</body></html>"#);
    });

    domimages_cmd()
        .arg("--url")
        .arg(server.url("/"))
        .arg("--selector")
        .arg("#gallery")
        .arg("--allow-private-networks")
        .assert()
        .success()
        .stdout("/img/in.png\n");
}

#[test]
fn preload_reports_outcome_as_json() {
    let server = MockServer::start();
    let image = server.mock(|when, then| {
        when.method(GET).path("/img/a.png");
        then.status(200).header("content-type", "image/png").body("png");
    });
    server.mock(|when, then| {
        when.method(GET).path("/img/b.png");
        then.status(404);
    });

    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(&html_path, r#"<img src="/img/a.png"><img src="/img/b.png">"#).unwrap();

    let assert = domimages_cmd()
        .arg(&html_path)
        .arg("--preload")
        .arg("--json")
        .arg("--base-url")
        .arg(server.url("/"))
        .arg("--allow-private-networks")
        .assert()
        .success();
    image.assert();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["preload"]["requested"], 2);
    assert_eq!(json["preload"]["loaded"], 1);
    assert_eq!(json["preload"]["failed"][0]["url"], "/img/b.png");
}

#[test]
fn preload_without_base_fails_for_relative_urls() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(&html_path, r#"<img src="/img/a.png">"#).unwrap();

    domimages_cmd()
        .arg(&html_path)
        .arg("--preload")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to start loading /img/a.png"));
}

#[test]
fn missing_input_is_an_error() {
    domimages_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn invalid_options_json_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(&html_path, "<p></p>").unwrap();

    domimages_cmd()
        .arg(&html_path)
        .arg("--options")
        .arg("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --options"));
}
