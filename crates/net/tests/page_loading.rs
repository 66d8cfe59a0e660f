// ABOUTME: Integration tests for live page loading and HTTP preloading against a mock server.
// ABOUTME: Covers linked stylesheets (same-origin, cross-origin, missing) and cache warming.

use domimages_core::{preload, DomImages, Element, ImageLoader, Source};
use domimages_net::{load_page, FetchOptions, HttpImageLoader};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;

fn local_opts() -> FetchOptions {
    FetchOptions {
        allow_private_networks: true,
        ..Default::default()
    }
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="/css/site.css">
  <style>.hero { background-image: url('/img/hero.jpg'); }</style>
</head>
<body>
  <div id="gallery">
    <img src="/img/one.png">
    <img src="/img/two.png">
  </div>
  <aside style="background: url(/img/aside.gif) no-repeat"></aside>
</body>
</html>"#;

#[tokio::test]
async fn same_origin_stylesheets_are_scanned() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(PAGE);
    });
    let css = server.mock(|when, then| {
        when.method(GET).path("/css/site.css");
        then.status(200)
            .header("content-type", "text/css")
            .body(".footer { background: #eee url(\"/img/footer.svg\") repeat-x; }");
    });

    let client = reqwest::Client::new();
    let page = load_page(&client, &server.url("/"), &local_opts())
        .await
        .expect("page should load");
    css.assert();

    assert_eq!(page.document.style_sheets().len(), 2);

    let engine = DomImages::builder().host(page.host()).build();
    assert!(engine.is_browser_context());
    assert_eq!(
        engine.stylesheet_images().unwrap(),
        vec!["/img/footer.svg", "/img/hero.jpg"]
    );
    assert_eq!(
        engine.document_images().unwrap(),
        vec![
            "/img/one.png",
            "/img/two.png",
            "/img/aside.gif",
            "/img/footer.svg",
            "/img/hero.jpg",
        ]
    );
}

#[tokio::test]
async fn cross_origin_stylesheet_degrades_to_no_sheet_images() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(
            r#"<html><head><link rel="stylesheet" href="https://cdn.example.invalid/theme.css">
<style>.x { background: url(x.png) }</style></head>
<body><img src="a.png"></body></html>"#,
        );
    });

    let page = load_page(&reqwest::Client::new(), &server.url("/"), &local_opts())
        .await
        .unwrap();
    let engine = DomImages::builder().host(page.host()).build();

    assert!(engine.stylesheet_images().is_err());
    assert_eq!(engine.document_images().unwrap(), vec!["a.png"]);
}

#[tokio::test]
async fn missing_stylesheet_is_left_pending() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(
            r#"<html><head><link rel="stylesheet" href="gone.css"></head>
<body><img src="a.png"></body></html>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/gone.css");
        then.status(404);
    });

    let page = load_page(&reqwest::Client::new(), &server.url("/"), &local_opts())
        .await
        .unwrap();
    let engine = DomImages::builder().host(page.host()).build();

    assert!(engine.stylesheet_images().unwrap().is_empty());
    assert_eq!(engine.document_images().unwrap(), vec!["a.png"]);
}

#[tokio::test]
async fn element_source_limits_tag_and_inline_scans() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE.replace(
            "</body>",
            r#"<footer><img src="/img/footer-logo.png"></footer></body>"#,
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/css/site.css");
        then.status(200).body("");
    });

    let page = load_page(&reqwest::Client::new(), &server.url("/"), &local_opts())
        .await
        .unwrap();
    let engine = DomImages::builder()
        .host(page.host())
        .source(Source::element(Element::new(page.document.clone(), "#gallery")))
        .build();

    assert!(engine.inline_style_images().unwrap().is_empty());
    assert_eq!(engine.tag_images().unwrap(), vec!["/img/one.png", "/img/two.png"]);

    let whole_body = DomImages::builder().host(page.host()).build();
    assert_eq!(
        whole_body.tag_images().unwrap(),
        vec!["/img/one.png", "/img/two.png", "/img/footer-logo.png"]
    );
}

#[tokio::test]
async fn private_page_blocked_by_default() {
    let server = MockServer::start();
    let err = load_page(&reqwest::Client::new(), &server.url("/"), &FetchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_ssrf());
}

#[tokio::test]
async fn preload_warms_cache_and_reports_failures() {
    let server = MockServer::start();
    let one = server.mock(|when, then| {
        when.method(GET).path("/img/one.png");
        then.status(200)
            .header("content-type", "image/png")
            .body(b"\x89PNG\r\n\x1a\n".as_slice());
    });
    server.mock(|when, then| {
        when.method(GET).path("/img/missing.png");
        then.status(404);
    });

    let base = url::Url::parse(&server.url("/")).unwrap();
    let loader = HttpImageLoader::new(reqwest::Client::new())
        .fetch_options(local_opts())
        .base_url(base);

    let urls = vec!["/img/one.png".to_string(), "/img/missing.png".to_string()];
    let report = preload(&loader, &urls, None).await.expect("both loads start");
    one.assert();

    assert_eq!(report.requested, 2);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, "/img/missing.png");
    assert!(loader.cache().contains(&server.url("/img/one.png")));
    assert_eq!(loader.cache().len(), 1);
}

#[tokio::test]
async fn preload_rejects_when_a_load_cannot_start() {
    let loader = HttpImageLoader::new(reqwest::Client::new()).fetch_options(local_opts());
    let urls = vec!["relative/without/base.png".to_string()];

    assert!(loader.start(&urls[0]).is_err());
    let err = preload(&loader, &urls, None).await.unwrap_err();
    assert!(err.is_preload_start());
}
