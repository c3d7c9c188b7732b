//! Build a site, load the result the way the server binary does and
//! request every artifact over the router.

use std::{fs, sync::Arc, time::SystemTime};

use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header::ACCEPT_ENCODING};
use sitepack_compiler::{CompiledRegistry, Compiler};
use sitepack_core::{Config, codec};
use sitepack_server::{Registry, create_router};
use tempfile::TempDir;
use tower::ServiceExt;

fn compile_site() -> CompiledRegistry {
    let site = TempDir::new().unwrap();
    let blog = site.path().join("blog");
    fs::create_dir(&blog).unwrap();
    fs::write(blog.join("2019-12-31-b.md"), "# B\n\nbee\n").unwrap();
    fs::write(blog.join("2020-01-01-a.md"), "# A\n\nay\n").unwrap();
    fs::write(blog.join("2021-05-01-c.md"), "# C\n\nsee\n").unwrap();
    fs::write(blog.join("icon.ico"), [0u8, 0, 1, 0, 1, 0, 16, 16]).unwrap();
    fs::create_dir(site.path().join("static")).unwrap();
    fs::write(site.path().join("static/style.css"), "body { color: red }").unwrap();

    let config = Config::new("Round Trip", "https://example.com");
    Compiler::new(config, site.path()).compile().unwrap()
}

fn load(compiled: &CompiledRegistry) -> Registry {
    let table: Vec<(&str, &str)> = compiled
        .assets
        .iter()
        .map(|a| (a.key.as_str(), a.payload.as_str()))
        .collect();
    Registry::load(&table).unwrap()
}

async fn fetch(app: axum::Router, path: &str, gzip: bool) -> (StatusCode, http::HeaderMap, Vec<u8>) {
    let mut request = Request::builder().uri(path);
    if gzip {
        request = request.header(ACCEPT_ENCODING, "gzip, deflate");
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_every_artifact_round_trips() {
    let compiled = compile_site();
    let app = create_router(Arc::new(load(&compiled)), SystemTime::now());

    for asset in &compiled.assets {
        let (status, plain_headers, plain) = fetch(app.clone(), &asset.key, false).await;
        assert_eq!(status, StatusCode::OK, "{}", asset.key);

        let (status, gzip_headers, compressed) = fetch(app.clone(), &asset.key, true).await;
        assert_eq!(status, StatusCode::OK, "{}", asset.key);
        assert_eq!(gzip_headers["content-encoding"], "gzip");

        assert_eq!(codec::decompress(&compressed).unwrap(), plain, "{}", asset.key);
        assert_eq!(
            plain_headers["etag"],
            codec::validator_token(&plain).as_str(),
            "{}",
            asset.key
        );
        assert_eq!(plain_headers["content-type"], gzip_headers["content-type"]);
    }
}

#[tokio::test]
async fn test_content_types_of_built_site() {
    let compiled = compile_site();
    let app = create_router(Arc::new(load(&compiled)), SystemTime::now());

    let expectations = [
        ("/", "text/html; charset=utf-8"),
        ("/blog/", "text/html; charset=utf-8"),
        ("/blog/c", "text/html; charset=utf-8"),
        ("/atom.xml", "text/xml; charset=utf-8"),
        ("/style.css", "text/css; charset=utf-8"),
        ("/blog/icon.ico", "image/x-icon"),
    ];
    for (path, expected) in expectations {
        let (status, headers, _) = fetch(app.clone(), path, false).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(headers["content-type"], expected, "{path}");
    }
}

#[tokio::test]
async fn test_unregistered_paths() {
    let compiled = compile_site();
    let app = create_router(Arc::new(load(&compiled)), SystemTime::now());

    for path in ["/blog", "/blog/c/", "/index.html", "/blog/2021-05-01-c.md"] {
        let (status, _, _) = fetch(app.clone(), path, true).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_non_ascii_and_spaced_keys_are_reachable() {
    let site = TempDir::new().unwrap();
    let blog = site.path().join("blog");
    fs::create_dir(&blog).unwrap();
    fs::write(blog.join("2020-01-01-café.md"), "# Café\n\nau lait\n").unwrap();
    fs::write(blog.join("a b.png"), b"\x89PNG\r\n\x1a\n").unwrap();

    let config = Config::new("Round Trip", "https://example.com");
    let compiled = Compiler::new(config, site.path()).compile().unwrap();
    let keys: Vec<_> = compiled.assets.iter().map(|a| a.key.as_str()).collect();
    assert!(keys.contains(&"/blog/café"));
    assert!(keys.contains(&"/blog/a b.png"));

    let app = create_router(Arc::new(load(&compiled)), SystemTime::now());

    let (status, _, body) = fetch(app.clone(), "/blog/caf%C3%A9", false).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("au lait"));

    let (status, headers, body) = fetch(app.clone(), "/blog/a%20b.png", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(body, b"\x89PNG\r\n\x1a\n");
}
