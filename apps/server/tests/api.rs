use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use depot_domain::config::ApiConfig;
use depot_server::Server;
use depot_uploads::{ListResponse, UploadResponse};
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const ADMIN_TOKEN: &str = "s3cret-admin";
const MIB: usize = 1024 * 1024;

struct Harness {
    server: TestServer,
    root: PathBuf,
    _temp: TempDir,
}

async fn harness() -> Harness {
    let temp = TempDir::new().unwrap();
    let mut cfg = ApiConfig::default();
    cfg.storage.root = temp.path().join("public");
    cfg.security.admin_token = Some(ADMIN_TOKEN.to_owned());

    let app = Server::builder().config(cfg).build().await.unwrap();
    let root = app.state().storage.root().to_path_buf();
    let server = TestServer::new(app.router()).unwrap();

    Harness { server, root, _temp: temp }
}

fn file_part(bytes: Vec<u8>, name: &str, mime: &str) -> Part {
    Part::bytes(bytes).file_name(name).mime_type(mime)
}

/// Every regular file under `root`, relative to it.
fn stored_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path.strip_prefix(root).unwrap().display().to_string());
            }
        }
    }
    files
}

async fn upload(h: &Harness, category: &str, form: MultipartForm) -> axum_test::TestResponse {
    h.server.post(&format!("/api/uploads/{category}")).multipart(form).await
}

#[tokio::test]
async fn payment_qr_upload_is_served_back_through_every_route() {
    let h = harness().await;
    let body = vec![0xAB; 2 * MIB];

    let form = MultipartForm::new()
        .add_text("paymentMethod", "fpx")
        .add_part("file", file_part(body.clone(), "qr.jpg", "image/jpeg"));
    let response = upload(&h, "payment-qr", form).await;
    response.assert_status_ok();

    let stored = response.json::<UploadResponse>();
    assert!(stored.success);
    assert!(stored.file_path.starts_with("payment-qr/fpx/qr_code_"), "{}", stored.file_path);
    assert!(stored.file_path.ends_with(".jpg"));
    assert_eq!(stored.url, format!("/uploads/{}", stored.file_path));

    for response in [
        h.server.get(&stored.url).await,
        h.server.get("/api/files").add_query_param("path", &stored.file_path).await,
        h.server.get("/api/files/image").add_query_param("path", &stored.url).await,
    ] {
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), HeaderValue::from_static("image/jpeg"));
        assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
        assert_eq!(response.as_bytes().as_ref(), body.as_slice());
    }
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_leaving_a_file() {
    let h = harness().await;

    let form = MultipartForm::new()
        .add_text("paymentMethod", "fpx")
        .add_part("file", file_part(vec![0; 6 * MIB], "qr.jpg", "image/jpeg"));
    let response = upload(&h, "payment-qr", form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);

    let dir = h.root.join("payment-qr/fpx");
    assert!(!dir.exists() || std::fs::read_dir(&dir).unwrap().next().is_none());
}

#[tokio::test]
async fn disallowed_type_and_missing_metadata_are_bad_requests() {
    let h = harness().await;

    let wrong_type = MultipartForm::new()
        .add_text("paymentMethod", "fpx")
        .add_part("file", file_part(b"%PDF-1.7".to_vec(), "qr.pdf", "application/pdf"));
    upload(&h, "payment-qr", wrong_type).await.assert_status(StatusCode::BAD_REQUEST);

    let no_method =
        MultipartForm::new().add_part("file", file_part(vec![1; 16], "qr.png", "image/png"));
    upload(&h, "payment-qr", no_method).await.assert_status(StatusCode::BAD_REQUEST);

    let bad_segment = MultipartForm::new()
        .add_text("paymentMethod", "..")
        .add_part("file", file_part(vec![1; 16], "qr.png", "image/png"));
    upload(&h, "payment-qr", bad_segment).await.assert_status(StatusCode::BAD_REQUEST);

    let unknown = MultipartForm::new().add_part("file", file_part(vec![1], "a.png", "image/png"));
    upload(&h, "avatars", unknown).await.assert_status(StatusCode::BAD_REQUEST);

    assert!(stored_files(&h.root).is_empty(), "{:?}", stored_files(&h.root));
}

#[tokio::test]
async fn svg_logos_are_sandboxed_when_served() {
    let h = harness().await;
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(1)</script></svg>"#;

    let form = MultipartForm::new()
        .add_part("file", file_part(svg.to_vec(), "brand.svg", "image/svg+xml"));
    let stored = upload(&h, "logos", form).await.json::<UploadResponse>();
    assert_eq!(stored.file_path, "logos/logo.svg");

    let served = h.server.get(&stored.url).await;
    served.assert_status_ok();
    assert_eq!(served.header(header::CONTENT_TYPE), "image/svg+xml");
    assert_eq!(served.header(header::CONTENT_SECURITY_POLICY), "sandbox");
    assert_eq!(served.header(header::CONTENT_DISPOSITION), "attachment");

    let png = MultipartForm::new().add_part("file", file_part(vec![1; 8], "b.png", "image/png"));
    let stored = upload(&h, "logos", png).await.json::<UploadResponse>();
    let served = h.server.get(&stored.url).await;
    assert!(served.maybe_header(header::CONTENT_SECURITY_POLICY).is_none());
}

#[tokio::test]
async fn traversal_attempts_are_forbidden_without_echoing_the_path() {
    let h = harness().await;

    for raw in ["../../etc/passwd", "..%2F..%2Fetc%2Fpasswd", "/etc/passwd", "uploads/../../x"] {
        for route in ["/api/files", "/api/files/image"] {
            let response = h.server.get(route).add_query_param("path", raw).await;
            response.assert_status(StatusCode::FORBIDDEN);

            let body = response.json::<Value>();
            assert_eq!(body["success"], false);
            assert!(!body["error"].as_str().unwrap().contains("passwd"), "{raw}");
        }
    }
}

#[tokio::test]
async fn retrieval_errors_map_to_status_codes() {
    let h = harness().await;

    h.server.get("/api/files").await.assert_status(StatusCode::BAD_REQUEST);
    h.server
        .get("/api/files")
        .add_query_param("path", "logos/missing.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    h.server.get("/uploads/logos/missing.png").await.assert_status(StatusCode::NOT_FOUND);

    let receipt = MultipartForm::new()
        .add_text("userId", "u1")
        .add_text("orderId", "o9")
        .add_part("file", file_part(b"%PDF-1.7".to_vec(), "receipt.pdf", "application/pdf"));
    let stored = upload(&h, "purchases", receipt).await.json::<UploadResponse>();
    assert!(stored.file_path.starts_with("purchases/u1/o9/receipt_"));

    h.server
        .get("/api/files/image")
        .add_query_param("path", &stored.file_path)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let pdf = h.server.get("/api/files").add_query_param("path", &stored.file_path).await;
    pdf.assert_status_ok();
    assert_eq!(pdf.header(header::CONTENT_TYPE), "application/pdf");
}

#[tokio::test]
async fn logo_upload_replaces_the_previous_one() {
    let h = harness().await;

    for bytes in [b"first".to_vec(), b"second".to_vec()] {
        let form = MultipartForm::new().add_part("file", file_part(bytes, "brand.png", "image/png"));
        let stored = upload(&h, "logos", form).await.json::<UploadResponse>();
        assert_eq!(stored.file_path, "logos/logo.png");
        assert_eq!(stored.url, "/uploads/logos/logo.png");
    }

    let served = h.server.get("/uploads/logos/logo.png").await;
    assert_eq!(served.as_bytes().as_ref(), b"second");
    assert_eq!(std::fs::read_dir(h.root.join("logos")).unwrap().count(), 1);
}

#[tokio::test]
async fn listing_requires_admin_and_is_newest_first() {
    let h = harness().await;

    let mut paths = Vec::new();
    for _ in 0..3 {
        let form = MultipartForm::new()
            .add_text("projectId", "p1")
            .add_part("file", file_part(vec![7; 32], "shot.png", "image/png"));
        paths.push(upload(&h, "project-images", form).await.json::<UploadResponse>().file_path);
    }

    // Oldest upload gets the newest mtime so ordering cannot come from the names.
    let base = SystemTime::now() - Duration::from_secs(3600);
    for (i, path) in paths.iter().enumerate() {
        let file = File::options().write(true).open(h.root.join(path)).unwrap();
        file.set_modified(base - Duration::from_secs(60 * i as u64)).unwrap();
    }

    h.server
        .get("/api/files/list")
        .add_query_param("type", "project-images")
        .await
        .assert_status(StatusCode::FORBIDDEN);
    h.server
        .get("/api/files/list")
        .add_query_param("type", "project-images")
        .authorization_bearer("wrong")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let listing = h
        .server
        .get("/api/files/list")
        .add_query_param("type", "project-images/p1")
        .authorization_bearer(ADMIN_TOKEN)
        .await;
    listing.assert_status_ok();

    let listing = listing.json::<ListResponse>();
    let listed: Vec<_> = listing.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(listed, paths);
    assert!(listing.files.iter().all(|f| f.size == 32 && f.url == format!("/uploads/{}", f.path)));

    let empty = h
        .server
        .get("/api/files/list")
        .add_query_param("type", "recruitment")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .json::<ListResponse>();
    assert!(empty.success && empty.files.is_empty());

    h.server
        .get("/api/files/list")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_api_reference_are_served() {
    let h = harness().await;

    let health = h.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "up");

    h.server.get("/api").await.assert_status_ok();
}
