use depot_domain::category::Category;
use depot_domain::policy::Policies;
use depot_storage::{RelativePath, Storage};
use depot_uploads::UploadError;
use depot_uploads::form::{FilePart, UploadForm};
use depot_uploads::service::store_upload;
use std::collections::{BTreeMap, HashSet};
use tempfile::TempDir;

async fn storage(temp: &TempDir) -> Storage {
    Storage::builder().root(temp.path().join("public")).connect().await.unwrap()
}

fn form(fields: &[(&str, &str)], name: &str, mime: &str, bytes: Vec<u8>) -> UploadForm {
    UploadForm {
        fields: fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
        file: Some(FilePart {
            original_name: name.to_owned(),
            content_type: mime.to_owned(),
            extension: name.rsplit('.').next().unwrap().to_ascii_lowercase(),
            bytes,
        }),
    }
}

#[tokio::test]
async fn payment_qr_upload_lands_under_its_method() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let policies = Policies::default();

    let upload =
        form(&[("paymentMethod", "fpx")], "qr.jpg", "image/jpeg", vec![1; 2 * 1024 * 1024]);
    let stored =
        store_upload(&storage, Category::PaymentQr, policies.get(Category::PaymentQr), upload)
            .await
            .unwrap();

    let path = stored.file.relative_path.as_str();
    assert!(path.starts_with("payment-qr/fpx/qr_code_"), "{path}");
    assert!(path.ends_with(".jpg"));
    assert_eq!(stored.file.public_url, format!("/uploads/{path}"));
    assert_eq!(stored.mime_type, "image/jpeg");
    assert_eq!(std::fs::metadata(storage.root().join(path)).unwrap().len(), 2 * 1024 * 1024);
}

#[tokio::test]
async fn logos_overwrite_in_place() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let policy = Policies::default().get(Category::Logos).clone();

    let logo = |name: &str, bytes: &[u8]| form(&[], name, "image/png", bytes.to_vec());

    let first = store_upload(&storage, Category::Logos, &policy, logo("a.png", b"A")).await.unwrap();
    let second =
        store_upload(&storage, Category::Logos, &policy, logo("b.png", b"BB")).await.unwrap();

    assert_eq!(first.file.relative_path.as_str(), "logos/logo.png");
    assert_eq!(second.file.relative_path, first.file.relative_path);
    assert!(second.file.replaced);

    let listing = storage.index(&RelativePath::parse("logos").unwrap()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(std::fs::read(storage.root().join("logos/logo.png")).unwrap(), b"BB");
}

#[tokio::test]
async fn explicit_name_without_overwrite_conflicts() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let policy = Policies::default().get(Category::ComponentAssets).clone();
    let fields = [("componentId", "hero"), ("name", "banner")];

    let asset = |name: &str, bytes: &[u8]| form(&fields, name, "image/png", bytes.to_vec());

    store_upload(&storage, Category::ComponentAssets, &policy, asset("x.png", b"1")).await.unwrap();
    let err = store_upload(&storage, Category::ComponentAssets, &policy, asset("y.png", b"2"))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Conflict { .. }), "{err:?}");
    assert_eq!(err.status_code(), 409);
    let kept = std::fs::read(storage.root().join("component-assets/hero/banner.png")).unwrap();
    assert_eq!(kept, b"1");
}

#[tokio::test]
async fn concurrent_uploads_get_distinct_names() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let policy = Policies::default().get(Category::ProjectImages).clone();

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let storage = storage.clone();
            let policy = policy.clone();
            tokio::spawn(async move {
                let upload = form(&[("projectId", "p7")], "shot.webp", "image/webp", vec![9; 64]);
                store_upload(&storage, Category::ProjectImages, &policy, upload).await
            })
        })
        .collect();

    let mut paths = HashSet::new();
    for task in tasks {
        let stored = task.await.unwrap().unwrap();
        assert!(paths.insert(stored.file.relative_path.to_string()));
    }
    assert_eq!(paths.len(), 50);
}

#[tokio::test]
async fn missing_file_part_is_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let policy = Policies::default().get(Category::Recruitment).clone();
    let upload = UploadForm {
        fields: BTreeMap::from([("fieldId".to_owned(), "cv".to_owned())]),
        file: None,
    };

    let err = store_upload(&storage, Category::Recruitment, &policy, upload).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(!storage.root().join("recruitment").exists());
}
