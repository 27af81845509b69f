use depot_domain::category::Category;
use depot_domain::config::{ApiConfig, ServerConfig, StorageConfig};
use depot_domain::constants::MIB;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let storage = StorageConfig::default();
    assert_eq!(storage.root, std::path::PathBuf::from("public"));
    assert_eq!(storage.public_prefix, "uploads");
    assert!(storage.create);

    let cfg = ApiConfig::default();
    assert!(cfg.security.admin_token.is_none());
    assert_eq!(cfg.policies.get(Category::PaymentQr).max_size_bytes, 5 * MIB);
    assert_eq!(cfg.policies.max_ceiling(), 10 * MIB);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "storage": { "root": "/srv/site/public", "public_prefix": "files" },
        "security": { "admin_token": "s3cret" },
        "policies": {
            "payment-qr": { "max_size_bytes": 1048576 },
            "logos": { "overwrite_allowed": false }
        }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.storage.root, std::path::PathBuf::from("/srv/site/public"));
    assert_eq!(cfg.storage.public_prefix, "files");
    assert_eq!(cfg.security.admin_token.as_deref(), Some("s3cret"));
    assert_eq!(cfg.policies.get(Category::PaymentQr).max_size_bytes, MIB);
    assert!(cfg.policies.get(Category::PaymentQr).allows_extension("jpg"));
    assert!(!cfg.policies.get(Category::Logos).overwrite_allowed);
}

#[test]
fn policy_keys_accept_snake_case_from_environment() {
    let raw = json!({ "policies": { "project_images": { "max_size_bytes": 42 } } });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.policies.get(Category::ProjectImages).max_size_bytes, 42);
}
