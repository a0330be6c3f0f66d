use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_only_database_url_set() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/memeforge")])).unwrap();
    assert_eq!(cfg.database_url, "postgres://localhost/memeforge");
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
    assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
}

#[test]
fn overrides_are_parsed() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://db/x"),
        ("PORT", " 8080 "),
        ("UPLOAD_DIR", "/var/memes"),
        ("MAX_UPLOAD_BYTES", "1024"),
        ("DB_MAX_CONNECTIONS", "12"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.upload_dir, PathBuf::from("/var/memes"));
    assert_eq!(cfg.max_upload_bytes, 1024);
    assert_eq!(cfg.db_max_connections, 12);
}

#[test]
fn missing_database_url_is_error() {
    let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "80")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn invalid_number_is_error() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]))
        .unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "eighty".into() });
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "70000")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
}

#[test]
fn blank_optional_values_fall_back_to_defaults() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", ""),
        ("UPLOAD_DIR", ""),
    ]))
    .unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
}
