use super::*;
use crate::frame::ErrorCode;

#[test]
fn parse_maps_drops_non_competitive_and_sorts() {
    let body = r#"{
        "status": 200,
        "data": [
            { "displayName": "Sunset", "uuid": "1" },
            { "displayName": "The Range" },
            { "displayName": "Ascent" },
            { "displayName": "Skirmish B" },
            { "displayName": "Kasbah" },
            { "displayName": "Abyss" },
            { "uuid": "no-name" },
            { "displayName": "Ascent" }
        ]
    }"#;
    assert_eq!(parse_maps(body).unwrap(), vec!["Abyss", "Ascent", "Sunset"]);
}

#[test]
fn parse_maps_accepts_empty_data() {
    assert!(parse_maps(r#"{"status":200}"#).unwrap().is_empty());
}

#[test]
fn parse_maps_rejects_garbage() {
    let err = parse_maps("<html>").unwrap_err();
    assert_eq!(err.error_code(), "E_CATALOG_PARSE");
    assert!(!err.retryable());
}

#[test]
fn server_errors_are_retryable() {
    assert!(CatalogError::Response { status: 503 }.retryable());
    assert!(CatalogError::Response { status: 429 }.retryable());
    assert!(!CatalogError::Response { status: 404 }.retryable());
}

#[test]
fn client_trims_trailing_slash() {
    let catalog = HttpCatalog::new(&CatalogConfig { base_url: "https://maps.test/v1/".into(), timeout_secs: 1 }).unwrap();
    assert_eq!(catalog.base_url, "https://maps.test/v1");
}
