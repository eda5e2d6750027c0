//! HTTP-level tests for the Pinata binding against a mock server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trustify::config::PinningConfig;
use trustify::error::Error;
use trustify::storage::{pinata::PinataProvider, StorageProvider, UploadMetadata};

fn config(base: &str) -> PinningConfig {
    PinningConfig {
        api_base: base.to_string(),
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
        jwt: "test-jwt".to_string(),
        gateway_base: None,
    }
}

#[tokio::test]
async fn upload_returns_the_pinned_cid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("pinata_api_key", "test-key"))
        .and(header("pinata_secret_api_key", "test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "IpfsHash": "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
            "PinSize": 10,
            "Timestamp": "2024-05-01T12:00:00Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = PinataProvider::new(config(&server.uri()));
    let metadata = UploadMetadata::for_file("deed.pdf", b"deed bytes");
    let cid = provider.upload(b"deed bytes".to_vec(), metadata).await.unwrap();
    assert_eq!(cid, "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
}

#[tokio::test]
async fn upload_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"reason": "INVALID_API_KEYS", "details": "Invalid API key provided"},
        })))
        .mount(&server)
        .await;

    let provider = PinataProvider::new(config(&server.uri()));
    let metadata = UploadMetadata::for_file("deed.pdf", b"deed bytes");
    let err = provider
        .upload(b"deed bytes".to_vec(), metadata)
        .await
        .unwrap_err();
    match err {
        Error::StorageUploadFailed(message) => {
            assert!(message.contains("INVALID_API_KEYS"), "got {message}");
        }
        other => panic!("expected StorageUploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_failure_without_error_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = PinataProvider::new(config(&server.uri()));
    let metadata = UploadMetadata::for_file("deed.pdf", b"x");
    let err = provider.upload(b"x".to_vec(), metadata).await.unwrap_err();
    match err {
        Error::StorageUploadFailed(message) => assert!(message.contains("500")),
        other => panic!("expected StorageUploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn listing_parses_files_and_sends_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/files/public"))
        .and(query_param("pageLimit", "10"))
        .and(query_param("pageOffset", "0"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "files": [
                    {
                        "id": "f1",
                        "name": "deed.pdf",
                        "cid": "QmDeed",
                        "created_at": "2024-05-01T12:00:00Z",
                        "size": 10,
                    },
                    {
                        "id": "f2",
                        "name": null,
                        "cid": "QmAnon",
                        "created_at": "2024-05-02T09:30:00Z",
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = PinataProvider::new(config(&server.uri()));
    let files = provider.list(10, 0).await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].display_name(), "deed.pdf");
    assert_eq!(files[0].cid, "QmDeed");
    assert_eq!(files[1].display_name(), "Unnamed File");

    // The same listing drives the CSV export.
    let out = tempfile::NamedTempFile::new().unwrap();
    trustify::report::write_csv(&files, out.reopen().unwrap()).unwrap();
    let csv = std::fs::read_to_string(out.path()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("File Name,CID,Created"));
    assert!(lines.next().unwrap().starts_with("deed.pdf,QmDeed,"));
    assert!(lines.next().unwrap().starts_with("Unnamed File,QmAnon,"));
}

#[tokio::test]
async fn listing_failure_is_a_list_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/files/public"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = PinataProvider::new(config(&server.uri()));
    let err = provider.list(10, 0).await.unwrap_err();
    assert!(matches!(err, Error::StorageListFailed(_)));
}
