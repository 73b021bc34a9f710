#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Archive client tests against a local stub archive.

use std::time::Duration;

use folio_kernel::archive::{ArchiveClient, ArchiveError, HttpArchiveClient};
use folio_test_utils::{ArchiveStub, archive_metadata};

fn client(stub: &ArchiveStub) -> HttpArchiveClient {
    HttpArchiveClient::new(stub.base_url(), Duration::from_secs(5))
}

#[tokio::test]
async fn fetches_license_and_tree() {
    let stub = ArchiveStub::start().await.unwrap();
    stub.insert("185cbf87", &archive_metadata("4.0", &["Preface", "Essential Ideas"]));

    let metadata = client(&stub).fetch_metadata("185cbf87").await.unwrap();
    assert_eq!(metadata.license.name, "Creative Commons Attribution License");
    assert_eq!(metadata.license.version, "4.0");
    assert_eq!(metadata.tree["contents"][1]["title"], "Essential Ideas");
}

#[tokio::test]
async fn unknown_id_is_http_404() {
    let stub = ArchiveStub::start().await.unwrap();
    let err = client(&stub).fetch_metadata("missing").await.unwrap_err();
    assert_eq!(
        err,
        ArchiveError::Http {
            status: 404,
            reason: "Not Found".into()
        }
    );
    assert_eq!(err.to_string(), "HTTP Error 404: Not Found");
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let stub = ArchiveStub::start().await.unwrap();
    stub.insert_raw("broken", r#"{"license": {"name": "CC BY"}}"#);
    let err = client(&stub).fetch_metadata("broken").await.unwrap_err();
    assert!(matches!(err, ArchiveError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_archive_is_a_transport_error() {
    let stub = ArchiveStub::start().await.unwrap();
    let base = stub.base_url();
    drop(stub);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = HttpArchiveClient::new(base, Duration::from_secs(2));
    let err = client.fetch_metadata("any").await.unwrap_err();
    assert!(matches!(err, ArchiveError::Transport(_)), "{err:?}");
}
