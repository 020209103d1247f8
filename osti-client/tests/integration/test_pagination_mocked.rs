//! Integration tests for full-result pagination using mocked HTTP responses

#[path = "common/mod.rs"]
mod common;

use common::{create_mock_client, create_retrying_mock_client, osti_records};
use osti_client::{OstiError, RecordQuery};
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount one page of a paginated result set
async fn mount_page(mock_server: &MockServer, page: u32, first_id: u64, count: usize, total: u64) {
    Mock::given(method("GET"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(osti_records(first_id, count))
                .insert_header("X-Total-Count", total.to_string()),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn test_fetches_all_pages_until_total_count() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, 1, 20, 45).await;
    mount_page(&mock_server, 2, 21, 20, 45).await;
    mount_page(&mock_server, 3, 41, 5, 45).await;

    let client = create_mock_client(&mock_server);
    let result = client
        .query_all_records(&RecordQuery::new(), None)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 45);
    assert_eq!(result.total_count, 45);
    assert_eq!(result.records[0]["osti_id"], "1");
    assert_eq!(result.records[44]["osti_id"], "45");
    assert!(result.url.contains("page=1"));

    let citations = result.citation_urls().unwrap();
    assert_eq!(
        citations[20].as_deref(),
        Some("https://www.osti.gov/biblio/21")
    );
}

#[tokio::test]
#[traced_test]
async fn test_limit_stops_early_and_truncates() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, 1, 20, 100).await;
    mount_page(&mock_server, 2, 21, 20, 100).await;

    let client = create_mock_client(&mock_server);
    let result = client
        .query_all_records(&RecordQuery::new(), Some(25))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 25);
    assert_eq!(result.total_count, 100);
}

#[tokio::test]
#[traced_test]
async fn test_empty_page_ends_pagination() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, 1, 20, 60).await;
    mount_page(&mock_server, 2, 21, 0, 60).await;

    let client = create_mock_client(&mock_server);
    let result = client
        .query_all_records(&RecordQuery::new(), None)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 20);
    assert_eq!(result.total_count, 60);
}

#[tokio::test]
#[traced_test]
async fn test_no_matches_needs_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Total-Count", "0"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client
        .query_all_records(&RecordQuery::new(), None)
        .await
        .unwrap();

    assert!(result.records.is_empty());
    assert_eq!(result.total_count, 0);
}

#[tokio::test]
#[traced_test]
async fn test_server_error_page_fails_pagination() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, 1, 20, 45).await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).insert_header("X-Total-Count", "45"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client
        .query_all_records(&RecordQuery::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, OstiError::ApiError { status: 500, .. }));
}

#[tokio::test]
#[traced_test]
async fn test_transient_page_failure_is_retried() {
    let mock_server = MockServer::start().await;

    // First request for page 1 is throttled, the retry succeeds
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(429).insert_header("X-Total-Count", "3"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, 1, 3, 3).await;

    let client = create_retrying_mock_client(&mock_server, 2);
    let result = client
        .query_all_records(&RecordQuery::new(), None)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.status, 200);
}

#[tokio::test]
#[traced_test]
async fn test_page_zero_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = create_mock_client(&mock_server);

    let err = client
        .query_page(&RecordQuery::new(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, OstiError::InvalidParameter(_)));
}
