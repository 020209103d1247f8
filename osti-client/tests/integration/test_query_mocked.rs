//! Integration tests for single-page record queries using mocked HTTP responses

#[path = "common/mod.rs"]
mod common;

use chrono::NaiveDate;
use common::{create_mock_client, osti_records, records_url, RECORDS_PATH, TEST_DATE_HEADER};
use osti_client::osti::{DateRange, QueryParameters};
use osti_client::RecordQuery;
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_query_returns_page_and_total_count() {
    let mock_server = MockServer::start().await;
    let records = osti_records(1000, 3);

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&records)
                .insert_header("X-Total-Count", "57")
                .insert_header("Date", TEST_DATE_HEADER),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client.query_records(&RecordQuery::new()).await.unwrap();

    assert_eq!(result.records, records);
    assert_eq!(result.total_count, 57);
    assert_eq!(result.status, 200);
    assert!(result.is_success());
    assert_eq!(result.page_count(), 3);
    assert_eq!(result.request_date.as_deref(), Some(TEST_DATE_HEADER));
    assert!(result.url.starts_with(&records_url(&mock_server)));
}

#[tokio::test]
#[traced_test]
async fn test_default_parameters_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("sort", "publication_date desc"))
        .and(query_param("sponsor_org", "\"EE-4S\""))
        .and(query_param("publication_date_start", "01/01/1980"))
        .and(query_param("publication_date_end", "12/31/1999"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Total-Count", "0"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let query = RecordQuery::new().end_date(date(1999, 12, 31));
    let result = client.query_records(&query).await.unwrap();

    assert!(result.records.is_empty());
    assert_eq!(result.total_count, 0);
}

#[tokio::test]
#[traced_test]
async fn test_open_end_date_is_today() {
    let mock_server = MockServer::start().await;
    let today = chrono::Local::now().date_naive().format("%m/%d/%Y").to_string();

    Mock::given(method("GET"))
        .and(query_param("publication_date_end", today.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Total-Count", "0"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    client.query_records(&RecordQuery::new()).await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_reused_default_parameters_do_not_leak_dates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Total-Count", "0"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let shared = QueryParameters::default();

    let first = RecordQuery::new()
        .params(shared.clone())
        .date_range(DateRange::new(date(2001, 1, 1), date(2001, 12, 31)));
    let second = RecordQuery::new()
        .params(shared.clone())
        .date_range(DateRange::new(date(2015, 6, 1), date(2015, 6, 30)));

    client.query_records(&first).await.unwrap();
    client.query_records(&second).await.unwrap();

    // The caller's parameters are never written to
    assert_eq!(shared, QueryParameters::default());
    assert_eq!(first.parameters(), &QueryParameters::default());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let dates = |index: usize| -> Vec<(String, String)> {
        requests[index]
            .url
            .query_pairs()
            .filter(|(k, _)| k.starts_with("publication_date_"))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    };

    assert_eq!(
        dates(0),
        vec![
            ("publication_date_end".to_string(), "12/31/2001".to_string()),
            ("publication_date_start".to_string(), "01/01/2001".to_string()),
        ]
    );
    assert_eq!(
        dates(1),
        vec![
            ("publication_date_end".to_string(), "06/30/2015".to_string()),
            ("publication_date_start".to_string(), "06/01/2015".to_string()),
        ]
    );
}

#[tokio::test]
#[traced_test]
async fn test_server_error_is_not_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("X-Total-Count", "12")
                .insert_header("Date", TEST_DATE_HEADER),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client
        .query_records(&RecordQuery::new().verbose(true))
        .await
        .expect("a 500 response should still be returned");

    assert!(result.records.is_empty());
    assert_eq!(result.total_count, 12);
    assert_eq!(result.status, 500);
    assert!(!result.is_success());
    assert!(result
        .status_report()
        .starts_with("Query was successful: False"));
    assert!(result.error_for_status().is_err());
}

#[tokio::test]
#[traced_test]
async fn test_custom_parameters_and_endpoint_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alt/records"))
        .and(query_param("title", "hydrogen storage"))
        .and(query_param("sponsor_org", "\"EE-3F\""))
        .and(query_param("sort", "publication_date asc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(osti_records(5, 1))
                .insert_header("X-Total-Count", "1"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // The client's base URL points elsewhere; the query overrides it
    let client = create_mock_client(&mock_server);
    let query = RecordQuery::new()
        .endpoint(format!("{}/alt/records", mock_server.uri()))
        .param("title", "hydrogen storage")
        .sponsor_org("EE-3F")
        .sort("publication_date asc");

    let result = client.query_records(&query).await.unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(
        result.citation_urls().unwrap(),
        vec![Some("https://www.osti.gov/biblio/5".to_string())]
    );
}

#[tokio::test]
#[traced_test]
async fn test_query_page_sets_page_parameter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(osti_records(21, 20))
                .insert_header("X-Total-Count", "45"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let query = RecordQuery::new();
    let result = client.query_page(&query, 2).await.unwrap();

    assert_eq!(result.records.len(), 20);
    assert_eq!(result.records[0]["osti_id"], "21");
    assert_eq!(query.parameters().get("page"), None);
}
