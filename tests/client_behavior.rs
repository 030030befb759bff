//! Behavior tests for endpoint-specific handling: envelope shapes, wire
//! parameters, deprecation warnings, whole-call failure, deadlines.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use matx_core::{
    ApiErrorKind, CatalogClient, CatalogConfig, CatalogEndpoint, FetchError, RetryConfig,
};
use matx_tests::{id_records, offset_of, ok, page_body, status, ScriptedHttpClient};

fn client_over(http: Arc<ScriptedHttpClient>) -> CatalogClient {
    let config = CatalogConfig::default().with_retry(RetryConfig::no_retry());
    CatalogClient::with_http_client(config, http).expect("valid config")
}

fn filters(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[tokio::test]
async fn one_rejected_page_fails_the_whole_call() {
    // Given: the first page is fine but one planned page 404s
    let http = ScriptedHttpClient::routed(|request| match offset_of(request) {
        Some(100) => status(404, "gone"),
        offset => {
            let start = offset.unwrap_or(0);
            ok(page_body("data", id_records(start..start + 50), Some(120)))
        }
    });
    let client = client_over(Arc::clone(&http));

    // When
    let error = client
        .fetch_all(CatalogEndpoint::Phases, &[], &BTreeMap::new(), None)
        .await
        .expect_err("a rejected page is fatal");

    // Then: no partial result is returned
    match error {
        FetchError::Api(api) => assert_eq!(api.kind(), ApiErrorKind::ClientRejected),
        other => panic!("expected API error, got {other}"),
    }
}

#[tokio::test]
async fn missing_records_field_is_a_malformed_envelope() {
    // Given: a response carrying meta but no records field
    let http = ScriptedHttpClient::sequence(vec![ok(r#"{"meta": {"data_available": 10}}"#)]);
    let client = client_over(Arc::clone(&http));

    // When
    let error = client
        .fetch_all(CatalogEndpoint::Phases, &[], &BTreeMap::new(), None)
        .await
        .expect_err("must not coerce to an empty page");

    // Then
    assert!(matches!(error, FetchError::MalformedEnvelope { field } if field == "data"));
}

#[tokio::test]
async fn deprecated_entries_endpoint_executes_with_a_warning() {
    // Given
    let http = ScriptedHttpClient::sequence(vec![ok(page_body("data", id_records(0..2), None))]);
    let client = client_over(Arc::clone(&http));

    // When
    let result = client
        .entries(&[], &BTreeMap::new(), None)
        .await
        .expect("deprecated endpoints still execute");

    // Then: the data arrives, the caller is told
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("deprecated"));

    let first = &http.requests()[0];
    assert!(first.url.ends_with("/oqmdapi/entry"));
}

#[tokio::test]
async fn fields_and_filters_render_on_the_wire() {
    // Given: a catalog reporting 60 records, so one paginated page follows
    let http = ScriptedHttpClient::routed(|request| {
        let start = offset_of(request).unwrap_or(0);
        ok(page_body("data", id_records(start..(start + 50).min(60)), Some(60)))
    });
    let client = client_over(Arc::clone(&http));

    // When
    client
        .phases(
            &["composition", "band_gap"],
            &filters(&[("stability", "0"), ("generic", "ABC3")]),
            None,
        )
        .await
        .expect("fetch succeeds");

    // Then: the first request carries fields and sorted filter, no offset
    let requests = http.requests();
    let first = requests
        .iter()
        .find(|request| offset_of(request).is_none())
        .expect("initial page request");
    assert!(first.url.ends_with("/oqmdapi/formationenergy"));
    assert_eq!(first.query_value("fields"), Some("composition,band_gap"));
    assert_eq!(first.query_value("filter"), Some("generic=ABC3 AND stability=0"));
    assert_eq!(first.query_value("limit"), None);

    // And: the planned page keeps the same parameters plus offset/limit
    let paged = requests
        .iter()
        .find(|request| offset_of(request) == Some(50))
        .expect("paginated request");
    assert_eq!(paged.query_value("filter"), Some("generic=ABC3 AND stability=0"));
    assert_eq!(paged.query_value("limit"), Some("50"));
}

#[tokio::test]
async fn structures_use_the_optimade_family_and_flatten_attributes() {
    // Given: an OPTIMADE envelope with attribute-wrapped records
    let http = ScriptedHttpClient::sequence(vec![ok(
        r#"{"data": [{"id": "s-1", "attributes": {"nelements": 3}}]}"#,
    )]);
    let client = client_over(Arc::clone(&http));

    // When
    let result = client
        .structures(&BTreeMap::new(), None)
        .await
        .expect("fetch succeeds");

    // Then: records are flat and the optimade base URL was used
    assert_eq!(result.records[0]["nelements"], 3);
    assert!(result.records[0].get("attributes").is_none());
    assert!(http.requests()[0].url.ends_with("/optimade/structures"));
}

#[tokio::test(start_paused = true)]
async fn deadline_aborts_inflight_work() {
    // Given: a server that answers only after a minute
    let http = ScriptedHttpClient::routed_with_delay(
        |_| ok(page_body("data", id_records(0..1), None)),
        |_| Duration::from_secs(60),
    );
    let client = client_over(Arc::clone(&http));

    // When: the caller allows ten seconds
    let error = client
        .fetch_all_within(
            Duration::from_secs(10),
            CatalogEndpoint::Phases,
            &[],
            &BTreeMap::new(),
            None,
        )
        .await
        .expect_err("deadline must fire first");

    // Then
    assert!(matches!(error, FetchError::DeadlineExceeded));
}

#[tokio::test(start_paused = true)]
async fn deadline_aborts_a_pending_retry_sleep() {
    // Given: endless transient failures with a 15s retry delay
    let http = ScriptedHttpClient::routed(|_| status(503, "down"));
    let config = CatalogConfig::default()
        .with_retry(RetryConfig::fixed(Duration::from_secs(15), 10));
    let client =
        CatalogClient::with_http_client(config, Arc::<ScriptedHttpClient>::clone(&http))
            .expect("valid config");

    // When: the deadline lands inside the second sleep
    let error = client
        .fetch_all_within(
            Duration::from_secs(20),
            CatalogEndpoint::Phases,
            &[],
            &BTreeMap::new(),
            None,
        )
        .await
        .expect_err("deadline must cut the retry loop short");

    // Then: the loop stopped mid-backoff instead of burning the full budget
    assert!(matches!(error, FetchError::DeadlineExceeded));
    assert_eq!(http.calls(), 2);
}
