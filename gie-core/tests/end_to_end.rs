//! End-to-end tests: real reqwest transport against a local mock server.

use chrono::NaiveDate;
use gie_core::{ApiFamily, ClientConfig, DatasetClient, GieClient, GieError, Protocol};
use httpmock::prelude::*;
use serde_json::json;

const KEY: &str = "test-key";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn bergermeer_three_days_normalize() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api")
            .header("x-key", KEY)
            .query_param("from", "2023-01-01")
            .query_param("till", "2023-01-03")
            .query_param("size", "300")
            .query_param("page", "1")
            .query_param("country", "NL")
            .query_param("company", "21X000000001120V")
            .query_param("facility", "21W0000000000087");
        then.status(200).json_body(json!({
            "last_page": 1,
            "total": 3,
            "dataset": "storage",
            "data": [
                {"name": "Bergermeer", "code": "21W0000000000087", "url": "21W0000000000087/NL/21X000000001120V",
                 "gasDayStart": "2023-01-01", "gasInStorage": "10.5", "status": "E", "info": []},
                {"name": "Bergermeer", "code": "21W0000000000087", "url": "21W0000000000087/NL/21X000000001120V",
                 "gasDayStart": "2023-01-02", "gasInStorage": "-", "status": "E", "info": []},
                {"name": "Bergermeer", "code": "21W0000000000087", "url": "21W0000000000087/NL/21X000000001120V",
                 "gasDayStart": "2023-01-03", "gasInStorage": "20", "status": "E", "info": []},
            ],
        }));
    });

    let config = ClientConfig::new(KEY).with_base_url(ApiFamily::GasStorage, server.url("/api"));
    let client = DatasetClient::new(config).unwrap();

    let ds = client
        .query_gas_storage("ugs_bergermeer", "2023-01-01", "2023-01-03")
        .unwrap();

    mock.assert();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.dates().unwrap(), vec![d(2023, 1, 1), d(2023, 1, 2), d(2023, 1, 3)]);
    assert_eq!(
        ds.numeric("gasInStorage").unwrap(),
        vec![Some(10.5), Some(0.0), Some(20.0)]
    );
    assert_eq!(
        ds.statuses().unwrap(),
        vec![Some("E".to_string()), Some("E".to_string()), Some("E".to_string())]
    );
    assert_eq!(ds.numeric_columns(), vec!["gasInStorage".to_string()]);
}

#[test]
fn pages_are_fetched_over_http() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path("/lng").query_param("page", "1");
        then.status(200)
            .json_body(json!({"last_page": 2, "data": [{"gasDayStart": "2023-01-01", "sendOut": "1"}]}));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/lng").query_param("page", "2");
        then.status(200)
            .json_body(json!({"last_page": 2, "data": [{"gasDayStart": "2023-01-02", "sendOut": "2"}]}));
    });

    let config = ClientConfig::new(KEY).with_base_url(ApiFamily::Lng, server.url("/lng"));
    let client = GieClient::new(config).unwrap();

    let records = client
        .query_lng_country("BE", d(2023, 1, 1), d(2023, 1, 2))
        .unwrap();

    first.assert();
    second.assert();
    let days: Vec<_> = records.iter().filter_map(|r| r.gas_day()).collect();
    assert_eq!(days, vec![d(2023, 1, 1), d(2023, 1, 2)]);
}

#[test]
fn path_addressed_anomaly_retry_over_http() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(GET)
            .path("/api/data/NL")
            .query_param("from", "2023-01-10")
            .query_param("till", "2023-01-12");
        then.status(200)
            .json_body(json!({"dataset": "ERROR", "exception": "Query failed"}));
    });
    let widened = server.mock(|when, then| {
        when.method(GET)
            .path("/api/data/NL")
            .query_param("from", "2023-01-05")
            .query_param("till", "2023-01-17");
        then.status(200).json_body(json!({"data": [
            {"gasDayStart": "2023-01-09", "full": "1"},
            {"gasDayStart": "2023-01-10", "full": "2"},
            {"gasDayStart": "2023-01-12", "full": "3"},
            {"gasDayStart": "2023-01-13", "full": "4"},
        ]}));
    });

    let config = ClientConfig::new(KEY)
        .with_protocol(Protocol::PathAddressed)
        .with_base_url(ApiFamily::GasStorage, server.url("/api/data/"));
    let client = DatasetClient::new(config).unwrap();

    let ds = client.query_gas_country("NL", "2023-01-10", "2023-01-12").unwrap();

    failing.assert();
    widened.assert();
    assert_eq!(ds.dates().unwrap(), vec![d(2023, 1, 10), d(2023, 1, 12)]);
    assert_eq!(ds.numeric("full").unwrap(), vec![Some(2.0), Some(3.0)]);
}

#[test]
fn http_error_status_surfaces_with_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api");
        then.status(403).body("{\"error\":\"access denied\"}");
    });

    let config = ClientConfig::new(KEY).with_base_url(ApiFamily::GasStorage, server.url("/api"));
    let client = GieClient::new(config).unwrap();

    let err = client
        .query_gas_company("taqa_gas_storage", "2023-01-01", "2023-01-03")
        .unwrap_err();

    mock.assert();
    match err {
        GieError::UpstreamHttp { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "{\"error\":\"access denied\"}");
        }
        other => panic!("expected UpstreamHttp, got {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_network_error() {
    let config = ClientConfig::new(KEY)
        .with_base_url(ApiFamily::GasStorage, "http://127.0.0.1:9/api");
    let client = GieClient::new(config).unwrap();

    let err = client
        .query_gas_country("NL", "2023-01-01", "2023-01-03")
        .unwrap_err();

    assert!(matches!(err, GieError::Network(_)));
}
