//! HTTP submission tests against a mocked "create document" endpoint.

use std::sync::Arc;
use std::time::Duration;

use crpt_api::config::HttpSettings;
use crpt_api::document::Document;
use crpt_api::error::AppError;
use crpt_api::http::{DocumentSink, HttpDocumentSink};
use crpt_api::{CrptApi, RateGate};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREATE_PATH: &str = "/api/v3/lk/documents/create";

fn plain_http_settings() -> HttpSettings {
    HttpSettings {
        connect_timeout_ms: 1_000,
        request_timeout_ms: 2_000,
        pool_idle_timeout_secs: 10,
        https_only: false,
    }
}

fn sink_for(server: &MockServer) -> HttpDocumentSink {
    HttpDocumentSink::new(format!("{}{}", server.uri(), CREATE_PATH), &plain_http_settings()).unwrap()
}

#[tokio::test]
async fn test_posts_json_body_with_signature_header() {
    let server = MockServer::start().await;
    let document = Document::sample();

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .and(header("Content-Type", "application/json"))
        .and(header("Signature", "exampleSignature"))
        .and(body_json(&document))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"value\":\"ignored\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let result = sink_for(&server).submit(&document, "exampleSignature").await;

    assert!(result.is_ok(), "Submission should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_non_success_status_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = sink_for(&server).submit(&Document::sample(), "sig").await;

    assert!(matches!(result, Err(AppError::Api { status: 429 })));
}

#[tokio::test]
async fn test_unparseable_response_body_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("not valid json"))
        .mount(&server)
        .await;

    let result = sink_for(&server).submit(&Document::sample(), "sig").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_failed_request_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let api = CrptApi::new(
        RateGate::new(5, Duration::from_secs(60)).unwrap(),
        Arc::new(sink_for(&server)),
    );

    let result = api.create_document(&Document::sample(), "sig").await;

    assert!(matches!(result, Err(AppError::Api { status: 500 })));
    assert_eq!(api.gate().available(), 5);
}

#[tokio::test]
async fn test_throttled_client_delivers_every_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&server)
        .await;

    let period = Duration::from_millis(200);
    let api = CrptApi::new(RateGate::new(2, period).unwrap(), Arc::new(sink_for(&server)));
    let start = std::time::Instant::now();

    let mut handles = vec![];
    for _ in 0..4 {
        let api = api.clone();
        handles.push(tokio::spawn(async move {
            api.create_document(&Document::sample(), "sig").await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    // The first pair drains the pool, so the second pair waits a full period
    assert!(start.elapsed() >= period);
    assert_eq!(api.stats().submitted(), 4);
}
