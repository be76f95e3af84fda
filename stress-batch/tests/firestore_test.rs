//! Firestore client tests against a mocked HTTP endpoint.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentio_common::{StressClass, StressPrediction, StressProbabilities};
use stress_batch::store::{FirestoreClient, StressStore};
use stress_batch::{BatchError, FirestoreConfig};

fn test_client(base_url: String) -> FirestoreClient {
    FirestoreClient::new(&FirestoreConfig {
        project_id: "test-project".to_string(),
        credentials_path: None,
        base_url,
    })
    .unwrap()
}

fn prediction() -> StressPrediction {
    StressPrediction {
        stress: StressClass::High,
        probabilities: StressProbabilities {
            low: 0.1,
            medium: 0.2,
            high: 0.7,
        },
        sdnn: 12.5,
        rmssd: 9.0,
        window_start: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        window_end: Utc.with_ymd_and_hms(2025, 6, 1, 12, 5, 0).unwrap(),
        prediction_timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap(),
        num_samples: 60,
    }
}

#[tokio::test]
async fn test_samples_since_parses_documents() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/projects/test-project/databases/(default)/documents:runQuery",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/test-project/databases/(default)/documents/heart_rate_data/doc-1",
                    "fields": {
                        "timestamp": {"timestampValue": "2025-06-01T12:00:00Z"},
                        "ibi": {"arrayValue": {"values": [
                            {"doubleValue": 800.0},
                            {"integerValue": "820"}
                        ]}}
                    }
                }
            },
            {
                "document": {
                    "name": "projects/test-project/databases/(default)/documents/heart_rate_data/doc-2",
                    "fields": {
                        "timestamp": {"timestampValue": "2025-06-01T12:00:05Z"}
                    }
                }
            },
            {"readTime": "2025-06-01T13:00:00Z"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
    let samples = client.samples_since(cutoff).await.unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].doc_id, "doc-1");
    assert_eq!(samples[0].ibi, vec![800.0, 820.0]);
    assert_eq!(samples[1].doc_id, "doc-2");
    assert!(samples[1].ibi.is_empty());
}

#[tokio::test]
async fn test_samples_since_sends_cutoff_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/projects/test-project/databases/(default)/documents:runQuery",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
    client.samples_since(cutoff).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let filter = &body["structuredQuery"]["where"]["fieldFilter"];
    assert_eq!(filter["field"]["fieldPath"], "timestamp");
    assert_eq!(filter["op"], "GREATER_THAN_OR_EQUAL");
    assert_eq!(
        filter["value"]["timestampValue"],
        "2025-06-01T11:00:00.000000Z"
    );
}

#[tokio::test]
async fn test_samples_since_surfaces_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
    let err = client.samples_since(cutoff).await.unwrap_err();
    assert!(matches!(err, BatchError::Store(_)));
}

#[tokio::test]
async fn test_write_predictions_commits_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/projects/test-project/databases/(default)/documents:commit",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    client
        .write_predictions(&[prediction(), prediction()])
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let writes = body["writes"].as_array().unwrap();
    assert_eq!(writes.len(), 2);

    let fields = &writes[0]["update"]["fields"];
    assert_eq!(fields["stress_level"]["integerValue"], "2");
    assert_eq!(fields["stress_label"]["stringValue"], "high");
    assert_eq!(fields["num_samples"]["integerValue"], "60");

    // Each document gets its own generated id.
    let name_0 = writes[0]["update"]["name"].as_str().unwrap();
    let name_1 = writes[1]["update"]["name"].as_str().unwrap();
    assert!(name_0.contains("/documents/stress_predictions/"));
    assert_ne!(name_0, name_1);
}

#[tokio::test]
async fn test_write_predictions_skips_empty_batch() {
    let mock_server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail the call.

    let client = test_client(mock_server.uri());
    client.write_predictions(&[]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_write_predictions_surfaces_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let err = client.write_predictions(&[prediction()]).await.unwrap_err();
    assert!(matches!(err, BatchError::Store(_)));
}
