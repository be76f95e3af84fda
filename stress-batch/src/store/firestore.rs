//! Firestore REST client.
//!
//! Reads the `heart_rate_data` collection with `:runQuery` and writes
//! `stress_predictions` with a single `:commit`, which Firestore applies
//! atomically.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use sentio_common::{HeartRateSample, StressPrediction};
use serde_json::{json, Value};
use uuid::Uuid;

use super::StressStore;
use crate::auth::ServiceAccountAuth;
use crate::config::FirestoreConfig;
use crate::error::{BatchError, Result};

const SAMPLES_COLLECTION: &str = "heart_rate_data";
const PREDICTIONS_COLLECTION: &str = "stress_predictions";

pub struct FirestoreClient {
    http_client: Client,
    base_url: String,
    project_id: String,
    auth: Option<ServiceAccountAuth>,
}

impl FirestoreClient {
    pub fn new(config: &FirestoreConfig) -> Result<FirestoreClient> {
        let auth = match &config.credentials_path {
            Some(path) => Some(ServiceAccountAuth::from_file(path)?),
            None => None,
        };

        Ok(FirestoreClient {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            auth,
        })
    }

    fn documents_url(&self, suffix: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents{}",
            self.base_url, self.project_id, suffix
        )
    }

    fn document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.project_id, collection, doc_id
        )
    }

    async fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.auth {
            Some(auth) => {
                let token = auth.token(&self.http_client).await?;
                Ok(builder.bearer_auth(token))
            }
            None => Ok(builder),
        }
    }
}

#[async_trait]
impl StressStore for FirestoreClient {
    async fn samples_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<HeartRateSample>> {
        let body = json!({
            "structuredQuery": {
                "from": [{"collectionId": SAMPLES_COLLECTION}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": "timestamp"},
                        "op": "GREATER_THAN_OR_EQUAL",
                        "value": timestamp_value(cutoff),
                    }
                },
            }
        });

        let request = self
            .http_client
            .post(self.documents_url(":runQuery"))
            .json(&body);
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|err| BatchError::Store(err.to_string()))?;

        if !response.status().is_success() {
            return Err(BatchError::Store(format!(
                "runQuery returned {}",
                response.status()
            )));
        }

        let entries: Vec<Value> = response
            .json()
            .await
            .map_err(|err| BatchError::Store(err.to_string()))?;

        let mut samples = Vec::new();
        for entry in &entries {
            // Entries without a document (e.g. trailing readTime) are normal.
            let Some(document) = entry.get("document") else {
                continue;
            };
            match decode_sample(document) {
                Some(sample) => samples.push(sample),
                None => {
                    tracing::warn!(
                        name = %document.get("name").and_then(|v| v.as_str()).unwrap_or("<unnamed>"),
                        "Skipping heart-rate document without a valid timestamp"
                    );
                }
            }
        }

        Ok(samples)
    }

    async fn write_predictions(&self, predictions: &[StressPrediction]) -> Result<()> {
        if predictions.is_empty() {
            return Ok(());
        }

        let writes: Vec<Value> = predictions
            .iter()
            .map(|prediction| {
                json!({
                    "update": {
                        "name": self.document_name(
                            PREDICTIONS_COLLECTION,
                            &Uuid::new_v4().simple().to_string(),
                        ),
                        "fields": prediction_fields(prediction),
                    }
                })
            })
            .collect();

        let request = self
            .http_client
            .post(self.documents_url(":commit"))
            .json(&json!({ "writes": writes }));
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|err| BatchError::Store(err.to_string()))?;

        if !response.status().is_success() {
            return Err(BatchError::Store(format!(
                "commit returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Typed-value encoding
// ---------------------------------------------------------------------------

fn timestamp_value(ts: DateTime<Utc>) -> Value {
    json!({"timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true)})
}

fn double_value(v: f64) -> Value {
    json!({"doubleValue": v})
}

fn integer_value(v: i64) -> Value {
    // Firestore encodes 64-bit integers as strings.
    json!({"integerValue": v.to_string()})
}

fn string_value(v: &str) -> Value {
    json!({"stringValue": v})
}

/// Firestore field map for one prediction document.
fn prediction_fields(prediction: &StressPrediction) -> Value {
    json!({
        "stress_level": integer_value(prediction.stress.index()),
        "stress_label": string_value(prediction.stress.label()),
        "stress_probabilities": {
            "mapValue": {
                "fields": {
                    "class_0_low": double_value(prediction.probabilities.low),
                    "class_1_medium": double_value(prediction.probabilities.medium),
                    "class_2_high": double_value(prediction.probabilities.high),
                }
            }
        },
        "sdnn": double_value(prediction.sdnn),
        "rmssd": double_value(prediction.rmssd),
        "window_start": timestamp_value(prediction.window_start),
        "window_end": timestamp_value(prediction.window_end),
        "prediction_timestamp": timestamp_value(prediction.prediction_timestamp),
        "num_samples": integer_value(prediction.num_samples as i64),
    })
}

// ---------------------------------------------------------------------------
// Typed-value decoding
// ---------------------------------------------------------------------------

/// Decode one `runQuery` document into a sample. Returns `None` when the
/// timestamp is missing or malformed; a missing `ibi` list reads as empty.
fn decode_sample(document: &Value) -> Option<HeartRateSample> {
    let name = document.get("name")?.as_str()?;
    let doc_id = name.rsplit('/').next()?.to_string();

    let fields = document.get("fields")?;
    let timestamp = decode_timestamp(fields.get("timestamp")?)?;

    let ibi = fields
        .get("ibi")
        .and_then(|value| value.get("arrayValue"))
        .and_then(|array| array.get("values"))
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(decode_number).collect())
        .unwrap_or_default();

    Some(HeartRateSample {
        doc_id,
        timestamp,
        ibi,
    })
}

fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Numeric values arrive either as `doubleValue` numbers or `integerValue`
/// strings.
fn decode_number(value: &Value) -> Option<f64> {
    if let Some(v) = value.get("doubleValue").and_then(Value::as_f64) {
        return Some(v);
    }
    value
        .get("integerValue")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sentio_common::{StressClass, StressProbabilities};

    #[test]
    fn test_decode_sample() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/heart_rate_data/abc123",
            "fields": {
                "timestamp": {"timestampValue": "2025-06-01T12:00:00Z"},
                "ibi": {"arrayValue": {"values": [
                    {"doubleValue": 800.5},
                    {"integerValue": "810"}
                ]}}
            }
        });

        let sample = decode_sample(&document).unwrap();
        assert_eq!(sample.doc_id, "abc123");
        assert_eq!(
            sample.timestamp,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(sample.ibi, vec![800.5, 810.0]);
    }

    #[test]
    fn test_decode_sample_without_ibi() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/heart_rate_data/abc123",
            "fields": {
                "timestamp": {"timestampValue": "2025-06-01T12:00:00Z"}
            }
        });

        let sample = decode_sample(&document).unwrap();
        assert!(sample.ibi.is_empty());
    }

    #[test]
    fn test_decode_sample_rejects_missing_timestamp() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/heart_rate_data/abc123",
            "fields": {}
        });
        assert!(decode_sample(&document).is_none());
    }

    #[test]
    fn test_prediction_fields() {
        let prediction = StressPrediction {
            stress: StressClass::Medium,
            probabilities: StressProbabilities {
                low: 0.1,
                medium: 0.7,
                high: 0.2,
            },
            sdnn: 42.5,
            rmssd: 31.25,
            window_start: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            window_end: Utc.with_ymd_and_hms(2025, 6, 1, 12, 5, 0).unwrap(),
            prediction_timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap(),
            num_samples: 60,
        };

        let fields = prediction_fields(&prediction);
        assert_eq!(fields["stress_level"]["integerValue"], "1");
        assert_eq!(fields["stress_label"]["stringValue"], "medium");
        assert_eq!(
            fields["stress_probabilities"]["mapValue"]["fields"]["class_1_medium"]["doubleValue"],
            0.7
        );
        assert_eq!(fields["sdnn"]["doubleValue"], 42.5);
        assert_eq!(fields["num_samples"]["integerValue"], "60");
        assert_eq!(
            fields["window_start"]["timestampValue"],
            "2025-06-01T12:00:00.000000Z"
        );
    }

    #[test]
    fn test_decode_number_variants() {
        assert_eq!(decode_number(&json!({"doubleValue": 1.5})), Some(1.5));
        assert_eq!(decode_number(&json!({"integerValue": "810"})), Some(810.0));
        assert_eq!(decode_number(&json!({"stringValue": "x"})), None);
    }
}
