//! Service-account authentication for the document store.
//!
//! Follows the standard Google OAuth2 flow: sign a short-lived RS256 JWT
//! with the service-account key, exchange it at the token endpoint for a
//! bearer token, cache until close to expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{BatchError, Result};

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file this flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: chrono::DateTime<Utc>,
}

/// Mints and caches bearer tokens for one service account.
#[derive(Debug)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn from_file(path: &str) -> Result<ServiceAccountAuth> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| BatchError::Auth(format!("{path}: {err}")))?;
        let key: ServiceAccountKey =
            serde_json::from_str(&raw).map_err(|err| BatchError::Auth(format!("{path}: {err}")))?;
        Ok(ServiceAccountAuth {
            key,
            cached: Mutex::new(None),
        })
    }

    /// A valid bearer token, minted on demand.
    pub async fn token(&self, http_client: &reqwest::Client) -> Result<String> {
        let mut cached = self.cached.lock().await;

        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now {
                return Ok(token.access_token.clone());
            }
        }

        let assertion = self.sign_assertion(now.timestamp())?;
        let response = http_client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|err| BatchError::Auth(err.to_string()))?;

        if !response.status().is_success() {
            return Err(BatchError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| BatchError::Auth(err.to_string()))?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(access_token)
    }

    fn sign_assertion(&self, iat: i64) -> Result<String> {
        let claims = TokenClaims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + 3600,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|err| BatchError::Auth(format!("invalid private key: {err}")))?;

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|err| BatchError::Auth(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_key_deserialization_defaults_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email": "job@example.iam.gserviceaccount.com", "private_key": "---"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"client_email": "job@example.iam.gserviceaccount.com",
                "private_key": "---",
                "token_uri": "https://oauth2.example.com/token"}}"#
        )
        .unwrap();

        let auth = ServiceAccountAuth::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(auth.key.client_email, "job@example.iam.gserviceaccount.com");
        assert_eq!(auth.key.token_uri, "https://oauth2.example.com/token");
    }

    #[test]
    fn test_from_file_missing() {
        let err = ServiceAccountAuth::from_file("/nonexistent/key.json").unwrap_err();
        assert!(matches!(err, BatchError::Auth(_)));
    }

    #[test]
    fn test_claims_shape() {
        let claims = TokenClaims {
            iss: "job@example.iam.gserviceaccount.com",
            scope: DATASTORE_SCOPE,
            aud: "https://oauth2.googleapis.com/token",
            iat: 1_000,
            exp: 4_600,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["scope"], DATASTORE_SCOPE);
        assert_eq!(json["exp"], 4_600);
    }
}
