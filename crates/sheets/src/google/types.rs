//! Google wire types: service-account keys, OAuth token responses and
//! Sheets API value ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default OAuth token endpoint, used when the key file omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service-account key file as downloaded from the Google Cloud console.
///
/// Only the fields needed for the JWT bearer grant are kept.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Always `"service_account"` for keys this client can use.
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    /// Identity the JWT is issued for.
    pub client_email: String,
    /// PKCS#8 RSA private key in PEM form.
    pub private_key: String,
    /// Key id, sent as the JWT `kid` header when present.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint (JWT audience).
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

// Hand-written so the private key never reaches a log line.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// JOSE header of the signed assertion.
#[derive(Debug, Serialize)]
pub struct JwtHeader<'a> {
    pub alg: &'static str,
    pub typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<&'a str>,
}

/// Claims of the JWT bearer grant assertion.
#[derive(Debug, Serialize)]
pub struct JwtClaims<'a> {
    /// Service-account email.
    pub iss: &'a str,
    /// Space-separated OAuth scopes.
    pub scope: &'a str,
    /// Token endpoint.
    pub aud: &'a str,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Successful response of the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// `spreadsheets.values.get` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Cells as strings, the way a "get all values" call presents them.
    pub fn into_string_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

/// Render one JSON cell as text. Formatted values are strings already;
/// numbers and booleans show up with unformatted render options.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Google API error envelope: `{"error": {"code": 403, "message": "...", "status": "..."}}`.
#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GoogleErrorBody {
    Detailed {
        message: String,
        #[serde(default)]
        status: Option<String>,
    },
    // The OAuth endpoint uses {"error": "invalid_grant", "error_description": ...}.
    Code(String),
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    #[serde(default)]
    error_description: Option<String>,
}

/// Best-effort human-readable message from an error response body.
pub fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<GoogleErrorEnvelope>(body) {
        return match envelope.error {
            GoogleErrorBody::Detailed { message, status } => match status {
                Some(status) => format!("{status}: {message}"),
                None => message,
            },
            GoogleErrorBody::Code(code) => {
                match serde_json::from_str::<OAuthError>(body)
                    .ok()
                    .and_then(|e| e.error_description)
                {
                    Some(desc) => format!("{code}: {desc}"),
                    None => code,
                }
            }
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
