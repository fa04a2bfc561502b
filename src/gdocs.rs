use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Error;
use crate::model::FieldEntry;

const SCOPES: &str = "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DOCS_ENDPOINT: &str = "https://docs.googleapis.com/v1/documents";
const TOKEN_LIFETIME_SECS: u64 = 3600;

pub const REPORT_BANNER: &str = "REPORTE DE PROYECTO WEB\n=======================\n";

/// A document created on the remote side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteDocument {
    pub id: String,
    pub url: String,
}

impl RemoteDocument {
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let url = format!("https://docs.google.com/document/d/{id}/edit");
        Self { id, url }
    }
}

/// Destination for briefings rendered as remote documents. Calls block.
pub trait DocsClient: Send + Sync {
    fn create_briefing_doc(&self, title: &str, entries: &[FieldEntry]) -> Result<RemoteDocument, Error>;
}

/// Plain-text body: a leading blank line, then `LABEL: value` per entry,
/// each followed by a blank line.
pub fn text_dump(entries: &[FieldEntry]) -> String {
    let mut body = String::from("\n");
    for entry in entries {
        body.push_str(&entry.display_label());
        body.push_str(": ");
        body.push_str(&entry.value);
        body.push_str("\n\n");
    }
    body
}

/// Both inserts target index 1, so the banner (applied second) lands above
/// the body.
pub fn insert_requests(body: &str) -> serde_json::Value {
    json!({
        "requests": [
            { "insertText": { "location": { "index": 1 }, "text": body } },
            { "insertText": { "location": { "index": 1 }, "text": REPORT_BANNER } },
        ]
    })
}

/// The fields of a service-account key file this client uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Signed JWT for the OAuth2 JWT-bearer grant.
pub fn signed_assertion(key: &ServiceAccountKey, issued_at: u64) -> Result<String, Error> {
    let claims = GrantClaims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &signing_key)?)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: Option<String>,
}

/// Pull the human-readable message out of a Google API error body, falling
/// back to the raw body.
pub fn upstream_message(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorField,
    }
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Detailed { message: String },
        // OAuth endpoints answer {"error": "invalid_grant", "error_description": ...}
        Code(String),
    }
    #[derive(Deserialize)]
    struct OAuthEnvelope {
        error_description: Option<String>,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope {
            error: ErrorField::Detailed { message },
        }) => message,
        Ok(Envelope {
            error: ErrorField::Code(code),
        }) => serde_json::from_str::<OAuthEnvelope>(body)
            .ok()
            .and_then(|e| e.error_description)
            .map(|d| format!("{code}: {d}"))
            .unwrap_or(code),
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => body.trim().to_string(),
    }
}

pub struct GoogleDocs {
    key: ServiceAccountKey,
    agent: ureq::Agent,
}

impl GoogleDocs {
    pub fn new(key: ServiceAccountKey) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { key, agent }
    }

    pub fn from_key_file(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::Remote(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Remote(upstream_message(status.as_u16(), &body)));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn access_token(&self) -> Result<String, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let assertion = signed_assertion(&self.key, now)
            .map_err(|e| Error::Auth(format!("cannot sign with service account key: {e}")))?;
        let response = self
            .agent
            .post(&self.key.token_uri)
            .send_form([
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .map_err(|e| Error::Auth(e.to_string()))?;
        let token: TokenResponse = Self::read_json(response).map_err(|e| match e {
            Error::Remote(msg) => Error::Auth(msg),
            other => other,
        })?;
        Ok(token.access_token)
    }

    fn create_document(&self, token: &str, title: &str) -> Result<String, Error> {
        let response = self
            .agent
            .post(DOCS_ENDPOINT)
            .header("Authorization", &format!("Bearer {token}"))
            .send_json(json!({ "title": title }))
            .map_err(|e| Error::Remote(e.to_string()))?;
        let created: CreatedDocument = Self::read_json(response)?;
        created
            .document_id
            .ok_or_else(|| Error::Remote("Failed to create document".into()))
    }

    fn insert_text(&self, token: &str, document_id: &str, body: &str) -> Result<(), Error> {
        let response = self
            .agent
            .post(&format!("{DOCS_ENDPOINT}/{document_id}:batchUpdate"))
            .header("Authorization", &format!("Bearer {token}"))
            .send_json(insert_requests(body))
            .map_err(|e| Error::Remote(e.to_string()))?;
        let _: serde_json::Value = Self::read_json(response)?;
        Ok(())
    }
}

impl DocsClient for GoogleDocs {
    fn create_briefing_doc(&self, title: &str, entries: &[FieldEntry]) -> Result<RemoteDocument, Error> {
        let t0 = std::time::Instant::now();
        let token = self.access_token()?;
        let document_id = self.create_document(&token, title)?;
        self.insert_text(&token, &document_id, &text_dump(entries))?;
        log::info!(
            "created Google Doc {document_id} ({} fields) in {:.1}ms",
            entries.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(RemoteDocument::from_id(document_id))
    }
}
