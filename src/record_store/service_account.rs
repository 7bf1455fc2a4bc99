use std::path::Path;

use anyhow::Context;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::RecordStoreError;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a Google service-account key file needed to obtain tokens.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: SecretString,
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: SecretString,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        serde_json::from_str(json).context("The service-account credential is not valid JSON.")
    }

    pub fn from_base64(encoded: &SecretString) -> Result<Self, anyhow::Error> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.expose_secret().trim())
            .context("Failed to base64-decode the service-account credential.")?;
        let json = String::from_utf8(bytes)
            .context("The decoded service-account credential is not UTF8.")?;
        Self::from_json(&json)
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let json = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read the service-account credential at {}.",
                path.display()
            )
        })?;
        Self::from_json(&json)
    }

    /// A signed JWT asserting this account's identity to the token endpoint.
    pub fn assertion(&self) -> Result<String, anyhow::Error> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .context("The service-account private key is not a valid RSA PEM.")?;

        jsonwebtoken::encode(&header, &claims, &key)
            .context("Failed to sign the service-account assertion.")
    }

    #[tracing::instrument(
        name = "Exchanging service-account assertion for an access token",
        skip_all,
        fields(client_email = %self.client_email)
    )]
    pub async fn access_token(
        &self,
        http_client: &Client,
    ) -> Result<SecretString, RecordStoreError> {
        let assertion = self.assertion()?;

        let response = http_client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordStoreError::UnexpectedStatus(status));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}
