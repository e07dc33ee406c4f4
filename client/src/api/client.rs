use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    api::{credentials::CredentialStore, types::*},
    config::Config,
};

/// HTTP client for the dashboard backend.
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(config: &Config, credentials: CredentialStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => request.bearer_auth(token),
            None => {
                tracing::debug!("no token found in storage");
                request
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.with_auth(request).send().await.map_err(|e| {
            tracing::warn!(error = %e, base_url = %self.base_url, "cannot reach backend");
            ApiError::network()
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)));
        }

        let body: Option<Value> = response.json().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message").or_else(|| b.get("error")))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        tracing::warn!(status = status.as_u16(), %message, "backend returned an error");

        let error = if status == StatusCode::UNAUTHORIZED {
            self.credentials.clear();
            ApiError::unauthorized(message)
        } else {
            ApiError::request_failed(message)
        };
        Err(match body {
            Some(details) => error.with_details(details),
            None => error,
        })
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = self.client.post(self.url("/auth/login")).json(request);
        self.execute(request).await
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ApiError> {
        if self.credentials.token().is_none() {
            return Err(ApiError::unauthorized("No token"));
        }
        let request = self.client.get(self.url("/auth/verify"));
        self.execute(request).await
    }
}
