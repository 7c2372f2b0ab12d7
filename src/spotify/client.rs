use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::PipelineError, management::Credentials, spotify::auth::AuthProvider, warning};

/// A single Spotify Web API request, independent of the credentials it is sent with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::DELETE,
            url: url.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Sends requests to the Spotify Web API.
///
/// Implementations report every HTTP status as a normal response; only
/// failures to talk to the server at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: &str,
    ) -> Result<ApiResponse, PipelineError>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: &str,
    ) -> Result<ApiResponse, PipelineError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .bearer_auth(access_token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        // Spotify answers some calls with an empty body.
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(ApiResponse { status, body })
    }
}

/// Extracts a readable message from a Spotify error payload.
///
/// The Web API nests it as `{"error": {"message": ..}}`, the accounts service
/// uses `{"error": .., "error_description": ..}`.
pub fn error_message(body: &Value) -> String {
    if let Some(message) = body["error"]["message"].as_str() {
        return message.to_string();
    }
    if let Some(description) = body["error_description"].as_str() {
        return description.to_string();
    }
    if let Some(error) = body["error"].as_str() {
        return error.to_string();
    }
    match body {
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => "No error message returned.".to_string(),
    }
}

/// Spotify Web API access for one session.
///
/// Every call goes through [`SpotifyApi::call`], which renews an expired
/// access token once and writes the renewed token back into the session's
/// credentials.
pub struct SpotifyApi<'a> {
    transport: &'a dyn Transport,
    auth: &'a dyn AuthProvider,
    base_url: &'a str,
    credentials: &'a mut Credentials,
}

impl<'a> SpotifyApi<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        auth: &'a dyn AuthProvider,
        base_url: &'a str,
        credentials: &'a mut Credentials,
    ) -> Self {
        SpotifyApi {
            transport,
            auth,
            base_url: base_url.trim_end_matches('/'),
            credentials,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn user_id(&self) -> &str {
        &self.credentials.user_id
    }

    /// Sends `request`, retrying it exactly once after a token refresh on 401.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::AuthExpired`] if the refresh fails or the retried
    ///   request fails with any status
    /// - [`PipelineError::Remote`] for a non-success status on the first attempt
    /// - transport errors as returned by the [`Transport`]
    pub async fn call(&mut self, request: ApiRequest) -> Result<Value, PipelineError> {
        let response = self
            .transport
            .send(&request, &self.credentials.access_token)
            .await?;

        let response = if response.status == StatusCode::UNAUTHORIZED {
            warning!(
                "Bad or expired token for {} {}: {}",
                request.method,
                request.url,
                error_message(&response.body)
            );

            let renewal = match self.auth.refresh(&self.credentials.refresh_token).await {
                Ok(renewal) => renewal,
                Err(e) => {
                    warning!(
                        "Failed to renew access token for {}: {}",
                        self.credentials.user_id,
                        e
                    );
                    return Err(PipelineError::AuthExpired);
                }
            };
            self.credentials.access_token = renewal.access_token;
            if let Some(rotated) = renewal.refresh_token {
                self.credentials.refresh_token = rotated;
            }

            let retried = self
                .transport
                .send(&request, &self.credentials.access_token)
                .await?;
            if !retried.status.is_success() {
                warning!(
                    "{} {} failed even after token refresh with status {}: {}",
                    request.method,
                    request.url,
                    retried.status.as_u16(),
                    error_message(&retried.body)
                );
                return Err(PipelineError::AuthExpired);
            }
            retried
        } else {
            response
        };

        if !response.status.is_success() {
            let message = error_message(&response.body);
            warning!(
                "{} {} failed with status {}: {}",
                request.method,
                request.url,
                response.status.as_u16(),
                message
            );
            return Err(PipelineError::Remote {
                status: response.status.as_u16(),
                message,
            });
        }

        Ok(response.body)
    }

    /// Like [`SpotifyApi::call`] but decodes the response body.
    pub async fn call_json<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
    ) -> Result<T, PipelineError> {
        let body = self.call(request).await?;
        Ok(serde_json::from_value(body)?)
    }
}
