use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::{
    config::Settings,
    error::PipelineError,
    spotify::client::error_message,
    types::{CurrentUser, Grant, Renewal, TokenResponse},
};

/// Obtains and renews Spotify credentials.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchanges an authorization code for tokens and the identity they belong to.
    async fn exchange(&self, code: &str) -> Result<Grant, PipelineError>;

    /// Derives a new access token from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<Renewal, PipelineError>;
}

/// Builds the URL the browser is sent to for authorization.
///
/// The `state` value is echoed back to the callback and has to match the one
/// stored in the login cookie.
///
/// # Errors
///
/// Fails with [`PipelineError::Input`] when the configured authorization URL
/// cannot be parsed.
pub fn authorize_url(settings: &Settings, state: &str) -> Result<String, PipelineError> {
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("state", state),
            ("scope", settings.scope.as_str()),
        ],
    )
    .map_err(|e| PipelineError::input(format!("invalid authorization url: {}", e)))?;

    Ok(url.to_string())
}

/// Authorization-code flow against the Spotify accounts service.
///
/// Uses the client secret (HTTP basic auth on the token endpoint), so it is
/// only suitable for a server side deployment.
#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    api_url: String,
}

impl SpotifyAuth {
    pub fn new(client: Client, settings: &Settings) -> Self {
        SpotifyAuth {
            client,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            token_url: settings.token_url.clone(),
            api_url: settings.api_url.clone(),
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, PipelineError> {
        let res = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = res.status();
        let json: Value = res.json().await.unwrap_or(Value::Null);

        if status != StatusCode::OK || !json["error"].is_null() {
            return Err(PipelineError::Remote {
                status: status.as_u16(),
                message: error_message(&json),
            });
        }

        Ok(serde_json::from_value(json)?)
    }

    async fn current_user(&self, access_token: &str) -> Result<CurrentUser, PipelineError> {
        let res = self
            .client
            .get(format!("{}/me", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = res.status();
        let json: Value = res.json().await.unwrap_or(Value::Null);
        if status != StatusCode::OK {
            return Err(PipelineError::Remote {
                status: status.as_u16(),
                message: error_message(&json),
            });
        }

        Ok(serde_json::from_value(json)?)
    }
}

#[async_trait]
impl AuthProvider for SpotifyAuth {
    async fn exchange(&self, code: &str) -> Result<Grant, PipelineError> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;

        let refresh_token = token.refresh_token.ok_or_else(|| PipelineError::Remote {
            status: StatusCode::OK.as_u16(),
            message: "token response without refresh token".to_string(),
        })?;

        let user = self.current_user(&token.access_token).await?;

        Ok(Grant {
            access_token: token.access_token,
            refresh_token,
            user_id: user.id,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Renewal, PipelineError> {
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        Ok(Renewal {
            access_token: token.access_token,
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}
