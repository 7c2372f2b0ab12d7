use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::{
    api::cookies,
    info,
    management::{Credentials, SessionContext},
    server::AppState,
    utils, warning,
};

/// The session a request runs in, checked out of the [`crate::management::SessionManager`].
pub struct CurrentSession {
    pub key: String,
    pub context: SessionContext,
    /// Set when the session was rebuilt from the remember cookie during this request.
    pub issued: bool,
    /// Refresh token as it is stored for the user.
    persisted_refresh: String,
}

impl CurrentSession {
    /// Writes the context back and wraps `response`, issuing the session
    /// cookie if this request created the session.
    ///
    /// A refresh token rotated by Spotify during the request is stored and
    /// the remember cookie is reissued for it.
    pub async fn respond(self, state: &AppState, response: impl IntoResponse) -> Response {
        let CurrentSession {
            key,
            context,
            issued,
            persisted_refresh,
        } = self;

        let mut set = Vec::new();
        if issued {
            set.push(cookies::session(&key));
        }
        let credentials = &context.credentials;
        if credentials.refresh_token != persisted_refresh {
            match state
                .store
                .save(&credentials.user_id, &credentials.refresh_token)
                .await
            {
                Ok(()) => {
                    info!("Stored rotated refresh token of {}", credentials.user_id);
                    set.push(cookies::remember(
                        &credentials.user_id,
                        &credentials.refresh_token,
                    ));
                }
                Err(e) => warning!(
                    "Failed to store rotated refresh token of {}: {}",
                    credentials.user_id,
                    e
                ),
            }
        }
        state.sessions.put(&key, context).await;

        cookies::attach(response.into_response(), &set)
    }
}

/// Finds the session of the request.
///
/// A known session cookie wins. Otherwise a valid remember cookie rebuilds
/// the session from the stored refresh token; a refresh token that no longer
/// works is dropped from the store.
pub async fn load(state: &AppState, headers: &HeaderMap) -> Option<CurrentSession> {
    if let Some(key) = cookies::read(headers, cookies::SESSION_COOKIE) {
        if let Some(context) = state.sessions.get(&key).await {
            return Some(CurrentSession {
                key,
                persisted_refresh: context.credentials.refresh_token.clone(),
                context,
                issued: false,
            });
        }
    }

    let (user_id, refresh_token) = remembered_user(state, headers).await?;

    let renewal = match state.auth.refresh(&refresh_token).await {
        Ok(renewal) => renewal,
        Err(e) => {
            warning!("Could not restore session of {}: {}", user_id, e);
            if let Err(e) = state.store.remove(&user_id).await {
                warning!("Failed to drop stored credentials of {}: {}", user_id, e);
            }
            return None;
        }
    };

    let context = SessionContext::new(Credentials {
        user_id: user_id.clone(),
        refresh_token: renewal.refresh_token.unwrap_or_else(|| refresh_token.clone()),
        access_token: renewal.access_token,
    });
    let key = state.sessions.create(context.clone()).await;
    info!("Restored session of {}", user_id);

    Some(CurrentSession {
        key,
        context,
        issued: true,
        persisted_refresh: refresh_token,
    })
}

/// The user named by a remember cookie, with their stored refresh token.
///
/// Only returned when the cookie's digest matches the stored token.
pub async fn remembered_user(state: &AppState, headers: &HeaderMap) -> Option<(String, String)> {
    let value = cookies::read(headers, cookies::REMEMBER_COOKIE)?;
    let (user_id, digest) = cookies::parse_remember(&value)?;

    let refresh_token = match state.store.load(&user_id).await {
        Ok(Some(token)) => token,
        Ok(None) => return None,
        Err(e) => {
            warning!("Failed to load stored credentials of {}: {}", user_id, e);
            return None;
        }
    };

    if !utils::constant_time_eq(&digest, &utils::credential_digest(&refresh_token)) {
        return None;
    }

    Some((user_id, refresh_token))
}
