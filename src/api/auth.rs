use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    api::{cookies, forms::CallbackParams, session, views},
    management::{Credentials, SessionContext},
    server::AppState,
    spotify::auth::authorize_url,
    success, utils, warning,
};

const AUTH_STATE_LEN: usize = 16;

pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(current) = session::load(&state, &headers).await {
        return current
            .respond(&state, Redirect::to("/playlist_picker"))
            .await;
    }

    let auth_state = utils::generate_token(AUTH_STATE_LEN);
    match authorize_url(&state.settings, &auth_state) {
        Ok(url) => cookies::attach(
            Redirect::to(&url).into_response(),
            &[cookies::auth_state(&auth_state)],
        ),
        Err(e) => {
            warning!("Cannot build authorization url: {}", e);
            Html(views::failure()).into_response()
        }
    }
}

/// Completes the authorization-code flow.
///
/// Any failure ends at `/logout`, which clears whatever half-made state the
/// browser holds.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let stored_state = cookies::read(&headers, cookies::AUTH_STATE_COOKIE);
    let state_matches = match (&params.state, &stored_state) {
        (Some(received), Some(stored)) => utils::constant_time_eq(received, stored),
        _ => false,
    };
    if !state_matches {
        warning!(
            "Authorization state mismatch, error: {:?}",
            params.error.as_deref().unwrap_or("none")
        );
        return Redirect::to("/logout").into_response();
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        warning!(
            "Authorization was not granted: {}",
            params.error.as_deref().unwrap_or("no code returned")
        );
        return Redirect::to("/logout").into_response();
    };

    let grant = match state.auth.exchange(code).await {
        Ok(grant) => grant,
        Err(e) => {
            warning!("Failed to receive token: {}", e);
            return Redirect::to("/logout").into_response();
        }
    };

    if let Err(e) = state.store.save(&grant.user_id, &grant.refresh_token).await {
        warning!("Failed to store credentials of {}: {}", grant.user_id, e);
        return Redirect::to("/logout").into_response();
    }

    let remember = cookies::remember(&grant.user_id, &grant.refresh_token);
    let user_id = grant.user_id.clone();
    let key = state
        .sessions
        .create(SessionContext::new(Credentials {
            user_id: grant.user_id,
            refresh_token: grant.refresh_token,
            access_token: grant.access_token,
        }))
        .await;
    success!("Logged in {}", user_id);

    cookies::attach(
        Redirect::to("/playlist_picker").into_response(),
        &[
            cookies::session(&key),
            remember,
            cookies::clear(cookies::AUTH_STATE_COOKIE),
        ],
    )
}

/// Ends the session and forgets the stored refresh token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut user_id = None;

    if let Some(key) = cookies::read(&headers, cookies::SESSION_COOKIE) {
        if let Some(context) = state.sessions.evict(&key).await {
            user_id = Some(context.credentials.user_id);
        }
    }
    if user_id.is_none() {
        user_id = session::remembered_user(&state, &headers)
            .await
            .map(|(user_id, _)| user_id);
    }

    if let Some(user_id) = user_id {
        match state.store.remove(&user_id).await {
            Ok(_) => success!("Logged out {}", user_id),
            Err(e) => warning!("Failed to remove stored credentials of {}: {}", user_id, e),
        }
    }

    cookies::attach(
        Redirect::to("/").into_response(),
        &[
            cookies::clear(cookies::SESSION_COOKIE),
            cookies::clear(cookies::REMEMBER_COOKIE),
            cookies::clear(cookies::AUTH_STATE_COOKIE),
        ],
    )
}
