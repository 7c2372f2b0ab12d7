use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    api::{session::CurrentSession, views},
    error::PipelineError,
    server::AppState,
    warning,
};

/// Turns a failed pipeline step into a page or redirect.
///
/// - input errors go back to the start without touching Spotify
/// - an expired authorization ends the session
/// - everything else shows a generic failure page
pub async fn failure(state: &AppState, session: CurrentSession, error: PipelineError) -> Response {
    match error {
        PipelineError::Input(reason) => {
            warning!("Rejected input from {}: {}", session.context.user_id(), reason);
            session.respond(state, Redirect::to("/")).await
        }
        PipelineError::AuthExpired => {
            warning!(
                "Authorization of {} expired, ending the session",
                session.context.user_id()
            );
            state.sessions.evict(&session.key).await;
            Redirect::to("/logout").into_response()
        }
        other => {
            warning!("Request of {} failed: {}", session.context.user_id(), other);
            session
                .respond(state, (StatusCode::BAD_GATEWAY, Html(views::failure())))
                .await
        }
    }
}

/// Redirect for requests that need a session but have none.
pub fn anonymous() -> Response {
    Redirect::to("/").into_response()
}
