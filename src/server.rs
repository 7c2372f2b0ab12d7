use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{
    Res, api,
    config::Settings,
    info,
    management::{CredentialStore, Credentials, SessionManager},
    spotify::{auth::AuthProvider, client::SpotifyApi, client::Transport},
};

/// Shared state of all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub transport: Arc<dyn Transport>,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: Arc<SessionManager>,
    pub store: CredentialStore,
}

impl AppState {
    pub fn new(
        settings: Settings,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
        store: CredentialStore,
    ) -> Self {
        AppState {
            settings: Arc::new(settings),
            transport,
            auth,
            sessions: Arc::new(SessionManager::new()),
            store,
        }
    }

    /// A Spotify client acting with, and renewing, `credentials`.
    pub fn api<'a>(&'a self, credentials: &'a mut Credentials) -> SpotifyApi<'a> {
        SpotifyApi::new(
            self.transport.as_ref(),
            self.auth.as_ref(),
            &self.settings.api_url,
            credentials,
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/playlist_picker", get(api::playlist_picker))
        .route("/playlist_picked", post(api::playlist_picked))
        .route("/playlist_for_songs", post(api::playlist_for_songs))
        .route("/confirm_playlist_song", post(api::confirm_playlist_song))
        .route("/add_songs", post(api::add_songs))
        .route("/health", get(api::health))
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
