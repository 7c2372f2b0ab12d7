//! # Spotify Integration Module
//!
//! This module is the integration layer between the playlist sampler and the
//! Spotify Web API. It handles the authorization-code flow, HTTP transport,
//! token renewal, pagination and the playlist endpoints the sampler needs.
//!
//! ## Architecture
//!
//! ```text
//! Web handlers / Pipeline
//!          ↓
//! SpotifyApi (per session, renews tokens)
//!     ├── pages    (cursor pagination)
//!     └── playlist (list, create, add, remove)
//!          ↓
//! Transport (reqwest) ── AuthProvider (accounts service)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - [`auth::AuthProvider`] seam and the [`auth::SpotifyAuth`]
//!   client for code exchange and token refresh
//! - [`client`] - [`client::Transport`] seam, the reqwest transport and
//!   [`client::SpotifyApi`], which applies the renewal policy to every call
//! - [`pages`] - explicit page cursors and page walking
//! - [`playlist`] - playlist endpoints
//!
//! ## Token Renewal
//!
//! Every remote call is sent with the session's cached access token. A 401
//! triggers exactly one refresh followed by exactly one retry of the same
//! request. A failed refresh or a second 401 is reported as
//! [`crate::error::PipelineError::AuthExpired`], which ends the session. Any
//! other non-success status aborts the current step with
//! [`crate::error::PipelineError::Remote`].
//!
//! ## API Coverage
//!
//! - `GET /me` - identity of the logged in user
//! - `GET /me/playlists` - the user's playlists
//! - `GET /playlists/{playlist_id}` - playlist with its first page of items
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - add up to 100 tracks
//! - `DELETE /playlists/{playlist_id}/tracks` - remove up to 100 tracks
//! - `POST /api/token` - code exchange and token refresh

pub mod auth;
pub mod client;
pub mod pages;
pub mod playlist;
