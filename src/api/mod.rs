//! # API Module
//!
//! HTTP endpoints of the sampler web front end.
//!
//! ## Endpoints
//!
//! | Route                         | Handler                   |
//! |-------------------------------|---------------------------|
//! | `GET /`                       | [`index`]                 |
//! | `GET /login`                  | [`login`]                 |
//! | `GET /callback`               | [`callback`]              |
//! | `GET /logout`                 | [`logout`]                |
//! | `GET /playlist_picker`        | [`playlist_picker`]       |
//! | `POST /playlist_picked`       | [`playlist_picked`]       |
//! | `POST /playlist_for_songs`    | [`playlist_for_songs`]    |
//! | `POST /confirm_playlist_song` | [`confirm_playlist_song`] |
//! | `POST /add_songs`             | [`add_songs`]             |
//! | `GET /health`                 | [`health`]                |
//!
//! Every handler except `index`, `login`, `callback`, `logout` and `health`
//! needs a session and redirects to `/` without one. Handlers never hold the
//! session lock across a Spotify call: they check a copy of the context out
//! with [`session::load`] and write it back through
//! [`session::CurrentSession::respond`].

mod auth;
pub mod cookies;
mod destination;
pub mod forms;
mod health;
mod outcome;
mod picker;
pub mod session;
pub mod views;

pub use auth::{callback, login, logout};
pub use destination::{add_songs, confirm_playlist_song, playlist_for_songs};
pub use health::health;
pub use picker::{index, playlist_picked, playlist_picker};
