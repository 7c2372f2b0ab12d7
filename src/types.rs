use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Cover shown when Spotify has no image for a playlist or album.
pub const PLACEHOLDER_COVER: &str = "no_img";

/// Shown in place of an artist entry Spotify did not return.
pub const PLACEHOLDER_ARTIST: &str = "-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

/// Result of a successful authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

/// A renewed access token. Spotify may rotate the refresh token along with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksRef {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    pub tracks: TracksRef,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub artists: Option<Vec<Option<ArtistObject>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumObject {
    #[serde(default)]
    pub images: Option<Vec<Image>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistObject {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

/// A playlist as shown in the pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub display_name: String,
    pub cover_image_url: String,
    pub track_count: usize,
    pub snapshot_id: String,
}

impl From<SimplifiedPlaylist> for PlaylistSummary {
    fn from(playlist: SimplifiedPlaylist) -> Self {
        PlaylistSummary {
            id: playlist.id,
            display_name: playlist.name,
            cover_image_url: last_image(playlist.images),
            track_count: playlist.tracks.total as usize,
            snapshot_id: playlist.snapshot_id,
        }
    }
}

/// A sampled track, held in the session until it is written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub id: String,
    pub uri: String,
    pub display_name: String,
    pub artist_names: Vec<String>,
    pub cover_image_url: String,
}

impl TrackDescriptor {
    pub fn artists_display(&self) -> String {
        self.artist_names.join(", ")
    }
}

impl From<TrackObject> for TrackDescriptor {
    fn from(track: TrackObject) -> Self {
        let artist_names = match track.artists {
            Some(artists) => artists
                .into_iter()
                .map(|a| {
                    a.and_then(|a| a.name)
                        .unwrap_or_else(|| PLACEHOLDER_ARTIST.to_string())
                })
                .collect(),
            None => vec![PLACEHOLDER_ARTIST.to_string()],
        };

        TrackDescriptor {
            id: track.id.unwrap_or_default(),
            uri: track.uri,
            display_name: track.name,
            artist_names,
            cover_image_url: last_image(track.album.and_then(|a| a.images)),
        }
    }
}

// Spotify orders images largest first; the last one is the thumbnail.
fn last_image(images: Option<Vec<Image>>) -> String {
    images
        .and_then(|mut images| images.pop())
        .map(|image| image.url)
        .unwrap_or_else(|| PLACEHOLDER_COVER.to_string())
}

/// How sampled tracks are arranged in the destination playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Insertion,
    NameAscending,
    NameDescending,
    Shuffle,
}

impl OrderMode {
    pub const ALL: [OrderMode; 4] = [
        OrderMode::Insertion,
        OrderMode::NameAscending,
        OrderMode::NameDescending,
        OrderMode::Shuffle,
    ];

    /// Value used in html forms.
    pub fn form_value(&self) -> &'static str {
        match self {
            OrderMode::Insertion => "no_sort",
            OrderMode::NameAscending => "song_name_asc",
            OrderMode::NameDescending => "song_name_desc",
            OrderMode::Shuffle => "random",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderMode::Insertion => "As sampled",
            OrderMode::NameAscending => "Name (A-Z)",
            OrderMode::NameDescending => "Name (Z-A)",
            OrderMode::Shuffle => "Shuffled",
        }
    }

    /// Lenient parse for optional form fields, unknown values fall back to insertion order.
    pub fn from_form(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderMode::ALL
            .into_iter()
            .find(|mode| mode.form_value() == s)
            .ok_or_else(|| format!("unknown order mode: {}", s))
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.form_value())
    }
}

/// Where the sampled tracks are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Existing {
        playlist_id: String,
        name: String,
        snapshot_id: String,
    },
    New {
        name: String,
    },
}

impl Destination {
    pub fn name(&self) -> &str {
        match self {
            Destination::Existing { name, .. } => name,
            Destination::New { name } => name,
        }
    }
}

/// Outcome of a completed playlist rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub playlist_id: String,
    pub removed: usize,
    pub added: usize,
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct CredentialTableRow {
    pub user: String,
    pub updated: String,
}
