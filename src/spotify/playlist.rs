use crate::{
    error::PipelineError,
    spotify::{
        client::{ApiRequest, SpotifyApi},
        pages::{self, PageCursor},
    },
    types::{
        AddTrackToPlaylistRequest, CreatePlaylistRequest, CreatePlaylistResponse,
        PlaylistSummary, PlaylistTrackItem, RemoveTracksRequest, SimplifiedPlaylist,
        SnapshotResponse, TrackUri,
    },
};

/// Spotify's limit for the number of items in one add or remove call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Lists every playlist of the current user, skipping null entries.
pub async fn list(api: &mut SpotifyApi<'_>) -> Result<Vec<PlaylistSummary>, PipelineError> {
    let cursor = PageCursor::start(api.url("/me/playlists?limit=50&offset=0"));
    let pages = pages::fetch_all::<SimplifiedPlaylist, _>(api, cursor, |_| false).await?;

    Ok(pages
        .into_iter()
        .flat_map(|page| page.items)
        .flatten()
        .map(PlaylistSummary::from)
        .collect())
}

/// First cursor over a playlist's items. The first page comes wrapped in the playlist object.
pub fn items_cursor(api: &SpotifyApi<'_>, playlist_id: &str) -> PageCursor {
    PageCursor::wrapped(api.url(&format!("/playlists/{}", playlist_id)), "tracks")
}

/// Collects the URIs of all tracks currently in the playlist, in playlist order.
pub async fn track_uris(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
) -> Result<Vec<String>, PipelineError> {
    let cursor = items_cursor(api, playlist_id);
    let pages = pages::fetch_all::<PlaylistTrackItem, _>(api, cursor, |_| false).await?;

    Ok(pages
        .into_iter()
        .flat_map(|page| page.items)
        .flatten()
        .filter_map(|item| item.track)
        .map(|track| track.uri)
        .collect())
}

/// Creates a private playlist for the current user.
pub async fn create(
    api: &mut SpotifyApi<'_>,
    name: &str,
) -> Result<CreatePlaylistResponse, PipelineError> {
    let url = api.url(&format!("/users/{}/playlists", api.user_id()));
    let body = serde_json::to_value(CreatePlaylistRequest {
        name: name.to_string(),
        description: "Custom playlist".to_string(),
        public: false,
    })?;

    api.call_json(ApiRequest::post(url, body)).await
}

/// Removes one batch of tracks, returning the playlist's new snapshot id.
///
/// `snapshot_id` has to be the latest one Spotify handed out for this
/// playlist, otherwise the call is rejected.
pub async fn remove_tracks(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    uris: &[String],
    snapshot_id: &str,
) -> Result<String, PipelineError> {
    if uris.len() > MAX_TRACKS_PER_REQUEST {
        return Err(PipelineError::input(format!(
            "at most {} tracks can be removed at once",
            MAX_TRACKS_PER_REQUEST
        )));
    }

    let url = api.url(&format!("/playlists/{}/tracks", playlist_id));
    let body = serde_json::to_value(RemoveTracksRequest {
        tracks: uris.iter().map(|uri| TrackUri { uri: uri.clone() }).collect(),
        snapshot_id: snapshot_id.to_string(),
    })?;

    let res: SnapshotResponse = api.call_json(ApiRequest::delete(url, body)).await?;
    Ok(res.snapshot_id)
}

/// Appends one batch of tracks to the end of the playlist.
pub async fn add_tracks(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    uris: &[String],
) -> Result<Option<String>, PipelineError> {
    if uris.len() > MAX_TRACKS_PER_REQUEST {
        return Err(PipelineError::input(format!(
            "at most {} tracks can be added at once",
            MAX_TRACKS_PER_REQUEST
        )));
    }

    let url = api.url(&format!("/playlists/{}/tracks", playlist_id));
    let body = serde_json::to_value(AddTrackToPlaylistRequest {
        uris: uris.to_vec(),
    })?;

    let res = api.call(ApiRequest::post(url, body)).await?;
    Ok(res["snapshot_id"].as_str().map(str::to_string))
}

