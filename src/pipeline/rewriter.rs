use crate::{
    error::PipelineError,
    info,
    pipeline::order::order_tracks,
    spotify::{
        client::SpotifyApi,
        playlist::{self, MAX_TRACKS_PER_REQUEST},
    },
    success,
    types::{Destination, OrderMode, RewriteReport, TrackDescriptor},
    warning,
};

/// Replaces the contents of `destination` with `tracks`.
///
/// A new destination is created first. The playlist is then drained
/// completely and the tracks are inserted in `order`, in batches of at most
/// 100. There is no rollback: a failure after the first removal leaves the
/// playlist partially rewritten, which is logged separately from failures
/// that left it untouched.
pub async fn rewrite(
    api: &mut SpotifyApi<'_>,
    destination: &Destination,
    tracks: &[TrackDescriptor],
    order: OrderMode,
) -> Result<RewriteReport, PipelineError> {
    let (playlist_id, snapshot_id) = match destination {
        Destination::Existing {
            playlist_id,
            snapshot_id,
            ..
        } => (playlist_id.clone(), snapshot_id.clone()),
        Destination::New { name } => {
            let created = playlist::create(api, name).await?;
            success!("Created playlist {} ({})", created.name, created.id);
            let snapshot_id = created.snapshot_id.unwrap_or_default();
            (created.id, snapshot_id)
        }
    };

    let mut progress = Progress::default();
    match run(api, &playlist_id, snapshot_id, tracks, order, &mut progress).await {
        Ok(snapshot_id) => Ok(RewriteReport {
            playlist_id,
            removed: progress.removed,
            added: progress.added,
            snapshot_id,
        }),
        Err(e) => {
            if progress.mutated() {
                warning!(
                    "Playlist {} was left partially rewritten ({} removed, {} added): {}",
                    playlist_id,
                    progress.removed,
                    progress.added,
                    e
                );
            } else if e.is_auth_expired() {
                warning!("Authorization expired before playlist {} was changed", playlist_id);
            } else {
                warning!("Playlist {} was not changed: {}", playlist_id, e);
            }
            Err(e)
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    removed: usize,
    added: usize,
}

impl Progress {
    fn mutated(&self) -> bool {
        self.removed > 0 || self.added > 0
    }
}

async fn run(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    snapshot_id: String,
    tracks: &[TrackDescriptor],
    order: OrderMode,
    progress: &mut Progress,
) -> Result<String, PipelineError> {
    let existing = playlist::track_uris(api, playlist_id).await?;
    info!(
        "Removing {} tracks from playlist {}",
        existing.len(),
        playlist_id
    );
    let mut snapshot_id = drain(api, playlist_id, &existing, snapshot_id, progress).await?;

    let uris: Vec<String> = order_tracks(tracks, order)
        .into_iter()
        .map(|track| track.uri)
        .collect();
    info!("Adding {} tracks to playlist {}", uris.len(), playlist_id);

    for batch in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        if let Some(next) = playlist::add_tracks(api, playlist_id, batch).await? {
            snapshot_id = next;
        }
        progress.added += batch.len();
    }

    Ok(snapshot_id)
}

/// Removes `uris` in batches, threading each returned snapshot id into the next call.
///
/// An empty list performs no call and hands back `snapshot_id` unchanged.
pub async fn drain_tracks(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    uris: &[String],
    snapshot_id: String,
) -> Result<String, PipelineError> {
    drain(api, playlist_id, uris, snapshot_id, &mut Progress::default()).await
}

async fn drain(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    uris: &[String],
    snapshot_id: String,
    progress: &mut Progress,
) -> Result<String, PipelineError> {
    let mut snapshot_id = snapshot_id;
    for batch in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        snapshot_id = playlist::remove_tracks(api, playlist_id, batch, &snapshot_id).await?;
        progress.removed += batch.len();
    }
    Ok(snapshot_id)
}
