//! # Sampling Pipeline
//!
//! Sequential orchestration of the Spotify calls behind one sampling run:
//!
//! ```text
//! sample_indices ──> resolver::resolve ──> session ──> rewriter::rewrite
//!       (utils)         (playlist pages)                (create, drain, insert)
//! ```
//!
//! Every remote call runs through [`crate::spotify::client::SpotifyApi`], so
//! the renewal policy is the same at every step. Nothing here runs in
//! parallel: each call depends on the cursor or snapshot id returned by the
//! previous one.

pub mod order;
pub mod resolver;
pub mod rewriter;

use crate::{
    error::PipelineError,
    info,
    spotify::client::SpotifyApi,
    types::{PlaylistSummary, TrackDescriptor},
    utils,
};

/// Samples up to `sample_size` tracks of `source` and resolves them.
pub async fn pick_tracks(
    api: &mut SpotifyApi<'_>,
    source: &PlaylistSummary,
    sample_size: usize,
) -> Result<Vec<TrackDescriptor>, PipelineError> {
    let k = sample_size.min(source.track_count);
    let indices = utils::sample_indices(source.track_count, k)?;
    info!(
        "Sampling {} of {} tracks from playlist {}",
        k, source.track_count, source.id
    );

    resolver::resolve(api, &source.id, indices).await
}
