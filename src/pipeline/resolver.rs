use std::collections::VecDeque;

use crate::{
    error::PipelineError,
    spotify::{client::SpotifyApi, pages, playlist},
    types::{PlaylistTrackItem, TrackDescriptor},
    warning,
};

/// Number of items Spotify returns per playlist-items page.
pub const PAGE_SIZE: usize = 100;

/// Sampled indices still to be resolved, expressed relative to the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveState {
    remaining: VecDeque<usize>,
    page_size: usize,
}

impl ResolveState {
    /// `indices` must be strictly increasing, as produced by the sampler.
    pub fn new(indices: Vec<usize>) -> Self {
        Self::with_page_size(indices, PAGE_SIZE)
    }

    pub fn with_page_size(indices: Vec<usize>, page_size: usize) -> Self {
        ResolveState {
            remaining: indices.into(),
            page_size,
        }
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn remaining(&self) -> &VecDeque<usize> {
        &self.remaining
    }

    /// Consumes the indices that fall into `items` and returns the state for the next page.
    ///
    /// Indices below the page size are looked up in `items`; every index left
    /// over is shifted down by one page.
    pub fn take_page(
        self,
        items: &[Option<PlaylistTrackItem>],
    ) -> (Vec<TrackDescriptor>, ResolveState) {
        let ResolveState {
            mut remaining,
            page_size,
        } = self;
        let mut picked = Vec::new();

        while let Some(&local) = remaining.front() {
            if local >= page_size {
                break;
            }
            remaining.pop_front();

            match items.get(local).cloned().flatten().and_then(|item| item.track) {
                Some(track) => picked.push(TrackDescriptor::from(track)),
                None => warning!("No track data at page offset {}, skipping it", local),
            }
        }

        for index in remaining.iter_mut() {
            *index -= page_size;
        }

        (
            picked,
            ResolveState {
                remaining,
                page_size,
            },
        )
    }
}

/// Resolves sorted sample indices of a playlist into track descriptors.
///
/// Pages are fetched only until every index is resolved, so a sample that
/// ends early in the playlist never touches its later pages. The output is in
/// index order.
pub async fn resolve(
    api: &mut SpotifyApi<'_>,
    playlist_id: &str,
    indices: Vec<usize>,
) -> Result<Vec<TrackDescriptor>, PipelineError> {
    let mut state = ResolveState::new(indices);
    let mut cursor = playlist::items_cursor(api, playlist_id);
    let mut tracks = Vec::new();

    while !state.is_done() {
        let Some((page, next)) = pages::fetch_page::<PlaylistTrackItem>(api, &cursor).await? else {
            break;
        };

        let (picked, after) = state.take_page(&page.items);
        tracks.extend(picked);
        state = after;
        cursor = next;
    }

    if !state.is_done() {
        warning!(
            "Playlist {} ended before {} sampled positions were reached",
            playlist_id,
            state.remaining().len()
        );
    }

    Ok(tracks)
}
