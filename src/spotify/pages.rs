use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::PipelineError,
    spotify::client::{ApiRequest, SpotifyApi},
    types::Paging,
};

/// Position in a cursor-paginated Spotify collection.
///
/// Some endpoints wrap their first page in a parent object (`GET
/// /playlists/{id}` returns the playlist with its first page of items under
/// `tracks`), while the `next` links point at bare pages. The `wrapper` key is
/// applied to the first response only, whatever the response looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Start {
        url: String,
        wrapper: Option<&'static str>,
    },
    Next(String),
    Done,
}

impl PageCursor {
    pub fn start(url: impl Into<String>) -> Self {
        PageCursor::Start {
            url: url.into(),
            wrapper: None,
        }
    }

    pub fn wrapped(url: impl Into<String>, wrapper: &'static str) -> Self {
        PageCursor::Start {
            url: url.into(),
            wrapper: Some(wrapper),
        }
    }

    fn after(next: Option<String>) -> Self {
        match next {
            Some(url) => PageCursor::Next(url),
            None => PageCursor::Done,
        }
    }
}

/// Fetches the page at `cursor`.
///
/// Returns `None` once the cursor is done, otherwise the page together with
/// the cursor pointing at the page after it.
///
/// # Errors
///
/// Propagates the errors of [`SpotifyApi::call`]; a first page without the
/// expected wrapper key is a decode error.
pub async fn fetch_page<T: DeserializeOwned>(
    api: &mut SpotifyApi<'_>,
    cursor: &PageCursor,
) -> Result<Option<(Paging<T>, PageCursor)>, PipelineError> {
    let (url, wrapper) = match cursor {
        PageCursor::Start { url, wrapper } => (url, *wrapper),
        PageCursor::Next(url) => (url, None),
        PageCursor::Done => return Ok(None),
    };

    let mut body = api.call(ApiRequest::get(url.as_str())).await?;
    let body = match wrapper {
        Some(key) => body
            .get_mut(key)
            .map(Value::take)
            .unwrap_or(Value::Null),
        None => body,
    };

    let page: Paging<T> = serde_json::from_value(body)?;
    let next = PageCursor::after(page.next.clone());
    Ok(Some((page, next)))
}

/// Walks every page from `cursor` on, or until `stop` returns true for the
/// page just fetched.
///
/// Nothing is returned when any page fails; callers that need the pages
/// fetched before a failure drive [`fetch_page`] themselves.
pub async fn fetch_all<T, F>(
    api: &mut SpotifyApi<'_>,
    cursor: PageCursor,
    mut stop: F,
) -> Result<Vec<Paging<T>>, PipelineError>
where
    T: DeserializeOwned,
    F: FnMut(&Paging<T>) -> bool,
{
    let mut pages = Vec::new();
    let mut cursor = cursor;

    while let Some((page, next)) = fetch_page(api, &cursor).await? {
        let done = stop(&page);
        pages.push(page);
        if done {
            break;
        }
        cursor = next;
    }

    Ok(pages)
}
