use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    api::{forms::PickForm, forms::non_blank, outcome, session, views},
    error::PipelineError,
    management::SampledTracks,
    pipeline,
    server::AppState,
    spotify,
};

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session::load(&state, &headers).await {
        Some(current) => {
            current
                .respond(&state, Redirect::to("/playlist_picker"))
                .await
        }
        None => Html(views::index(state.settings.sample_size)).into_response(),
    }
}

/// Lists the source playlists that have at least one track.
pub async fn playlist_picker(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(mut current) = session::load(&state, &headers).await else {
        return outcome::anonymous();
    };

    let listed = {
        let mut api = state.api(&mut current.context.credentials);
        spotify::playlist::list(&mut api).await
    };

    match listed {
        Ok(playlists) => {
            current.context.sources = playlists
                .into_iter()
                .filter(|p| p.track_count > 0)
                .collect();
            let page = views::playlist_picker(&current.context.sources, state.settings.sample_size);
            current.respond(&state, Html(page)).await
        }
        Err(e) => outcome::failure(&state, current, e).await,
    }
}

/// Samples and resolves tracks of the chosen source playlist.
pub async fn playlist_picked(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<PickForm>, FormRejection>,
) -> Response {
    let Some(mut current) = session::load(&state, &headers).await else {
        return outcome::anonymous();
    };

    let source = match form
        .map_err(|e| PipelineError::input(e.body_text()))
        .and_then(|Form(form)| {
            let id = non_blank(form.playlist_id.as_deref())
                .ok_or_else(|| PipelineError::input("no playlist chosen"))?;
            current
                .context
                .source(id)
                .cloned()
                .ok_or_else(|| PipelineError::input(format!("unknown playlist {}", id)))
        }) {
        Ok(source) => source,
        Err(e) => return outcome::failure(&state, current, e).await,
    };

    let picked = {
        let mut api = state.api(&mut current.context.credentials);
        pipeline::pick_tracks(&mut api, &source, state.settings.sample_size).await
    };

    match picked {
        Ok(tracks) => {
            let page = views::sampled(&source, &tracks);
            current.context.sampled = Some(SampledTracks {
                source_playlist_id: source.id.clone(),
                tracks,
            });
            current.respond(&state, Html(page)).await
        }
        Err(e) => outcome::failure(&state, current, e).await,
    }
}
