use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::HeaderMap,
    response::{Html, Response},
};

use crate::{
    api::{
        forms::{DestinationForm, OrderForm},
        outcome, session, views,
    },
    error::PipelineError,
    pipeline::rewriter,
    server::AppState,
    spotify,
};

/// Shows the playlists the sample can be written into.
pub async fn playlist_for_songs(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<OrderForm>, FormRejection>,
) -> Response {
    let Some(mut current) = session::load(&state, &headers).await else {
        return outcome::anonymous();
    };

    let order = match form {
        Ok(Form(form)) if current.context.has_sample() => form.order(),
        Ok(_) => {
            let e = PipelineError::input("nothing sampled yet");
            return outcome::failure(&state, current, e).await;
        }
        Err(e) => {
            let e = PipelineError::input(e.body_text());
            return outcome::failure(&state, current, e).await;
        }
    };

    let listed = {
        let mut api = state.api(&mut current.context.credentials);
        spotify::playlist::list(&mut api).await
    };

    match listed {
        Ok(playlists) => {
            current.context.destinations = playlists;
            let page = views::destinations(&current.context.destinations, order);
            current.respond(&state, Html(page)).await
        }
        Err(e) => outcome::failure(&state, current, e).await,
    }
}

pub async fn confirm_playlist_song(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<DestinationForm>, FormRejection>,
) -> Response {
    let Some(current) = session::load(&state, &headers).await else {
        return outcome::anonymous();
    };

    let chosen = form
        .map_err(|e| PipelineError::input(e.body_text()))
        .and_then(|Form(form)| {
            let destination = form.destination(&current.context)?;
            Ok((destination, form.order()))
        });

    match chosen {
        Ok((destination, order)) if current.context.has_sample() => {
            let page = views::confirm(&destination, order);
            current.respond(&state, Html(page)).await
        }
        Ok(_) => {
            let e = PipelineError::input("nothing sampled yet");
            outcome::failure(&state, current, e).await
        }
        Err(e) => outcome::failure(&state, current, e).await,
    }
}

/// Writes the sample into the confirmed destination.
///
/// The sample stays in the session afterwards, so it can be written to
/// another playlist.
pub async fn add_songs(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<DestinationForm>, FormRejection>,
) -> Response {
    let Some(mut current) = session::load(&state, &headers).await else {
        return outcome::anonymous();
    };

    let chosen = form
        .map_err(|e| PipelineError::input(e.body_text()))
        .and_then(|Form(form)| {
            let destination = form.destination(&current.context)?;
            Ok((destination, form.order()))
        });
    let (destination, order) = match chosen {
        Ok(chosen) => chosen,
        Err(e) => return outcome::failure(&state, current, e).await,
    };

    let tracks = match current.context.sampled.as_ref() {
        Some(sampled) if !sampled.tracks.is_empty() => sampled.tracks.clone(),
        _ => {
            let e = PipelineError::input("nothing sampled yet");
            return outcome::failure(&state, current, e).await;
        }
    };

    let written = {
        let mut api = state.api(&mut current.context.credentials);
        rewriter::rewrite(&mut api, &destination, &tracks, order).await
    };

    match written {
        Ok(report) => {
            // The listing is stale once a playlist was rewritten or created.
            current.context.destinations.clear();
            let page = views::done(&destination, &report);
            current.respond(&state, Html(page)).await
        }
        Err(e) => outcome::failure(&state, current, e).await,
    }
}
