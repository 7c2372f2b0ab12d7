//! Server-rendered HTML pages. Handlers pass plain data in, nothing here talks to Spotify.

use crate::types::{
    Destination, OrderMode, PLACEHOLDER_COVER, PlaylistSummary, RewriteReport, TrackDescriptor,
};

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
li{list-style:none;margin:.4rem 0;display:flex;align-items:center;gap:.6rem}\
img{width:48px;height:48px;object-fit:cover;background:#ddd}\
.muted{color:#777}button{margin-top:1rem}";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body><h1>{title}</h1>{body}\
         <p class=\"muted\"><a href=\"/\">Start over</a> · <a href=\"/logout\">Log out</a></p>\
         </body></html>",
        title = escape(title),
        body = body,
    )
}

fn cover(url: &str) -> String {
    if url == PLACEHOLDER_COVER {
        "<img alt=\"\">".to_string()
    } else {
        format!("<img alt=\"\" src=\"{}\">", escape(url))
    }
}

fn order_select(selected: OrderMode) -> String {
    let options: String = OrderMode::ALL
        .iter()
        .map(|mode| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                mode.form_value(),
                if *mode == selected { " selected" } else { "" },
                mode.label()
            )
        })
        .collect();
    format!("<label>Order <select name=\"song_sorting\">{}</select></label>", options)
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        name,
        escape(value)
    )
}

pub fn index(sample_size: usize) -> String {
    layout(
        "Playlist Sampler",
        &format!(
            "<p>Pick one of your Spotify playlists and get {} random tracks from it \
             written into a playlist of your choice.</p>\
             <p><a href=\"/login\">Log in with Spotify</a></p>",
            sample_size
        ),
    )
}

pub fn playlist_picker(playlists: &[PlaylistSummary], sample_size: usize) -> String {
    if playlists.is_empty() {
        return layout(
            "Pick a playlist",
            "<p>You have no playlists with tracks in them.</p>",
        );
    }

    let items: String = playlists
        .iter()
        .map(|p| {
            format!(
                "<li><input type=\"radio\" name=\"playlist_id\" id=\"src-{id}\" value=\"{id}\" required>\
                 {cover}<label for=\"src-{id}\">{name} <span class=\"muted\">({count} tracks)</span></label></li>",
                id = escape(&p.id),
                cover = cover(&p.cover_image_url),
                name = escape(&p.display_name),
                count = p.track_count,
            )
        })
        .collect();

    layout(
        "Pick a playlist",
        &format!(
            "<p>Up to {} tracks will be sampled from the playlist you choose.</p>\
             <form method=\"post\" action=\"/playlist_picked\"><ul>{}</ul>\
             <button type=\"submit\">Sample tracks</button></form>",
            sample_size, items
        ),
    )
}

fn track_list(tracks: &[TrackDescriptor]) -> String {
    tracks
        .iter()
        .map(|t| {
            format!(
                "<li>{}<span>{} <span class=\"muted\">{}</span></span></li>",
                cover(&t.cover_image_url),
                escape(&t.display_name),
                escape(&t.artists_display())
            )
        })
        .collect()
}

pub fn sampled(source: &PlaylistSummary, tracks: &[TrackDescriptor]) -> String {
    layout(
        "Your sample",
        &format!(
            "<p>{} tracks from <strong>{}</strong>.</p><ul>{}</ul>\
             <form method=\"post\" action=\"/playlist_for_songs\">{}\
             <button type=\"submit\">Choose a destination</button></form>\
             <form method=\"post\" action=\"/playlist_picked\">{}\
             <button type=\"submit\">Sample again</button></form>",
            tracks.len(),
            escape(&source.display_name),
            track_list(tracks),
            order_select(OrderMode::Insertion),
            hidden("playlist_id", &source.id),
        ),
    )
}

pub fn destinations(playlists: &[PlaylistSummary], order: OrderMode) -> String {
    let items: String = playlists
        .iter()
        .map(|p| {
            format!(
                "<li><input type=\"radio\" name=\"playlist_id\" id=\"dst-{id}\" value=\"{id}\">\
                 {cover}<label for=\"dst-{id}\">{name} <span class=\"muted\">({count} tracks)</span></label></li>",
                id = escape(&p.id),
                cover = cover(&p.cover_image_url),
                name = escape(&p.display_name),
                count = p.track_count,
            )
        })
        .collect();

    layout(
        "Where should the tracks go?",
        &format!(
            "<p>The chosen playlist is emptied before the sample is added.</p>\
             <form method=\"post\" action=\"/confirm_playlist_song\">{}<ul>{}</ul>\
             <label>Or create a new playlist <input type=\"text\" name=\"new_playlist_name\" maxlength=\"100\"></label>\
             <br><button type=\"submit\">Continue</button></form>",
            hidden("song_sorting", order.form_value()),
            items
        ),
    )
}

pub fn confirm(destination: &Destination, order: OrderMode) -> String {
    let (target, fields) = match destination {
        Destination::Existing {
            playlist_id, name, ..
        } => (
            format!(
                "All tracks in <strong>{}</strong> will be replaced by your sample.",
                escape(name)
            ),
            hidden("playlist_id", playlist_id),
        ),
        Destination::New { name } => (
            format!(
                "A new private playlist <strong>{}</strong> will be created.",
                escape(name)
            ),
            hidden("playlist_name", name),
        ),
    };

    layout(
        "Confirm",
        &format!(
            "<p>{}</p><p class=\"muted\">Order: {}</p>\
             <form method=\"post\" action=\"/add_songs\">{}{}\
             <button type=\"submit\">Write playlist</button></form>",
            target,
            order.label(),
            fields,
            hidden("song_sorting", order.form_value())
        ),
    )
}

pub fn done(destination: &Destination, report: &RewriteReport) -> String {
    layout(
        "Done",
        &format!(
            "<p><strong>{}</strong> now holds {} sampled tracks ({} removed).</p>",
            escape(destination.name()),
            report.added,
            report.removed
        ),
    )
}

pub fn failure() -> String {
    layout(
        "Something went wrong",
        "<p>Spotify did not accept one of our requests. Please try again.</p>",
    )
}
