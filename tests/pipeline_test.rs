mod common;

use std::collections::BTreeSet;

use reqwest::{Method, StatusCode};

use common::{FRESH_TOKEN, FakeAuth, ROTATED_REFRESH, FakeSpotify, api, credentials, named, tracks};
use spotsample::{
    error::PipelineError,
    pipeline::{self, order::order_tracks, resolver, rewriter},
    spotify::playlist,
    types::{Destination, OrderMode, PlaylistSummary, TrackDescriptor},
};

fn summary(id: &str, track_count: usize) -> PlaylistSummary {
    PlaylistSummary {
        id: id.to_string(),
        display_name: id.to_string(),
        cover_image_url: "no_img".to_string(),
        track_count,
        snapshot_id: "snap-1".to_string(),
    }
}

fn existing(id: &str) -> Destination {
    Destination::Existing {
        playlist_id: id.to_string(),
        name: id.to_string(),
        snapshot_id: "snap-1".to_string(),
    }
}

fn page_fetches(spotify: &FakeSpotify, id: &str) -> usize {
    spotify.count(Method::GET, &format!("/playlists/{}", id))
        + spotify.count(Method::GET, &format!("/playlists/{}/tracks", id))
}

#[tokio::test]
async fn test_resolve_returns_tracks_in_index_order() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 250));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let resolved = resolver::resolve(&mut api, "src", vec![0, 5, 120, 249]).await.unwrap();

    let names: Vec<&str> = resolved.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["src 000", "src 005", "src 120", "src 249"]);
    assert_eq!(resolved[2].uri, "spotify:track:src120");
    assert_eq!(resolved[2].artist_names, vec!["Artist of src 120".to_string()]);
    assert_eq!(resolved[2].cover_image_url, "https://img.test/src120-64.jpg");
    assert_eq!(page_fetches(&spotify, "src"), 3);
}

#[tokio::test]
async fn test_resolve_fetches_only_needed_pages() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 350));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let resolved = resolver::resolve(&mut api, "src", vec![3, 99, 100, 250, 349])
        .await
        .unwrap();

    assert_eq!(resolved.len(), 5);
    assert_eq!(resolved[4].display_name, "src 349");
    assert_eq!(page_fetches(&spotify, "src"), 4);
}

#[tokio::test]
async fn test_resolve_stops_after_last_needed_page() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 350));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let resolved = resolver::resolve(&mut api, "src", vec![3, 50]).await.unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(spotify.log().len(), 1);
}

#[tokio::test]
async fn test_resolve_skips_slots_without_track() {
    let mut slots = tracks("src", 3);
    slots[1] = None;
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", slots);
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let resolved = resolver::resolve(&mut api, "src", vec![0, 1, 2]).await.unwrap();

    let ids: Vec<&str> = resolved.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["src0", "src2"]);
}

#[tokio::test]
async fn test_expired_token_is_renewed_once_mid_pagination() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 300));
    spotify.expire_token_after(1);
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");

    let resolved = {
        let mut api = api(&spotify, &auth, &mut creds);
        resolver::resolve(&mut api, "src", vec![10, 150, 250]).await.unwrap()
    };

    assert_eq!(resolved.len(), 3);
    assert_eq!(auth.refreshes(), 1);
    assert_eq!(creds.access_token, FRESH_TOKEN);

    assert_eq!(spotify.count(Method::GET, "/playlists/src"), 1);
    assert_eq!(
        spotify.count_query(Method::GET, "/playlists/src/tracks", "offset=100"),
        2
    );
    assert_eq!(
        spotify.count_query(Method::GET, "/playlists/src/tracks", "offset=200"),
        1
    );

    let log = spotify.log();
    assert_eq!(log.len(), 4);
    assert_eq!(log[1].status, StatusCode::UNAUTHORIZED);
    assert_eq!(log[2].token, FRESH_TOKEN);
    assert_eq!(log[3].token, FRESH_TOKEN);
}

#[tokio::test]
async fn test_second_unauthorized_response_is_auth_expired() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 10));
    let auth = FakeAuth::ok();
    // Any token is accepted but the endpoint keeps answering 401.
    spotify.fail_next(Method::GET, "/playlists/src", StatusCode::UNAUTHORIZED);
    spotify.fail_next(Method::GET, "/playlists/src", StatusCode::UNAUTHORIZED);
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let err = resolver::resolve(&mut api, "src", vec![1]).await.unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(auth.refreshes(), 1);
    assert_eq!(spotify.log().len(), 2);
}

#[tokio::test]
async fn test_any_failure_after_refresh_is_auth_expired() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 10));
    let auth = FakeAuth::ok();
    spotify.fail_next(Method::GET, "/playlists/src", StatusCode::UNAUTHORIZED);
    spotify.fail_next(Method::GET, "/playlists/src", StatusCode::INTERNAL_SERVER_ERROR);
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let err = resolver::resolve(&mut api, "src", vec![1]).await.unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(auth.refreshes(), 1);
    let log = spotify.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(log[1].token, FRESH_TOKEN);
}

#[tokio::test]
async fn test_rotated_refresh_token_replaces_the_old_one() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 10));
    spotify.expire_token_after(0);
    let auth = FakeAuth::rotating();
    let mut creds = credentials("token");

    let resolved = {
        let mut api = api(&spotify, &auth, &mut creds);
        resolver::resolve(&mut api, "src", vec![2]).await.unwrap()
    };

    assert_eq!(resolved.len(), 1);
    assert_eq!(creds.access_token, FRESH_TOKEN);
    assert_eq!(creds.refresh_token, ROTATED_REFRESH);
}

#[tokio::test]
async fn test_remote_error_is_reported_with_status() {
    let spotify = FakeSpotify::new("token");
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let err = resolver::resolve(&mut api, "missing", vec![0]).await.unwrap_err();

    match err {
        PipelineError::Remote { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(auth.refreshes(), 0);
}

#[tokio::test]
async fn test_pick_tracks_clamps_sample_size() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 30));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let picked = pipeline::pick_tracks(&mut api, &summary("src", 30), 20).await.unwrap();
    assert_eq!(picked.len(), 20);
    let ids: BTreeSet<&str> = picked.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 20);

    // Sampled in playlist order.
    let positions: Vec<usize> = picked
        .iter()
        .map(|t| t.id.trim_start_matches("src").parse().unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let all = pipeline::pick_tracks(&mut api, &summary("src", 30), 50).await.unwrap();
    assert_eq!(all.len(), 30);
}

#[tokio::test]
async fn test_list_walks_every_page() {
    let mut spotify = FakeSpotify::new("token");
    for i in 0..60 {
        spotify =
            spotify.with_playlist(&format!("p{:02}", i), &format!("List {}", i), tracks("t", i % 3));
    }
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");

    let listed = playlist::list(&mut api(&spotify, &auth, &mut creds)).await.unwrap();

    assert_eq!(listed.len(), 60);
    assert_eq!(spotify.count(Method::GET, "/me/playlists"), 2);
    assert_eq!(listed[4].track_count, 1);
    assert_eq!(listed[4].snapshot_id, "snap-1");
    assert_eq!(listed[4].cover_image_url, "no_img");
}

#[tokio::test]
async fn test_drain_of_empty_playlist_makes_no_calls() {
    let spotify = FakeSpotify::new("token").with_playlist("dst", "Empty", Vec::new());
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");

    let snapshot = rewriter::drain_tracks(
        &mut api(&spotify, &auth, &mut creds),
        "dst",
        &[],
        "snap-1".to_string(),
    )
    .await
    .unwrap();

    assert_eq!(snapshot, "snap-1");
    assert!(spotify.log().is_empty());
}

#[tokio::test]
async fn test_rewrite_replaces_contents_in_insertion_order() {
    let spotify = FakeSpotify::new("token")
        .with_playlist("src", "Source", tracks("src", 250))
        .with_playlist("dst", "Destination", tracks("old", 130));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let sampled = resolver::resolve(&mut api, "src", (0..250).collect()).await.unwrap();
    let report = rewriter::rewrite(&mut api, &existing("dst"), &sampled, OrderMode::Insertion)
        .await
        .unwrap();

    let dst = spotify.playlist("dst").unwrap();
    let expected: Vec<String> = sampled.iter().map(|t| t.uri.clone()).collect();
    assert_eq!(dst.uris(), expected);

    assert_eq!(report.removed, 130);
    assert_eq!(report.added, 250);
    assert_eq!(report.snapshot_id, dst.snapshot_id());
    assert_eq!(spotify.count(Method::DELETE, "/playlists/dst/tracks"), 2);
    assert_eq!(spotify.count(Method::POST, "/playlists/dst/tracks"), 3);
}

#[tokio::test]
async fn test_rewrite_into_empty_playlist_skips_removal() {
    let spotify = FakeSpotify::new("token").with_playlist("dst", "Empty", Vec::new());
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let sampled: Vec<TrackDescriptor> = Vec::new();

    let report = rewriter::rewrite(
        &mut api(&spotify, &auth, &mut creds),
        &existing("dst"),
        &sampled,
        OrderMode::Shuffle,
    )
    .await
    .unwrap();

    assert_eq!(report.removed, 0);
    assert_eq!(report.added, 0);
    assert_eq!(report.snapshot_id, "snap-1");
    assert_eq!(spotify.count(Method::DELETE, "/playlists/dst/tracks"), 0);
}

#[tokio::test]
async fn test_name_orders_are_reverses_of_each_other() {
    let spotify = FakeSpotify::new("token")
        .with_playlist("src", "Source", named(&["delta", "Alpha", "charlie", "Bravo", "echo"]))
        .with_playlist("dst", "Destination", Vec::new());
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let sampled = resolver::resolve(&mut api, "src", (0..5).collect()).await.unwrap();

    let ascending = order_tracks(&sampled, OrderMode::NameAscending);
    let names: Vec<&str> = ascending.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "charlie", "delta", "echo"]);

    let report = rewriter::rewrite(&mut api, &existing("dst"), &sampled, OrderMode::NameAscending)
        .await
        .unwrap();
    let written_ascending = spotify.playlist("dst").unwrap().uris();

    let again = Destination::Existing {
        playlist_id: "dst".to_string(),
        name: "Destination".to_string(),
        snapshot_id: report.snapshot_id,
    };
    rewriter::rewrite(&mut api, &again, &sampled, OrderMode::NameDescending)
        .await
        .unwrap();
    let mut written_descending = spotify.playlist("dst").unwrap().uris();

    written_descending.reverse();
    assert_eq!(written_ascending, written_descending);
}

#[tokio::test]
async fn test_failed_renewal_during_drain_leaves_partial_playlist() {
    let spotify = FakeSpotify::new("token").with_playlist("dst", "Destination", tracks("old", 250));
    // Three page fetches and the first removal succeed.
    spotify.expire_token_after(4);
    let auth = FakeAuth::failing();
    let mut creds = credentials("token");
    let sampled = vec![TrackDescriptor {
        id: "x".to_string(),
        uri: "spotify:track:x".to_string(),
        display_name: "x".to_string(),
        artist_names: vec!["-".to_string()],
        cover_image_url: "no_img".to_string(),
    }];

    let err = rewriter::rewrite(
        &mut api(&spotify, &auth, &mut creds),
        &existing("dst"),
        &sampled,
        OrderMode::Insertion,
    )
    .await
    .unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(auth.refreshes(), 1);
    assert_eq!(spotify.count(Method::DELETE, "/playlists/dst/tracks"), 2);
    assert_eq!(spotify.count(Method::POST, "/playlists/dst/tracks"), 0);
    assert_eq!(spotify.playlist("dst").unwrap().slots.len(), 150);
}

#[tokio::test]
async fn test_rewrite_creates_new_playlist() {
    let spotify = FakeSpotify::new("token").with_playlist("src", "Source", tracks("src", 3));
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let mut api = api(&spotify, &auth, &mut creds);

    let sampled = resolver::resolve(&mut api, "src", vec![0, 1, 2]).await.unwrap();
    let destination = Destination::New {
        name: "Fresh picks".to_string(),
    };
    let report = rewriter::rewrite(&mut api, &destination, &sampled, OrderMode::Insertion)
        .await
        .unwrap();

    let (id, created) = spotify.playlist_by_name("Fresh picks").unwrap();
    assert_eq!(report.playlist_id, id);
    assert_eq!(created.uris().len(), 3);
    assert_eq!(report.removed, 0);
    assert_eq!(spotify.count(Method::POST, "/users/alice/playlists"), 1);
    assert_eq!(spotify.count(Method::DELETE, &format!("/playlists/{}/tracks", id)), 0);
}

#[tokio::test]
async fn test_failed_creation_aborts_rewrite() {
    let spotify = FakeSpotify::new("token");
    spotify.fail_next(
        Method::POST,
        "/users/alice/playlists",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    let auth = FakeAuth::ok();
    let mut creds = credentials("token");
    let sampled: Vec<TrackDescriptor> = Vec::new();

    let err = rewriter::rewrite(
        &mut api(&spotify, &auth, &mut creds),
        &Destination::New {
            name: "Never".to_string(),
        },
        &sampled,
        OrderMode::Insertion,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Remote { status: 500, .. }));
    assert!(spotify.playlist_by_name("Never").is_none());
    assert_eq!(spotify.log().len(), 1);
}
