//! In-process fakes of the Spotify Web API and the accounts service.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde_json::{Value, json};

use spotsample::{
    error::PipelineError,
    management::Credentials,
    spotify::{
        auth::AuthProvider,
        client::{ApiRequest, ApiResponse, SpotifyApi, Transport},
    },
    types::{Grant, Renewal},
};

pub const BASE_URL: &str = "http://spotify.test/v1";
pub const USER_ID: &str = "alice";
pub const FRESH_TOKEN: &str = "fresh-token";
pub const ROTATED_REFRESH: &str = "rotated-refresh";

#[derive(Debug, Clone)]
pub struct FakeTrack {
    pub id: String,
    pub name: String,
}

impl FakeTrack {
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct FakePlaylist {
    pub name: String,
    pub slots: Vec<Option<FakeTrack>>,
    pub snapshot: u64,
}

impl FakePlaylist {
    pub fn snapshot_id(&self) -> String {
        format!("snap-{}", self.snapshot)
    }

    pub fn uris(&self) -> Vec<String> {
        self.slots.iter().flatten().map(FakeTrack::uri).collect()
    }
}

#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub token: String,
    pub status: StatusCode,
}

struct Injected {
    method: Method,
    path: String,
    status: StatusCode,
}

struct FakeState {
    playlists: BTreeMap<String, FakePlaylist>,
    valid_token: String,
    // The current token stops working once this many requests were answered.
    expire_after: Option<usize>,
    injected: VecDeque<Injected>,
    log: Vec<LoggedRequest>,
    created: usize,
}

/// A stateful fake of the playlist endpoints used by the pipeline.
pub struct FakeSpotify {
    state: Mutex<FakeState>,
}

pub fn tracks(prefix: &str, count: usize) -> Vec<Option<FakeTrack>> {
    (0..count)
        .map(|i| {
            Some(FakeTrack {
                id: format!("{}{}", prefix, i),
                name: format!("{} {:03}", prefix, i),
            })
        })
        .collect()
}

pub fn named(names: &[&str]) -> Vec<Option<FakeTrack>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Some(FakeTrack {
                id: format!("n{}", i),
                name: name.to_string(),
            })
        })
        .collect()
}

impl FakeSpotify {
    pub fn new(token: &str) -> Self {
        FakeSpotify {
            state: Mutex::new(FakeState {
                playlists: BTreeMap::new(),
                valid_token: token.to_string(),
                expire_after: None,
                injected: VecDeque::new(),
                log: Vec::new(),
                created: 0,
            }),
        }
    }

    pub fn with_playlist(self, id: &str, name: &str, slots: Vec<Option<FakeTrack>>) -> Self {
        self.state.lock().unwrap().playlists.insert(
            id.to_string(),
            FakePlaylist {
                name: name.to_string(),
                slots,
                snapshot: 1,
            },
        );
        self
    }

    /// The current access token is rejected after `requests` answered requests.
    /// Any refreshed token keeps working.
    pub fn expire_token_after(&self, requests: usize) {
        self.state.lock().unwrap().expire_after = Some(requests);
    }

    /// Answers the next request matching `method` and `path` with `status`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode) {
        self.state.lock().unwrap().injected.push_back(Injected {
            method,
            path: path.to_string(),
            status,
        });
    }

    pub fn playlist(&self, id: &str) -> Option<FakePlaylist> {
        self.state.lock().unwrap().playlists.get(id).cloned()
    }

    pub fn playlist_by_name(&self, name: &str) -> Option<(String, FakePlaylist)> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|(_, p)| p.name == name)
            .map(|(id, p)| (id.clone(), p.clone()))
    }

    pub fn log(&self) -> Vec<LoggedRequest> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.log()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn count_query(&self, method: Method, path: &str, query: &str) -> usize {
        self.log()
            .iter()
            .filter(|r| r.method == method && r.path == path && r.query.contains(query))
            .count()
    }
}

fn error(status: StatusCode, message: &str) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({"error": {"status": status.as_u16(), "message": message}}),
    }
}

fn query_param(url: &Url, name: &str) -> Option<usize> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse().ok())
}

fn track_json(track: &FakeTrack) -> Value {
    json!({
        "id": track.id,
        "name": track.name,
        "uri": track.uri(),
        "album": {"images": [{"url": format!("https://img.test/{}-640.jpg", track.id)}, {"url": format!("https://img.test/{}-64.jpg", track.id)}]},
        "artists": [{"name": format!("Artist of {}", track.name)}]
    })
}

fn items_page(id: &str, playlist: &FakePlaylist, offset: usize, limit: usize) -> Value {
    let end = (offset + limit).min(playlist.slots.len());
    let items: Vec<Value> = playlist.slots[offset.min(end)..end]
        .iter()
        .map(|slot| match slot {
            Some(track) => json!({"track": track_json(track)}),
            None => json!({"track": null}),
        })
        .collect();
    let next = if end < playlist.slots.len() {
        json!(format!(
            "{}/playlists/{}/tracks?offset={}&limit={}",
            BASE_URL, id, end, limit
        ))
    } else {
        Value::Null
    };
    json!({"items": items, "next": next, "total": playlist.slots.len()})
}

impl FakeState {
    fn answer(&mut self, request: &ApiRequest, path: &str, url: &Url) -> ApiResponse {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["me", "playlists"]) => {
                let offset = query_param(url, "offset").unwrap_or(0);
                let limit = query_param(url, "limit").unwrap_or(20);
                let all: Vec<Value> = self
                    .playlists
                    .iter()
                    .map(|(id, p)| {
                        json!({
                            "id": id,
                            "name": p.name,
                            "images": [],
                            "tracks": {"total": p.slots.len()},
                            "snapshot_id": p.snapshot_id(),
                        })
                    })
                    .collect();
                let end = (offset + limit).min(all.len());
                let next = if end < all.len() {
                    json!(format!("{}/me/playlists?offset={}&limit={}", BASE_URL, end, limit))
                } else {
                    Value::Null
                };
                let items = all[offset.min(end)..end].to_vec();
                ApiResponse {
                    status: StatusCode::OK,
                    body: json!({"items": items, "next": next, "total": all.len()}),
                }
            }
            ("GET", ["playlists", id]) => match self.playlists.get(*id) {
                Some(p) => ApiResponse {
                    status: StatusCode::OK,
                    body: json!({
                        "id": id,
                        "name": p.name,
                        "snapshot_id": p.snapshot_id(),
                        "tracks": items_page(id, p, 0, 100),
                    }),
                },
                None => error(StatusCode::NOT_FOUND, "Not found."),
            },
            ("GET", ["playlists", id, "tracks"]) => match self.playlists.get(*id) {
                Some(p) => {
                    let offset = query_param(url, "offset").unwrap_or(0);
                    let limit = query_param(url, "limit").unwrap_or(100);
                    ApiResponse {
                        status: StatusCode::OK,
                        body: items_page(id, p, offset, limit),
                    }
                }
                None => error(StatusCode::NOT_FOUND, "Not found."),
            },
            ("POST", ["users", user, "playlists"]) => {
                if *user != USER_ID {
                    return error(
                        StatusCode::FORBIDDEN,
                        "You cannot create a playlist for another user",
                    );
                }
                let body = request.body.clone().unwrap_or(Value::Null);
                self.created += 1;
                let id = format!("new{}", self.created);
                let playlist = FakePlaylist {
                    name: body["name"].as_str().unwrap_or_default().to_string(),
                    slots: Vec::new(),
                    snapshot: 1,
                };
                let response = json!({"id": id, "name": playlist.name, "snapshot_id": playlist.snapshot_id()});
                self.playlists.insert(id, playlist);
                ApiResponse {
                    status: StatusCode::CREATED,
                    body: response,
                }
            }
            ("DELETE", ["playlists", id, "tracks"]) => {
                let Some(p) = self.playlists.get_mut(*id) else {
                    return error(StatusCode::NOT_FOUND, "Not found.");
                };
                let body = request.body.clone().unwrap_or(Value::Null);
                if body["snapshot_id"].as_str() != Some(p.snapshot_id().as_str()) {
                    return error(StatusCode::BAD_REQUEST, "Invalid snapshot id");
                }
                let uris: Vec<String> = body["tracks"]
                    .as_array()
                    .map(|tracks| {
                        tracks
                            .iter()
                            .filter_map(|t| t["uri"].as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                if uris.len() > 100 {
                    return error(StatusCode::BAD_REQUEST, "Too many tracks");
                }
                p.slots
                    .retain(|slot| slot.as_ref().is_none_or(|t| !uris.contains(&t.uri())));
                p.snapshot += 1;
                ApiResponse {
                    status: StatusCode::OK,
                    body: json!({"snapshot_id": p.snapshot_id()}),
                }
            }
            ("POST", ["playlists", id, "tracks"]) => {
                let Some(p) = self.playlists.get_mut(*id) else {
                    return error(StatusCode::NOT_FOUND, "Not found.");
                };
                let body = request.body.clone().unwrap_or(Value::Null);
                let uris: Vec<&str> = body["uris"]
                    .as_array()
                    .map(|uris| uris.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                if uris.len() > 100 {
                    return error(StatusCode::BAD_REQUEST, "Too many tracks");
                }
                for uri in uris {
                    let id = uri.trim_start_matches("spotify:track:").to_string();
                    p.slots.push(Some(FakeTrack {
                        name: id.clone(),
                        id,
                    }));
                }
                p.snapshot += 1;
                ApiResponse {
                    status: StatusCode::CREATED,
                    body: json!({"snapshot_id": p.snapshot_id()}),
                }
            }
            _ => error(StatusCode::NOT_FOUND, "Unknown endpoint"),
        }
    }
}

#[async_trait]
impl Transport for FakeSpotify {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: &str,
    ) -> Result<ApiResponse, PipelineError> {
        let url = Url::parse(&request.url)
            .map_err(|e| PipelineError::input(format!("bad url {}: {}", request.url, e)))?;
        let path = url
            .path()
            .strip_prefix("/v1")
            .unwrap_or(url.path())
            .to_string();

        let mut state = self.state.lock().unwrap();

        if let Some(limit) = state.expire_after {
            if state.log.len() >= limit {
                state.valid_token = "expired".to_string();
            }
        }

        let response = if access_token != state.valid_token && access_token != FRESH_TOKEN {
            error(StatusCode::UNAUTHORIZED, "The access token expired")
        } else if let Some(pos) = state
            .injected
            .iter()
            .position(|i| i.method == request.method && i.path == path)
        {
            let injected = state.injected.remove(pos);
            let status = injected.map(|i| i.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error(status, "Injected failure")
        } else {
            state.answer(request, &path, &url)
        };

        state.log.push(LoggedRequest {
            method: request.method.clone(),
            path,
            query: url.query().unwrap_or_default().to_string(),
            token: access_token.to_string(),
            status: response.status,
        });

        Ok(response)
    }
}

/// Accounts service fake. Refreshing hands out [`FRESH_TOKEN`] unless it was told to fail.
pub struct FakeAuth {
    refresh_ok: bool,
    rotate: bool,
    refreshes: AtomicUsize,
}

impl FakeAuth {
    pub fn ok() -> Self {
        FakeAuth {
            refresh_ok: true,
            rotate: false,
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        FakeAuth {
            refresh_ok: false,
            ..Self::ok()
        }
    }

    /// Also hands out [`ROTATED_REFRESH`] as the new refresh token.
    pub fn rotating() -> Self {
        FakeAuth {
            rotate: true,
            ..Self::ok()
        }
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn exchange(&self, code: &str) -> Result<Grant, PipelineError> {
        Ok(Grant {
            access_token: format!("access-{}", code),
            refresh_token: format!("refresh-{}", code),
            user_id: USER_ID.to_string(),
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<Renewal, PipelineError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.refresh_ok {
            Ok(Renewal {
                access_token: FRESH_TOKEN.to_string(),
                refresh_token: self.rotate.then(|| ROTATED_REFRESH.to_string()),
            })
        } else {
            Err(PipelineError::Remote {
                status: 400,
                message: "Refresh token revoked".to_string(),
            })
        }
    }
}

pub fn credentials(token: &str) -> Credentials {
    Credentials {
        user_id: USER_ID.to_string(),
        refresh_token: "refresh".to_string(),
        access_token: token.to_string(),
    }
}

pub fn api<'a>(
    spotify: &'a FakeSpotify,
    auth: &'a FakeAuth,
    credentials: &'a mut Credentials,
) -> SpotifyApi<'a> {
    SpotifyApi::new(spotify, auth, BASE_URL, credentials)
}
