use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::{utils, warning};

pub const SESSION_COOKIE: &str = "sid";
pub const REMEMBER_COOKIE: &str = "remember";
pub const AUTH_STATE_COOKIE: &str = "spotify_auth_state";

const REMEMBER_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Reads cookie `name` from the request headers.
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session(key: &str) -> String {
    build(SESSION_COOKIE, key, None)
}

pub fn auth_state(state: &str) -> String {
    build(AUTH_STATE_COOKIE, state, Some(600))
}

/// Remember cookie for `user_id`, bound to the refresh token stored for them.
pub fn remember(user_id: &str, refresh_token: &str) -> String {
    build(
        REMEMBER_COOKIE,
        &remember_value(user_id, refresh_token),
        Some(REMEMBER_MAX_AGE),
    )
}

pub fn clear(name: &str) -> String {
    build(name, "", Some(0))
}

pub fn remember_value(user_id: &str, refresh_token: &str) -> String {
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(user_id.as_bytes()),
        utils::credential_digest(refresh_token)
    )
}

/// Splits a remember cookie into the user id and the credential digest.
pub fn parse_remember(value: &str) -> Option<(String, String)> {
    let (user, digest) = value.split_once('.')?;
    let user = URL_SAFE_NO_PAD.decode(user).ok()?;
    let user = String::from_utf8(user).ok()?;
    if user.is_empty() || digest.is_empty() {
        return None;
    }
    Some((user, digest.to_string()))
}

/// Appends `Set-Cookie` headers to `response`.
pub fn attach(mut response: Response, cookies: &[String]) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warning!("Dropping invalid cookie header: {}", e),
        }
    }
    response
}

fn build(name: &str, value: &str, max_age: Option<i64>) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    cookie
}
