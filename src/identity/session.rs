//! Session token extraction from incoming requests.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};

pub const DEFAULT_SESSION_COOKIE: &str = "__session";

/// Return the session token carried by the request, if any.
///
/// A bearer `Authorization` header wins over the cookie so API clients can
/// call the same routes as the browser.
#[must_use]
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token);
    }

    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == cookie_name && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }

    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
