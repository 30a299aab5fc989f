//! Transient user-visible notices.
//!
//! There is no server-side session. A failed stage stores its message in a short-lived cookie
//! and redirects to the upload form, which shows the notice once and clears the cookie.

use axum::{
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

pub const NOTICE_COOKIE: &str = "idiomcard_notice";

const NOTICE_MAX_AGE_SECS: u32 = 60;

/// `Set-Cookie` value carrying `message`
pub fn set_cookie(message: &str) -> String {
    format!(
        "{NOTICE_COOKIE}={}; Path=/; Max-Age={NOTICE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax",
        URL_SAFE_NO_PAD.encode(message.as_bytes())
    )
}

/// `Set-Cookie` value that removes the notice
pub fn clear_cookie() -> String {
    format!("{NOTICE_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Read the pending notice from the request cookies, if any.
///
/// A cookie that does not decode is ignored rather than rejected.
pub fn from_headers(headers: &HeaderMap) -> Option<String> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=')
                && name == NOTICE_COOKIE
                && !value.is_empty()
            {
                return URL_SAFE_NO_PAD
                    .decode(value)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok());
            }
        }
    }
    None
}

/// 303 redirect to `location` with `message` queued as a notice
pub fn redirect_with_notice(location: &str, message: &str) -> Response {
    ([(header::SET_COOKIE, set_cookie(message))], Redirect::to(location)).into_response()
}
