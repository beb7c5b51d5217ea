use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Cookie that transports the refresh token. The browser-visible session
/// never sees this value; it only travels on same-site requests.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Builds the `Set-Cookie` value for a newly issued refresh token.
/// `Secure` is added outside local development.
pub fn refresh_cookie(value: &str, ttl_days: i64, secure: bool) -> String {
    let max_age = ttl_days * 86_400;
    let mut cookie = format!(
        "{REFRESH_COOKIE}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that expires the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> String {
    let mut cookie = format!("{REFRESH_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Reads a cookie by name from the request headers. Handles repeated
/// `Cookie` headers and skips malformed pairs.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
