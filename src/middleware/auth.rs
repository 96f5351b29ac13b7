use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Pull the stream token out of an `Authorization: Basic ...` header.
///
/// The token travels as the basic-auth username; the password half is
/// ignored. Returns `None` for a missing header, a non-Basic scheme,
/// undecodable credentials or an empty username.
pub fn extract_basic_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let (scheme, encoded) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let username = match credentials.split_once(':') {
        Some((user, _password)) => user,
        None => credentials.as_str(),
    };

    if username.is_empty() {
        None
    } else {
        Some(username.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[test]
    fn token_is_the_username() {
        let headers = headers_with(&basic("secret-token:"));
        assert_eq!(extract_basic_token(&headers).as_deref(), Some("secret-token"));
    }

    #[test]
    fn password_is_ignored() {
        let headers = headers_with(&basic("secret-token:whatever"));
        assert_eq!(extract_basic_token(&headers).as_deref(), Some("secret-token"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with(&format!("basic {}", STANDARD.encode("tok:")));
        assert_eq!(extract_basic_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn missing_header() {
        assert!(extract_basic_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn bearer_scheme_rejected() {
        assert!(extract_basic_token(&headers_with("Bearer abc")).is_none());
    }

    #[test]
    fn empty_username_rejected() {
        assert!(extract_basic_token(&headers_with(&basic(":password"))).is_none());
    }

    #[test]
    fn garbage_base64_rejected() {
        assert!(extract_basic_token(&headers_with("Basic %%%")).is_none());
    }
}
