use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "pdf_helper_sid";

/// Session id carried by the `Cookie` header, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value binding the browser to session `id`.
pub fn session_cookie(id: Uuid) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_id_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn malformed_id_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("pdf_helper_sid=nope"));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn cookie_is_http_only() {
        let v = session_cookie(Uuid::nil()).unwrap();
        let s = v.to_str().unwrap();
        assert!(s.starts_with("pdf_helper_sid=00000000-"));
        assert!(s.contains("HttpOnly"));
    }
}
