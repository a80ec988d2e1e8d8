use axum::{
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::context::BearerToken;

/// Attach the request's bearer credential (if any) as a [`BearerToken`]
/// extension. Rejection is left to the gateway.
pub async fn bearer_middleware(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let token = extract_bearer(req.headers());
    req.extensions_mut().insert(BearerToken::new(token));
    next.run(req).await
}

/// `Bearer <token>` yields the token; any other header value is passed on
/// verbatim so the decoder reports it as malformed rather than missing.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?;
    let header = match header.to_str() {
        Ok(h) => h.trim_start(),
        Err(_) => return Some(String::from_utf8_lossy(header.as_bytes()).into_owned()),
    };

    let token = match header.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest,
        _ => header,
    };
    Some(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header_is_none() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn other_schemes_are_passed_through() {
        assert_eq!(extract_bearer(&headers("Basic Zm9vOmJhcg==")).as_deref(), Some("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_bearer(&headers("Bearer ")).as_deref(), Some(""));
    }
}
