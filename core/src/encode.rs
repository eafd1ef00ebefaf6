//! URL, form body and cookie encoding.
//!
//! Pure functions; nothing here touches the engine.

use url::form_urlencoded;

use crate::types::{RequestBody, RequestUrl};

/// Resolve a request target into the URL handed to the engine.
///
/// Query parameters are appended with `&` when the base already contains a
/// `?` anywhere, and with `?` otherwise. The test is a plain substring
/// check, so a base whose only `?` sits inside a fragment still gets `&`.
pub fn build_url(url: &RequestUrl) -> String {
    match url {
        RequestUrl::Plain(url) => url.clone(),
        RequestUrl::WithQuery { base, params } => {
            if params.is_empty() {
                return base.clone();
            }
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}{}", build_query(params))
        }
    }
}

/// Encode pairs as `application/x-www-form-urlencoded`.
pub fn build_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Bytes to send for a body: forms are encoded, raw payloads pass through.
pub fn prepare_data(body: &RequestBody) -> Vec<u8> {
    match body {
        RequestBody::Form(pairs) => build_query(pairs).into_bytes(),
        RequestBody::Raw(bytes) => bytes.clone(),
    }
}

/// Serialize cookies as a single `k1=v1; k2=v2` string.
pub fn build_cookie(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
