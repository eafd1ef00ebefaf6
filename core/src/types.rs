//! Request inputs accepted by the client.
//!
//! # Design
//! A URL is either a plain string or a base URL plus query pairs, and a body
//! is either form pairs or raw bytes. Both keep pairs in insertion order so
//! encoded output is predictable. The `From` impls let call sites pass
//! `"http://..."`, `("http://...", [("q", "x")])`, `[("name", "a b")]` or
//! `"raw payload"` directly.

/// Target of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUrl {
    /// Used verbatim.
    Plain(String),
    /// Base URL followed by query parameters to append.
    WithQuery {
        base: String,
        params: Vec<(String, String)>,
    },
}

impl RequestUrl {
    pub fn with_query<B, I, K, V>(base: B, params: I) -> Self
    where
        B: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        RequestUrl::WithQuery {
            base: base.into(),
            params: to_pairs(params),
        }
    }
}

impl From<&str> for RequestUrl {
    fn from(url: &str) -> Self {
        RequestUrl::Plain(url.to_string())
    }
}

impl From<String> for RequestUrl {
    fn from(url: String) -> Self {
        RequestUrl::Plain(url)
    }
}

impl From<&String> for RequestUrl {
    fn from(url: &String) -> Self {
        RequestUrl::Plain(url.clone())
    }
}

impl<B, K, V, const N: usize> From<(B, [(K, V); N])> for RequestUrl
where
    B: Into<String>,
    K: ToString,
    V: ToString,
{
    fn from((base, params): (B, [(K, V); N])) -> Self {
        RequestUrl::with_query(base, params)
    }
}

impl<B, K, V> From<(B, Vec<(K, V)>)> for RequestUrl
where
    B: Into<String>,
    K: ToString,
    V: ToString,
{
    fn from((base, params): (B, Vec<(K, V)>)) -> Self {
        RequestUrl::with_query(base, params)
    }
}

/// Payload of a request.
///
/// The default is an empty form, which encodes to an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Encoded as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Sent unchanged.
    Raw(Vec<u8>),
}

impl RequestBody {
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        RequestBody::Form(to_pairs(pairs))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Form(pairs) => pairs.is_empty(),
            RequestBody::Raw(bytes) => bytes.is_empty(),
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::Form(Vec::new())
    }
}

impl From<&str> for RequestBody {
    fn from(raw: &str) -> Self {
        RequestBody::Raw(raw.as_bytes().to_vec())
    }
}

impl From<String> for RequestBody {
    fn from(raw: String) -> Self {
        RequestBody::Raw(raw.into_bytes())
    }
}

impl From<&[u8]> for RequestBody {
    fn from(raw: &[u8]) -> Self {
        RequestBody::Raw(raw.to_vec())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(raw: Vec<u8>) -> Self {
        RequestBody::Raw(raw)
    }
}

impl<K: ToString, V: ToString, const N: usize> From<[(K, V); N]> for RequestBody {
    fn from(pairs: [(K, V); N]) -> Self {
        RequestBody::form(pairs)
    }
}

impl<K: ToString, V: ToString> From<Vec<(K, V)>> for RequestBody {
    fn from(pairs: Vec<(K, V)>) -> Self {
        RequestBody::form(pairs)
    }
}

fn to_pairs<I, K, V>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: ToString,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
