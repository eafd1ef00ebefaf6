use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw for one request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercase names; repeated headers joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/redirect/{hops}", any(redirect))
        .route("/slow-redirect/{hops}", any(slow_redirect))
        .route("/status/{code}", any(status))
        .route("/bytes/{len}", any(bytes))
}

/// Delay before each `/slow-redirect` hop answers.
pub const SLOW_HOP: Duration = Duration::from_millis(400);

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    tracing::debug!(%method, %uri, "echo");
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        seen.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// 302 chain: `/redirect/{n}` points at `/redirect/{n-1}`, `/redirect/0` at `/echo`.
async fn redirect(Path(hops): Path<u32>) -> impl IntoResponse {
    let location = if hops == 0 {
        "/echo".to_string()
    } else {
        format!("/redirect/{}", hops - 1)
    };
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

/// Same chain as `/redirect`, but every hop waits [`SLOW_HOP`] first.
async fn slow_redirect(Path(hops): Path<u32>) -> impl IntoResponse {
    tokio::time::sleep(SLOW_HOP).await;
    let location = if hops == 0 {
        "/echo".to_string()
    } else {
        format!("/slow-redirect/{}", hops - 1)
    };
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

/// `len` bytes of `x`.
async fn bytes(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}
