//! Native transfer engine backed by `ureq`.
//!
//! # Design
//! `ureq` runs with its own redirect handling disabled. The engine follows
//! `Location` itself, one hop per request, so that every hop's header lines
//! reach the consumer and `Referer` can be set from the previous URL. HTTP
//! error statuses come back as data; only transport failures become a
//! `TransferError`.
//!
//! The timeout bounds the whole transfer, redirects included: a deadline is
//! fixed when the transfer starts and each hop only gets the time left.
//!
//! Response bodies are read without a size cap.
//!
//! The agent is cached and rebuilt only when the TLS settings change, so
//! keep-alive connections survive across sequential requests.
//!
//! Header names pass through the `http` crate, which lowercases them. Both
//! the captured response header lines and the recorded outgoing block show
//! names in lowercase, whatever case the peer used on the wire.

use std::fmt::Write as _;
use std::io;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use ureq::http::{header, Method, Request, Response, StatusCode, Uri};
use ureq::tls::TlsConfig;
use ureq::{Agent, Body};
use url::Url;

use crate::engine::{Engine, EngineOptions, Transfer, TransferInfo};
use crate::error::{TransferError, TransferErrorKind};

/// Redirect bound when `MaxRedirs` was never set.
const DEFAULT_MAX_REDIRS: u32 = 50;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const DEFAULT_USER_AGENT: &str = concat!("easyreq/", env!("CARGO_PKG_VERSION"));
const DEFAULT_ACCEPT: &str = "*/*";
const DEFAULT_ACCEPT_ENCODING: &str = "gzip";

/// Blocking HTTP/1.1 engine with rustls TLS.
#[derive(Default)]
pub struct UreqEngine {
    /// Agent and the TLS verification flag it was built with.
    agent: Option<(bool, Agent)>,
}

impl UreqEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn agent(&mut self, options: &EngineOptions) -> Agent {
        let verify = options.verify_peer && options.verify_host;
        if let Some((cached, agent)) = &self.agent {
            if *cached == verify {
                return agent.clone();
            }
        }
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .tls_config(TlsConfig::builder().disable_verification(!verify).build())
            .build()
            .new_agent();
        self.agent = Some((verify, agent.clone()));
        agent
    }

    fn run(
        &mut self,
        options: &EngineOptions,
        on_header: &mut dyn FnMut(&[u8]) -> usize,
        info: &mut TransferInfo,
    ) -> Result<Vec<u8>, TransferError> {
        let mut url = options
            .url
            .clone()
            .ok_or_else(|| TransferError::new(TransferErrorKind::UrlMalformed, "No URL set"))?;
        let agent = self.agent(options);
        let max_redirs = options.max_redirs.unwrap_or(DEFAULT_MAX_REDIRS);
        let mut method = options.method().to_string();
        let mut body = options.body();
        let mut referer: Option<String> = None;
        let deadline = options.timeout.map(|timeout| (Instant::now() + timeout, timeout));

        loop {
            info.url = url.clone();
            // Empty bodies are sent only for methods that require one.
            let sent = body.filter(|bytes| !bytes.is_empty() || requires_body(&method));
            let request = build_request(options, &method, &url, sent, referer.as_deref())?;
            let head = request_head(&request, sent);
            info.request_size += head.len() as u64;
            if options.capture_request_header {
                info.request_header = head;
            }
            info.size_upload = sent.map_or(0, |b| b.len() as u64);

            let remaining = time_left(deadline, Instant::now())?;
            debug!(%method, %url, ?remaining, "sending request");
            let mut response = send(&agent, request, sent, remaining)?;
            let status = response.status();
            info.http_code = status.as_u16();
            info.content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            info.header_size += deliver_headers(&response, on_header)?;

            let Some(next) = redirect_target(options, &response, &url) else {
                let bytes = read_body(&mut response).map_err(map_error)?;
                info.size_download = bytes.len() as u64;
                return Ok(bytes);
            };

            if info.redirect_count >= max_redirs {
                return Err(TransferError::new(
                    TransferErrorKind::TooManyRedirects,
                    format!("Maximum ({max_redirs}) redirects followed"),
                ));
            }
            // Intermediate bodies are discarded.
            if let Err(err) = read_body(&mut response) {
                debug!(%url, error = %err, "failed to drain redirect body");
            }
            info.redirect_count += 1;

            let downgrade = status == StatusCode::SEE_OTHER
                || (method == "POST"
                    && (status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND));
            if downgrade {
                method = "GET".to_string();
                body = None;
            }
            if options.auto_referer {
                referer = Some(url.clone());
            }
            debug!(from = %url, to = %next, status = status.as_u16(), "following redirect");
            url = next;
        }
    }
}

impl Engine for UreqEngine {
    fn perform(
        &mut self,
        options: &EngineOptions,
        on_header: &mut dyn FnMut(&[u8]) -> usize,
    ) -> Transfer {
        let started = Instant::now();
        let mut info = TransferInfo::default();
        let body = self.run(options, on_header, &mut info);
        info.total_time = started.elapsed().as_secs_f64();
        if let Err(err) = &body {
            warn!(code = err.code(), message = %err.message, url = %info.url, "transfer failed");
        }
        Transfer { body, info }
    }
}

fn build_request(
    options: &EngineOptions,
    method: &str,
    url: &str,
    body: Option<&[u8]>,
    referer: Option<&str>,
) -> Result<Request<()>, TransferError> {
    let uri: Uri = url
        .parse()
        .map_err(|e| TransferError::new(TransferErrorKind::UrlMalformed, format!("{url}: {e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => {
            return Err(TransferError::new(
                TransferErrorKind::UnsupportedProtocol,
                format!("Protocol \"{other}\" not supported"),
            ))
        }
        None => {
            return Err(TransferError::new(
                TransferErrorKind::UrlMalformed,
                format!("{url}: missing scheme"),
            ))
        }
    }
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|e| TransferError::new(TransferErrorKind::BadFunctionArgument, e.to_string()))?;

    let custom: Vec<(&str, &str)> = options
        .headers
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .collect();

    let has = |wanted: &str| custom.iter().any(|(name, _)| name.eq_ignore_ascii_case(wanted));

    let mut builder = Request::builder().method(method).uri(uri);
    if !has("user-agent") {
        let agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        builder = builder.header(header::USER_AGENT, agent);
    }
    if !has("accept") {
        builder = builder.header(header::ACCEPT, DEFAULT_ACCEPT);
    }
    if !has("accept-encoding") {
        builder = builder.header(header::ACCEPT_ENCODING, DEFAULT_ACCEPT_ENCODING);
    }
    if let Some(referer) = referer {
        builder = builder.header(header::REFERER, referer);
    }
    if let Some(cookie) = options.cookie.as_deref().filter(|c| !c.is_empty()) {
        builder = builder.header(header::COOKIE, cookie);
    }
    if body.is_some() && !has("content-type") {
        builder = builder.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE);
    }
    for (name, value) in custom {
        builder = builder.header(name, value);
    }
    builder
        .body(())
        .map_err(|e| TransferError::new(TransferErrorKind::BadFunctionArgument, e.to_string()))
}

/// Render the request line and headers as they are handed to the agent.
fn request_head(request: &Request<()>, body: Option<&[u8]>) -> String {
    let uri = request.uri();
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut head = format!("{} {} HTTP/1.1\r\n", request.method(), target);
    if let Some(host) = uri.authority() {
        let _ = write!(head, "Host: {host}\r\n");
    }
    for (name, value) in request.headers() {
        let _ = write!(head, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    if let Some(body) = body {
        let _ = write!(head, "content-length: {}\r\n", body.len());
    }
    head.push_str("\r\n");
    head
}

/// Time the next hop may take, or `OperationTimedOut` once the transfer
/// deadline has passed. `None` means unbounded.
fn time_left(
    deadline: Option<(Instant, Duration)>,
    now: Instant,
) -> Result<Option<Duration>, TransferError> {
    let Some((at, timeout)) = deadline else {
        return Ok(None);
    };
    match at.checked_duration_since(now) {
        Some(left) if !left.is_zero() => Ok(Some(left)),
        _ => Err(TransferError::new(
            TransferErrorKind::OperationTimedOut,
            format!("Operation timed out after {} milliseconds", timeout.as_millis()),
        )),
    }
}

fn send(
    agent: &Agent,
    request: Request<()>,
    body: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Response<Body>, TransferError> {
    let result = match body {
        Some(bytes) => {
            let (parts, ()) = request.into_parts();
            let request = agent
                .configure_request(Request::from_parts(parts, bytes))
                .timeout_global(timeout)
                .build();
            agent.run(request)
        }
        None => {
            let request = agent.configure_request(request).timeout_global(timeout).build();
            agent.run(request)
        }
    };
    result.map_err(map_error)
}

fn read_body(response: &mut Response<Body>) -> Result<Vec<u8>, ureq::Error> {
    response.body_mut().with_config().limit(u64::MAX).read_to_vec()
}

fn requires_body(method: &str) -> bool {
    ["POST", "PUT", "PATCH"]
        .iter()
        .any(|wanted| method.eq_ignore_ascii_case(wanted))
}

/// Feed the status line, each header and the terminating blank line to
/// `on_header`. Returns the number of header bytes delivered.
fn deliver_headers(
    response: &Response<Body>,
    on_header: &mut dyn FnMut(&[u8]) -> usize,
) -> Result<u64, TransferError> {
    let status = response.status();
    let status_line = format!(
        "{:?} {} {}",
        response.version(),
        status.as_str(),
        status.canonical_reason().unwrap_or("")
    );

    let mut lines: Vec<Vec<u8>> = Vec::with_capacity(response.headers().len() + 2);
    lines.push(format!("{}\r\n", status_line.trim_end()).into_bytes());
    for (name, value) in response.headers() {
        let mut line = Vec::with_capacity(name.as_str().len() + value.len() + 4);
        line.extend_from_slice(name.as_str().as_bytes());
        line.extend_from_slice(b": ");
        line.extend_from_slice(value.as_bytes());
        line.extend_from_slice(b"\r\n");
        lines.push(line);
    }
    lines.push(b"\r\n".to_vec());

    let mut delivered = 0u64;
    for line in &lines {
        if on_header(line.as_slice()) != line.len() {
            return Err(TransferError::new(
                TransferErrorKind::WriteError,
                "Failed writing header",
            ));
        }
        delivered += line.len() as u64;
    }
    Ok(delivered)
}

fn redirect_target(options: &EngineOptions, response: &Response<Body>, current: &str) -> Option<String> {
    if !options.follow_location {
        return None;
    }
    let status = response.status();
    let followed = [
        StatusCode::MOVED_PERMANENTLY,
        StatusCode::FOUND,
        StatusCode::SEE_OTHER,
        StatusCode::TEMPORARY_REDIRECT,
        StatusCode::PERMANENT_REDIRECT,
    ];
    if !followed.contains(&status) {
        return None;
    }
    let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
    let next = Url::parse(current).ok()?.join(location).ok()?;
    Some(next.to_string())
}

fn map_error(err: ureq::Error) -> TransferError {
    let kind = match &err {
        ureq::Error::HostNotFound => TransferErrorKind::CouldntResolveHost,
        ureq::Error::ConnectionFailed => TransferErrorKind::CouldntConnect,
        ureq::Error::Timeout(_) => TransferErrorKind::OperationTimedOut,
        ureq::Error::BadUri(_) => TransferErrorKind::UrlMalformed,
        ureq::Error::TooManyRedirects => TransferErrorKind::TooManyRedirects,
        ureq::Error::Tls(_) => TransferErrorKind::SslConnectError,
        ureq::Error::Io(e) => match e.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable => {
                TransferErrorKind::CouldntConnect
            }
            io::ErrorKind::TimedOut => TransferErrorKind::OperationTimedOut,
            _ => TransferErrorKind::RecvError,
        },
        _ => TransferErrorKind::RecvError,
    };
    TransferError::new(kind, err.to_string())
}
