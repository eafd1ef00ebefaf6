//! The seam between the wrapper and the native transfer engine.
//!
//! # Design
//! The client never performs I/O itself. It arranges `EngineOption`s on an
//! `EngineOptions` value and asks an `Engine` to run one blocking transfer
//! with them, passing a header line consumer. The engine hands back a
//! `Transfer`: the body or the failure, plus the metadata it collected.
//!
//! Options are stored as given. Nothing is validated until the engine runs.

use std::time::Duration;

use serde::Serialize;

use crate::error::TransferError;

/// One settable engine option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOption {
    Url(String),
    /// `true` switches the handle back to a bodyless GET.
    HttpGet(bool),
    /// `true` switches the handle to a plain POST.
    Post(bool),
    /// Body bytes. Setting them makes the request carry a body.
    PostFields(Vec<u8>),
    /// Method token sent instead of GET/POST.
    CustomRequest(String),
    /// Full list of `"Name: value"` request header lines.
    HttpHeader(Vec<String>),
    /// Value for the `Cookie` request header.
    Cookie(String),
    /// Upper bound on the whole transfer.
    Timeout(Duration),
    FollowLocation(bool),
    MaxRedirs(u32),
    /// Send `Referer` with the previous URL when following a redirect.
    AutoReferer(bool),
    SslVerifyPeer(bool),
    SslVerifyHost(bool),
    /// Record the outgoing header block in `TransferInfo::request_header`.
    CaptureRequestHeader(bool),
    UserAgent(String),
}

/// Accumulated option state of one engine handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub url: Option<String>,
    pub post: bool,
    pub post_fields: Option<Vec<u8>>,
    pub custom_request: Option<String>,
    pub headers: Vec<String>,
    pub cookie: Option<String>,
    pub timeout: Option<Duration>,
    pub follow_location: bool,
    pub max_redirs: Option<u32>,
    pub auto_referer: bool,
    pub verify_peer: bool,
    pub verify_host: bool,
    pub capture_request_header: bool,
    pub user_agent: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            url: None,
            post: false,
            post_fields: None,
            custom_request: None,
            headers: Vec::new(),
            cookie: None,
            timeout: None,
            follow_location: false,
            max_redirs: None,
            auto_referer: false,
            verify_peer: true,
            verify_host: true,
            capture_request_header: false,
            user_agent: None,
        }
    }
}

impl EngineOptions {
    pub fn apply(&mut self, option: EngineOption) {
        match option {
            EngineOption::Url(url) => self.url = Some(url),
            EngineOption::HttpGet(on) => {
                if on {
                    self.post = false;
                    self.custom_request = None;
                }
            }
            EngineOption::Post(on) => {
                self.post = on;
                if on {
                    self.custom_request = None;
                }
            }
            EngineOption::PostFields(fields) => {
                self.post = true;
                self.post_fields = Some(fields);
            }
            EngineOption::CustomRequest(method) => self.custom_request = Some(method),
            EngineOption::HttpHeader(headers) => self.headers = headers,
            EngineOption::Cookie(cookie) => self.cookie = Some(cookie),
            EngineOption::Timeout(timeout) => self.timeout = Some(timeout),
            EngineOption::FollowLocation(on) => self.follow_location = on,
            EngineOption::MaxRedirs(max) => self.max_redirs = Some(max),
            EngineOption::AutoReferer(on) => self.auto_referer = on,
            EngineOption::SslVerifyPeer(on) => self.verify_peer = on,
            EngineOption::SslVerifyHost(on) => self.verify_host = on,
            EngineOption::CaptureRequestHeader(on) => self.capture_request_header = on,
            EngineOption::UserAgent(agent) => self.user_agent = Some(agent),
        }
    }

    /// Method token the next transfer will send.
    pub fn method(&self) -> &str {
        match &self.custom_request {
            Some(method) => method.as_str(),
            None if self.post => "POST",
            None => "GET",
        }
    }

    /// Body the next transfer will send, if any.
    pub fn body(&self) -> Option<&[u8]> {
        if self.post {
            Some(self.post_fields.as_deref().unwrap_or_default())
        } else {
            None
        }
    }
}

/// Metadata about the most recent transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferInfo {
    /// Last URL requested, after redirects.
    pub url: String,
    pub content_type: Option<String>,
    /// 0 when no response was received.
    pub http_code: u16,
    pub header_size: u64,
    pub request_size: u64,
    pub redirect_count: u32,
    /// Seconds.
    pub total_time: f64,
    pub size_upload: u64,
    pub size_download: u64,
    /// Raw outgoing header block of the last request sent.
    pub request_header: String,
}

/// Outcome of one `Engine::perform` call.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub body: Result<Vec<u8>, TransferError>,
    pub info: TransferInfo,
}

/// A native HTTP transfer engine.
pub trait Engine {
    /// Run one blocking transfer with `options`.
    ///
    /// `on_header` is called once per raw response header line, CRLF
    /// included, for every response received (redirect hops too). A return
    /// value other than the line's length must abort the transfer with
    /// `TransferErrorKind::WriteError`.
    fn perform(
        &mut self,
        options: &EngineOptions,
        on_header: &mut dyn FnMut(&[u8]) -> usize,
    ) -> Transfer;
}
