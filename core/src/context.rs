//! State of the most recent request/response pair.
//!
//! # Design
//! A `Client` owns exactly one `Context`. Every request overwrites it in
//! place; there is no history. Transport failures land in `error_code` and
//! `error_message` instead of being returned, so the fields are always the
//! place to look after a call.

use crate::engine::TransferInfo;
use crate::header::ResponseHeaders;
use crate::http::HttpMethod;
use crate::types::RequestBody;

/// What was asked for.
#[derive(Debug, Clone, Default)]
pub struct RequestRecord {
    /// Resolved URL, query parameters included.
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    /// Outgoing header lines as sent, request line first.
    pub header: Vec<String>,
    /// Body as supplied, before encoding.
    pub body: RequestBody,
}

/// What came back.
#[derive(Debug, Clone, Default)]
pub struct ResponseRecord {
    /// `None` when the transfer failed.
    pub body: Option<Vec<u8>>,
    pub info: TransferInfo,
    pub header: ResponseHeaders,
    /// 0 when the remote host was never reached.
    pub code: u16,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    /// 0 means success.
    pub error_code: u32,
    /// Empty on success.
    pub error_message: String,
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

impl Context {
    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}
