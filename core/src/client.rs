//! Fluent HTTP client over a native transfer engine.
//!
//! # Design
//! `Client` holds one engine handle, the option state arranged on it, the
//! configured header and cookie mappings, and the `Context` of the last
//! exchange. Request methods translate their arguments into `EngineOption`s,
//! run exactly one blocking transfer and copy the results into the context.
//! They return `&mut Self` so calls chain; transport failures are read back
//! through `error_code` / `error_message` rather than returned.
//!
//! A `Client` is not meant to be shared between threads. Use one instance
//! per sequence of requests.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::encode::{build_cookie, build_url, prepare_data};
use crate::engine::{Engine, EngineOption, EngineOptions, Transfer, TransferInfo};
use crate::error::{ClientError, TransferError, TransferErrorKind};
use crate::header::ResponseHeaders;
use crate::http::HttpMethod;
use crate::types::{RequestBody, RequestUrl};

pub struct Client {
    handle: Option<Box<dyn Engine>>,
    options: EngineOptions,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    context: Context,
}

impl Client {
    /// Client on the built-in engine with the default baseline.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    #[cfg(feature = "ureq")]
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_engine(crate::native::UreqEngine::new(), config))
    }

    #[cfg(not(feature = "ureq"))]
    pub fn with_config(_config: ClientConfig) -> Result<Self, ClientError> {
        Err(ClientError::EngineUnavailable)
    }

    /// Client on a caller-supplied engine.
    pub fn with_engine(engine: impl Engine + 'static, config: ClientConfig) -> Self {
        let mut client = Self {
            handle: Some(Box::new(engine)),
            options: EngineOptions::default(),
            headers: Vec::new(),
            cookies: Vec::new(),
            context: Context::default(),
        };
        client.init(&config);
        client
    }

    fn init(&mut self, config: &ClientConfig) {
        self.set_opt(EngineOption::CaptureRequestHeader(true))
            .set_opt(EngineOption::Timeout(config.timeout()))
            .set_opt(EngineOption::AutoReferer(config.auto_referer))
            .set_opt(EngineOption::FollowLocation(config.follow_redirects))
            .set_opt(EngineOption::MaxRedirs(config.max_redirects));
        if !config.verify_tls {
            self.set_opt(EngineOption::SslVerifyPeer(false))
                .set_opt(EngineOption::SslVerifyHost(false));
        }
        if let Some(agent) = &config.user_agent {
            self.set_opt(EngineOption::UserAgent(agent.clone()));
        }
    }

    pub fn get(&mut self, url: impl Into<RequestUrl>) -> &mut Self {
        self.request(url, HttpMethod::Get, RequestBody::default())
    }

    pub fn post(&mut self, url: impl Into<RequestUrl>, data: impl Into<RequestBody>) -> &mut Self {
        self.request(url, HttpMethod::Post, data)
    }

    pub fn put(&mut self, url: impl Into<RequestUrl>, data: impl Into<RequestBody>) -> &mut Self {
        self.request(url, HttpMethod::Put, data)
    }

    pub fn patch(&mut self, url: impl Into<RequestUrl>, data: impl Into<RequestBody>) -> &mut Self {
        self.request(url, HttpMethod::Patch, data)
    }

    pub fn delete(&mut self, url: impl Into<RequestUrl>, data: impl Into<RequestBody>) -> &mut Self {
        self.request(url, HttpMethod::Delete, data)
    }

    pub fn options(&mut self, url: impl Into<RequestUrl>, data: impl Into<RequestBody>) -> &mut Self {
        self.request(url, HttpMethod::Options, data)
    }

    /// Configure the handle for `method`, resolve the URL and run one
    /// transfer. GET never carries a body; every other method sends `data`
    /// encoded by `prepare_data`.
    pub fn request(
        &mut self,
        url: impl Into<RequestUrl>,
        method: HttpMethod,
        data: impl Into<RequestBody>,
    ) -> &mut Self {
        let data = data.into();
        match method {
            HttpMethod::Get => {
                self.set_opt(EngineOption::HttpGet(true));
            }
            HttpMethod::Post => {
                self.set_opt(EngineOption::Post(true))
                    .set_opt(EngineOption::PostFields(prepare_data(&data)));
            }
            other => {
                self.set_opt(EngineOption::CustomRequest(other.as_str().to_string()))
                    .set_opt(EngineOption::PostFields(prepare_data(&data)));
            }
        }
        let url = build_url(&url.into());
        self.context.request.url = Some(url.clone());
        self.context.request.method = Some(method);
        self.context.request.body = data;
        self.set_opt(EngineOption::Url(url));
        self.exec()
    }

    /// Run one transfer with the current options and capture its results.
    pub fn exec(&mut self) -> &mut Self {
        self.context.response.header.clear();
        let headers = &mut self.context.response.header;
        let transfer = match self.handle.as_mut() {
            Some(engine) => engine.perform(&self.options, &mut |line: &[u8]| headers.consume(line)),
            None => Transfer {
                body: Err(TransferError::new(
                    TransferErrorKind::FailedInit,
                    "engine handle is closed",
                )),
                info: TransferInfo::default(),
            },
        };

        let Transfer { body, info } = transfer;
        self.context.response.code = info.http_code;
        self.context.request.header = info
            .request_header
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        self.context.response.info = info;
        match body {
            Ok(bytes) => {
                self.context.error_code = 0;
                self.context.error_message.clear();
                self.context.response.body = Some(bytes);
            }
            Err(err) => {
                self.context.error_code = err.code();
                self.context.error_message = err.message;
                self.context.response.body = None;
            }
        }
        debug!(
            status = self.context.response.code,
            error_code = self.context.error_code,
            "transfer finished"
        );
        self
    }

    /// Hand an option straight to the engine handle.
    pub fn set_opt(&mut self, option: EngineOption) -> &mut Self {
        self.options.apply(option);
        self
    }

    /// Set a request header, replacing any earlier value under the same key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let line = format!("{key}: {}", value.into());
        upsert(&mut self.headers, key, line);
        let lines = self.headers.iter().map(|(_, line)| line.clone()).collect();
        self.set_opt(EngineOption::HttpHeader(lines))
    }

    /// Set a cookie, replacing any earlier value under the same key.
    pub fn set_cookie(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.cookies, key.into(), value.into());
        let cookie = build_cookie(&self.cookies);
        self.set_opt(EngineOption::Cookie(cookie))
    }

    /// Release the engine handle. Later calls are no-ops.
    pub fn close(&mut self) -> &mut Self {
        if let Some(engine) = self.handle.take() {
            drop(engine);
            debug!("released engine handle");
        }
        self
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn engine_options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn error_code(&self) -> u32 {
        self.context.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.context.error_message
    }

    pub fn request_url(&self) -> Option<&str> {
        self.context.request.url.as_deref()
    }

    pub fn request_header(&self) -> &[String] {
        &self.context.request.header
    }

    pub fn request_body(&self) -> &RequestBody {
        &self.context.request.body
    }

    pub fn request_cookie(&self) -> &[(String, String)] {
        &self.cookies
    }

    pub fn response(&self) -> Option<&[u8]> {
        self.context.response.body.as_deref()
    }

    pub fn response_text(&self) -> Option<Cow<'_, str>> {
        self.response().map(String::from_utf8_lossy)
    }

    pub fn response_json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let body = self
            .response()
            .ok_or_else(|| ClientError::DeserializationError("no response body".to_string()))?;
        serde_json::from_slice(body).map_err(|e| ClientError::DeserializationError(e.to_string()))
    }

    pub fn response_info(&self) -> &TransferInfo {
        &self.context.response.info
    }

    pub fn response_header(&self) -> &ResponseHeaders {
        &self.context.response.header
    }

    pub fn response_code(&self) -> u16 {
        self.context.response.code
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
