//! Fluent HTTP client wrapper over a native transfer engine.
//!
//! # Overview
//! `Client` exposes GET/POST/PUT/PATCH/DELETE/OPTIONS, header and cookie
//! management, and captures the last response as plain fields. All transfer
//! work (connections, TLS, timeouts) is delegated to an `Engine`; the
//! wrapper only arranges options and stores results.
//!
//! ```no_run
//! use easyreq::Client;
//!
//! let mut client = Client::new()?;
//! client.get(("http://example.com/search", [("keywords", "grass")]));
//! if client.error_code() == 0 {
//!     println!("{} {:?}", client.response_code(), client.response_text());
//! }
//! client.post("http://example.com/login/", [("username", "admin"), ("password", "123456")]);
//! # Ok::<(), easyreq::ClientError>(())
//! ```
//!
//! # Design
//! - Request methods return `&mut Self` and never fail; transport errors are
//!   read from `error_code` / `error_message` after each call.
//! - Construction fails with `ClientError::EngineUnavailable` when the crate
//!   is built without the `ureq` feature and no engine is supplied.
//! - `Engine` is the single seam to the transfer library, so the client can
//!   be driven by a scripted engine in tests.

pub mod client;
pub mod config;
pub mod context;
pub mod encode;
pub mod engine;
pub mod error;
pub mod header;
pub mod http;
#[cfg(feature = "ureq")]
pub mod native;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use context::{Context, RequestRecord, ResponseRecord};
pub use engine::{Engine, EngineOption, EngineOptions, Transfer, TransferInfo};
pub use error::{ClientError, TransferError, TransferErrorKind};
pub use header::ResponseHeaders;
pub use http::{HttpMethod, UnknownMethod};
#[cfg(feature = "ureq")]
pub use native::UreqEngine;
pub use types::{RequestBody, RequestUrl};
