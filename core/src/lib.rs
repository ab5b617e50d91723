//! Typed API client for the micro-url URL-shortening service.
//!
//! # Overview
//! Every network operation reports exactly one outcome as an [`ApiResult`]:
//! the decoded body on success, or a [`BasicError`] (`{"error": "..."}`) on
//! any failure. Nothing is raised past the call-wrapper layer.
//!
//! # Design
//! - [`MicroUrlClient`] is sans-IO: it builds [`HttpRequest`] values and
//!   parses [`HttpResponse`] values.
//! - A [`Transport`] executes the round-trip; [`ReqwestTransport`] is the
//!   default. Tests swap in canned transports.
//! - [`Caller`] glues the two into the get / post / put / delete / asset
//!   wrappers and normalizes failures.
//! - [`MicroUrlApi`] exposes one method per endpoint, configured with a
//!   [`ClientConfig`] (base URL + mode) at construction.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod asset;
pub mod calls;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod result;
pub mod routes;
pub mod transport;
pub mod types;
pub mod validate;

pub use api::MicroUrlApi;
pub use asset::{ImageMime, NamedAsset};
pub use calls::Caller;
pub use client::MicroUrlClient;
pub use config::{ClientConfig, ConfigError, Mode};
pub use error::{normalize, ApiError, BasicError, Normalize};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use result::{err, ok, ApiResult, Tag};
pub use routes::Routes;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    BasicResponse, ImageFormat, LoginRequest, NewUrlRequest, NewUserRequest, OidcName, Paginate,
    QrCodeParams, QrParams, Rgba, ShortLink, User, UserLink, UserLinkWithViews, UserLinksAndViews,
    UserView,
};
pub use validate::ValidationError;
