//! Blocking JSON client for the campaign backend.
//!
//! # Overview
//! Resolves the backend base URL from configuration and the runtime
//! environment, then exposes one generic `request` plus named wrappers for
//! the user, campaign and health endpoints.
//!
//! # Design
//! - `ApiClient` is an explicit value; construct one and pass it around.
//! - Each endpoint has a pure `build_*` method and a wrapper that sends it,
//!   so request shaping is testable without a network.
//! - The transport sits behind the `Transport` trait; `UreqTransport` is the
//!   default.
//! - Failures are typed (`ApiError`, `ErrorKind`) and logged once through
//!   `tracing` before being returned.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{parse_response, ApiClient};
pub use config::{resolve_base_url, ApiConfig, Environment};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Campaign, CampaignEnvelope, CampaignProgress, CampaignStatus, HealthStatus, NewCampaign,
    NewUser, User, UserEnvelope,
};
