//! Request shaping, dispatch and response parsing for the campaign API.
//!
//! # Design
//! `ApiClient` holds the base URL resolved at construction, the default
//! headers and a transport. None of it changes after construction, so a
//! shared `&ApiClient` is safe to use from several threads at once.
//!
//! Every endpoint has a `build_*` method producing the `HttpRequest` it would
//! send, and a wrapper of the same name that sends it through `send`.
//! `send` is the single place where failures are logged.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{resolve_base_url, ApiConfig, Environment};
use crate::error::ApiError;
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
}

impl ApiClient {
    /// Client over the default `ureq` transport, bounded by `config.timeout`.
    pub fn new(config: &ApiConfig, env: &Environment) -> Self {
        Self::with_transport(config, env, UreqTransport::new(config.timeout))
    }

    /// Configuration and environment both read from the process environment.
    pub fn from_env() -> Self {
        Self::new(&ApiConfig::from_env(), &Environment::detect())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: &ApiConfig, env: &Environment, transport: T) -> Self {
        let base_url = resolve_base_url(config, env).to_string();
        tracing::debug!(%base_url, mode = %env.mode, host = %env.host, "resolved API base URL");
        Self {
            base_url,
            headers: config.headers.clone(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shape a request for `endpoint`, appended verbatim to the base URL.
    pub fn build_request(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        HttpRequest {
            method: options.method.unwrap_or_default(),
            url: format!("{}{endpoint}", self.base_url),
            headers: merge_headers(&self.headers, &options.headers),
            body: options.body,
        }
    }

    /// Generic entry point: shape, send and decode.
    pub fn request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        self.send(self.build_request(endpoint, options))
    }

    /// Execute an already shaped request and decode the JSON body.
    ///
    /// Any failure is logged once here before being returned.
    pub fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending API request");
        self.transport
            .execute(&request)
            .and_then(parse_response)
            .inspect_err(|err| {
                tracing::error!(
                    error = %err,
                    method = request.method.as_str(),
                    url = %request.url,
                    "API request failed"
                );
            })
    }

    // Users

    pub fn build_create_user<B: Serialize + ?Sized>(&self, data: &B) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::default()
            .method(HttpMethod::Post)
            .body(json_body(data)?);
        Ok(self.build_request("/users/", options))
    }

    pub fn create_user<B, R>(&self, data: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_create_user(data)?;
        self.send(request)
    }

    pub fn build_get_user<I: Display>(&self, id: I) -> HttpRequest {
        self.build_request(&format!("/users/{id}"), RequestOptions::default())
    }

    pub fn get_user<I: Display, R: DeserializeOwned>(&self, id: I) -> Result<R, ApiError> {
        self.send(self.build_get_user(id))
    }

    // Campaigns

    pub fn build_create_campaign<B: Serialize + ?Sized>(
        &self,
        data: &B,
    ) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::default()
            .method(HttpMethod::Post)
            .body(json_body(data)?);
        Ok(self.build_request("/campaigns/", options))
    }

    pub fn create_campaign<B, R>(&self, data: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_create_campaign(data)?;
        self.send(request)
    }

    pub fn build_get_campaign<I: Display>(&self, id: I) -> HttpRequest {
        self.build_request(&format!("/campaigns/{id}"), RequestOptions::default())
    }

    pub fn get_campaign<I: Display, R: DeserializeOwned>(&self, id: I) -> Result<R, ApiError> {
        self.send(self.build_get_campaign(id))
    }

    pub fn build_update_campaign_progress<I, B>(&self, id: I, data: &B) -> Result<HttpRequest, ApiError>
    where
        I: Display,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::default()
            .method(HttpMethod::Patch)
            .body(json_body(data)?);
        Ok(self.build_request(&format!("/campaigns/{id}/progress"), options))
    }

    pub fn update_campaign_progress<I, B, R>(&self, id: I, data: &B) -> Result<R, ApiError>
    where
        I: Display,
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_update_campaign_progress(id, data)?;
        self.send(request)
    }

    // Health

    pub fn build_health_check(&self) -> HttpRequest {
        self.build_request("/health", RequestOptions::default())
    }

    pub fn health_check<R: DeserializeOwned>(&self) -> Result<R, ApiError> {
        self.send(self.build_health_check())
    }
}

/// Reject non-2xx responses without looking at the body, decode the rest.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::HttpStatus {
            status: response.status,
        })
    }
}

fn json_body<B: Serialize + ?Sized>(data: &B) -> Result<String, ApiError> {
    serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))
}
