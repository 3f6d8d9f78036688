//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only seam where I/O happens. `UreqTransport` runs the
//! blocking `ureq` agent on tokio's blocking pool so async callers never
//! stall the scheduler. Status codes are returned as data, never as errors:
//! interpreting them is `ApiClient`'s job.

use std::time::Duration;

use async_trait::async_trait;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations return `ApiError::Network` when no response was received
/// and `Ok` for every response that was, whatever its status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Network(format!("transport task failed: {e}")))?
    }
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    log::debug!("{} {}", req.method.as_str(), req.path);

    let result = match req.method {
        HttpMethod::Get => without_body(agent.get(&req.path), &req.headers).call(),
        HttpMethod::Delete => without_body(agent.delete(&req.path), &req.headers).call(),
        HttpMethod::Post => send(with_body(agent.post(&req.path), &req.headers), req.body),
        HttpMethod::Put => send(with_body(agent.put(&req.path), &req.headers), req.body),
        HttpMethod::Patch => send(with_body(agent.patch(&req.path), &req.headers), req.body),
    };

    let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Network(e.to_string()))?;

    log::debug!("{} {} -> {status}", req.method.as_str(), req.path);
    Ok(HttpResponse::new(status, body))
}

fn without_body(
    mut builder: RequestBuilder<WithoutBody>,
    headers: &[(String, String)],
) -> RequestBuilder<WithoutBody> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn with_body(
    mut builder: RequestBuilder<WithBody>,
    headers: &[(String, String)],
) -> RequestBuilder<WithBody> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
