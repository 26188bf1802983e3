//! Blocking JSON-RPC transport over HTTP.

use crate::protocol::{RpcRequest, RpcResponse};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use skinkit_core::KodiConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors from a single JSON-RPC round trip.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("authentication rejected by {endpoint}")]
    Unauthorized { endpoint: String },
    #[error("{method} returned HTTP {status}")]
    Http { method: String, status: u16 },
    #[error("failed to decode {method} response: {message}")]
    Decode { method: String, message: String },
    #[error("{method} failed with code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },
    #[error("request/response ID mismatch: sent {sent}, received {received}")]
    IdMismatch { sent: u64, received: u64 },
}

pub type RpcResult<T> = Result<T, RpcError>;

/// One JSON-RPC call in, the `result` member out.
pub trait RpcTransport: Send + Sync {
    fn call(&self, method: &str, params: Value) -> RpcResult<Value>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
    request_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &KodiConfig) -> RpcResult<Self> {
        let endpoint = Url::parse(&config.url).map_err(|e| RpcError::InvalidEndpoint {
            url: config.url.clone(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.timeout())
            .build()
            .map_err(|e| RpcError::Network {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RpcTransport for HttpTransport {
    fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        tracing::debug!(id, method, "sending json-rpc request");

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }
        let resp = builder.send().map_err(|e| RpcError::Network {
            message: e.to_string(),
        })?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(RpcError::Unauthorized {
                    endpoint: self.endpoint.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(RpcError::Http {
                    method: method.to_string(),
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body: RpcResponse = resp.json().map_err(|e| RpcError::Decode {
            method: method.to_string(),
            message: e.to_string(),
        })?;

        if let Some(received) = body.id {
            if received != id {
                return Err(RpcError::IdMismatch { sent: id, received });
            }
        }

        body.into_result().map_err(|err| RpcError::Remote {
            method: method.to_string(),
            code: err.code,
            message: err.message,
        })
    }
}
