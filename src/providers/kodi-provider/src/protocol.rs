//! JSON-RPC 2.0 wire types for the media-center API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skinkit_core::DbId;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request body posted to the `jsonrpc` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Correlates the response with this request.
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Response envelope. Exactly one of `result`/`error` is expected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// A missing `result` without an error reads as `null`.
    pub fn into_result(self) -> Result<Value, RpcErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `{<id_param>: <id>, "properties": [...]}`
pub fn details_params(id_param: &str, id: &DbId, properties: &[&str]) -> Value {
    let mut params = Map::new();
    params.insert(id_param.to_string(), id.to_value());
    params.insert(
        "properties".to_string(),
        Value::Array(properties.iter().map(|p| Value::from(*p)).collect()),
    );
    Value::Object(params)
}
