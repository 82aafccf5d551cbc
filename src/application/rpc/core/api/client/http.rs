use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::application::rpc::auth::Token;
use crate::application::rpc::core::api::client::transport::Transport;
use crate::application::rpc::core::error::RpcError;
use crate::application::rpc::core::error::RpcResult;
use crate::application::rpc::core::model::json::JsonError;
use crate::application::rpc::core::model::json::JsonRequest;

/// [Transport] posting JSON-RPC requests over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    url: String,
    client: Client,
    token: Option<Token>,
    last_id: Arc<AtomicU64>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            token: None,
            last_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// presents `token` as bearer token on every call
    pub fn with_token(mut self, token: impl Into<Token>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: &str, params: serde_json::Value) -> RpcResult<serde_json::Value> {
        let request = JsonRequest {
            jsonrpc: Some("2.0".to_string()),
            method: method.to_string(),
            params,
            id: Some(self.last_id.fetch_add(1, Ordering::SeqCst).into()),
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = self.token.as_ref().and_then(Token::as_str) {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            debug!("{method} request to {} failed: {e}", self.url);
            RpcError::Server(JsonError::InternalError)
        })?;
        if !response.status().is_success() {
            debug!("{method} returned HTTP status {}", response.status());
            return Err(RpcError::Server(JsonError::InternalError));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|_| RpcError::Server(JsonError::ParseError))?;

        if let Some(error_val) = value.get("error") {
            let error: JsonError = serde_json::from_value(error_val.clone())
                .unwrap_or(JsonError::InternalError);
            return Err(error.into());
        }

        value
            .get("result")
            .cloned()
            .ok_or(RpcError::Server(JsonError::InvalidRequest))
    }
}
