use serde::ser::SerializeStruct;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use thiserror::Error;

use crate::application::rpc::core::error::RpcError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    #[error("Parse error")]
    ParseError,
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Method not found")]
    MethodNotFound,
    #[error("Invalid params")]
    InvalidParams,
    #[error("Internal error")]
    InternalError,
    #[error("{message}")]
    Custom {
        code: i32,
        message: String,
        data: Option<Value>,
    },
}

impl JsonError {
    /// code for implementation defined server errors
    pub const SERVER_ERROR_CODE: i32 = -32000;

    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Custom { code, .. } => *code,
        }
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Custom { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

impl From<RpcError> for JsonError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Server(error) => error,
            err => JsonError::Custom {
                code: err.code(),
                message: err.to_string(),
                // the error is plain data; a failure here leaves the kind to
                // the code alone.
                data: serde_json::to_value(&err).ok(),
            },
        }
    }
}

impl From<JsonError> for RpcError {
    fn from(err: JsonError) -> Self {
        match err {
            JsonError::Custom {
                code,
                message,
                data: Some(value),
            } => match serde_json::from_value(value.clone()) {
                Ok(rpc_error) => rpc_error,
                Err(_) => RpcError::Server(JsonError::Custom {
                    code,
                    message,
                    data: Some(value),
                }),
            },
            err => RpcError::Server(err),
        }
    }
}

impl Serialize for JsonError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("JsonError", 3)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.to_string())?;

        if let Some(data) = self.data() {
            state.serialize_field("data", data)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for JsonError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            code: i32,
            message: String,
            data: Option<serde_json::Value>,
        }

        let err = Envelope::deserialize(deserializer)?;

        // errors carrying data are server errors whatever their code.
        if err.data.is_some() {
            return Ok(JsonError::Custom {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        match err.code {
            -32700 => Ok(JsonError::ParseError),
            -32600 => Ok(JsonError::InvalidRequest),
            -32601 => Ok(JsonError::MethodNotFound),
            -32602 => Ok(JsonError::InvalidParams),
            -32603 => Ok(JsonError::InternalError),
            code => Ok(JsonError::Custom {
                code,
                message: err.message,
                data: None,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonResponse {
    Success {
        #[serde(skip_deserializing)]
        jsonrpc: &'static str,
        id: Option<Value>,
        result: Value,
    },
    Error {
        #[serde(skip_deserializing)]
        jsonrpc: &'static str,
        id: Option<Value>,
        error: JsonError,
    },
}

impl JsonResponse {
    pub const VERSION: &'static str = "2.0";

    pub fn success(id: Option<Value>, result: Value) -> Self {
        JsonResponse::Success {
            jsonrpc: Self::VERSION,
            id,
            result,
        }
    }

    pub fn error(id: Option<Value>, error: JsonError) -> Self {
        JsonResponse::Error {
            jsonrpc: Self::VERSION,
            id,
            error,
        }
    }
}
