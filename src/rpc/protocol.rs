//! Wire format: one newline-terminated UTF-8 JSON object per direction.
//!
//! ```text
//! → {"method":"CreateBlog","params":{...}}\n
//! ← {"result":...}\n   |   {"error":"..."}\n
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rpc::RpcError;

/// Terminates every frame.
pub const FRAME_DELIMITER: u8 = b'\n';

/// A single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Serialize as a complete frame, delimiter included.
    pub fn encode(&self) -> Result<Vec<u8>, RpcError> {
        let mut frame = serde_json::to_vec(self)?;
        frame.push(FRAME_DELIMITER);
        Ok(frame)
    }
}

/// The outcome reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    Result(Value),
    Error(String),
}

impl RpcResponse {
    /// Interpret a decoded frame.
    ///
    /// A non-empty `error` member wins over `result`; a frame with neither
    /// resolves to `null`.
    pub fn from_value(value: Value) -> Result<Self, RpcError> {
        let Value::Object(mut object) = value else {
            return Err(RpcError::Protocol("response is not a JSON object".to_string()));
        };

        match object.remove("error") {
            None | Some(Value::Null) => {}
            Some(Value::String(message)) if message.is_empty() => {}
            Some(Value::String(message)) => return Ok(RpcResponse::Error(message)),
            Some(Value::Bool(false)) => {}
            Some(other) => return Ok(RpcResponse::Error(other.to_string())),
        }

        Ok(RpcResponse::Result(object.remove("result").unwrap_or(Value::Null)))
    }

    /// Serialize as a complete frame. Used by backends and test doubles.
    pub fn encode(&self) -> Vec<u8> {
        let value = match self {
            RpcResponse::Result(result) => serde_json::json!({ "result": result }),
            RpcResponse::Error(message) => serde_json::json!({ "error": message }),
        };
        let mut frame = value.to_string().into_bytes();
        frame.push(FRAME_DELIMITER);
        frame
    }

    /// Resolve into the call's value, or reject with the backend's message.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self {
            RpcResponse::Result(value) => Ok(value),
            RpcResponse::Error(message) => Err(RpcError::Application(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_frame_is_newline_terminated() {
        let mut params = Map::new();
        params.insert("username".into(), json!("ana"));
        let frame = RpcRequest::new("GetProfile", params).encode().unwrap();

        assert_eq!(frame.last(), Some(&b'\n'));
        assert_eq!(frame.iter().filter(|b| **b == b'\n').count(), 1);
        let decoded: Value = serde_json::from_slice(&frame[..frame.len() - 1]).unwrap();
        assert_eq!(decoded, json!({"method": "GetProfile", "params": {"username": "ana"}}));
    }

    #[test]
    fn newlines_in_params_stay_escaped() {
        let mut params = Map::new();
        params.insert("description".into(), json!("line one\nline two"));
        let frame = RpcRequest::new("CreateBlog", params).encode().unwrap();
        assert_eq!(frame.iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn result_and_error_interpretation() {
        assert_eq!(
            RpcResponse::from_value(json!({"result": {"id": 1}})).unwrap(),
            RpcResponse::Result(json!({"id": 1}))
        );
        assert_eq!(
            RpcResponse::from_value(json!({"error": "bad input"})).unwrap(),
            RpcResponse::Error("bad input".into())
        );
        assert_eq!(
            RpcResponse::from_value(json!({"error": null, "result": [1, 2]})).unwrap(),
            RpcResponse::Result(json!([1, 2]))
        );
        assert_eq!(
            RpcResponse::from_value(json!({"error": "", "result": true})).unwrap(),
            RpcResponse::Result(json!(true))
        );
        assert_eq!(
            RpcResponse::from_value(json!({})).unwrap(),
            RpcResponse::Result(Value::Null)
        );
    }

    #[test]
    fn structured_error_is_stringified() {
        let response = RpcResponse::from_value(json!({"error": {"code": 7}})).unwrap();
        assert_eq!(response, RpcResponse::Error(r#"{"code":7}"#.into()));
    }

    #[test]
    fn non_object_is_protocol_error() {
        assert!(matches!(
            RpcResponse::from_value(json!([1, 2])),
            Err(RpcError::Protocol(_))
        ));
    }

    #[test]
    fn application_error_message_is_preserved() {
        let err = RpcResponse::Error("bad input".into()).into_result().unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }
}
