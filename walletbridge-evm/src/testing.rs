//! JSON-RPC fixtures for wiremock-backed tests.

use alloy_signer_local::PrivateKeySigner;
use serde_json::{Value, json};
use wiremock::matchers::body_partial_json;
use wiremock::{Request, Respond, ResponseTemplate};

/// Throwaway key used across tests.
pub(crate) const TEST_KEY: &str =
    "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub(crate) fn test_signer() -> PrivateKeySigner {
    TEST_KEY.parse().unwrap()
}

/// Matches a JSON-RPC call by method name.
pub(crate) fn rpc_method(method: &str) -> impl wiremock::Match + 'static {
    body_partial_json(json!({ "method": method }))
}

/// Replies to a JSON-RPC call, echoing the request id.
pub(crate) struct RpcReply(Result<Value, (i64, String)>);

impl RpcReply {
    pub(crate) fn ok(result: impl Into<Value>) -> Self {
        Self(Ok(result.into()))
    }

    pub(crate) fn error(code: i64, message: &str) -> Self {
        Self(Err((code, message.to_owned())))
    }
}

impl Respond for RpcReply {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let id = body.get("id").cloned().unwrap_or(Value::Null);
        let payload = match &self.0 {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            }),
        };
        ResponseTemplate::new(200).set_body_json(payload)
    }
}
