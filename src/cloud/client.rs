//! Cloud translation/chat client. Failures never escape: translation falls
//! back to the source text, chat reports a failure-flagged result.

use crate::cloud::transport::{CloudSettings, CloudTransport, HttpTransport};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct CloudClient {
    transport: Arc<dyn CloudTransport>,
}

impl CloudClient {
    pub fn new(settings: CloudSettings) -> Self {
        CloudClient {
            transport: Arc::new(HttpTransport::new(settings)),
        }
    }

    /// Swap the transport (tests, alternative providers).
    pub fn with_transport(transport: Arc<dyn CloudTransport>) -> Self {
        CloudClient { transport }
    }

    /// Translate `source_text` from `source` (callers default to "zh") to
    /// `target`. Any failure degrades to returning the input unchanged.
    pub async fn translate_text(&self, source_text: &str, target: &str, source: &str) -> String {
        let payload = json!({
            "SourceText": source_text,
            "Source": source,
            "Target": target,
            "ProjectId": 0,
        });
        match self.transport.call("tmt", "TextTranslate", payload).await {
            Ok(resp) => match resp.get("TargetText").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => {
                    tracing::warn!("translate: response missing TargetText");
                    source_text.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "translate failed, returning source text");
                source_text.to_string()
            }
        }
    }

    /// Small-talk chat. Success merges `"result": true` into the provider
    /// response; any failure yields `{"result": false, "message": ...}`.
    pub async fn chat(&self, content: &str) -> Value {
        let payload = json!({ "Query": content });
        match self.transport.call("nlp", "ChatBot", payload).await {
            Ok(Value::Object(mut resp)) => {
                resp.insert("result".into(), Value::Bool(true));
                Value::Object(resp)
            }
            Ok(other) => {
                tracing::warn!("chat: unexpected response shape");
                json!({ "result": false, "message": format!("unexpected response: {}", other) })
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat failed");
                json!({ "result": false, "message": e.to_string() })
            }
        }
    }
}
