//! Transport seam for the cloud provider: a trait so the client logic is
//! testable, plus the reqwest-backed production implementation.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Provider credentials and per-service regions. Built by Settings at
/// startup; never read from globals.
#[derive(Clone, Debug, Default)]
pub struct CloudSettings {
    pub secret_id: String,
    pub secret_key: String,
    pub translate_region: String,
    pub nlp_region: String,
}

impl CloudSettings {
    pub fn from_env() -> Self {
        CloudSettings {
            secret_id: std::env::var("TENCENT_CLOUD_SECRET_ID").unwrap_or_default(),
            secret_key: std::env::var("TENCENT_CLOUD_SECRET_KEY").unwrap_or_default(),
            translate_region: std::env::var("TENCENT_CLOUD_TMT_REGION")
                .unwrap_or_else(|_| "ap-beijing".into()),
            nlp_region: std::env::var("TENCENT_CLOUD_NLP_REGION")
                .unwrap_or_else(|_| "ap-guangzhou".into()),
        }
    }
}

/// One provider call: service ("tmt" or "nlp"), API action, JSON payload.
#[async_trait]
pub trait CloudTransport: Send + Sync {
    async fn call(&self, service: &str, action: &str, payload: Value) -> Result<Value, CloudError>;
}

/// HTTPS transport posting JSON to `{service}.tencentcloudapi.com`.
/// Request signing is out of scope here; credentials go out as headers.
pub struct HttpTransport {
    http: reqwest::Client,
    settings: CloudSettings,
}

impl HttpTransport {
    pub fn new(settings: CloudSettings) -> Self {
        HttpTransport {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn region_for(&self, service: &str) -> &str {
        match service {
            "tmt" => &self.settings.translate_region,
            _ => &self.settings.nlp_region,
        }
    }

    fn version_for(service: &str) -> &'static str {
        match service {
            "tmt" => "2018-03-21",
            _ => "2019-04-08",
        }
    }
}

#[async_trait]
impl CloudTransport for HttpTransport {
    async fn call(&self, service: &str, action: &str, payload: Value) -> Result<Value, CloudError> {
        let url = format!("https://{}.tencentcloudapi.com/", service);
        let resp = self
            .http
            .post(&url)
            .header("X-TC-Action", action)
            .header("X-TC-Version", Self::version_for(service))
            .header("X-TC-Region", self.region_for(service))
            .header("X-TC-SecretId", &self.settings.secret_id)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| CloudError::Malformed(e.to_string()))?;
        let response = body
            .get("Response")
            .cloned()
            .ok_or_else(|| CloudError::Malformed("missing Response".into()))?;
        if let Some(err) = response.get("Error") {
            return Err(CloudError::Provider {
                code: err
                    .get("Code")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                message: err
                    .get("Message")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            });
        }
        Ok(response)
    }
}
