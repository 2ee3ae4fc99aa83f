//! Signed forwarding of application payloads to external automation workflows.

mod router;
mod signing;

pub use router::relay_router;
pub use signing::{sign_payload, verify_signature};

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RelaySettings;

pub const ORIGIN_HEADER: &str = "x-origin";
pub const SIGNATURE_HEADER: &str = "x-signature";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Endpoints and credentials for the workflow relay.
#[derive(Clone)]
pub struct RelayConfig {
    pub shared_secret: Option<String>,
    pub origin: String,
    pub endpoints: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn new(secret: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            shared_secret: Some(secret.into()),
            origin: origin.into(),
            endpoints: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, workflow: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(workflow.into(), url.into());
        self
    }
}

impl From<&RelaySettings> for RelayConfig {
    fn from(settings: &RelaySettings) -> Self {
        Self {
            shared_secret: settings.shared_secret.clone(),
            origin: settings.origin.clone(),
            endpoints: settings.workflows.clone(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "***"))
            .field("origin", &self.origin)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub workflow: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Upstream reply, passed back without interpretation. `body` holds the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no endpoint configured for workflow '{0}'")]
    UnknownWorkflow(String),
    #[error("relay shared secret is not configured")]
    MissingSecret,
    #[error("relay shared secret cannot key HMAC-SHA256")]
    InvalidSecret,
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payload could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP client forwarding signed payloads to named workflow endpoints.
pub struct WorkflowRelay {
    client: reqwest::Client,
    config: RelayConfig,
}

impl WorkflowRelay {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn workflows(&self) -> impl Iterator<Item = &str> {
        self.config.endpoints.keys().map(String::as_str)
    }

    pub async fn relay(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let url = self
            .config
            .endpoints
            .get(&request.workflow)
            .ok_or_else(|| RelayError::UnknownWorkflow(request.workflow.clone()))?;
        let secret = self
            .config
            .shared_secret
            .as_deref()
            .ok_or(RelayError::MissingSecret)?;

        let body = serde_json::to_vec(&request.payload)?;
        let signature = sign_payload(secret, &body)?;

        info!(workflow = %request.workflow, bytes = body.len(), "relaying workflow payload");
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN_HEADER, &self.config.origin)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;

        if !status.is_success() {
            warn!(
                workflow = %request.workflow,
                status = status.as_u16(),
                "workflow endpoint returned an error"
            );
        }

        Ok(RelayResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings_keeps_endpoints_and_masks_secret() {
        let mut workflows = BTreeMap::new();
        workflows.insert(
            "inspection-complete".to_string(),
            "https://hooks.example.test/complete".to_string(),
        );
        let settings = RelaySettings {
            shared_secret: Some("s3cret".to_string()),
            origin: "inspection-ai".to_string(),
            workflows,
        };

        let config = RelayConfig::from(&settings);
        assert_eq!(
            config.endpoints.get("inspection-complete").map(String::as_str),
            Some("https://hooks.example.test/complete")
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
    }

    #[tokio::test]
    async fn unknown_workflow_is_rejected_before_any_request() {
        let relay = WorkflowRelay::new(RelayConfig::new("secret", "inspection-ai"))
            .expect("client builds");
        let err = relay
            .relay(RelayRequest {
                workflow: "missing".to_string(),
                payload: serde_json::json!({}),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UnknownWorkflow(name) if name == "missing"));
    }

    #[tokio::test]
    async fn missing_secret_is_reported() {
        let mut config = RelayConfig::new("unused", "inspection-ai")
            .with_endpoint("notify", "http://127.0.0.1:9/hook");
        config.shared_secret = None;
        let relay = WorkflowRelay::new(config).expect("client builds");

        let err = relay
            .relay(RelayRequest {
                workflow: "notify".to_string(),
                payload: serde_json::json!({ "id": "insp-1" }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingSecret));
    }
}
