//! poslint-vk
//!
//! Thin VK API client for the poslint auditor. It wraps the single method
//! the auditor needs, `groups.getById` with extra fields, behind a typed
//! interface with a bounded exponential-backoff retry policy. Group payloads
//! are returned as raw `serde_json::Value` objects; interpretation belongs
//! to `poslint-core`.

pub mod error;

pub use crate::error::{VkError, VkResult};

use serde_json::Value;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

/// Default API endpoint root.
pub const DEFAULT_API_BASE: &str = "https://api.vk.com/method";

/// Pinned API version; responses are `{response:{groups:[...]}}` from 5.199 on.
pub const DEFAULT_API_VERSION: &str = "5.199";

/// Maximum group ids per `groups.getById` call.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct VkClientConfig {
    pub access_token: String,
    pub api_version: String,
    pub api_base: String,
    /// Retry attempts after the first failure.
    pub max_retries: usize,
    /// Base delay of the exponential backoff, in milliseconds.
    pub retry_base_ms: u64,
}

impl Default for VkClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_retries: 5,
            retry_base_ms: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VkClient {
    http: reqwest::Client,
    cfg: VkClientConfig,
}

impl VkClient {
    pub fn new(cfg: VkClientConfig) -> VkResult<Self> {
        if cfg.access_token.trim().is_empty() {
            return Err(VkError::config("access token must not be empty"));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, cfg })
    }

    /// Fetch group payloads by id or screen name.
    ///
    /// One API call per invocation; the caller batches ids (at most
    /// [`DEFAULT_BATCH_SIZE`] per call). Retries transport and rate-limit
    /// failures with jittered exponential backoff; permanent API errors
    /// surface immediately.
    pub async fn groups_get_by_id(
        &self,
        group_ids: &[String],
        fields: &[String],
    ) -> VkResult<Vec<Value>> {
        // Delays double from ~2x the base: 1s, 2s, 4s, ... for the default.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.cfg.retry_base_ms)
            .map(jitter)
            .take(self.cfg.max_retries);

        RetryIf::spawn(
            strategy,
            || self.groups_get_by_id_once(group_ids, fields),
            |e: &VkError| {
                let retry = e.is_retryable();
                if retry {
                    tracing::warn!(error = %e, "retrying groups.getById");
                }
                retry
            },
        )
        .await
    }

    async fn groups_get_by_id_once(
        &self,
        group_ids: &[String],
        fields: &[String],
    ) -> VkResult<Vec<Value>> {
        tracing::debug!(ids = group_ids.len(), "groups.getById");

        let params = [
            ("group_ids", group_ids.join(",")),
            ("fields", fields.join(",")),
            ("access_token", self.cfg.access_token.clone()),
            ("v", self.cfg.api_version.clone()),
        ];

        let resp = self
            .http
            .post(format!("{}/groups.getById", self.cfg.api_base))
            .form(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = resp.json().await?;
        parse_groups_response(&body)
    }
}

/// Decode a `groups.getById` response body.
///
/// Accepts both the modern `{response:{groups:[...]}}` envelope and the
/// legacy `{response:[...]}` array form.
pub fn parse_groups_response(body: &Value) -> VkResult<Vec<Value>> {
    if let Some(err) = body.get("error") {
        let code = err.get("error_code").and_then(Value::as_i64).unwrap_or(-1);
        let msg = err
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(VkError::api(code, msg));
    }

    let response = body
        .get("response")
        .ok_or_else(|| VkError::decode("missing response field"))?;

    let groups = match response {
        Value::Array(items) => items.clone(),
        Value::Object(_) => response
            .get("groups")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| VkError::decode("missing response.groups array"))?,
        _ => return Err(VkError::decode("response is neither array nor object")),
    };

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_modern_envelope() {
        let body = json!({ "response": { "groups": [{ "id": 1 }, { "id": 2 }] } });
        let groups = parse_groups_response(&body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["id"], 1);
    }

    #[test]
    fn decodes_legacy_array() {
        let body = json!({ "response": [{ "id": 7 }] });
        let groups = parse_groups_response(&body).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn api_error_maps_to_vk_error() {
        let body = json!({ "error": { "error_code": 5, "error_msg": "User authorization failed" } });
        let err = parse_groups_response(&body).unwrap_err();
        match err {
            VkError::Api { code, msg } => {
                assert_eq!(code, 5);
                assert!(msg.contains("authorization"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = parse_groups_response(&json!({ "unexpected": true })).unwrap_err();
        assert!(matches!(err, VkError::Decode(_)));
    }

    #[test]
    fn empty_token_rejected_at_construction() {
        assert!(VkClient::new(VkClientConfig::default()).is_err());
    }
}
