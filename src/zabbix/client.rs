use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{config::ZabbixConfig, errors::Fault};

#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    /// Issues one JSON-RPC call and returns the `result` member of the response.
    async fn invoke(&self, method: &str, params: Value) -> Result<Value, Fault>;
}

#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

pub struct ZabbixClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    next_id: AtomicU64,
}

impl ZabbixClient {
    pub fn new(config: &ZabbixConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl MonitoringBackend for ZabbixClient {
    async fn invoke(&self, method: &str, params: Value) -> Result<Value, Fault> {
        let id = self.next_request_id();
        let envelope = RequestEnvelope {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        let body = serde_json::to_vec(&envelope)
            .map_err(|err| Fault::protocol(method, format!("unable to encode request: {err}")))?;

        debug!(method, request_id = id, "calling zabbix api");

        let response = self
            .http
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json-rpc")
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .body(body)
            .send()
            .await
            .map_err(|err| {
                warn!(method, request_id = id, error = %err, "zabbix api unreachable");
                Fault::transport(method, err)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(method, request_id = id, status = status.as_u16(), "zabbix api returned failure status");
            return Err(Fault::backend(method, format!("HTTP {status}")));
        }

        let payload: Value = response.json().await.map_err(|err| {
            if err.is_timeout() {
                Fault::transport(method, err)
            } else {
                Fault::protocol(method, format!("response body is not JSON: {err}"))
            }
        })?;

        extract_result(method, payload)
    }
}

/// Unwraps a JSON-RPC response body into its `result` member.
pub fn extract_result(method: &str, mut payload: Value) -> Result<Value, Fault> {
    if let Some(error) = payload.get("error") {
        let message = error.get("message").and_then(Value::as_str).unwrap_or("error");
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let detail = match error.get("data").and_then(Value::as_str) {
            Some(data) if !data.is_empty() => format!("{message} {data} (code {code})"),
            _ => format!("{message} (code {code})"),
        };
        return Err(Fault::backend(method, detail));
    }

    payload
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| Fault::protocol(method, "response has no result field"))
}
