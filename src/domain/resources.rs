//! Model Context Protocol static resource providers
//!
//! Exposes the domain status report and the host inventory as JSON documents under
//! `resource://` URIs.

use rust_mcp_sdk::schema::{
    ReadResourceContent, ReadResourceRequestParams, ReadResourceResult, Resource,
    TextResourceContents,
};
use serde_json::{json, Value};

use crate::domain::reconcile::reconcile;
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result,
};
use crate::{errors::AppError, zabbix::api, AppState};

pub const DOMAIN_STATUS_RESOURCE_URI: &str = "resource://domains/status";
pub const HOST_INVENTORY_RESOURCE_URI: &str = "resource://hosts/inventory";

fn json_resource(name: &str, description: &str, uri: &str) -> Resource {
    Resource {
        annotations: None,
        description: Some(description.to_string()),
        icons: vec![],
        meta: None,
        mime_type: Some("application/json".to_string()),
        name: name.to_string(),
        size: None,
        title: None,
        uri: uri.to_string(),
    }
}

pub fn build_resources_list() -> Vec<Resource> {
    vec![
        json_resource(
            "Domain Status Report",
            "SSL and WHOIS expiry for every host carrying a domain monitoring template",
            DOMAIN_STATUS_RESOURCE_URI,
        ),
        json_resource(
            "Host Inventory",
            "All Zabbix hosts with ID and status",
            HOST_INVENTORY_RESOURCE_URI,
        ),
    ]
}

fn read_result(id: Option<Value>, uri: &str, document: Value) -> Value {
    let result = serde_json::to_value(ReadResourceResult {
        contents: vec![ReadResourceContent::from(TextResourceContents {
            meta: None,
            mime_type: Some("application/json".to_string()),
            text: document.to_string(),
            uri: uri.to_string(),
        })],
        meta: None,
    })
    .expect("read resource result serialization");

    json_rpc_result(id, result)
}

pub async fn handle_resources_read(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let resource_read: ReadResourceRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };

    match resource_read.uri.as_str() {
        DOMAIN_STATUS_RESOURCE_URI => {
            match reconcile(state.backend.as_ref(), state.lookups.as_ref()).await {
                Ok(records) => read_result(
                    id,
                    DOMAIN_STATUS_RESOURCE_URI,
                    json!({ "domains": records }),
                ),
                Err(fault) => app_error_to_json_rpc(id, AppError::from(fault)),
            }
        }
        HOST_INVENTORY_RESOURCE_URI => match api::list_hosts(state.backend.as_ref()).await {
            Ok(hosts) => read_result(id, HOST_INVENTORY_RESOURCE_URI, json!({ "hosts": hosts })),
            Err(fault) => app_error_to_json_rpc(id, AppError::from(fault)),
        },
        _ => json_rpc_error_with_data(
            id,
            -32601,
            "Method not found",
            Some(json!({
                "code": "resource_not_found",
                "message": "unknown resource uri",
                "details": {
                    "uri": resource_read.uri,
                },
            })),
        ),
    }
}
