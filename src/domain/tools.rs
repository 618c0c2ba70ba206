//! Interactive tools exposed via Model Context Protocol
//!
//! Each tool delegates to the reconciliation, inventory, metric or provisioning logic and
//! returns one text block per line plus a structured copy of the same data. Backend faults
//! come back as tool results flagged `isError` so the caller sees the failure text.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::{
    inventory::{filter_hosts_by_name_contains, host_line, total_line},
    metrics::{disk_space_report, memory_disk_report},
    provision::{provision, DEFAULT_GROUP, DEFAULT_TEMPLATES},
    reconcile::reconcile,
    utils::{
        normalize_domain, normalize_group_name, normalize_host_name, normalize_template_names,
        ESXI_NAME_FILTER,
    },
};
use crate::mcp::rpc::{app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result};
use crate::{
    errors::{AppError, Fault},
    zabbix::api,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct HostNameParams {
    pub host_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDomainHostParams {
    pub domain: String,
    pub group_name: Option<String>,
    pub template_names: Option<Vec<String>>,
}

#[macros::mcp_tool(
    name = "get_domain_status",
    description = "Get domain SSL and WHOIS expiry data from Zabbix-monitored hosts"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetDomainStatusTool {}

#[macros::mcp_tool(name = "get_host_list", description = "List all Zabbix hosts with ID and status")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetHostListTool {}

#[macros::mcp_tool(
    name = "get_esxi_host_list",
    description = "List Zabbix hosts whose name contains 'esxi'"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetEsxiHostListTool {}

#[macros::mcp_tool(name = "get_total_hosts", description = "Count the hosts known to Zabbix")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetTotalHostsTool {}

#[macros::mcp_tool(
    name = "get_host_memory_disk",
    description = "Show memory and disk items for the first host matching a name"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetHostMemoryDiskTool {
    pub host_name: String,
}

#[macros::mcp_tool(
    name = "get_host_disk_space",
    description = "Show disk total and available space in GB for the first host matching a name"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetHostDiskSpaceTool {
    pub host_name: String,
}

#[macros::mcp_tool(
    name = "create_domain_host",
    description = "Create a Zabbix host for a domain with certificate and domain expiry templates"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CreateDomainHostTool {
    pub domain: String,
    pub group_name: Option<String>,
    pub template_names: Option<Vec<String>>,
}

pub fn build_tools_list() -> Vec<Tool> {
    vec![
        GetDomainStatusTool::tool(),
        GetHostListTool::tool(),
        GetEsxiHostListTool::tool(),
        GetTotalHostsTool::tool(),
        GetHostMemoryDiskTool::tool(),
        GetHostDiskSpaceTool::tool(),
        CreateDomainHostTool::tool(),
    ]
}

fn text_blocks<I>(lines: I) -> Vec<ContentBlock>
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .map(|line| ContentBlock::from(TextContent::new(line, None, None)))
        .collect()
}

fn success(id: Option<Value>, lines: Vec<String>, structured: Map<String, Value>) -> Value {
    json_rpc_result(
        id,
        serde_json::to_value(CallToolResult {
            content: text_blocks(lines),
            is_error: None,
            meta: None,
            structured_content: Some(structured),
        })
        .expect("tool result serialization"),
    )
}

fn failure(id: Option<Value>, tool: &str, fault: Fault) -> Value {
    warn!(tool, error = %fault, "tool call failed");
    json_rpc_result(
        id,
        serde_json::to_value(CallToolResult {
            content: text_blocks([fault.to_string()]),
            is_error: Some(true),
            meta: None,
            structured_content: None,
        })
        .expect("tool error result serialization"),
    )
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    arguments: Option<Map<String, Value>>,
) -> Option<T> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default())).ok()
}

pub async fn handle_tools_call(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };

    let backend = state.backend.as_ref();
    let tool = tool_call.name.as_str();

    match tool {
        "get_domain_status" => match reconcile(backend, state.lookups.as_ref()).await {
            Ok(records) => {
                let lines = records
                    .iter()
                    .map(|record| json!(record).to_string())
                    .collect();
                success(
                    id,
                    lines,
                    Map::from_iter([
                        ("total".to_string(), json!(records.len())),
                        ("domains".to_string(), json!(records)),
                    ]),
                )
            }
            Err(fault) => failure(id, tool, fault),
        },
        "get_host_list" | "get_esxi_host_list" => match api::list_hosts(backend).await {
            Ok(mut hosts) => {
                if tool == "get_esxi_host_list" {
                    hosts = filter_hosts_by_name_contains(hosts, ESXI_NAME_FILTER);
                }
                let lines = hosts.iter().map(host_line).collect();
                success(
                    id,
                    lines,
                    Map::from_iter([
                        ("total".to_string(), json!(hosts.len())),
                        ("hosts".to_string(), json!(hosts)),
                    ]),
                )
            }
            Err(fault) => failure(id, tool, fault),
        },
        "get_total_hosts" => match api::list_host_ids(backend).await {
            Ok(hosts) => success(
                id,
                vec![total_line(hosts.len())],
                Map::from_iter([("total".to_string(), json!(hosts.len()))]),
            ),
            Err(fault) => failure(id, tool, fault),
        },
        "get_host_memory_disk" | "get_host_disk_space" => {
            let Some(query_params) = parse_arguments::<HostNameParams>(tool_call.arguments) else {
                return json_rpc_error(id, -32602, "Invalid params");
            };
            let host_name = match normalize_host_name(query_params.host_name) {
                Ok(value) => value,
                Err(err) => return app_error_to_json_rpc(id, err),
            };

            match api::find_host_items(backend, &host_name).await {
                Ok(host) => {
                    let lines = if tool == "get_host_memory_disk" {
                        memory_disk_report(&host.items)
                    } else {
                        disk_space_report(&host.items)
                    };
                    success(
                        id,
                        lines.clone(),
                        Map::from_iter([
                            ("hostid".to_string(), json!(host.hostid)),
                            ("host".to_string(), json!(host.name)),
                            ("lines".to_string(), json!(lines)),
                        ]),
                    )
                }
                Err(fault) => failure(id, tool, fault),
            }
        }
        "create_domain_host" => {
            let Some(create_params) =
                parse_arguments::<CreateDomainHostParams>(tool_call.arguments)
            else {
                return json_rpc_error(id, -32602, "Invalid params");
            };
            if let Err(fault) = normalize_domain(&create_params.domain) {
                warn!(tool, error = %fault, "rejected domain argument");
                return app_error_to_json_rpc(
                    id,
                    AppError::bad_request("invalid_domain", "domain must be a valid DNS name"),
                );
            }
            let template_names =
                match normalize_template_names(create_params.template_names, &DEFAULT_TEMPLATES) {
                    Ok(value) => value,
                    Err(err) => return app_error_to_json_rpc(id, err),
                };
            let group_name = normalize_group_name(create_params.group_name, DEFAULT_GROUP);

            match provision(
                backend,
                &state.interface,
                &create_params.domain,
                &group_name,
                &template_names,
            )
            .await
            {
                Ok(created) => success(
                    id,
                    vec![created.summary()],
                    Map::from_iter([
                        ("hostid".to_string(), json!(created.hostid)),
                        ("domain".to_string(), json!(created.domain)),
                        ("macro".to_string(), json!(created.macro_name)),
                        ("group".to_string(), json!(group_name)),
                        ("templates".to_string(), json!(template_names)),
                    ]),
                ),
                Err(fault) => failure(id, tool, fault),
            }
        }
        _ => json_rpc_error_with_data(
            id,
            -32601,
            "Method not found",
            Some(json!({
                "code": "tool_not_found",
                "message": "unknown tool name",
                "details": {
                    "name": tool_call.name,
                },
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::build_tools_list;

    #[test]
    fn lists_every_tool_in_order() {
        let names: Vec<_> = build_tools_list().into_iter().map(|tool| tool.name).collect();
        assert_eq!(
            names,
            vec![
                "get_domain_status",
                "get_host_list",
                "get_esxi_host_list",
                "get_total_hosts",
                "get_host_memory_disk",
                "get_host_disk_space",
                "create_domain_host",
            ]
        );
    }
}
