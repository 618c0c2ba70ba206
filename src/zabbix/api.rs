use serde_json::json;

use crate::errors::Fault;
use crate::zabbix::{
    records::{
        decode, GroupRecord, HostCreateParams, HostCreateResult, HostId, HostSummary,
        HostWithItems, TemplateRecord, TemplatedHost,
    },
    MonitoringBackend,
};

pub async fn list_hosts(backend: &dyn MonitoringBackend) -> Result<Vec<HostSummary>, Fault> {
    let result = backend
        .invoke(
            "host.get",
            json!({"output": ["hostid", "host", "name", "status"]}),
        )
        .await?;
    decode("host.get", result)
}

pub async fn list_host_ids(backend: &dyn MonitoringBackend) -> Result<Vec<HostId>, Fault> {
    let result = backend
        .invoke("host.get", json!({"output": ["hostid"]}))
        .await?;
    decode("host.get", result)
}

pub async fn list_templated_hosts(
    backend: &dyn MonitoringBackend,
) -> Result<Vec<TemplatedHost>, Fault> {
    let result = backend
        .invoke(
            "host.get",
            json!({
                "output": ["hostid", "host", "name", "status"],
                "selectParentTemplates": ["name"]
            }),
        )
        .await?;
    decode("host.get", result)
}

/// First host whose visible name matches `host_name`, with its items.
pub async fn find_host_items(
    backend: &dyn MonitoringBackend,
    host_name: &str,
) -> Result<HostWithItems, Fault> {
    let result = backend
        .invoke(
            "host.get",
            json!({
                "output": ["hostid", "name"],
                "search": {"name": host_name},
                "selectItems": ["itemid", "name", "key_", "lastvalue"]
            }),
        )
        .await?;

    let hosts: Vec<HostWithItems> = decode("host.get", result)?;
    hosts
        .into_iter()
        .next()
        .ok_or_else(|| Fault::not_found("host", host_name))
}

pub async fn find_group_id(
    backend: &dyn MonitoringBackend,
    group_name: &str,
) -> Result<String, Fault> {
    let result = backend
        .invoke(
            "hostgroup.get",
            json!({"output": ["groupid"], "filter": {"name": [group_name]}}),
        )
        .await?;

    let groups: Vec<GroupRecord> = decode("hostgroup.get", result)?;
    groups
        .into_iter()
        .next()
        .map(|group| group.groupid)
        .ok_or_else(|| Fault::not_found("group", group_name))
}

pub async fn find_template_id(
    backend: &dyn MonitoringBackend,
    template_name: &str,
) -> Result<String, Fault> {
    let result = backend
        .invoke(
            "template.get",
            json!({"output": ["templateid"], "filter": {"host": [template_name]}}),
        )
        .await?;

    let templates: Vec<TemplateRecord> = decode("template.get", result)?;
    templates
        .into_iter()
        .next()
        .map(|template| template.templateid)
        .ok_or_else(|| Fault::not_found("template", template_name))
}

pub async fn create_host(
    backend: &dyn MonitoringBackend,
    params: &HostCreateParams,
) -> Result<String, Fault> {
    let params = serde_json::to_value(params).map_err(|err| Fault::protocol("host.create", err))?;
    let result = backend.invoke("host.create", params).await?;

    let created: HostCreateResult = decode("host.create", result)?;
    created
        .hostids
        .into_iter()
        .next()
        .ok_or_else(|| Fault::protocol("host.create", "response carries no host id"))
}
