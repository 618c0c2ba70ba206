//! Creation of monitored hosts for new domains
//!
//! Every group and template name must resolve before the single `host.create` call is
//! issued; a missing name aborts the whole operation with nothing created.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use crate::config::InterfaceConfig;
use crate::domain::utils::normalize_domain;
use crate::errors::Fault;
use crate::zabbix::{
    api,
    records::{GroupLink, HostCreateParams, InterfaceSpec, MacroSpec, TemplateLink},
    MonitoringBackend,
};

pub const HOSTNAME_MACRO: &str = "{$CERT.WEBSITE.HOSTNAME}";
pub const DEFAULT_GROUP: &str = "Domains";
pub const CERTIFICATE_TEMPLATE: &str = "Website certificate by Zabbix agent 2";
pub const DOMAIN_EXPIRY_TEMPLATE: &str = "Domain Expiry";
pub const DEFAULT_TEMPLATES: [&str; 2] = [CERTIFICATE_TEMPLATE, DOMAIN_EXPIRY_TEMPLATE];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedHost {
    pub hostid: String,
    pub domain: String,
    pub macro_name: &'static str,
}

impl CreatedHost {
    pub fn summary(&self) -> String {
        format!(
            "Host created: {} with macro {} = {}",
            self.hostid, self.macro_name, self.domain
        )
    }
}

pub fn build_host_params(
    domain: &str,
    interface: &InterfaceConfig,
    group_id: String,
    template_ids: Vec<String>,
) -> HostCreateParams {
    HostCreateParams {
        host: domain.to_string(),
        interfaces: vec![InterfaceSpec {
            kind: 1,
            main: 1,
            useip: 1,
            ip: interface.ip.clone(),
            dns: String::new(),
            port: interface.port.clone(),
        }],
        groups: vec![GroupLink { groupid: group_id }],
        templates: template_ids
            .into_iter()
            .map(|templateid| TemplateLink { templateid })
            .collect(),
        macros: vec![MacroSpec {
            name: HOSTNAME_MACRO.to_string(),
            value: domain.to_string(),
        }],
    }
}

/// Not idempotent: a second call for the same domain creates a second host or is
/// rejected by the backend.
pub async fn provision(
    backend: &dyn MonitoringBackend,
    interface: &InterfaceConfig,
    domain: &str,
    group_name: &str,
    template_names: &[String],
) -> Result<CreatedHost, Fault> {
    let domain = normalize_domain(domain)?;

    let group_id = api::find_group_id(backend, group_name).await?;
    let template_ids = try_join_all(
        template_names
            .iter()
            .map(|name| api::find_template_id(backend, name)),
    )
    .await?;

    let params = build_host_params(&domain, interface, group_id, template_ids);
    let hostid = api::create_host(backend, &params).await?;

    info!(domain = %domain, hostid = %hostid, group = group_name, "monitored host created");

    Ok(CreatedHost {
        hostid,
        domain,
        macro_name: HOSTNAME_MACRO,
    })
}
