//! Domain status report: backend inventory cross-referenced with live TLS and WHOIS facts

use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::domain::provision::{CERTIFICATE_TEMPLATE, DOMAIN_EXPIRY_TEMPLATE};
use crate::errors::{Fault, LookupFault};
use crate::lookup::ExpiryLookup;
use crate::zabbix::{
    api,
    records::{HostStatus, TemplatedHost},
    MonitoringBackend,
};

pub const RECOGNIZED_TEMPLATES: [&str; 2] = [DOMAIN_EXPIRY_TEMPLATE, CERTIFICATE_TEMPLATE];

pub type ExpiryOutcome = Result<NaiveDate, LookupFault>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainStatusRecord {
    pub name: String,
    pub host: String,
    pub status: HostStatus,
    #[serde(serialize_with = "serialize_expiry")]
    pub ssl_expiry: ExpiryOutcome,
    #[serde(serialize_with = "serialize_expiry")]
    pub domain_expiry: ExpiryOutcome,
}

pub fn render_expiry(outcome: &ExpiryOutcome) -> String {
    match outcome {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(fault) => fault.to_string(),
    }
}

fn serialize_expiry<S: Serializer>(outcome: &ExpiryOutcome, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&render_expiry(outcome))
}

pub fn select_monitored(hosts: Vec<TemplatedHost>) -> Vec<TemplatedHost> {
    hosts
        .into_iter()
        .filter(|host| host.has_any_template(&RECOGNIZED_TEMPLATES))
        .collect()
}

async fn check_host(lookups: &dyn ExpiryLookup, host: TemplatedHost) -> DomainStatusRecord {
    let domain = host.host.as_str();
    let (ssl_expiry, domain_expiry) = futures::join!(
        lookups.certificate_expiry(domain),
        lookups.registration_expiry(domain)
    );

    debug!(
        domain,
        ssl_ok = ssl_expiry.is_ok(),
        whois_ok = domain_expiry.is_ok(),
        "domain lookups finished"
    );

    DomainStatusRecord {
        name: host.name,
        host: host.host,
        status: host.status,
        ssl_expiry,
        domain_expiry,
    }
}

/// One record per host carrying a recognized template, in backend listing order.
pub async fn reconcile(
    backend: &dyn MonitoringBackend,
    lookups: &dyn ExpiryLookup,
) -> Result<Vec<DomainStatusRecord>, Fault> {
    let hosts = api::list_templated_hosts(backend).await?;
    let listed = hosts.len();
    let monitored = select_monitored(hosts);

    let records = join_all(
        monitored
            .into_iter()
            .map(|host| check_host(lookups, host)),
    )
    .await;

    info!(listed, reported = records.len(), "domain status reconciled");
    Ok(records)
}
