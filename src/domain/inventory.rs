//! Host listing lines for the inventory tools

use crate::zabbix::records::HostSummary;

pub fn host_line(host: &HostSummary) -> String {
    format!(
        "- {} (ID: {}, Status: {})",
        host.name,
        host.hostid,
        host.status.as_str()
    )
}

/// Display-name substring match; a naming convention, not a backend host type.
pub fn filter_hosts_by_name_contains(hosts: Vec<HostSummary>, needle: &str) -> Vec<HostSummary> {
    let needle = needle.to_lowercase();
    hosts
        .into_iter()
        .filter(|host| host.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn total_line(count: usize) -> String {
    format!("Total hosts: {count}")
}
