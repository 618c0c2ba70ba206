//! Memory and disk figures from free-text Zabbix item values
//!
//! Item values arrive either as raw byte counts or as already formatted strings, so every
//! item is classified and converted on its own; one bad value never spoils the report.

use crate::zabbix::records::ItemRecord;

pub const MEMORY_KEYWORDS: [&str; 1] = ["memory"];
pub const DISK_KEYWORDS: [&str; 1] = ["disk"];
pub const TOTAL_KEYWORDS: [&str; 2] = ["total", "size"];
pub const AVAILABLE_KEYWORDS: [&str; 2] = ["free", "available"];
pub const SIZING_KEYWORDS: [&str; 4] = ["total", "size", "free", "available"];
const PERCENTAGE_KEY_MARKERS: [&str; 2] = ["pavailable", "pused"];

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    let name = name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| name.contains(&keyword.to_lowercase()))
}

/// Formats a byte count as gibibytes with two decimals.
pub fn bytes_to_gib(value: &str) -> Option<String> {
    let value = value.trim();
    let number = value.parse::<f64>().ok().filter(|number| number.is_finite())?;
    Some(format!("{:.2} GB", number / BYTES_PER_GIB))
}

/// Ratio items such as `vm.memory.size[pavailable]` or "Available memory in %".
pub fn is_percentage(item: &ItemRecord) -> bool {
    item.name.contains('%') || contains_any(&item.key, &PERCENTAGE_KEY_MARKERS)
}

/// Renders one metric, converting sizing values and flagging the ones that do not parse.
pub fn format_metric(label: &str, item: &ItemRecord) -> String {
    let value = &item.lastvalue;
    if is_percentage(item) || !contains_any(&item.name, &SIZING_KEYWORDS) {
        return format!("{label}: {value}");
    }

    match bytes_to_gib(value) {
        Some(size) => format!("{label}: {size}"),
        None => format!("Error parsing value for {label}: {value}"),
    }
}

pub fn extract(items: &[ItemRecord], keywords: &[&str]) -> Vec<String> {
    items
        .iter()
        .filter(|item| contains_any(&item.name, keywords))
        .map(|item| format_metric(&item.name, item))
        .collect()
}

pub fn memory_disk_report(items: &[ItemRecord]) -> Vec<String> {
    let memory = extract(items, &MEMORY_KEYWORDS);
    let disk = extract(items, &DISK_KEYWORDS);

    if memory.is_empty() && disk.is_empty() {
        return vec!["No memory/disk data found".to_string()];
    }

    let mut lines = Vec::with_capacity(memory.len() + disk.len() + 2);
    lines.push("Memory:".to_string());
    lines.extend(memory.into_iter().map(|line| format!("- {line}")));
    lines.push("Disk:".to_string());
    lines.extend(disk.into_iter().map(|line| format!("- {line}")));
    lines
}

pub fn disk_space_report(items: &[ItemRecord]) -> Vec<String> {
    let labelled = |prefix: &str, keywords: &[&str]| {
        items
            .iter()
            .filter(|item| contains_any(&item.name, keywords))
            .map(|item| format_metric(&format!("{prefix} ({})", item.name), item))
            .collect::<Vec<_>>()
    };

    let mut lines = labelled("Total", &TOTAL_KEYWORDS);
    lines.extend(labelled("Available", &AVAILABLE_KEYWORDS));

    if lines.is_empty() {
        return vec!["Disk data not found".to_string()];
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{
        bytes_to_gib, disk_space_report, extract, is_percentage, memory_disk_report,
        SIZING_KEYWORDS,
    };
    use crate::zabbix::records::ItemRecord;

    fn item(name: &str, lastvalue: &str) -> ItemRecord {
        ItemRecord {
            itemid: String::new(),
            name: name.to_string(),
            key: String::new(),
            lastvalue: lastvalue.to_string(),
        }
    }

    #[test]
    fn converts_sizes_and_flags_unparseable_values() {
        let items = vec![
            item("Memory total", "8589934592"),
            item("Disk free", "not-a-number"),
        ];

        let lines = extract(&items, &SIZING_KEYWORDS);
        assert_eq!(
            lines,
            vec![
                "Memory total: 8.00 GB".to_string(),
                "Error parsing value for Disk free: not-a-number".to_string(),
            ]
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let items = vec![item("AVAILABLE memory", "1073741824"), item("CPU load", "0.5")];
        assert_eq!(extract(&items, &["available"]), vec!["AVAILABLE memory: 1.00 GB"]);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(bytes_to_gib("1610612736").as_deref(), Some("1.50 GB"));
        assert_eq!(bytes_to_gib(" 1000000000 ").as_deref(), Some("0.93 GB"));
        assert_eq!(bytes_to_gib("15.2 GB"), None);
        assert_eq!(bytes_to_gib("NaN"), None);
    }

    #[test]
    fn non_sizing_values_pass_through() {
        let items = vec![item("Memory utilization", "42.5 %")];
        assert_eq!(
            memory_disk_report(&items),
            vec!["Memory:", "- Memory utilization: 42.5 %", "Disk:"]
        );
    }

    fn keyed_item(name: &str, key: &str, lastvalue: &str) -> ItemRecord {
        ItemRecord {
            key: key.to_string(),
            ..item(name, lastvalue)
        }
    }

    #[test]
    fn percentage_items_keep_their_value() {
        let items = vec![
            keyed_item("Available memory in %", "vm.memory.size[pavailable]", "45.3"),
            keyed_item("/: Space utilization", "vfs.fs.size[/,pused]", "61.2"),
            keyed_item("Available memory", "vm.memory.size[available]", "2147483648"),
        ];

        assert!(is_percentage(&items[0]));
        assert!(is_percentage(&items[1]));
        assert!(!is_percentage(&items[2]));
        assert_eq!(
            memory_disk_report(&items),
            vec![
                "Memory:",
                "- Available memory in %: 45.3",
                "- Available memory: 2.00 GB",
                "Disk:",
            ]
        );
        assert_eq!(
            disk_space_report(&[keyed_item("/: Free space in %", "vfs.fs.size[/,pfree]", "38.8")]),
            vec!["Available (/: Free space in %): 38.8"]
        );
    }

    #[test]
    fn memory_disk_report_groups_sections() {
        let items = vec![
            item("Total memory", "8589934592"),
            item("Disk /: Free", "oops"),
            item("CPU idle", "99"),
        ];

        assert_eq!(
            memory_disk_report(&items),
            vec![
                "Memory:",
                "- Total memory: 8.00 GB",
                "Disk:",
                "- Error parsing value for Disk /: Free: oops",
            ]
        );
    }

    #[test]
    fn memory_disk_report_without_matches() {
        let items = vec![item("CPU idle", "99")];
        assert_eq!(memory_disk_report(&items), vec!["No memory/disk data found"]);
    }

    #[test]
    fn disk_space_report_labels_totals_then_available() {
        let items = vec![
            item("/: Space available", "2147483648"),
            item("/: Total space", "10737418240"),
        ];

        assert_eq!(
            disk_space_report(&items),
            vec![
                "Total (/: Total space): 10.00 GB",
                "Available (/: Space available): 2.00 GB",
            ]
        );
        assert_eq!(disk_space_report(&[]), vec!["Disk data not found"]);
    }
}
