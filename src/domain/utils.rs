//! Argument normalization shared by the tools

use crate::errors::{AppError, Fault};

pub const MAX_DOMAIN_LENGTH: usize = 253;
pub const ESXI_NAME_FILTER: &str = "esxi";

pub fn normalize_domain(domain: &str) -> Result<String, Fault> {
    let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if normalized.is_empty() || normalized.len() > MAX_DOMAIN_LENGTH {
        return Err(Fault::InvalidArgument(
            "domain must be between 1 and 253 characters".to_string(),
        ));
    }

    let valid_labels = normalized.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '-')
    });

    if !valid_labels {
        return Err(Fault::InvalidArgument(format!(
            "'{}' is not a valid domain name",
            domain.trim()
        )));
    }

    Ok(normalized)
}

pub fn normalize_host_name(host_name: Option<String>) -> Result<String, AppError> {
    host_name
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::bad_request("invalid_host_name", "host_name must not be empty"))
}

pub fn normalize_group_name(group_name: Option<String>, default: &str) -> String {
    group_name
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn normalize_template_names(
    template_names: Option<Vec<String>>,
    defaults: &[&str],
) -> Result<Vec<String>, AppError> {
    let Some(names) = template_names else {
        return Ok(defaults.iter().map(|name| name.to_string()).collect());
    };

    let names = names
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();

    if names.is_empty() || names.iter().any(String::is_empty) {
        return Err(AppError::bad_request(
            "invalid_template_names",
            "template_names must be a non-empty list of non-empty names",
        ));
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::{normalize_domain, normalize_group_name, normalize_host_name, normalize_template_names};

    #[test]
    fn normalizes_domain_case_and_trailing_dot() {
        assert_eq!(
            normalize_domain(" Shop.Example.COM. ").expect("valid domain"),
            "shop.example.com"
        );
    }

    #[test]
    fn rejects_invalid_domains() {
        for domain in ["", "   ", "a..b", "-a.com", "exa mple.com", "a/b.com"] {
            assert!(normalize_domain(domain).is_err(), "{domain:?} should be rejected");
        }
    }

    #[test]
    fn rejects_blank_host_name() {
        let error = normalize_host_name(Some("  ".to_string())).expect_err("blank host");
        assert!(error.to_string().contains("bad request"));
        assert_eq!(
            normalize_host_name(Some(" esxi-01 ".to_string())).expect("valid host"),
            "esxi-01"
        );
    }

    #[test]
    fn group_name_falls_back_to_default() {
        assert_eq!(normalize_group_name(None, "Domains"), "Domains");
        assert_eq!(normalize_group_name(Some(" ".to_string()), "Domains"), "Domains");
        assert_eq!(normalize_group_name(Some("Web".to_string()), "Domains"), "Web");
    }

    #[test]
    fn template_names_default_and_validate() {
        assert_eq!(
            normalize_template_names(None, &["A", "B"]).expect("defaults"),
            vec!["A", "B"]
        );
        assert!(normalize_template_names(Some(vec![]), &["A"]).is_err());
        assert!(normalize_template_names(Some(vec![" ".to_string()]), &["A"]).is_err());
    }
}
