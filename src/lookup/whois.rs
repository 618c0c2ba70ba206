use std::{sync::OnceLock, time::Duration};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};
use tracing::debug;

use crate::errors::LookupFault;

pub const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

/// Queries a WHOIS root server, follows one referral and extracts the expiration date.
pub struct RegistrationInspector {
    server: String,
    port: u16,
    timeout: Duration,
}

impl RegistrationInspector {
    pub fn new(server: String, timeout: Duration) -> Self {
        Self {
            server,
            port: WHOIS_PORT,
            timeout,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub async fn expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        let domain = domain.trim().to_ascii_lowercase();
        if domain.is_empty() {
            return Err(LookupFault::whois("domain name is empty"));
        }

        timeout(self.timeout, self.lookup(&domain))
            .await
            .map_err(|_| {
                LookupFault::whois(format!(
                    "query timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
    }

    async fn lookup(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        let mut response = query(&self.server, self.port, domain).await?;

        if let Some(referral) = referral_server(&response) {
            if !referral.eq_ignore_ascii_case(&self.server) {
                debug!(domain, referral = %referral, "following whois referral");
                response = query(&referral, WHOIS_PORT, domain).await?;
            }
        }

        first_expiration(&response)
            .map_err(|err| match err {
                ExpirationError::Missing => {
                    LookupFault::whois(format!("no expiration date found for {domain}"))
                }
                ExpirationError::Unparseable(raw) => {
                    LookupFault::whois(format!("unparseable expiration date '{raw}'"))
                }
            })
    }
}

async fn query(server: &str, port: u16, domain: &str) -> Result<String, LookupFault> {
    let mut stream = TcpStream::connect((server, port))
        .await
        .map_err(|err| LookupFault::whois(format!("{server}: {err}")))?;

    stream
        .write_all(format!("{domain}\r\n").as_bytes())
        .await
        .map_err(|err| LookupFault::whois(format!("{server}: {err}")))?;

    let mut raw = Vec::new();
    stream
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut raw)
        .await
        .map_err(|err| LookupFault::whois(format!("{server}: {err}")))?;

    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn referral_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?im)^\s*(?:refer|whois|Registrar WHOIS Server):\s*(\S+)\s*$")
            .expect("referral regex")
    })
}

fn expiration_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?im)^\s*(?:Registry Expiry Date|Registrar Registration Expiration Date|Expiration Date|Expiry Date|Expiration Time|paid-till|expires|expire)\s*:\s*(.+?)\s*$",
        )
        .expect("expiration regex")
    })
}

/// WHOIS server named by the response, if any.
pub fn referral_server(response: &str) -> Option<String> {
    referral_regex()
        .captures(response)
        .and_then(|captures| captures.get(1))
        .map(|server| {
            server
                .as_str()
                .trim_start_matches("whois://")
                .trim_end_matches('/')
                .to_string()
        })
        .filter(|server| !server.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirationError {
    Missing,
    Unparseable(String),
}

/// Raw expiration values in response order.
pub fn expiration_values(response: &str) -> Vec<String> {
    expiration_regex()
        .captures_iter(response)
        .filter_map(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
        .collect()
}

/// The first expiration value is authoritative, even when later ones would parse.
pub fn first_expiration(response: &str) -> Result<NaiveDate, ExpirationError> {
    let first = expiration_values(response)
        .into_iter()
        .next()
        .ok_or(ExpirationError::Missing)?;

    parse_whois_date(&first).ok_or(ExpirationError::Unparseable(first))
}

pub fn parse_whois_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }

    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"];
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y", "%d/%m/%Y"];
    let candidates = [value, value.split_whitespace().next().unwrap_or(value)];
    candidates.iter().find_map(|candidate| {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::{
        expiration_values, first_expiration, parse_whois_date, referral_server,
        ExpirationError, RegistrationInspector,
    };
    use crate::testing::date;

    #[test]
    fn first_of_several_expiration_dates_wins() {
        let response = "Domain Name: EXAMPLE.COM\r\n\
             Registry Expiry Date: 2026-08-13T04:00:00Z\r\n\
             Registrar Registration Expiration Date: 2026-08-12T04:00:00Z\r\n";

        assert_eq!(expiration_values(response).len(), 2);
        assert_eq!(first_expiration(response), Ok(date(2026, 8, 13)));
    }

    #[test]
    fn unparseable_first_value_is_not_replaced_by_later_one() {
        let response = "Registry Expiry Date: not-a-date\nRegistry Expiry Date: 2029-01-01\n";

        assert_eq!(
            first_expiration(response),
            Err(ExpirationError::Unparseable("not-a-date".to_string()))
        );
    }

    #[test]
    fn response_without_expiration_field_is_missing() {
        assert_eq!(
            first_expiration("Domain Name: EXAMPLE.COM\n"),
            Err(ExpirationError::Missing)
        );
    }

    #[test]
    fn parses_common_registry_formats() {
        assert_eq!(parse_whois_date("2027-01-31T23:59:59.000Z"), Some(date(2027, 1, 31)));
        assert_eq!(parse_whois_date("2027-01-31 10:00:00"), Some(date(2027, 1, 31)));
        assert_eq!(parse_whois_date("2027.01.31"), Some(date(2027, 1, 31)));
        assert_eq!(parse_whois_date("31-Jan-2027"), Some(date(2027, 1, 31)));
        assert_eq!(parse_whois_date("2027-01-31 10:00:00 CLST"), Some(date(2027, 1, 31)));
        assert_eq!(parse_whois_date("soon"), None);
    }

    #[test]
    fn reads_iana_referral() {
        let response = "% IANA WHOIS server\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(
            referral_server(response).as_deref(),
            Some("whois.verisign-grs.com")
        );
        assert_eq!(referral_server("domain: COM\n"), None);
    }

    async fn serve_once(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut query = [0u8; 256];
            let _ = socket.read(&mut query).await;
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
        });

        port
    }

    #[tokio::test]
    async fn queries_server_and_extracts_first_date() {
        let port = serve_once(
            "Domain Name: example.org\nExpiry Date: 2028-03-01\nExpiry Date: 2029-03-01\n",
        )
        .await;

        let inspector =
            RegistrationInspector::new("127.0.0.1".to_string(), Duration::from_secs(2))
                .with_port(port);
        let expiry = inspector.expiry("example.org").await.expect("expiry found");
        assert_eq!(expiry, date(2028, 3, 1));
    }

    #[tokio::test]
    async fn response_without_expiry_is_error_value() {
        let port = serve_once("No match for \"NOPE.EXAMPLE\".\n").await;

        let inspector =
            RegistrationInspector::new("127.0.0.1".to_string(), Duration::from_secs(2))
                .with_port(port);
        let error = inspector
            .expiry("nope.example")
            .await
            .expect_err("no date must fail");
        assert!(error.to_string().starts_with("WHOIS Error: "));
    }

    #[tokio::test]
    async fn garbage_first_expiry_is_error_value() {
        let port = serve_once(
            "Registry Expiry Date: not-a-date\nRegistry Expiry Date: 2029-01-01\n",
        )
        .await;

        let inspector =
            RegistrationInspector::new("127.0.0.1".to_string(), Duration::from_secs(2))
                .with_port(port);
        let error = inspector
            .expiry("example.net")
            .await
            .expect_err("unparseable first date must fail");
        assert_eq!(
            error.to_string(),
            "WHOIS Error: unparseable expiration date 'not-a-date'"
        );
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let inspector =
            RegistrationInspector::new("127.0.0.1".to_string(), Duration::from_millis(200))
                .with_port(port);
        let error = inspector
            .expiry("example.org")
            .await
            .expect_err("silent server must time out");
        assert!(error.to_string().contains("timed out"));
        server.abort();
    }
}
