use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate};
use tokio::{net::TcpStream, time::timeout};
use tokio_rustls::{
    rustls::{self, pki_types::ServerName, ClientConfig, RootCertStore},
    TlsConnector,
};
use tracing::debug;

use crate::errors::LookupFault;

pub const HTTPS_PORT: u16 = 443;

/// Reads the leaf certificate's expiry date through a verified TLS handshake.
pub struct CertificateInspector {
    timeout: Duration,
    port: u16,
    connector: Result<TlsConnector, LookupFault>,
}

impl CertificateInspector {
    /// Loads the root store once; every lookup reuses the same connector.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            port: HTTPS_PORT,
            connector: client_config().map(|config| TlsConnector::from(Arc::new(config))),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub async fn expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        let domain = domain.trim();
        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|err| LookupFault::ssl(format!("invalid server name '{domain}': {err}")))?;
        let connector = self.connector.as_ref().map_err(Clone::clone)?;

        // Connect and handshake share one deadline.
        let handshake = async {
            let stream = TcpStream::connect((domain, self.port))
                .await
                .map_err(LookupFault::ssl)?;
            connector
                .connect(server_name, stream)
                .await
                .map_err(LookupFault::ssl)
        };

        let tls = timeout(self.timeout, handshake)
            .await
            .map_err(|_| {
                LookupFault::ssl(format!(
                    "handshake timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })??;

        let (_, connection) = tls.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| LookupFault::ssl("peer presented no certificate"))?;

        let expiry = not_after(leaf.as_ref())?;
        debug!(domain, expiry = %expiry, "certificate expiry resolved");
        Ok(expiry)
    }
}

fn client_config() -> Result<ClientConfig, LookupFault> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(LookupFault::ssl)?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(config)
}

/// Calendar date of a DER certificate's notAfter field.
pub fn not_after(der: &[u8]) -> Result<NaiveDate, LookupFault> {
    let (_, certificate) = x509_parser::parse_x509_certificate(der)
        .map_err(|err| LookupFault::ssl(format!("unable to parse certificate: {err}")))?;

    let timestamp = certificate.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0)
        .map(|datetime| datetime.date_naive())
        .ok_or_else(|| LookupFault::ssl("certificate expiry is out of range"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::{not_after, CertificateInspector};

    #[tokio::test]
    async fn stalled_handshake_times_out_as_error_value() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();

        // Accepts the connection and never answers the ClientHello.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let inspector = CertificateInspector::new(Duration::from_millis(200)).with_port(port);
        let error = inspector
            .expiry("127.0.0.1")
            .await
            .expect_err("handshake must time out");

        assert!(error.to_string().starts_with("SSL Error: "));
        assert!(error.to_string().contains("timed out"));
        server.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_error_value() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let inspector = CertificateInspector::new(Duration::from_secs(2)).with_port(port);
        let error = inspector
            .expiry("127.0.0.1")
            .await
            .expect_err("closed port must fail");

        assert!(error.to_string().starts_with("SSL Error: "));
    }

    #[tokio::test]
    async fn connector_is_reused_across_lookups() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let inspector = CertificateInspector::new(Duration::from_secs(2)).with_port(port);
        assert!(inspector.connector.is_ok());

        for _ in 0..2 {
            let error = inspector
                .expiry("127.0.0.1")
                .await
                .expect_err("closed port must fail");
            assert!(error.to_string().starts_with("SSL Error: "));
        }
    }

    #[tokio::test]
    async fn invalid_server_name_is_error_value() {
        let inspector = CertificateInspector::new(Duration::from_secs(1));
        let error = inspector
            .expiry("not a host")
            .await
            .expect_err("invalid name must fail");

        assert!(error.to_string().contains("invalid server name"));
    }

    #[test]
    fn garbage_der_is_parse_error() {
        let error = not_after(&[0x30, 0x03, 0x01]).expect_err("garbage must fail");
        assert!(error.to_string().contains("unable to parse certificate"));
    }
}
