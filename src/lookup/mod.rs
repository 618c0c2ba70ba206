//! Live certificate and registration expiry lookups
//!
//! Both lookups return their failures as values so a report can carry a partial result
//! for every domain.

pub mod certificate;
pub mod whois;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{config::LookupConfig, errors::LookupFault};

pub use certificate::CertificateInspector;
pub use whois::RegistrationInspector;

#[async_trait]
pub trait ExpiryLookup: Send + Sync {
    async fn certificate_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault>;
    async fn registration_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault>;
}

pub struct NetworkLookup {
    certificates: CertificateInspector,
    registrations: RegistrationInspector,
}

impl NetworkLookup {
    pub fn new(config: &LookupConfig) -> Self {
        Self {
            certificates: CertificateInspector::new(config.tls_timeout),
            registrations: RegistrationInspector::new(
                config.whois_server.clone(),
                config.whois_timeout,
            ),
        }
    }
}

#[async_trait]
impl ExpiryLookup for NetworkLookup {
    async fn certificate_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        self.certificates.expiry(domain).await
    }

    async fn registration_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        self.registrations.expiry(domain).await
    }
}
