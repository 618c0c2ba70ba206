//! In-process fakes for the backend and lookup seams.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    errors::{Fault, LookupFault},
    lookup::ExpiryLookup,
    zabbix::MonitoringBackend,
};

type Handler = dyn Fn(&str, &Value) -> Result<Value, Fault> + Send + Sync;

pub struct FakeBackend {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeBackend {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(called, _)| called == method)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl MonitoringBackend for FakeBackend {
    async fn invoke(&self, method: &str, params: Value) -> Result<Value, Fault> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((method.to_string(), params.clone()));
        (self.handler)(method, &params)
    }
}

#[derive(Default)]
pub struct FakeLookups {
    pub certificates: HashMap<String, Result<NaiveDate, LookupFault>>,
    pub registrations: HashMap<String, Result<NaiveDate, LookupFault>>,
}

impl FakeLookups {
    pub fn with_certificate(
        mut self,
        domain: &str,
        outcome: Result<NaiveDate, LookupFault>,
    ) -> Self {
        self.certificates.insert(domain.to_string(), outcome);
        self
    }

    pub fn with_registration(
        mut self,
        domain: &str,
        outcome: Result<NaiveDate, LookupFault>,
    ) -> Self {
        self.registrations.insert(domain.to_string(), outcome);
        self
    }
}

#[async_trait]
impl ExpiryLookup for FakeLookups {
    async fn certificate_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        self.certificates
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Err(LookupFault::ssl("no fake certificate")))
    }

    async fn registration_expiry(&self, domain: &str) -> Result<NaiveDate, LookupFault> {
        self.registrations
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Err(LookupFault::whois("no fake registration")))
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
