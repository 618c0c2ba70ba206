//! Typed shapes of the Zabbix responses this crate consumes
//!
//! Each RPC call decodes into its own record type so that a missing field surfaces as a
//! protocol fault at the client boundary.

use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Enabled,
    Disabled,
}

impl HostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }
}

impl<'de> Deserialize<'de> for HostStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "0" {
            Self::Enabled
        } else {
            Self::Disabled
        })
    }
}

impl Serialize for HostStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostSummary {
    pub hostid: String,
    pub host: String,
    pub name: String,
    pub status: HostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostId {
    pub hostid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplatedHost {
    pub hostid: String,
    pub host: String,
    pub name: String,
    pub status: HostStatus,
    #[serde(rename = "parentTemplates", default)]
    pub parent_templates: Vec<TemplateRef>,
}

impl TemplatedHost {
    pub fn has_any_template(&self, names: &[&str]) -> bool {
        self.parent_templates
            .iter()
            .any(|template| names.contains(&template.name.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub itemid: String,
    pub name: String,
    #[serde(rename = "key_", default)]
    pub key: String,
    pub lastvalue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostWithItems {
    pub hostid: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRecord {
    pub groupid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateRecord {
    pub templateid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostCreateResult {
    pub hostids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSpec {
    #[serde(rename = "type")]
    pub kind: u8,
    pub main: u8,
    pub useip: u8,
    pub ip: String,
    pub dns: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupLink {
    pub groupid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateLink {
    pub templateid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroSpec {
    #[serde(rename = "macro")]
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostCreateParams {
    pub host: String,
    pub interfaces: Vec<InterfaceSpec>,
    pub groups: Vec<GroupLink>,
    pub templates: Vec<TemplateLink>,
    pub macros: Vec<MacroSpec>,
}

pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, Fault> {
    serde_json::from_value(value).map_err(|err| Fault::protocol(method, err))
}
