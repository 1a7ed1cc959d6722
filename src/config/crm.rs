//! Ticket tracker connection settings.
use merge::Merge;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ReleaseHelperError, Result};

/// Connector used when `crm.connector` is omitted.
pub const DEFAULT_CONNECTOR: &str = "jira";

/// `crm` section as written in a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
pub struct CrmLayer {
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Validated ticket tracker settings.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub connector: String,
    pub api_url: String,
    pub username: String,
    pub api_key: SecretString,
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ReleaseHelperError::invalid_config(format!(
            "crm.{key} is required when the crm section is present"
        ))),
    }
}

impl CrmConfig {
    pub fn from_layer(layer: CrmLayer) -> Result<Self> {
        let connector = layer
            .connector
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONNECTOR.into());

        Ok(Self {
            connector,
            api_url: required(layer.api_url, "api_url")?,
            username: required(layer.username, "username")?,
            api_key: SecretString::from(required(layer.api_key, "api_key")?),
        })
    }

    /// File representation with the api key masked.
    pub fn to_masked_layer(&self) -> CrmLayer {
        CrmLayer {
            connector: Some(self.connector.clone()),
            api_url: Some(self.api_url.clone()),
            username: Some(self.username.clone()),
            api_key: Some("********".into()),
        }
    }
}
