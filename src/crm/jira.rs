//! Jira REST API (v3) connector.
use log::*;
use reqwest::{Url, blocking::Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::crm::CrmConfig,
    crm::{TicketConnector, TicketDetails},
    error::{ReleaseHelperError, Result},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JiraIssue {
    fields: JiraFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JiraFields {
    summary: Option<String>,
    status: Option<JiraStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JiraStatus {
    name: Option<String>,
}

/// Jira connector authenticating with username and API token.
pub struct JiraConnector {
    base_url: String,
    username: String,
    api_key: SecretString,
    client: Client,
}

impl JiraConnector {
    pub fn new(config: &CrmConfig) -> Result<Self> {
        let url = Url::parse(&config.api_url).map_err(|err| {
            ReleaseHelperError::invalid_config(format!(
                "crm.api_url '{}' is not a valid url: {err}",
                config.api_url
            ))
        })?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/3/{path}", self.base_url)
    }

    /// Link to the ticket in the Jira web UI.
    pub fn browse_url(&self, id: &str) -> String {
        format!("{}/browse/{id}", self.base_url)
    }

    fn get(&self, url: String) -> reqwest::blocking::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.username, Some(self.api_key.expose_secret()))
    }
}

impl TicketConnector for JiraConnector {
    fn validate_connection(&self) -> bool {
        match self.get(self.endpoint("myself")).send() {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    debug!(
                        "jira connection check returned {}",
                        response.status()
                    );
                }
                ok
            }
            Err(err) => {
                debug!("jira connection check failed: {err}");
                false
            }
        }
    }

    fn fetch_ticket(&self, id: &str) -> Result<TicketDetails> {
        let response = self
            .get(self.endpoint(&format!("issue/{id}")))
            .send()?
            .error_for_status()?;

        let issue: JiraIssue = response.json()?;

        Ok(details_from_issue(issue, self.browse_url(id)))
    }
}

fn details_from_issue(issue: JiraIssue, url: String) -> TicketDetails {
    TicketDetails {
        title: issue.fields.summary.unwrap_or_else(|| UNKNOWN.into()),
        status: issue
            .fields
            .status
            .and_then(|s| s.name)
            .unwrap_or_else(|| UNKNOWN.into()),
        url,
    }
}
