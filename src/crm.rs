//! Ticket tracker (CRM) connectors used to enrich release tickets.
//!
//! Enrichment is best effort: a tracker that cannot be reached, or a ticket
//! that cannot be fetched, only costs that ticket its metadata. Ticket ids
//! always make it into the release message.
use log::*;

use crate::{
    config::crm::CrmConfig,
    error::{ReleaseHelperError, Result},
    ticket::Ticket,
};

pub mod jira;

/// Metadata fetched from the ticket tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetails {
    pub title: String,
    pub status: String,
    pub url: String,
}

/// Connection to a ticket tracker.
#[cfg_attr(test, mockall::automock)]
pub trait TicketConnector {
    /// Check that the tracker is reachable with the configured credentials.
    fn validate_connection(&self) -> bool;

    /// Fetch details for a single ticket id.
    fn fetch_ticket(&self, id: &str) -> Result<TicketDetails>;
}

/// Build the connector named in the configuration.
pub fn connector_from_config(
    config: &CrmConfig,
) -> Result<Box<dyn TicketConnector>> {
    match config.connector.to_lowercase().as_str() {
        "jira" => Ok(Box::new(jira::JiraConnector::new(config)?)),
        other => Err(ReleaseHelperError::invalid_config(format!(
            "crm.connector: unsupported connector '{other}'"
        ))),
    }
}

/// Turn ticket ids into tickets, attaching tracker details where possible.
pub fn enrich_tickets(
    connector: Option<&dyn TicketConnector>,
    ids: &[String],
) -> Vec<Ticket> {
    let mut tickets: Vec<Ticket> = ids.iter().map(Ticket::new).collect();

    let Some(connector) = connector else {
        return tickets;
    };

    if tickets.is_empty() {
        return tickets;
    }

    if !connector.validate_connection() {
        warn!("unable to connect to ticket tracker: ticket details omitted");
        return tickets;
    }

    for ticket in tickets.iter_mut() {
        match connector.fetch_ticket(&ticket.id) {
            Ok(details) => {
                debug!("fetched details for {}: {}", ticket.id, details.title);
                ticket.details = Some(details);
            }
            Err(err) => {
                warn!("failed to fetch details for ticket {}: {err}", ticket.id)
            }
        }
    }

    tickets
}
