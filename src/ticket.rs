//! Ticket identifier extraction from commit messages.
use log::*;
use regex::Regex;
use std::collections::HashSet;

use crate::{
    crm::TicketDetails,
    error::{ReleaseHelperError, Result},
};

/// A ticket referenced by a release, optionally enriched with tracker data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub details: Option<TicketDetails>,
}

impl Ticket {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            details: None,
        }
    }
}

/// Compiled ticket pattern.
///
/// When the pattern has a capture group, group 1 is the identifier;
/// otherwise the whole match is.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    regex: Regex,
    group: usize,
}

impl TicketExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|err| {
            ReleaseHelperError::invalid_config(format!(
                "ticket_pattern '{pattern}' is not a valid regular expression: {err}"
            ))
        })?;

        let group = if regex.captures_len() > 1 { 1 } else { 0 };

        Ok(Self { regex, group })
    }

    /// All ticket ids in a single message, in order of appearance.
    pub fn ticket_ids<'m>(
        &'m self,
        message: &'m str,
    ) -> impl Iterator<Item = &'m str> + 'm {
        self.regex
            .captures_iter(message)
            .filter_map(move |c| c.get(self.group))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Unique ticket ids across `messages`, in first-seen order.
    pub fn extract<'a, I>(&self, messages: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut tickets = vec![];

        for message in messages {
            for id in self.ticket_ids(message) {
                if seen.insert(id.to_string()) {
                    trace!("found ticket {id}");
                    tickets.push(id.to_string());
                }
            }
        }

        tickets
    }
}

/// Compile `pattern` and return the unique ticket ids found in
/// `commit_messages`, preserving first-seen order.
pub fn extract_tickets<'a, I>(
    commit_messages: I,
    pattern: &str,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let extractor = TicketExtractor::new(pattern)?;
    Ok(extractor.extract(commit_messages))
}
