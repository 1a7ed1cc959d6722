//! Release message templates and rendering.
//!
//! Templates are plain text files named `<format>.template` holding up to
//! three tokens: `[PROJECT_NAME]`, `[TAG_NAME]` and `[TICKETS_LIST]`. There
//! are no conditionals or loops; rendering is a single substitution pass.
use log::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::message_format::MessageFormat,
    error::{ReleaseHelperError, Result},
    placeholder::{self, Placeholder},
    ticket::Ticket,
};

pub const PROJECT_NAME_TOKEN: &str = "[PROJECT_NAME]";
pub const TAG_NAME_TOKEN: &str = "[TAG_NAME]";
pub const TICKETS_LIST_TOKEN: &str = "[TICKETS_LIST]";

/// Rendered in place of the ticket list when a release has no tickets.
pub const NO_TICKETS_MESSAGE: &str = "No tickets found in this release.";

pub const DEFAULT_MARKDOWN_TEMPLATE: &str =
    "# Deploying [PROJECT_NAME] `[TAG_NAME]`\n\n## Tickets:\n[TICKETS_LIST]";

pub const DEFAULT_PLAIN_TEMPLATE: &str =
    "Deploying [PROJECT_NAME] [TAG_NAME]\n\nTickets:\n[TICKETS_LIST]";

struct MessageContext<'a> {
    project_name: &'a str,
    tag_name: &'a str,
    tickets: &'a [Ticket],
    format: MessageFormat,
}

fn message_placeholders<'a>() -> [Placeholder<MessageContext<'a>>; 3] {
    [
        Placeholder {
            token: PROJECT_NAME_TOKEN,
            resolve: |ctx| ctx.project_name.to_string(),
        },
        Placeholder {
            token: TAG_NAME_TOKEN,
            resolve: |ctx| ctx.tag_name.to_string(),
        },
        Placeholder {
            token: TICKETS_LIST_TOKEN,
            resolve: |ctx| format_tickets(ctx.tickets, ctx.format),
        },
    ]
}

/// Built-in template for `format`.
pub fn default_template(format: MessageFormat) -> &'static str {
    match format {
        MessageFormat::Markdown => DEFAULT_MARKDOWN_TEMPLATE,
        MessageFormat::Plain => DEFAULT_PLAIN_TEMPLATE,
    }
}

fn format_ticket(ticket: &Ticket, format: MessageFormat) -> String {
    match (format, &ticket.details) {
        (MessageFormat::Markdown, Some(d)) => {
            format!("- {}: {} ({})", ticket.id, d.title, d.status)
        }
        (MessageFormat::Markdown, None) => format!("- {}", ticket.id),
        (MessageFormat::Plain, Some(d)) => {
            format!("{} - {} [{}]", ticket.id, d.title, d.status)
        }
        (MessageFormat::Plain, None) => ticket.id.clone(),
    }
}

/// Join tickets into the list substituted for `[TICKETS_LIST]`.
pub fn format_tickets(tickets: &[Ticket], format: MessageFormat) -> String {
    if tickets.is_empty() {
        return NO_TICKETS_MESSAGE.to_string();
    }

    tickets
        .iter()
        .map(|t| format_ticket(t, format))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Substitute project, tag and tickets into `template`.
pub fn render(
    template: &str,
    project_name: &str,
    tag_name: &str,
    tickets: &[Ticket],
    format: MessageFormat,
) -> String {
    let ctx = MessageContext {
        project_name,
        tag_name,
        tickets,
        format,
    };

    placeholder::substitute(template, &message_placeholders(), &ctx)
}

/// Path of the template for `format` inside `templates_dir`.
pub fn template_path(templates_dir: &Path, format: MessageFormat) -> PathBuf {
    templates_dir.join(format.template_file_name())
}

/// Read the template for `format` from `templates_dir`.
pub fn load_template(
    templates_dir: &Path,
    format: MessageFormat,
) -> Result<String> {
    let path = template_path(templates_dir, format);
    debug!("loading template: {}", path.display());

    fs::read_to_string(&path)
        .map_err(|source| ReleaseHelperError::TemplateError { path, source })
}

/// Write the built-in templates into `templates_dir`.
///
/// Existing files are kept unless `overwrite` is set. Returns the paths that
/// were written.
pub fn write_default_templates(
    templates_dir: &Path,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(templates_dir)?;

    let mut written = vec![];

    for format in [MessageFormat::Markdown, MessageFormat::Plain] {
        let path = template_path(templates_dir, format);

        if path.exists() && !overwrite {
            debug!("keeping existing template: {}", path.display());
            continue;
        }

        fs::write(&path, default_template(format))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::crm::TicketDetails;

    fn tickets() -> Vec<Ticket> {
        vec![Ticket::new("ALLI-1"), Ticket::new("ALLI-2")]
    }

    fn detailed(id: &str, title: &str, status: &str) -> Ticket {
        Ticket {
            id: id.into(),
            details: Some(TicketDetails {
                title: title.into(),
                status: status.into(),
                url: format!("https://jira.example.com/browse/{id}"),
            }),
        }
    }

    #[test]
    fn renders_default_markdown_template() {
        let message = render(
            DEFAULT_MARKDOWN_TEMPLATE,
            "Web App",
            "20230105.3",
            &tickets(),
            MessageFormat::Markdown,
        );

        assert_eq!(
            message,
            "# Deploying Web App `20230105.3`\n\n## Tickets:\n- ALLI-1\n- ALLI-2"
        );
    }

    #[test]
    fn renders_default_plain_template() {
        let message = render(
            DEFAULT_PLAIN_TEMPLATE,
            "api",
            "v2",
            &tickets(),
            MessageFormat::Plain,
        );

        assert_eq!(message, "Deploying api v2\n\nTickets:\nALLI-1\nALLI-2");
    }

    #[test]
    fn substitutes_each_value_once_and_leaves_no_tokens() {
        let template = "[PROJECT_NAME]|[TAG_NAME]|[TICKETS_LIST]";

        let message = render(
            template,
            "proj-x",
            "tag-y",
            &[Ticket::new("TICK-1")],
            MessageFormat::Plain,
        );

        assert_eq!(message.matches("proj-x").count(), 1);
        assert_eq!(message.matches("tag-y").count(), 1);
        assert_eq!(message.matches("TICK-1").count(), 1);
        assert!(!message.contains(PROJECT_NAME_TOKEN));
        assert!(!message.contains(TAG_NAME_TOKEN));
        assert!(!message.contains(TICKETS_LIST_TOKEN));
    }

    #[test]
    fn values_containing_tokens_are_not_expanded() {
        let message = render(
            "[PROJECT_NAME] [TAG_NAME]",
            "[TAG_NAME]",
            "v1",
            &[],
            MessageFormat::Plain,
        );

        assert_eq!(message, "[TAG_NAME] v1");
    }

    #[test]
    fn includes_ticket_details_when_present() {
        let tickets = vec![
            detailed("ALLI-1", "Login form", "Done"),
            Ticket::new("ALLI-2"),
        ];

        assert_eq!(
            format_tickets(&tickets, MessageFormat::Markdown),
            "- ALLI-1: Login form (Done)\n- ALLI-2"
        );
        assert_eq!(
            format_tickets(&tickets, MessageFormat::Plain),
            "ALLI-1 - Login form [Done]\nALLI-2"
        );
    }

    #[test]
    fn empty_ticket_list_renders_placeholder_text() {
        assert_eq!(
            format_tickets(&[], MessageFormat::Markdown),
            NO_TICKETS_MESSAGE
        );
    }

    #[test]
    fn missing_template_is_template_error() {
        let dir = TempDir::new().unwrap();

        let err = load_template(dir.path(), MessageFormat::Plain).unwrap_err();

        assert!(matches!(err, ReleaseHelperError::TemplateError { .. }));
        assert!(err.to_string().contains("plain.template"));
    }

    #[test]
    fn writes_and_loads_default_templates() {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("templates");

        let written = write_default_templates(&templates, false).unwrap();
        assert_eq!(written.len(), 2);

        fs::write(template_path(&templates, MessageFormat::Plain), "custom")
            .unwrap();

        let written = write_default_templates(&templates, false).unwrap();
        assert!(written.is_empty());

        assert_eq!(
            load_template(&templates, MessageFormat::Markdown).unwrap(),
            DEFAULT_MARKDOWN_TEMPLATE
        );
        assert_eq!(
            load_template(&templates, MessageFormat::Plain).unwrap(),
            "custom"
        );

        write_default_templates(&templates, true).unwrap();
        assert_eq!(
            load_template(&templates, MessageFormat::Plain).unwrap(),
            DEFAULT_PLAIN_TEMPLATE
        );
    }
}
