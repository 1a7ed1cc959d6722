//! `release` command: resolve the tag, collect tickets and render the
//! release message.
use chrono::{Local, NaiveDate};
use log::*;
use std::env;

use crate::{
    cli::{self, ReleaseArgs},
    command::show,
    config::{
        ReleaseConfig,
        loader::{self, ConfigPaths},
    },
    crm::{self, TicketConnector},
    error::{ReleaseHelperError, Result},
    render,
    repo::{CommitRecord, Divergence, Repository, TaggedCommit},
    tag::{self, Tag},
    ticket::{Ticket, TicketExtractor},
};

/// Project name used when the repository directory name is unavailable.
const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Behavior switches for a release run.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    pub tag: Option<String>,
    pub force: bool,
    pub dry_run: bool,
}

impl From<&ReleaseArgs> for ReleaseOptions {
    fn from(args: &ReleaseArgs) -> Self {
        Self {
            tag: args.tag.clone(),
            force: args.force,
            dry_run: args.dry_run,
        }
    }
}

/// Everything a release run produced.
#[derive(Debug)]
pub struct ReleaseOutcome {
    pub tag: Tag,
    /// Commit the release tag points (or will point) at.
    pub target: String,
    pub previous_tag: Option<TaggedCommit>,
    pub commits: Vec<CommitRecord>,
    pub tickets: Vec<Ticket>,
    pub message: String,
    pub tag_created: bool,
}

/// Execute the release command.
pub fn execute(args: &cli::Args, release_args: &ReleaseArgs) -> Result<()> {
    let paths = ConfigPaths::from_current_dir(args.config.as_deref())?;

    if release_args.show_config {
        return show::execute(&paths, release_args.message_format);
    }

    let config = loader::load(&paths)?
        .with_message_format(release_args.message_format);

    let repo = Repository::discover(&env::current_dir()?)?;

    let connector = match &config.crm {
        Some(crm_config) => Some(crm::connector_from_config(crm_config)?),
        None => None,
    };

    let outcome = run(
        &repo,
        &config,
        &ReleaseOptions::from(release_args),
        connector.as_deref(),
        Local::now().date_naive(),
    )?;

    println!("{}", outcome.message);

    info!("tag: {}", outcome.tag.name);
    info!("title: Release {}", outcome.tag.name);

    Ok(())
}

/// Fail unless `branch` is a default branch or `force` is set.
pub fn validate_branch(
    branch: &str,
    config: &ReleaseConfig,
    force: bool,
) -> Result<()> {
    if config.is_default_branch(branch) {
        return Ok(());
    }

    if force {
        warn!(
            "not on a default branch ({branch}): continuing because of --force"
        );
        return Ok(());
    }

    Err(ReleaseHelperError::wrong_branch(
        branch,
        &config.default_branches,
    ))
}

fn warn_if_behind_upstream(repo: &Repository, branch: &str) {
    match repo.upstream_divergence(branch) {
        Ok(Some(Divergence { ahead, behind })) if behind > 0 => {
            let plural = if behind > 1 { "s" } else { "" };
            warn!(
                "local branch {branch} is {behind} commit{plural} behind its upstream: pull to include the latest changes"
            );
            if ahead > 0 {
                warn!(
                    "local branch {branch} has also diverged: {ahead} local commits are not on its upstream"
                );
            }
        }
        Ok(Some(Divergence { ahead, .. })) if ahead > 0 => {
            debug!(
                "local branch {branch} is {ahead} commits ahead of upstream"
            )
        }
        Ok(_) => {}
        Err(err) => debug!("unable to compare {branch} with upstream: {err}"),
    }
}

fn report_commits_without_tickets(
    extractor: &TicketExtractor,
    commits: &[CommitRecord],
    config: &ReleaseConfig,
) {
    for commit in commits {
        if extractor.ticket_ids(&commit.message).next().is_none() {
            debug!(
                "commit {} has no ticket id (expected format: {}): {}",
                commit.short_hash(),
                config.commit_message_format,
                commit.summary()
            );
        }
    }
}

/// Run the release pipeline against `repo`.
///
/// The tag is created last, after the message rendered successfully, and
/// only when it does not exist yet and this is not a dry run.
pub fn run(
    repo: &Repository,
    config: &ReleaseConfig,
    options: &ReleaseOptions,
    connector: Option<&dyn TicketConnector>,
    today: NaiveDate,
) -> Result<ReleaseOutcome> {
    match repo.current_branch() {
        Ok(branch) => {
            validate_branch(&branch, config, options.force)?;
            warn_if_behind_upstream(repo, &branch);
        }
        Err(ReleaseHelperError::DetachedHead) if options.force => {
            warn!("HEAD is detached: continuing because of --force");
        }
        Err(err) => return Err(err),
    }

    let existing_tags = repo.tag_names()?;
    let tag = tag::resolve_tag(
        options.tag.as_deref(),
        &config.tag_format,
        &existing_tags,
        today,
    )?;

    let existing = repo.find_tag(&tag.name)?;

    let target = match &existing {
        Some(tagged) => {
            info!("using existing tag {} at {}", tagged.name, tagged.commit);
            tagged.commit.clone()
        }
        None => repo.head_commit()?,
    };

    // a new tag treats a tag already on HEAD as the previous release
    let previous_tag = repo.previous_tag(&target, existing.is_none())?;

    let since = match &previous_tag {
        Some(previous) => {
            info!("previous release: {} ({})", previous.name, previous.commit);
            format!("tag '{}'", previous.name)
        }
        None => {
            info!("no previous tag found: using full history");
            "the start of history".to_string()
        }
    };

    let commits = repo.commits_between(
        previous_tag.as_ref().map(|t| t.commit.as_str()),
        &target,
    )?;

    if commits.is_empty() {
        return Err(ReleaseHelperError::NothingToRelease { since });
    }

    info!("preparing release {} from {} commits", tag.name, commits.len());

    let extractor = TicketExtractor::new(&config.ticket_pattern)?;
    report_commits_without_tickets(&extractor, &commits, config);

    let ids = extractor.extract(commits.iter().map(|c| c.message.as_str()));

    if ids.is_empty() {
        info!("no tickets found in commits since the last release");
    } else {
        info!("tickets merged since the last release: {}", ids.join(", "));
    }

    let tickets = crm::enrich_tickets(connector, &ids);

    let project_name = repo
        .project_name()
        .map(|name| config.project_display_name(&name))
        .unwrap_or_else(|err| {
            warn!("{err}");
            UNKNOWN_PROJECT.to_string()
        });

    let template =
        render::load_template(&config.templates_dir, config.message_format)?;

    let message = render::render(
        &template,
        &project_name,
        &tag.name,
        &tickets,
        config.message_format,
    );

    let tag_created = match (&existing, options.dry_run) {
        (Some(_), _) => false,
        (None, true) => {
            info!("dry run: tag {} not created", tag.name);
            false
        }
        (None, false) => {
            repo.create_tag(&tag.name, &target)?;
            true
        }
    };

    Ok(ReleaseOutcome {
        tag,
        target,
        previous_tag,
        commits,
        tickets,
        message,
        tag_created,
    })
}
