//! Release tag resolution and date-based auto numbering.
//!
//! Tag formats are plain strings carrying date placeholders (`YYYY`, `YY`,
//! `MM`, `DD`) and an optional sequence placeholder `N`. When no explicit tag
//! is requested the next tag is generated for the given day: existing tags
//! that match today's rendered shape are scanned for the highest sequence
//! number and the new tag gets that number plus one.
use chrono::NaiveDate;
use log::*;
use regex::Regex;

use crate::{
    error::{ReleaseHelperError, Result},
    placeholder::{self, Placeholder, Segment},
};

/// Token replaced with the per-day sequence number.
pub const SEQUENCE_TOKEN: &str = "N";

/// A resolved release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Full tag name.
    pub name: String,
    /// Day the tag was generated for, when the format carries a date.
    pub date: Option<NaiveDate>,
    /// Sequence number within the day, when the format carries `N`.
    pub sequence: Option<u32>,
}

impl Tag {
    fn explicit(name: &str) -> Self {
        Self {
            name: name.to_string(),
            date: None,
            sequence: None,
        }
    }
}

struct TagContext {
    date: NaiveDate,
    sequence: u32,
}

fn tag_placeholders() -> [Placeholder<TagContext>; 5] {
    [
        Placeholder {
            token: "YYYY",
            resolve: |ctx| ctx.date.format("%Y").to_string(),
        },
        Placeholder {
            token: "YY",
            resolve: |ctx| ctx.date.format("%y").to_string(),
        },
        Placeholder {
            token: "MM",
            resolve: |ctx| ctx.date.format("%m").to_string(),
        },
        Placeholder {
            token: "DD",
            resolve: |ctx| ctx.date.format("%d").to_string(),
        },
        Placeholder {
            token: SEQUENCE_TOKEN,
            resolve: |ctx| ctx.sequence.to_string(),
        },
    ]
}

/// A validated tag format.
#[derive(Debug, Clone)]
pub struct TagFormat {
    format: String,
    has_date: bool,
    has_sequence: bool,
}

impl TagFormat {
    /// Validate `format`: it needs at least one placeholder and at most one
    /// sequence placeholder.
    pub fn parse(format: &str) -> Result<Self> {
        let placeholders = tag_placeholders();
        let segments = placeholder::tokenize(format, &placeholders);

        let mut date_tokens = 0;
        let mut sequence_tokens = 0;

        for segment in segments.iter() {
            if let Segment::Token(p) = segment {
                if p.token == SEQUENCE_TOKEN {
                    sequence_tokens += 1;
                } else {
                    date_tokens += 1;
                }
            }
        }

        if date_tokens + sequence_tokens == 0 {
            return Err(ReleaseHelperError::invalid_config(format!(
                "tag_format '{format}' contains no recognized placeholders (YYYY, YY, MM, DD, N)"
            )));
        }

        if sequence_tokens > 1 {
            return Err(ReleaseHelperError::invalid_config(format!(
                "tag_format '{format}' may contain at most one sequence placeholder N"
            )));
        }

        Ok(Self {
            format: format.to_string(),
            has_date: date_tokens > 0,
            has_sequence: sequence_tokens == 1,
        })
    }

    fn render(&self, ctx: &TagContext) -> String {
        placeholder::substitute(&self.format, &tag_placeholders(), ctx)
    }

    /// Regex matching tags of this format for the context's day, capturing
    /// the sequence number.
    fn matcher(&self, ctx: &TagContext) -> Result<Regex> {
        let placeholders = tag_placeholders();
        let mut pattern = String::from("^");

        for segment in placeholder::tokenize(&self.format, &placeholders) {
            match segment {
                Segment::Literal(literal) => {
                    pattern.push_str(&regex::escape(literal))
                }
                Segment::Token(p) if p.token == SEQUENCE_TOKEN => {
                    pattern.push_str(r"(\d+)")
                }
                Segment::Token(p) => {
                    pattern.push_str(&regex::escape(&(p.resolve)(ctx)))
                }
            }
        }

        pattern.push('$');

        Regex::new(&pattern).map_err(|err| {
            ReleaseHelperError::invalid_config(format!(
                "tag_format '{}' produced an invalid pattern: {err}",
                self.format
            ))
        })
    }

    /// Generate the next tag for `today` given the tags already present.
    pub fn next_tag(
        &self,
        existing: &[String],
        today: NaiveDate,
    ) -> Result<Tag> {
        let date = self.has_date.then_some(today);

        if !self.has_sequence {
            let name = self.render(&TagContext {
                date: today,
                sequence: 0,
            });

            if existing.iter().any(|t| t == &name) {
                return Err(ReleaseHelperError::invalid_config(format!(
                    "tag_format '{}' has no sequence placeholder N and tag '{name}' already exists",
                    self.format
                )));
            }

            return Ok(Tag {
                name,
                date,
                sequence: None,
            });
        }

        let matcher = self.matcher(&TagContext {
            date: today,
            sequence: 0,
        })?;

        let highest = existing
            .iter()
            .filter_map(|t| matcher.captures(t))
            .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
            .max();

        debug!("highest existing sequence for {today}: {highest:?}");

        let sequence = match highest {
            Some(n) => n.checked_add(1).ok_or_else(|| {
                ReleaseHelperError::invalid_config(format!(
                    "tag_format '{}': sequence number {n} cannot be incremented",
                    self.format
                ))
            })?,
            None => 1,
        };
        let name = self.render(&TagContext {
            date: today,
            sequence,
        });

        Ok(Tag {
            name,
            date,
            sequence: Some(sequence),
        })
    }
}

/// Return the tag to release.
///
/// An explicit tag is returned as-is after checking it is a valid tag name.
/// Otherwise the next tag is generated from `format` for `today`.
pub fn resolve_tag(
    explicit_tag: Option<&str>,
    format: &str,
    existing_tags: &[String],
    today: NaiveDate,
) -> Result<Tag> {
    if let Some(explicit) = explicit_tag {
        let name = explicit.trim();

        if name.is_empty() {
            return Err(ReleaseHelperError::invalid_args(
                "--tag must not be empty",
            ));
        }

        if !git2::Reference::is_valid_name(&format!("refs/tags/{name}")) {
            return Err(ReleaseHelperError::invalid_args(format!(
                "--tag '{name}' is not a valid tag name"
            )));
        }

        return Ok(Tag::explicit(name));
    }

    TagFormat::parse(format)?.next_tag(existing_tags, today)
}
