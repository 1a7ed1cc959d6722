//! Git repository queries used by the release pipeline.
//!
//! This module wraps `git2::Repository` with the handful of operations the
//! release flow needs:
//!
//! - Current branch and upstream divergence
//! - Tag listing and lookup
//! - Previous-release detection for a target commit
//! - Commit ranges between two points in history
//! - Annotated tag creation
use git2::{BranchType, ErrorCode, Oid, Sort};
use log::*;
use std::path::Path;

use crate::error::{ReleaseHelperError, Result};

/// A commit read from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
    pub author: String,
    /// Commit time in seconds since the epoch.
    pub timestamp: i64,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(8)]
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// A tag and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedCommit {
    pub name: String,
    pub commit: String,
    pub message: String,
}

/// Commits a local branch is ahead of and behind its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub ahead: usize,
    pub behind: usize,
}

/// High-level repository interface for the release flow.
pub struct Repository {
    repo: git2::Repository,
}

impl Repository {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path).map_err(|err| {
            debug!("repository discovery failed: {err}");
            ReleaseHelperError::NotARepository(path.display().to_string())
        })?;

        Ok(Self { repo })
    }

    /// Get the repository's working directory path.
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or_else(|| {
            ReleaseHelperError::NotARepository(
                "repository has no working directory".into(),
            )
        })
    }

    /// Name of the working directory, used as the project name.
    pub fn project_name(&self) -> Result<String> {
        let workdir = self.workdir()?;

        workdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ReleaseHelperError::NotARepository(format!(
                    "unable to determine repository name from {}",
                    workdir.display()
                ))
            })
    }

    /// Name of the checked out branch.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if !head.is_branch() {
            return Err(ReleaseHelperError::DetachedHead);
        }

        head.shorthand()
            .map(|s| s.to_string())
            .ok_or(ReleaseHelperError::DetachedHead)
    }

    /// Commit id HEAD points at.
    pub fn head_commit(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// All tag names in the repository.
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        Ok(names.iter().flatten().map(|n| n.to_string()).collect())
    }

    fn tag_commit(&self, name: &str) -> Result<Option<git2::Commit<'_>>> {
        let reference =
            match self.repo.find_reference(&format!("refs/tags/{name}")) {
                Ok(reference) => reference,
                Err(err)
                    if matches!(
                        err.code(),
                        ErrorCode::NotFound | ErrorCode::InvalidSpec
                    ) =>
                {
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            };

        match reference.peel_to_commit() {
            Ok(commit) => Ok(Some(commit)),
            Err(err) => {
                debug!("tag {name} does not point at a commit: {err}");
                Ok(None)
            }
        }
    }

    /// Look up a tag by name.
    pub fn find_tag(&self, name: &str) -> Result<Option<TaggedCommit>> {
        Ok(self.tag_commit(name)?.map(|commit| TaggedCommit {
            name: name.to_string(),
            commit: commit.id().to_string(),
            message: commit.message().unwrap_or("").trim().to_string(),
        }))
    }

    /// The nearest tag reachable from `target`.
    ///
    /// Tags on `target` itself only count when `include_target` is set.
    /// Among tagged ancestors the one closest to `target` in history wins;
    /// unrelated candidates (e.g. on either side of a merge) fall back to
    /// commit time.
    pub fn previous_tag(
        &self,
        target: &str,
        include_target: bool,
    ) -> Result<Option<TaggedCommit>> {
        let target_oid = Oid::from_str(target)?;
        let mut best: Option<(git2::Commit<'_>, String)> = None;

        for name in self.tag_names()? {
            let Some(commit) = self.tag_commit(&name)? else {
                continue;
            };

            let reachable = if commit.id() == target_oid {
                include_target
            } else {
                self.repo.graph_descendant_of(target_oid, commit.id())?
            };

            if !reachable {
                continue;
            }

            let replace = match &best {
                None => true,
                Some((current, _)) if current.id() == commit.id() => false,
                Some((current, _)) => {
                    if self
                        .repo
                        .graph_descendant_of(commit.id(), current.id())?
                    {
                        true
                    } else if self
                        .repo
                        .graph_descendant_of(current.id(), commit.id())?
                    {
                        false
                    } else {
                        commit.time().seconds() > current.time().seconds()
                    }
                }
            };

            if replace {
                best = Some((commit, name));
            }
        }

        Ok(best.map(|(commit, name)| TaggedCommit {
            name,
            commit: commit.id().to_string(),
            message: commit.message().unwrap_or("").trim().to_string(),
        }))
    }

    /// Commits reachable from `to` but not from `from`, oldest first.
    pub fn commits_between(
        &self,
        from: Option<&str>,
        to: &str,
    ) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(Oid::from_str(to)?)?;

        if let Some(from) = from {
            revwalk.hide(Oid::from_str(from)?)?;
        }

        let mut records = vec![];

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            records.push(CommitRecord {
                hash: commit.id().to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("").to_string(),
                timestamp: commit.time().seconds(),
            });
        }

        Ok(records)
    }

    /// Create an annotated tag `name` on commit `target`.
    pub fn create_tag(&self, name: &str, target: &str) -> Result<()> {
        info!("creating tag {name} at {target}");
        let commit = self.repo.find_commit(Oid::from_str(target)?)?;
        let tagger = self.repo.signature()?;

        self.repo.tag(
            name,
            commit.as_object(),
            &tagger,
            &format!("Release {name}"),
            false,
        )?;

        Ok(())
    }

    /// Divergence of local `branch` from its upstream, if it has one.
    pub fn upstream_divergence(
        &self,
        branch: &str,
    ) -> Result<Option<Divergence>> {
        let local = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let Ok(upstream) = local.upstream() else {
            return Ok(None);
        };

        let (Some(local_oid), Some(upstream_oid)) =
            (local.get().target(), upstream.get().target())
        else {
            return Ok(None);
        };

        let (ahead, behind) =
            self.repo.graph_ahead_behind(local_oid, upstream_oid)?;

        Ok(Some(Divergence { ahead, behind }))
    }
}
