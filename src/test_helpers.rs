//! Common test helper functions shared across test modules.
//!
//! Provides scratch git repositories with deterministic commit times and a
//! ready-made release configuration.
use git2::{Oid, RepositoryInitOptions, Signature, Time};
use std::{cell::Cell, collections::BTreeMap, path::Path};
use tempfile::TempDir;

use crate::config::{ReleaseConfig, message_format::MessageFormat};

/// Scratch repository driven directly through git2.
pub struct TestRepo {
    pub repo: git2::Repository,
    clock: Cell<i64>,
}

/// Creates an empty repository on branch `main` with a configured user.
///
/// # Example
/// ```ignore
/// let (dir, test_repo) = init_test_repo();
/// let oid = test_repo.commit("ALLI-1: first");
/// ```
pub fn init_test_repo() -> (TempDir, TestRepo) {
    let dir = TempDir::new().unwrap();

    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(dir.path(), &opts).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (
        dir,
        TestRepo {
            repo,
            clock: Cell::new(1_672_900_000),
        },
    )
}

impl TestRepo {
    /// Commit an empty tree on HEAD. Each commit is one minute after the
    /// previous one.
    pub fn commit(&self, message: &str) -> Oid {
        let time = self.clock.get() + 60;
        self.clock.set(time);

        let sig =
            Signature::new("Test User", "test@example.com", &Time::new(time, 0))
                .unwrap();

        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parent =
            self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Create `branch` at HEAD and switch to it.
    pub fn checkout_branch(&self, branch: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(branch, &head, false).unwrap();
        self.checkout_existing_branch(branch);
    }

    pub fn checkout_existing_branch(&self, branch: &str) {
        self.repo.set_head(&format!("refs/heads/{branch}")).unwrap();
    }

    pub fn detach_head(&self, oid: Oid) {
        self.repo.set_head_detached(oid).unwrap();
    }

    /// Point local `branch` at `oid` without touching the working tree.
    pub fn reset_branch(&self, branch: &str, oid: Oid) {
        self.repo
            .reference(&format!("refs/heads/{branch}"), oid, true, "reset")
            .unwrap();
    }

    /// Make `origin/<branch>` point at `oid` and track it from `branch`.
    pub fn track_upstream(&self, branch: &str, oid: Oid) {
        if self.repo.find_remote("origin").is_err() {
            self.repo
                .remote("origin", "https://example.com/project.git")
                .unwrap();
        }

        self.repo
            .reference(
                &format!("refs/remotes/origin/{branch}"),
                oid,
                true,
                "fetch",
            )
            .unwrap();

        let mut local =
            self.repo.find_branch(branch, git2::BranchType::Local).unwrap();
        local.set_upstream(Some(&format!("origin/{branch}"))).unwrap();
    }

    pub fn lightweight_tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }
}

/// Release configuration with default settings reading templates from
/// `templates_dir`.
pub fn create_test_config(templates_dir: &Path) -> ReleaseConfig {
    ReleaseConfig {
        default_branches: vec!["main".into(), "master".into()],
        commit_message_format: "TICKET_NAME: Commit message".into(),
        ticket_pattern: "ALLI-[0-9]+".into(),
        tag_format: "YYYYMMDD.N".into(),
        message_format: MessageFormat::Markdown,
        templates_dir: templates_dir.to_path_buf(),
        project_aliases: BTreeMap::new(),
        crm: None,
    }
}
