// src/snapshot.rs

//! Access to repository content as of a tag.
//!
//! A [`SnapshotProvider`] hands out one active [`Snapshot`] at a time: the
//! snapshot borrows the provider mutably, so a second tag cannot be activated
//! while reads against the first one are still possible. Providers that need
//! to run side by side must be separate instances.

use crate::error::{CheckError, Result};
use git2::build::CheckoutBuilder;
use git2::{Commit, ErrorCode, ObjectType, Repository, Tree};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Repository content of one activated tag
pub trait Snapshot {
    fn tag(&self) -> &str;

    /// Bytes of `path` at this tag, or `None` if the file does not exist.
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

pub trait SnapshotProvider {
    type Active<'a>: Snapshot
    where
        Self: 'a;

    /// Makes `tag` the observable state of this provider.
    fn activate(&mut self, tag: &str) -> Result<Self::Active<'_>>;
}

/// Resolves a tag name (or any revision) to the commit it points at.
pub fn resolve_commit<'r>(repo: &'r Repository, tag: &str) -> Result<Commit<'r>> {
    let object = match repo.revparse_single(&format!("refs/tags/{tag}")) {
        Ok(object) => object,
        Err(_) => repo.revparse_single(tag).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous => {
                CheckError::TagNotFound(tag.to_string())
            }
            _ => CheckError::Git(e),
        })?,
    };
    object
        .peel_to_commit()
        .map_err(|_| CheckError::TagNotFound(tag.to_string()))
}

/// Repository-relative location of a served `path`.
///
/// The result is lexically normalized: `.` components and leading `/` are
/// dropped and `..` never climbs above the repository root, so worktree and
/// tree reads resolve the same entry.
fn join_web_path(web_folder: &Path, path: &str) -> PathBuf {
    let mut joined = PathBuf::new();
    for component in web_folder.components().chain(Path::new(path).components()) {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                joined.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    joined
}

/// Checks every tag out into the repository's working tree.
///
/// This mirrors `git checkout --force <tag>`: local modifications to tracked
/// files are discarded and HEAD is detached at the tag.
pub struct WorktreeSnapshots {
    repo: Repository,
    root: PathBuf,
    web_folder: PathBuf,
}

impl WorktreeSnapshots {
    pub fn new(repo: Repository, web_folder: impl Into<PathBuf>) -> Result<Self> {
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| CheckError::Bare(repo.path().to_path_buf()))?;
        Ok(Self { repo, root, web_folder: web_folder.into() })
    }
}

pub struct ActiveWorktree<'a> {
    tag: String,
    provider: &'a WorktreeSnapshots,
}

impl SnapshotProvider for WorktreeSnapshots {
    type Active<'a> = ActiveWorktree<'a>;

    fn activate(&mut self, tag: &str) -> Result<ActiveWorktree<'_>> {
        let commit = resolve_commit(&self.repo, tag)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| CheckError::Checkout(tag.to_string(), e))?;
        self.repo
            .set_head_detached(commit.id())
            .map_err(|e| CheckError::Checkout(tag.to_string(), e))?;
        tracing::debug!(tag, commit = %commit.id(), "checked out");

        Ok(ActiveWorktree { tag: tag.to_string(), provider: self })
    }
}

impl Snapshot for ActiveWorktree<'_> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.provider.root.join(join_web_path(&self.provider.web_folder, path));
        if !full.is_file() {
            return Ok(None);
        }
        fs::read(&full).map(Some).map_err(|source| CheckError::ReadSnapshot {
            tag: self.tag.clone(),
            path: path.to_string(),
            source,
        })
    }
}

/// Reads files straight from the tag's tree object.
///
/// The working tree is never touched, so every instance is isolated and
/// several instances over the same repository can run concurrently.
pub struct TreeSnapshots {
    repo: Repository,
    web_folder: PathBuf,
}

impl TreeSnapshots {
    pub fn new(repo: Repository, web_folder: impl Into<PathBuf>) -> Self {
        Self { repo, web_folder: web_folder.into() }
    }

    pub fn open(path: &Path, web_folder: impl Into<PathBuf>) -> Result<Self> {
        let repo = Repository::open(path)
            .map_err(|e| CheckError::OpenRepository(path.to_path_buf(), e))?;
        Ok(Self::new(repo, web_folder))
    }
}

pub struct ActiveTree<'a> {
    tag: String,
    tree: Tree<'a>,
    repo: &'a Repository,
    web_folder: &'a Path,
}

impl SnapshotProvider for TreeSnapshots {
    type Active<'a> = ActiveTree<'a>;

    fn activate(&mut self, tag: &str) -> Result<ActiveTree<'_>> {
        let commit = resolve_commit(&self.repo, tag)?;
        let tree = commit.tree()?;
        Ok(ActiveTree {
            tag: tag.to_string(),
            tree,
            repo: &self.repo,
            web_folder: &self.web_folder,
        })
    }
}

impl Snapshot for ActiveTree<'_> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let location = join_web_path(self.web_folder, path);
        if location.as_os_str().is_empty() {
            return Ok(None);
        }
        let entry = match self.tree.get_path(&location) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some(blob.content().to_vec()))
    }
}

/// In-memory tags, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshots {
    tags: HashMap<String, HashMap<String, Vec<u8>>>,
    activations: Vec<String>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a tag with no files.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.entry(tag.to_string()).or_default();
        self
    }

    pub fn with_file(mut self, tag: &str, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .insert(path.to_string(), content.into());
        self
    }

    /// Tags activated so far, in order.
    pub fn activations(&self) -> &[String] {
        &self.activations
    }
}

pub struct ActiveMemory<'a> {
    tag: String,
    files: &'a HashMap<String, Vec<u8>>,
}

impl SnapshotProvider for MemorySnapshots {
    type Active<'a> = ActiveMemory<'a>;

    fn activate(&mut self, tag: &str) -> Result<ActiveMemory<'_>> {
        if !self.tags.contains_key(tag) {
            return Err(CheckError::TagNotFound(tag.to_string()));
        }
        self.activations.push(tag.to_string());
        Ok(ActiveMemory {
            tag: tag.to_string(),
            files: &self.tags[tag],
        })
    }
}

impl Snapshot for ActiveMemory<'_> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(path).cloned())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn two_tag_repo() -> (tempfile::TempDir, Repository) {
        let (dir, repo) = init_repo();
        commit_tag(&repo, "v1", &[("js/app.js", b"one"), ("js/old.js", b"old")]);
        commit_tag(&repo, "v2", &[("js/app.js", b"two")]);
        (dir, repo)
    }

    #[test]
    fn worktree_checkout_switches_content() {
        let (_dir, repo) = two_tag_repo();
        let mut snapshots = WorktreeSnapshots::new(repo, "").unwrap();

        {
            let v1 = snapshots.activate("v1").unwrap();
            assert_eq!(v1.read("js/app.js").unwrap(), Some(b"one".to_vec()));
            assert_eq!(v1.read("js/old.js").unwrap(), Some(b"old".to_vec()));
        }

        let v2 = snapshots.activate("v2").unwrap();
        assert_eq!(v2.tag(), "v2");
        assert_eq!(v2.read("js/app.js").unwrap(), Some(b"two".to_vec()));
        assert_eq!(v2.read("js/old.js").unwrap(), None);
    }

    #[test]
    fn worktree_honours_web_folder() {
        let (_dir, repo) = init_repo();
        commit_tag(&repo, "v1", &[("public/app.css", b"body{}")]);
        let mut snapshots = WorktreeSnapshots::new(repo, "public").unwrap();
        let active = snapshots.activate("v1").unwrap();
        assert_eq!(active.read("app.css").unwrap(), Some(b"body{}".to_vec()));
        assert_eq!(active.read("public/app.css").unwrap(), None);
    }

    #[test]
    fn tree_reads_do_not_need_checkout() {
        let (dir, _repo) = two_tag_repo();
        let mut snapshots = TreeSnapshots::open(dir.path(), "js").unwrap();

        {
            let v1 = snapshots.activate("v1").unwrap();
            assert_eq!(v1.read("old.js").unwrap(), Some(b"old".to_vec()));
            assert_eq!(v1.read("/app.js").unwrap(), Some(b"one".to_vec()));
        }

        let v2 = snapshots.activate("v2").unwrap();
        assert_eq!(v2.read("old.js").unwrap(), None);
        assert_eq!(v2.read("missing/deep.js").unwrap(), None);
    }

    #[test]
    fn served_paths_are_normalized() {
        let web = Path::new("public");
        assert_eq!(join_web_path(web, "./js/app.js"), PathBuf::from("public/js/app.js"));
        assert_eq!(join_web_path(web, "/js/./app.js"), PathBuf::from("public/js/app.js"));
        assert_eq!(join_web_path(web, "js/../app.js"), PathBuf::from("public/app.js"));
        assert_eq!(join_web_path(Path::new(""), "../../app.js"), PathBuf::from("app.js"));
        assert_eq!(join_web_path(Path::new(""), "./"), PathBuf::new());
    }

    #[test]
    fn dotted_paths_read_the_same_in_both_modes() {
        let (dir, repo) = two_tag_repo();
        let mut tree = TreeSnapshots::open(dir.path(), "").unwrap();
        let from_tree = {
            let v1 = tree.activate("v1").unwrap();
            (v1.read("./js/app.js").unwrap(), v1.read("./js/../js/none.js").unwrap())
        };

        let mut worktree = WorktreeSnapshots::new(repo, ".").unwrap();
        let v1 = worktree.activate("v1").unwrap();
        let from_worktree = (v1.read("./js/app.js").unwrap(), v1.read("./js/../js/none.js").unwrap());

        assert_eq!(from_tree, (Some(b"one".to_vec()), None));
        assert_eq!(from_tree, from_worktree);
    }

    #[test]
    fn tree_directory_is_not_a_file() {
        let (dir, _repo) = two_tag_repo();
        let mut snapshots = TreeSnapshots::open(dir.path(), "").unwrap();
        let v1 = snapshots.activate("v1").unwrap();
        assert_eq!(v1.read("js").unwrap(), None);
        assert_eq!(v1.read("./").unwrap(), None);
    }

    #[test]
    fn unknown_tag_is_reported() {
        let (dir, _repo) = two_tag_repo();
        let mut snapshots = TreeSnapshots::open(dir.path(), "").unwrap();
        assert!(matches!(
            snapshots.activate("v9"),
            Err(CheckError::TagNotFound(tag)) if tag == "v9"
        ));

        let mut memory = MemorySnapshots::new().with_tag("v1");
        assert!(matches!(memory.activate("v2"), Err(CheckError::TagNotFound(_))));
    }

    #[test]
    fn memory_records_activation_order() {
        let mut memory = MemorySnapshots::new()
            .with_file("v1", "a.js", "x")
            .with_tag("v2");
        assert_eq!(memory.activate("v2").unwrap().read("a.js").unwrap(), None);
        assert_eq!(
            memory.activate("v1").unwrap().read("a.js").unwrap(),
            Some(b"x".to_vec())
        );
        assert_eq!(memory.activations(), ["v2".to_string(), "v1".to_string()]);
    }
}
