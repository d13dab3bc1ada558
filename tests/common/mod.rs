//! Git repository fixtures shared by the integration tests

use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Writes `files` on top of the working tree, commits them and tags the commit.
pub fn commit_and_tag(repo: &Repository, tag: &str, files: &[(&str, &str)]) {
    let root = repo.workdir().unwrap();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("test", "test@example.com").unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<_> = parents.iter().collect();
    let oid = repo.commit(Some("HEAD"), &sig, &sig, tag, &tree, &parent_refs).unwrap();
    repo.tag_lightweight(tag, &repo.find_object(oid, None).unwrap(), false)
        .unwrap();
}
