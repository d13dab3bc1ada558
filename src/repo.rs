// src/repo.rs

use crate::error::{CheckError, Result};
use crate::snapshot::resolve_commit;
use chrono::{DateTime, TimeZone, Utc};
use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks, Repository};
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;

pub fn open_local(path: &Path) -> Result<Repository> {
    let repo = Repository::open(path).map_err(|e| CheckError::OpenRepository(path.to_path_buf(), e))?;
    tracing::info!(path = %path.display(), "using local repository");
    Ok(repo)
}

/// Clones `url` into `dir`.
///
/// An existing repository in `dir` is reused unless `fresh` is set, in which
/// case the directory is deleted and cloned again.
pub fn clone_into(url: &str, dir: &Path, fresh: bool, bar: &ProgressBar) -> Result<Repository> {
    if dir.exists() {
        if fresh {
            tracing::info!(dir = %dir.display(), "removing previous clone");
            fs::remove_dir_all(dir)?;
        } else {
            match Repository::open(dir) {
                Ok(repo) => {
                    tracing::warn!(dir = %dir.display(), "clone directory already exists, reusing it (pass --fresh to clone again)");
                    return Ok(repo);
                }
                Err(e) => return Err(CheckError::OpenRepository(dir.to_path_buf(), e)),
            }
        }
    }

    tracing::info!(url, dir = %dir.display(), "cloning repository");
    bar.set_message("Cloning repository");

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|stats| {
        bar.set_length(stats.total_objects() as u64);
        bar.set_position(stats.received_objects() as u64);
        true
    });
    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    let repo = RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, dir)
        .map_err(|e| CheckError::Clone(url.to_string(), e))?;
    bar.finish_with_message("Cloned");
    tracing::debug!(dir = %dir.display(), "cloned");
    Ok(repo)
}

/// All tag names of the repository.
pub fn list_tags(repo: &Repository) -> Result<Vec<String>> {
    let names = repo.tag_names(None)?;
    Ok(names.iter().flatten().map(str::to_string).collect())
}

/// Commit date of the commit `tag` points at.
pub fn tag_date(repo: &Repository, tag: &str) -> Option<DateTime<Utc>> {
    let commit = resolve_commit(repo, tag).ok()?;
    Utc.timestamp_opt(commit.time().seconds(), 0).single()
}
