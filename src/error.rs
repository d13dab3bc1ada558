// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of a version check run.
///
/// Missing files and undecodable content are not errors: they end up in the
/// score matrix as the invalid ratio.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CheckError {
    #[error("no tags to compare")]
    NoTags,

    #[error("no files to compare")]
    NoFiles,

    #[error("a repository is required: pass --clone or --local")]
    NoSource,

    #[error("failed to open repository at {0}: {1}")]
    OpenRepository(PathBuf, #[source] git2::Error),

    #[error("failed to clone {0}: {1}")]
    Clone(String, #[source] git2::Error),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("failed to check out tag {0}: {1}")]
    Checkout(String, #[source] git2::Error),

    #[error("repository at {0} has no working tree")]
    Bare(PathBuf),

    #[error("failed to read {path} at tag {tag}: {source}")]
    ReadSnapshot {
        tag: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {0} failed: {1}")]
    Http(String, #[source] Box<ureq::Error>),

    #[error("invalid proxy {0}: {1}")]
    Proxy(String, #[source] Box<ureq::Error>),

    #[error("url {url} answered with status {status}, expected 200")]
    UrlStatus { url: String, status: u16 },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
