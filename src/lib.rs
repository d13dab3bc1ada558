// src/lib.rs

//! Finds which tagged release of a repository a deployed site was built from,
//! by scoring the files the site serves against the same files at each tag.

pub mod aggregate;
pub mod analyzer;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod model;
pub mod renderer;
pub mod repo;
pub mod resolver;
pub mod similarity;
pub mod snapshot;

pub use aggregate::Aggregates;
pub use error::{CheckError, Result};
pub use model::{BestTagSet, FileBestMatch, Ratio, RemoteFile, ScoreMatrix, TagAggregate};
pub use resolver::resolve;
pub use snapshot::{Snapshot, SnapshotProvider};
