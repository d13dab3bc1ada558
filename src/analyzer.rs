// src/analyzer.rs

use crate::error::{CheckError, Result};
use crate::model::*;
use crate::similarity;
use crate::snapshot::{Snapshot, SnapshotProvider};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// Ratios of one tag, in the order of the requested files
pub type TagScores = Vec<(String, Ratio)>;

/// Activates `tag` on `provider` and scores every remote file against it.
///
/// A file missing at the tag, or whose content is not UTF-8 on either side,
/// scores [`Ratio::Invalid`]. Only snapshot failures are errors.
pub fn compare_tag<P: SnapshotProvider>(
    provider: &mut P,
    tag: &str,
    files: &[RemoteFile],
) -> Result<TagScores> {
    let snapshot = provider.activate(tag)?;
    let mut scores = Vec::with_capacity(files.len());

    for file in files {
        let ratio = match snapshot.read(&file.path)? {
            Some(content) => {
                let ratio = similarity::compare_text(&content, &file.content);
                if !ratio.is_valid() {
                    tracing::debug!(tag = snapshot.tag(), file = %file.path, "content is not utf-8");
                }
                ratio
            }
            None => {
                tracing::debug!(tag = snapshot.tag(), file = %file.path, "file not found");
                Ratio::Invalid
            }
        };
        tracing::debug!(tag = snapshot.tag(), file = %file.path, %ratio, "ratio");
        scores.push((file.path.clone(), ratio));
    }

    Ok(scores)
}

/// Builds the full score matrix by visiting each tag once, in order.
///
/// Tags share `provider`, so their comparisons run one after the other.
pub fn build_matrix<P: SnapshotProvider>(
    provider: &mut P,
    tags: &[String],
    files: &[RemoteFile],
    bar: &ProgressBar,
) -> Result<ScoreMatrix> {
    let mut matrix = ScoreMatrix::new(file_paths(files));

    bar.set_length(tags.len() as u64);
    for tag in tags {
        bar.set_message(format!("Checking tag {tag:>15}"));
        tracing::debug!(tag = %tag, "checking tag");
        let scores = compare_tag(provider, tag, files)?;
        matrix.insert(tag.as_str(), scores.iter().map(|(path, ratio)| (path.as_str(), *ratio)));
        bar.inc(1);
    }
    bar.finish_with_message("Tags checked");

    Ok(matrix)
}

/// Same as [`build_matrix`], spread over `jobs` workers.
///
/// `open` is called at most once per worker thread, the first time that
/// thread picks up a tag, and must return a provider isolated from every
/// other one (its own repository handle, its own checkout). Rows keep the
/// order of `tags`.
pub fn build_matrix_parallel<P, F>(
    open: F,
    tags: &[String],
    files: &[RemoteFile],
    jobs: usize,
    bar: ProgressBar,
) -> Result<ScoreMatrix>
where
    P: SnapshotProvider + Send,
    F: Fn() -> Result<P> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;
    let workers: Vec<Mutex<Option<P>>> = (0..pool.current_num_threads()).map(|_| Mutex::new(None)).collect();

    bar.set_length(tags.len() as u64);
    bar.set_message("Checking tags");
    let rows: Vec<TagScores> = pool.install(|| {
        tags.par_iter()
            .progress_with(bar.clone())
            .map(|tag| {
                let index = rayon::current_thread_index().unwrap_or(0) % workers.len();
                let mut slot = workers[index].lock().unwrap_or_else(PoisonError::into_inner);
                let mut provider = match slot.take() {
                    Some(provider) => provider,
                    None => open()?,
                };
                let scores = compare_tag(&mut provider, tag, files);
                *slot = Some(provider);
                scores
            })
            .collect::<Result<Vec<_>>>()
    })?;
    bar.finish_with_message("Tags checked");

    let mut matrix = ScoreMatrix::new(file_paths(files));
    for (tag, scores) in tags.iter().zip(&rows) {
        matrix.insert(tag.as_str(), scores.iter().map(|(path, ratio)| (path.as_str(), *ratio)));
    }
    Ok(matrix)
}

fn file_paths(files: &[RemoteFile]) -> Vec<String> {
    files.iter().map(|f| f.path.clone()).collect()
}

/// Rejects runs that cannot produce a meaningful matrix.
pub fn check_inputs(tags: &[String], files: &[RemoteFile]) -> Result<()> {
    if tags.is_empty() {
        return Err(CheckError::NoTags);
    }
    if files.is_empty() {
        return Err(CheckError::NoFiles);
    }
    Ok(())
}
