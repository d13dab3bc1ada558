// src/aggregate.rs

//! Statistics derived from a [`ScoreMatrix`].
//!
//! Invalid ratios take part in every statistic with their numeric value of
//! `-1`: a tag missing files is pulled down rather than judged only on the
//! files it has. Rankings depend on this.

use crate::error::{CheckError, Result};
use crate::model::*;

/// Everything the resolver and the report need, recomputed from the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    /// One entry per tag, in matrix order
    pub tags: Vec<TagAggregate>,
    /// One entry per file, in matrix order
    pub files: Vec<FileBestMatch>,
    /// Number of requested files, the denominator of `mean_over_total`
    pub total_files: usize,
}

impl Aggregates {
    /// Fails on a matrix without tags or files, or when `total_files` is 0.
    pub fn compute(matrix: &ScoreMatrix, total_files: usize) -> Result<Self> {
        if matrix.rows().is_empty() {
            return Err(CheckError::NoTags);
        }
        if matrix.files().is_empty() || total_files == 0 {
            return Err(CheckError::NoFiles);
        }

        let files = files_best_tags(matrix);
        let wins = win_counts(matrix, &files);
        let tags = matrix
            .rows()
            .iter()
            .zip(wins)
            .map(|(row, win_count)| TagAggregate {
                tag: row.tag.clone(),
                mean_over_checked: mean_over_checked(row),
                mean_over_total: mean_over_total(row, total_files),
                win_count,
            })
            .collect();

        Ok(Self { tags, files, total_files })
    }

    pub fn tag(&self, tag: &str) -> Option<&TagAggregate> {
        self.tags.iter().find(|t| t.tag == tag)
    }

    pub fn file(&self, path: &str) -> Option<&FileBestMatch> {
        self.files.iter().find(|f| f.path == path)
    }
}

fn row_sum(row: &TagRow) -> f64 {
    row.ratios.iter().map(|r| r.value()).sum()
}

/// Mean of the stored ratios, invalid ones included as `-1`.
pub fn mean_over_checked(row: &TagRow) -> f64 {
    row_sum(row) / row.ratios.len() as f64
}

/// Sum of the stored ratios over the number of requested files.
pub fn mean_over_total(row: &TagRow, total_files: usize) -> f64 {
    row_sum(row) / total_files as f64
}

/// Best ratio per file and every tag tied on it.
pub fn files_best_tags(matrix: &ScoreMatrix) -> Vec<FileBestMatch> {
    matrix
        .files()
        .iter()
        .enumerate()
        .filter_map(|(idx, path)| {
            let mut rows = matrix.rows().iter();
            let first = rows.next()?;
            let mut best = FileBestMatch {
                path: path.clone(),
                best_ratio: first.ratios[idx],
                winning_tags: vec![first.tag.clone()],
            };
            for row in rows {
                let ratio = row.ratios[idx];
                if ratio.value() > best.best_ratio.value() {
                    best.best_ratio = ratio;
                    best.winning_tags = vec![row.tag.clone()];
                } else if ratio.value() == best.best_ratio.value() {
                    best.winning_tags.push(row.tag.clone());
                }
            }
            Some(best)
        })
        .collect()
}

/// Number of files each tag wins, aligned with the matrix rows. Ties credit
/// every tied tag.
pub fn win_counts(matrix: &ScoreMatrix, best: &[FileBestMatch]) -> Vec<usize> {
    matrix
        .rows()
        .iter()
        .map(|row| {
            best.iter()
                .filter(|file| file.winning_tags.iter().any(|t| *t == row.tag))
                .count()
        })
        .collect()
}
