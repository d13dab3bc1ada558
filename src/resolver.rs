// src/resolver.rs

use crate::aggregate::Aggregates;
use crate::error::{CheckError, Result};
use crate::model::{BestTagSet, TagAggregate};

/// Picks the most likely deployed tags.
///
/// The result is the union of three maxima:
/// 1. every tag with the highest win count (ties are all kept),
/// 2. the tag with the highest mean over checked files,
/// 3. the tag with the highest mean over all requested files.
///
/// For both means a tie goes to the tag seen first in matrix order.
pub fn resolve(aggregates: &Aggregates) -> Result<BestTagSet> {
    if aggregates.tags.is_empty() {
        return Err(CheckError::NoTags);
    }
    if aggregates.files.is_empty() {
        return Err(CheckError::NoFiles);
    }

    let mut best = BestTagSet::default();

    let max_wins = aggregates.tags.iter().map(|t| t.win_count).max().unwrap_or(0);
    for tag in aggregates.tags.iter().filter(|t| t.win_count == max_wins) {
        best.insert(&tag.tag);
    }

    if let Some(tag) = first_max_by(&aggregates.tags, |t| t.mean_over_checked) {
        best.insert(&tag.tag);
    }
    if let Some(tag) = first_max_by(&aggregates.tags, |t| t.mean_over_total) {
        best.insert(&tag.tag);
    }

    Ok(best)
}

fn first_max_by(tags: &[TagAggregate], key: impl Fn(&TagAggregate) -> f64) -> Option<&TagAggregate> {
    let mut iter = tags.iter();
    let mut best = iter.next()?;
    for tag in iter {
        if key(tag) > key(best) {
            best = tag;
        }
    }
    Some(best)
}
