// src/model.rs

use std::fmt;

/// A file served by the remote target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path relative to the target url
    pub path: String,
    pub content: Vec<u8>,
}

impl RemoteFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), content: content.into() }
    }
}

/// Similarity between a remote file and the same file at one tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// Score in `[0, 100]`
    Score(f64),
    /// File absent at the tag, or content is not text
    Invalid,
}

impl Ratio {
    /// Numeric stand-in for [`Ratio::Invalid`] in sums, means and maxima.
    pub const INVALID_VALUE: f64 = -1.0;

    /// The value used by every aggregate. Invalid ratios count as `-1`.
    pub fn value(self) -> f64 {
        match self {
            Ratio::Score(v) => v,
            Ratio::Invalid => Self::INVALID_VALUE,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Ratio::Score(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Score(v) => write!(f, "{v:.2}"),
            Ratio::Invalid => write!(f, "n/a ({})", Self::INVALID_VALUE),
        }
    }
}

/// Scores of one tag, aligned with [`ScoreMatrix::files`]
#[derive(Debug, Clone, PartialEq)]
pub struct TagRow {
    pub tag: String,
    pub ratios: Vec<Ratio>,
}

/// Tag × file table of ratios for one run.
///
/// Rows keep the order in which tags were visited and every row holds exactly
/// one ratio per file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreMatrix {
    files: Vec<String>,
    rows: Vec<TagRow>,
}

impl ScoreMatrix {
    pub fn new(files: Vec<String>) -> Self {
        Self { files, rows: Vec::new() }
    }

    /// Appends the scores of `tag`. `scores` maps file paths to ratios; any
    /// file of the matrix missing from it is recorded as invalid. A tag that
    /// is already present has its row replaced in place.
    pub fn insert<'a, I>(&mut self, tag: impl Into<String>, scores: I)
    where
        I: IntoIterator<Item = (&'a str, Ratio)>,
    {
        let mut ratios = vec![Ratio::Invalid; self.files.len()];
        for (path, ratio) in scores {
            if let Some(idx) = self.file_index(path) {
                ratios[idx] = ratio;
            }
        }
        let tag = tag.into();
        match self.rows.iter_mut().find(|row| row.tag == tag) {
            Some(row) => row.ratios = ratios,
            None => self.rows.push(TagRow { tag, ratios }),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn rows(&self) -> &[TagRow] {
        &self.rows
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.tag.as_str())
    }

    pub fn row(&self, tag: &str) -> Option<&TagRow> {
        self.rows.iter().find(|row| row.tag == tag)
    }

    pub fn get(&self, tag: &str, file: &str) -> Option<Ratio> {
        let idx = self.file_index(file)?;
        self.row(tag).map(|row| row.ratios[idx])
    }

    fn file_index(&self, path: &str) -> Option<usize> {
        self.files.iter().position(|f| f == path)
    }
}

/// Per-tag statistics derived from a [`ScoreMatrix`]
#[derive(Debug, Clone, PartialEq)]
pub struct TagAggregate {
    pub tag: String,
    /// Mean of the stored ratios, invalid ones counted as `-1`
    pub mean_over_checked: f64,
    /// Sum of the stored ratios divided by the number of requested files
    pub mean_over_total: f64,
    /// Number of files for which this tag reaches the best ratio
    pub win_count: usize,
}

/// Best ratio reached for one file and every tag reaching it
#[derive(Debug, Clone, PartialEq)]
pub struct FileBestMatch {
    pub path: String,
    pub best_ratio: Ratio,
    /// Tags tied on `best_ratio`, in matrix order
    pub winning_tags: Vec<String>,
}

/// Tags retained as the most likely deployed version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BestTagSet {
    tags: Vec<String>,
}

impl BestTagSet {
    /// Adds `tag` unless already present. Insertion order is kept.
    pub fn insert(&mut self, tag: &str) {
        if !self.contains(tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
