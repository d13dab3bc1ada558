// src/cli.rs

use crate::error::{CheckError, Result};
use crate::fetch::normalize_base_url;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example: version-checker -c https://github.com/org/repo -u http://target/ -f js/admin.js,js/tools.js")]
#[command(group(ArgGroup::new("source").required(true).args(["clone", "local"])))]
pub struct Args {
    /// Target url, the base the file paths are relative to
    #[arg(short, long)]
    pub url: String,

    /// Git url to clone locally
    #[arg(short, long)]
    pub clone: Option<String>,

    /// Local git repository to compare against
    #[arg(short, long)]
    pub local: Option<PathBuf>,

    /// Relative paths of the files to compare, comma separated
    #[arg(short, long)]
    pub files: String,

    /// Only check these tags, comma separated (default: every tag)
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Folder of the repository served as the web root (e.g. public)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Log every ratio instead of showing a progress bar
    #[arg(short, long)]
    pub verbose: bool,

    /// Proxy for requests to the target url
    #[arg(short = 'P', long, env = "VERSION_CHECKER_PROXY")]
    pub proxy: Option<String>,

    /// How tag content is read from the repository
    #[arg(long, value_enum, default_value_t = Mode::Checkout)]
    pub mode: Mode,

    /// Worker count for --mode tree
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Where --clone puts the repository
    #[arg(long, default_value = ".tmp")]
    pub clone_dir: PathBuf,

    /// Delete an existing clone directory and clone again
    #[arg(long)]
    pub fresh: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print the full tag × file matrix
    #[arg(long)]
    pub matrix: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Force-checkout each tag into the working tree and read files from disk
    Checkout,
    /// Read files from each tag's git tree without touching the working tree
    Tree,
}

/// Where the repository comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Clone { url: String, dir: PathBuf, fresh: bool },
    Local(PathBuf),
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub source: Source,
    pub files: Vec<String>,
    /// `None` means every tag of the repository
    pub tags: Option<Vec<String>>,
    pub web_folder: PathBuf,
    pub verbose: bool,
    pub proxy: Option<String>,
    pub mode: Mode,
    pub jobs: usize,
    pub timeout: Duration,
    pub show_matrix: bool,
}

/// Splits a comma separated list, trimming entries and dropping empty ones
/// and repeats.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

impl Args {
    pub fn into_settings(self) -> Result<Settings> {
        let files = split_list(&self.files);
        if files.is_empty() {
            return Err(CheckError::NoFiles);
        }
        let tags = match self.tags.as_deref().map(split_list) {
            Some(tags) if tags.is_empty() => return Err(CheckError::NoTags),
            other => other,
        };
        let source = match (self.clone, self.local) {
            (_, Some(local)) => Source::Local(local),
            (Some(url), None) => Source::Clone { url, dir: self.clone_dir, fresh: self.fresh },
            (None, None) => return Err(CheckError::NoSource),
        };

        Ok(Settings {
            url: normalize_base_url(&self.url),
            source,
            files,
            tags,
            web_folder: self.path.unwrap_or_default(),
            verbose: self.verbose,
            proxy: self.proxy,
            mode: self.mode,
            jobs: self.jobs.max(1),
            timeout: Duration::from_secs(self.timeout),
            show_matrix: self.matrix,
        })
    }
}
