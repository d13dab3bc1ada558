// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use version_checker::analyzer;
use version_checker::cli::{Args, Mode, Settings, Source};
use version_checker::fetch::Fetcher;
use version_checker::renderer::{self, Report, ReportOptions};
use version_checker::repo;
use version_checker::snapshot::{TreeSnapshots, WorktreeSnapshots};
use version_checker::{resolve, Aggregates, CheckError};

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    let start_time = Instant::now();

    if let Err(e) = run(args) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }

    tracing::info!("Total time: {:.2?}", start_time.elapsed());
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,version_checker={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn progress_bar(settings: &Settings) -> ProgressBar {
    if settings.verbose {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}") {
        bar.set_style(style);
    }
    bar
}

fn run(args: Args) -> Result<()> {
    let settings = args.into_settings()?;

    let fetcher = Fetcher::new(&settings.url, settings.proxy.as_deref(), settings.timeout)?;
    fetcher.check_url().context("target url is not reachable")?;
    let files = fetcher.fetch_files(&settings.files)?;
    if files.is_empty() {
        return Err(CheckError::NoFiles).context("none of the requested files is served by the target");
    }

    let repo = match &settings.source {
        Source::Local(path) => repo::open_local(path)?,
        Source::Clone { url, dir, fresh } => repo::clone_into(url, dir, *fresh, &progress_bar(&settings))?,
    };

    let tags = match &settings.tags {
        Some(tags) => tags.clone(),
        None => repo::list_tags(&repo)?,
    };
    analyzer::check_inputs(&tags, &files).context("nothing to compare")?;
    tracing::debug!(tags = %tags.join(", "), "tag list");

    let tag_dates: HashMap<_, _> = tags
        .iter()
        .filter_map(|tag| repo::tag_date(&repo, tag).map(|date| (tag.clone(), date)))
        .collect();

    let check_start = Instant::now();
    let bar = progress_bar(&settings);
    let matrix = match settings.mode {
        Mode::Checkout => {
            if settings.jobs > 1 {
                tracing::warn!("--jobs only applies to --mode tree, checking tags one at a time");
            }
            let mut snapshots = WorktreeSnapshots::new(repo, settings.web_folder.clone())?;
            analyzer::build_matrix(&mut snapshots, &tags, &files, &bar)?
        }
        Mode::Tree if settings.jobs > 1 => {
            let git_dir = repo.path().to_path_buf();
            drop(repo);
            analyzer::build_matrix_parallel(
                || TreeSnapshots::open(&git_dir, settings.web_folder.clone()),
                &tags,
                &files,
                settings.jobs,
                bar,
            )?
        }
        Mode::Tree => {
            let mut snapshots = TreeSnapshots::new(repo, settings.web_folder.clone());
            analyzer::build_matrix(&mut snapshots, &tags, &files, &bar)?
        }
    };
    tracing::info!(
        "Checked {} tags against {} files in {:.2?}",
        tags.len(),
        files.len(),
        check_start.elapsed()
    );

    let aggregates = Aggregates::compute(&matrix, settings.files.len())?;
    let best = resolve(&aggregates)?;

    let options = ReportOptions {
        color: std::io::stdout().is_terminal(),
        show_matrix: settings.show_matrix,
        tag_dates,
    };
    let report = Report { matrix: &matrix, aggregates: &aggregates, best: &best };
    renderer::render_report(&mut std::io::stdout().lock(), &report, &options)?;
    Ok(())
}
