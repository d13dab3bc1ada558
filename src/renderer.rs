// src/renderer.rs

use crate::aggregate::Aggregates;
use crate::model::*;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::io::{self, Write};

/// How close a ratio is to an exact match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioBand {
    /// 100
    Exact,
    /// 95 and above
    Close,
    /// 90 and above
    Near,
    /// Everything else, invalid ratios included
    Far,
}

impl RatioBand {
    pub fn of(value: f64) -> Self {
        if value == 100.0 {
            RatioBand::Exact
        } else if value >= 95.0 {
            RatioBand::Close
        } else if value >= 90.0 {
            RatioBand::Near
        } else {
            RatioBand::Far
        }
    }
}

/// Report settings
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Emit ANSI colours
    pub color: bool,
    /// Print the full tag × file matrix before the summaries
    pub show_matrix: bool,
    /// Commit date of each tag, when known
    pub tag_dates: HashMap<String, DateTime<Utc>>,
}

pub struct Report<'a> {
    pub matrix: &'a ScoreMatrix,
    pub aggregates: &'a Aggregates,
    pub best: &'a BestTagSet,
}

fn paint(text: &str, band: RatioBand, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match band {
        RatioBand::Exact => text.green().to_string(),
        RatioBand::Close => text.blue().to_string(),
        RatioBand::Near => text.yellow().to_string(),
        RatioBand::Far => text.red().to_string(),
    }
}

fn paint_ratio(ratio: Ratio, width: usize, color: bool) -> String {
    paint(&format!("{:<width$}", ratio.to_string()), RatioBand::of(ratio.value()), color)
}

fn paint_mean(value: f64, width: usize, color: bool) -> String {
    paint(&format!("{value:<width$.2}"), RatioBand::of(value), color)
}

fn heading(text: &str, color: bool) -> String {
    let text = format!(" --- {text} --- ");
    if color {
        text.blue().bold().to_string()
    } else {
        text
    }
}

pub fn render_report<W: Write>(out: &mut W, report: &Report<'_>, options: &ReportOptions) -> io::Result<()> {
    let color = options.color;

    if options.show_matrix {
        render_matrix(out, report.matrix, color)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", heading("RESULTS by files", color))?;
    for file in &report.aggregates.files {
        writeln!(
            out,
            "file {} : {} ({})",
            file.path,
            file.winning_tags.join(", "),
            paint_ratio(file.best_ratio, 0, color)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", heading("RESULTS by tags", color))?;

    let total = report.aggregates.total_files;
    let wins_header = format!("Number of best choice on {total} files");
    let tag_width = report
        .aggregates
        .tags
        .iter()
        .map(|t| t.tag.len())
        .chain(std::iter::once("Tag".len()))
        .max()
        .unwrap_or(3);
    let date_width = 10;
    let ratio_width = 22;

    let header = format!(
        "{:<tag_width$}  {:<date_width$}  {:<ratio_width$}  {:<ratio_width$}  {}",
        "Tag", "Date", "Ratio on checked files", "Ratio on all files", wins_header
    );
    if color {
        writeln!(out, "{}", header.magenta().bold())?;
    } else {
        writeln!(out, "{header}")?;
    }

    for tag in &report.aggregates.tags {
        let is_best = report.best.contains(&tag.tag);
        let date = options
            .tag_dates
            .get(&tag.tag)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = format!("{:<tag_width$}", tag.tag);
        let wins = tag.win_count.to_string();
        let (name, wins) = if is_best && color {
            (name.green().to_string(), wins.green().to_string())
        } else if is_best {
            (name, format!("{wins} *"))
        } else {
            (name, wins)
        };
        writeln!(
            out,
            "{}  {:<date_width$}  {}  {}  {}",
            name,
            date,
            paint_mean(tag.mean_over_checked, ratio_width, color),
            paint_mean(tag.mean_over_total, ratio_width, color),
            wins
        )?;
    }

    writeln!(out)?;
    let best: Vec<&str> = report.best.iter().collect();
    let line = format!("Best matching tag(s): {}", best.join(", "));
    if color {
        writeln!(out, "{}", line.green().bold())?;
    } else {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn render_matrix<W: Write>(out: &mut W, matrix: &ScoreMatrix, color: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", heading("RESULTS matrix", color))?;
    for row in matrix.rows() {
        writeln!(out, "{}", row.tag)?;
        for (path, ratio) in matrix.files().iter().zip(&row.ratios) {
            writeln!(out, "  {path} : {}", paint_ratio(*ratio, 0, color))?;
        }
    }
    Ok(())
}
