mod common;

use common::{commit_and_tag, init_repo};
use indicatif::ProgressBar;
use version_checker::analyzer::build_matrix;
use version_checker::snapshot::{MemorySnapshots, WorktreeSnapshots};
use version_checker::{resolve, Aggregates, Ratio, RemoteFile, ScoreMatrix};

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|t| t.to_string()).collect()
}

fn remote() -> Vec<RemoteFile> {
    vec![
        RemoteFile::new("a.js", "abcdefghij"),
        RemoteFile::new("b.js", "console.log(1)"),
    ]
}

fn snapshots() -> MemorySnapshots {
    MemorySnapshots::new()
        .with_file("v1", "a.js", "abcdefghij")
        .with_file("v1", "b.js", "console.log(1)")
        .with_file("v2", "a.js", "abcdefghiX")
}

#[test]
fn identical_tag_wins_everything() {
    let files = remote();
    let matrix = build_matrix(&mut snapshots(), &tags(&["v1", "v2"]), &files, &ProgressBar::hidden()).unwrap();
    let aggregates = Aggregates::compute(&matrix, files.len()).unwrap();

    let v1 = aggregates.tag("v1").unwrap();
    assert_eq!(v1.mean_over_checked, 100.0);
    assert_eq!(v1.win_count, 2);
    assert!(resolve(&aggregates).unwrap().contains("v1"));
}

#[test]
fn missing_file_is_averaged_as_minus_one() {
    let files = remote();
    let matrix = build_matrix(&mut snapshots(), &tags(&["v1", "v2"]), &files, &ProgressBar::hidden()).unwrap();

    assert_eq!(matrix.get("v2", "a.js"), Some(Ratio::Score(90.0)));
    assert_eq!(matrix.get("v2", "b.js"), Some(Ratio::Invalid));

    let aggregates = Aggregates::compute(&matrix, files.len()).unwrap();
    assert_eq!(aggregates.tag("v2").unwrap().mean_over_checked, 44.5);
    assert_eq!(aggregates.tag("v2").unwrap().win_count, 0);
}

#[test]
fn best_set_is_the_union_of_maxima() {
    let files: Vec<&str> = vec!["f1", "f2", "f3", "f4", "f5", "f6"];
    let mut matrix = ScoreMatrix::new(files.iter().map(|f| f.to_string()).collect());
    for (tag, won) in [("A", ["f1", "f2"]), ("B", ["f3", "f4"]), ("C", ["f5", "f6"])] {
        let scores = files.iter().map(|f| {
            let ratio = if won.contains(f) { 100.0 } else { 0.0 };
            (*f, Ratio::Score(ratio))
        });
        matrix.insert(tag, scores);
    }
    matrix.insert("D", files.iter().map(|f| (*f, Ratio::Score(95.0))));

    let aggregates = Aggregates::compute(&matrix, files.len()).unwrap();
    let wins: Vec<usize> = aggregates.tags.iter().map(|t| t.win_count).collect();
    assert_eq!(wins, vec![2, 2, 2, 0]);

    let best = resolve(&aggregates).unwrap();
    assert_eq!(best.iter().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
}

#[test]
fn aggregation_is_deterministic() {
    let files = remote();
    let matrix = build_matrix(&mut snapshots(), &tags(&["v2", "v1"]), &files, &ProgressBar::hidden()).unwrap();

    let first = Aggregates::compute(&matrix, files.len()).unwrap();
    let second = Aggregates::compute(&matrix, files.len()).unwrap();
    assert_eq!(first, second);
    assert_eq!(resolve(&first).unwrap(), resolve(&second).unwrap());
}

#[test]
fn worktree_run_finds_the_deployed_release() {
    let (_dir, repo) = init_repo();
    commit_and_tag(&repo, "1.0.0", &[("public/js/app.js", "var version = 1;")]);
    commit_and_tag(&repo, "1.1.0", &[("public/js/app.js", "var version = 11;"), ("public/css/site.css", "p{}")]);
    commit_and_tag(&repo, "2.0.0", &[("public/js/app.js", "let version = 2;"), ("public/css/site.css", "p{margin:0}")]);

    let deployed = vec![
        RemoteFile::new("js/app.js", "var version = 11;"),
        RemoteFile::new("css/site.css", "p{}"),
    ];
    let mut snapshots = WorktreeSnapshots::new(repo, "public").unwrap();
    let matrix = build_matrix(
        &mut snapshots,
        &tags(&["1.0.0", "1.1.0", "2.0.0"]),
        &deployed,
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(matrix.get("1.0.0", "css/site.css"), Some(Ratio::Invalid));
    let aggregates = Aggregates::compute(&matrix, deployed.len()).unwrap();
    let best = resolve(&aggregates).unwrap();
    assert_eq!(best.iter().collect::<Vec<_>>(), vec!["1.1.0"]);
}
