//! Integration tests for the search engine and the background search task.
//!
//! The task tests use an async-aware MPSC channel from `tokio::sync` as the
//! result sink so the test thread can await results without blocking.

use searching_tool::app::{self, ResultRow, SearchEvent, SearchSession};
use searching_tool::config::AppConfig;
use searching_tool::core::{
    CoreError, ExtensionCatalog, MatchRecord, MatchTier, SearchConfig, SearchEngine, SearchType,
};
use searching_tool::utils::test_helpers::{setup_test_logging, write_fixture, write_pdf};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Contains the test infrastructure.
mod helpers {
    use super::*;

    /// An isolated directory tree plus a default catalog.
    pub struct TestTree {
        pub catalog: ExtensionCatalog,
        pub root_path: PathBuf,
        _temp_dir: TempDir,
    }

    impl TestTree {
        pub fn new() -> Self {
            setup_test_logging();
            let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
            Self {
                catalog: ExtensionCatalog::with_defaults(),
                root_path: temp_dir.path().to_path_buf(),
                _temp_dir: temp_dir,
            }
        }

        pub fn create_file(&self, path: &str, content: &str) {
            write_fixture(&self.root_path, path, content);
        }

        /// The three files used by the report scenarios.
        pub fn setup_report_files(&self) {
            self.create_file("report.txt", "invoice number 42");
            self.create_file("report_final.txt", "final numbers");
            self.create_file("notes.pdf", "%PDF-1.4 not really a pdf");
        }

        pub fn config(&self) -> SearchConfig {
            SearchConfig::new(self.root_path.clone())
        }

        pub fn run(&self, config: &SearchConfig) -> Vec<MatchRecord> {
            SearchEngine::default()
                .run(config, &self.catalog)
                .expect("search failed")
        }

        /// One `name tier` line per record.
        pub fn render(records: &[MatchRecord]) -> String {
            records
                .iter()
                .map(|r| format!("{} {:?}", r.name, r.tier))
                .collect::<Vec<_>>()
                .join("\n")
        }

        pub fn session(&self, debounce_ms: u64) -> Arc<Mutex<SearchSession>> {
            let config = AppConfig {
                search_directory: Some(self.root_path.clone()),
                debounce_ms,
                ..Default::default()
            };
            Arc::new(Mutex::new(SearchSession::new(config)))
        }
    }

    /// Waits for the results of one particular search generation.
    pub async fn wait_for_results(
        rx: &mut mpsc::UnboundedReceiver<SearchEvent>,
        generation: u64,
    ) -> Vec<ResultRow> {
        loop {
            match tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
                Ok(Some(SearchEvent::Results { generation: g, rows })) if g == generation => {
                    return rows;
                }
                Ok(Some(_)) => { /* Ignore events of other generations */ }
                _ => panic!("Search did not complete within timeout or channel closed"),
            }
        }
    }

    /// Returns true when the current process runs as root (UID 0), where
    /// permission bits do not restrict reads.
    #[cfg(unix)]
    pub fn running_as_root() -> bool {
        // SAFETY: geteuid has no side effects.
        unsafe { libc::geteuid() == 0 }
    }
}

use helpers::TestTree;

#[test]
fn partial_name_matches_are_sorted_by_name() {
    let tree = TestTree::new();
    tree.setup_report_files();

    let results = tree.run(&tree.config().with_term("report"));

    insta::assert_snapshot!(TestTree::render(&results), @r"
    report.txt Partial
    report_final.txt Partial
    ");
}

#[test]
fn exact_name_match_leads_the_results() {
    let tree = TestTree::new();
    tree.setup_report_files();

    let results = tree.run(&tree.config().with_term("report.txt"));

    insta::assert_snapshot!(TestTree::render(&results), @r"
    report.txt Exact
    report_final.txt Partial
    ");
}

#[test]
fn content_match_is_found_when_the_name_misses() {
    let tree = TestTree::new();
    tree.create_file("invoice.txt", "Report 42");
    tree.create_file("receipt.txt", "nothing to see");

    let results = tree.run(&tree.config().with_term("report"));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "invoice.txt");
    assert_eq!(results[0].tier, MatchTier::Content);
    assert_eq!(results[0].full_path, tree.root_path.join("invoice.txt"));
}

#[test]
fn pdf_text_lands_in_the_content_tier() {
    let tree = TestTree::new();
    write_pdf(&tree.root_path.join("scan.pdf"), &["Quarterly Report"]);
    tree.create_file("quarterly.txt", "");

    let results = tree.run(&tree.config().with_term("quarterly report"));

    insta::assert_snapshot!(TestTree::render(&results), @"scan.pdf Content");
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_listed_without_following() {
    let tree = TestTree::new();
    let outside = tempfile::tempdir().expect("Failed to create temp dir");
    write_fixture(outside.path(), "archive/report_2023.txt", "");
    tree.create_file("report.txt", "");
    std::os::unix::fs::symlink(
        outside.path().join("archive/report_2023.txt"),
        tree.root_path.join("report_link.txt"),
    )
    .unwrap();
    std::os::unix::fs::symlink(outside.path().join("archive"), tree.root_path.join("reports"))
        .unwrap();

    let files = tree.run(&tree.config().with_term("report"));
    let names: Vec<_> = files.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["report.txt", "report_link.txt"]);

    let dirs = tree.run(
        &tree
            .config()
            .with_search_type(SearchType::Directory)
            .with_term("report"),
    );
    let names: Vec<_> = dirs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["reports"]);
}

#[test]
fn empty_term_lists_enabled_category_files_alphabetically() {
    let tree = TestTree::new();
    tree.create_file("zebra.PNG", "");
    tree.create_file("album/Beach.jpg", "");
    tree.create_file("album/raw/cliff.jpeg", "");
    tree.create_file("notes.txt", "");
    tree.create_file("clip.mp4", "");

    let results = tree.run(&tree.config().with_category("Images"));
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();

    assert_eq!(names, vec!["Beach.jpg", "cliff.jpeg", "zebra.PNG"]);
}

#[test]
fn disabled_extension_never_appears() {
    let mut tree = TestTree::new();
    tree.create_file("report.pdf", "");
    tree.create_file("report.docx", "");
    tree.create_file("report.txt", "");
    tree.catalog
        .toggle("Documents", ".pdf", false)
        .expect("toggle failed");

    for term in ["report", "report.pdf", ""] {
        let results = tree.run(&tree.config().with_category("Documents").with_term(term));
        assert!(
            results.iter().all(|r| !r.name.ends_with(".pdf")),
            "pdf leaked for term {:?}",
            term
        );
    }

    let results = tree.run(&tree.config().with_category("Documents").with_term("report"));
    assert_eq!(results.len(), 2);
}

#[test]
fn missing_root_is_reported_as_unreadable() {
    let tree = TestTree::new();
    let missing = tree.root_path.join("does-not-exist");

    let err = SearchEngine::default()
        .run(&SearchConfig::new(missing.clone()), &tree.catalog)
        .unwrap_err();

    assert!(matches!(err, CoreError::DirectoryUnreadable(p) if p == missing));
}

#[test]
fn list_all_equals_the_extension_filtered_tree() {
    let tree = TestTree::new();
    tree.create_file("a/one.txt", "");
    tree.create_file("a/b/two.py", "");
    tree.create_file("three.unknown", "");
    tree.create_file("four.CSV", "");

    let results = tree.run(&tree.config());
    let mut paths: Vec<_> = results.iter().map(|r| r.full_path.clone()).collect();
    paths.sort();

    let mut expected = vec![
        tree.root_path.join("a/one.txt"),
        tree.root_path.join("a/b/two.py"),
        tree.root_path.join("four.CSV"),
    ];
    expected.sort();
    assert_eq!(paths, expected);
}

#[test]
fn repeated_runs_are_identical() {
    let tree = TestTree::new();
    for i in 0..20 {
        tree.create_file(&format!("dir{}/Data_{}.txt", i % 4, i), "payload data");
        tree.create_file(&format!("dir{}/same.txt", i % 4), "");
    }
    let config = tree.config().with_term("data");

    let first = tree.run(&config);
    let second = tree.run(&config);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn directory_search_matches_folder_names_only() {
    let tree = TestTree::new();
    tree.create_file("Projects/report/readme.txt", "");
    tree.create_file("old_Reports/file.txt", "");
    tree.create_file("report.txt", "report");

    let results = tree.run(
        &tree
            .config()
            .with_search_type(SearchType::Directory)
            .with_term("report"),
    );

    insta::assert_snapshot!(TestTree::render(&results), @r"
    old_Reports Partial
    report Partial
    ");
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    if helpers::running_as_root() {
        eprintln!("skipping: permissions are not enforced for root");
        return;
    }

    let tree = TestTree::new();
    tree.create_file("visible/report.txt", "");
    tree.create_file("locked/report_secret.txt", "");
    let locked = tree.root_path.join("locked");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    let results = tree.run(&tree.config().with_term("report"));

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["report.txt"]);
}

#[tokio::test]
async fn background_search_delivers_ordered_rows() {
    let tree = TestTree::new();
    tree.setup_report_files();
    let state = tree.session(0);
    state.lock().unwrap().set_search_term("report.txt");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let generation = app::tasks::start_search(state.clone(), tx);
    let rows = helpers::wait_for_results(&mut rx, generation).await;

    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["report.txt", "report_final.txt"]);
    assert!(state.lock().unwrap().search_task.is_none());
}

#[tokio::test]
async fn newer_search_supersedes_older_one() {
    let tree = TestTree::new();
    tree.setup_report_files();
    let state = tree.session(200);
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.lock().unwrap().set_search_term("rep");
    let first = app::tasks::start_search(state.clone(), tx.clone());
    state.lock().unwrap().set_search_term("report_final");
    let second = app::tasks::start_search(state.clone(), tx);
    assert!(second > first);

    let mut seen = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
        seen.push(event);
    }

    assert_eq!(
        seen,
        vec![SearchEvent::Results {
            generation: second,
            rows: vec![ResultRow {
                name: "report_final.txt".to_string(),
                full_path: tree.root_path.join("report_final.txt"),
            }],
        }]
    );
}

#[tokio::test]
async fn toggles_after_start_do_not_affect_the_running_search() {
    let tree = TestTree::new();
    tree.create_file("a.pdf", "");
    tree.create_file("b.txt", "");
    let state = tree.session(100);
    state.lock().unwrap().select_category("Documents").unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let generation = app::tasks::start_search(state.clone(), tx);
    state
        .lock()
        .unwrap()
        .toggle_extension("Documents", ".pdf", false)
        .unwrap();

    let rows = helpers::wait_for_results(&mut rx, generation).await;
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.txt"]);
}

#[tokio::test]
async fn unreadable_root_yields_empty_rows_and_an_error() {
    let tree = TestTree::new();
    let state = tree.session(0);
    state.lock().unwrap().search_directory = tree.root_path.join("gone");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let generation = app::tasks::start_search(state, tx);

    let rows = helpers::wait_for_results(&mut rx, generation).await;
    assert!(rows.is_empty());
    match rx.recv().await {
        Some(SearchEvent::ShowError(message)) => {
            assert!(message.contains("unreadable"), "unexpected message: {}", message)
        }
        other => panic!("expected an error event, got {:?}", other),
    }
}
