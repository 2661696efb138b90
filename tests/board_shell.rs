use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ulid::Ulid;

use workboard::calendar::FixedClock;
use workboard::kv::{FileKv, KvStore};
use workboard::model::BoundaryRule;
use workboard::shell::{self, Board};
use workboard::store::{ASSIGNMENTS_KEY, AssignmentStore};
use workboard::timescale::{TimescaleConfig, TimescaleEngine};

// ── Test infrastructure ──────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
}

fn data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("workboard_int_test_{}", Ulid::new()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn open_board(dir: &Path) -> Board<FileKv> {
    let kv = FileKv::open(dir).unwrap();
    let store = AssignmentStore::open(kv, today(), BoundaryRule::Exclusive).unwrap();
    let timescale = TimescaleEngine::new(TimescaleConfig::default(), FixedClock(today()));
    Board::new(timescale, store)
}

/// Feed `script` through the shell and return its output lines.
fn exec(board: &mut Board<FileKv>, script: &str) -> Vec<String> {
    let mut out = Vec::new();
    shell::run(board, script.as_bytes(), &mut out, "").unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ── Sessions ─────────────────────────────────────────────────

#[test]
fn fresh_directory_is_seeded() {
    let dir = data_dir();
    let mut board = open_board(&dir);
    let lines = exec(&mut board, "resources\n");
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "wc-001  Genesis Hardware  (2 work orders)");
    assert!(dir.join("resources.json").exists());
    assert!(dir.join("assignments.json").exists());
}

#[test]
fn create_respects_overlap_rules() {
    let dir = data_dir();
    let mut board = open_board(&dir);

    // wc-001 holds [2025-05-04, 2025-06-03] and [2025-06-28, 2025-07-13].
    let gap = exec(&mut board, "create wc-001 2025-06-10 2025-06-20 open Gap Fill\n");
    assert!(gap[0].starts_with("ok wo-"), "{gap:?}");

    let adjacent = exec(&mut board, "create wc-001 2025-07-13 2025-07-20 open After\n");
    assert!(adjacent[0].starts_with("ok wo-"), "{adjacent:?}");

    let clash = exec(&mut board, "create wc-001 2025-07-01 2025-07-05 open Clash\n");
    assert_eq!(
        clash,
        vec!["error: this time period overlaps with \"Maintenance Schedule\" (2025-06-28 - 2025-07-13)"]
    );

    let invalid = exec(&mut board, "create wc-001 2025-08-10 2025-08-10 open Zero\n");
    assert_eq!(
        invalid,
        vec!["error: end date 2025-08-10 must be after start date 2025-08-10"]
    );

    let listed = exec(&mut board, "list wc-001\n");
    assert_eq!(listed.len(), 4);
    assert!(listed[2].ends_with("[Open]  Gap Fill"), "{listed:?}");
}

#[test]
fn check_update_and_delete() {
    let dir = data_dir();
    let mut board = open_board(&dir);

    assert_eq!(exec(&mut board, "check wc-003 2025-07-13 2025-07-18\n"), vec!["ok"]);
    let blocked = exec(&mut board, "check wc-003 2025-07-10 2025-07-20\n");
    assert!(blocked[0].starts_with("error: this time period overlaps with \"Konsulting Inc\""));
    assert_eq!(exec(&mut board, "check wc-003 2025-05-29 2025-07-14 wo-003\n"), vec!["ok"]);

    assert_eq!(
        exec(&mut board, "update wo-003 wc-003 2025-05-29 2025-07-14 complete Konsulting Inc\n"),
        vec!["ok"]
    );
    let shown = exec(&mut board, "show wo-003\n");
    assert!(shown[0].contains("[Complete]"), "{shown:?}");
    assert!(shown[1].starts_with("  05.29.2025 to 07.14.2025 (46 days), left "), "{shown:?}");

    assert_eq!(
        exec(&mut board, "update wo-404 wc-003 2025-01-01 2025-01-02 open Ghost\n"),
        vec!["error: work order not found: wo-404"]
    );

    assert_eq!(exec(&mut board, "delete wo-007\ndelete wo-007\n"), vec!["ok", "ok (no such work order)"]);
}

#[test]
fn timescale_commands() {
    let dir = data_dir();
    let mut board = open_board(&dir);

    let columns = exec(&mut board, "columns\n");
    assert!(columns[0].starts_with("Dec 2024 | Jan 2025"), "{columns:?}");
    assert!(columns[0].contains("*Jun 2025*"));

    let lines = exec(&mut board, "scale day\nat 250\nexpand past\nexpand future\n");
    assert_eq!(
        lines,
        vec![
            "day view, 12 columns",
            "2025-06-14",
            "added 6 columns before 2025-06-06; scroll right by 600.0px",
            "added 6 columns through 2025-06-29",
        ]
    );
    assert_eq!(board.timescale.total_columns(), 24);

    let centered = exec(&mut board, "today\n");
    assert_eq!(centered, vec!["centered on 2025-06-18: 2025-06-12 .. 2025-06-23"]);
}

#[test]
fn errors_do_not_end_the_session() {
    let dir = data_dir();
    let mut board = open_board(&dir);
    let lines = exec(&mut board, "bogus\n\n# comment\nscale year\nscale week\nquit\nscale day\n");
    assert_eq!(
        lines,
        vec![
            "error: unknown command: bogus (try `help`)",
            "error: parse error: unknown granularity: year",
            "week view, 12 columns",
        ]
    );
    assert_eq!(board.timescale.granularity().as_str(), "week");
}

#[test]
fn undecodable_line_is_reported_and_skipped() {
    let dir = data_dir();
    let mut board = open_board(&dir);
    let mut out = Vec::new();
    let input: &[u8] = b"scale day\n\xff\xfe\nscale week\n";
    shell::run(&mut board, input, &mut out, "").unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "{lines:?}");
    assert_eq!(lines[0], "day view, 12 columns");
    assert!(lines[1].starts_with("error: input is not valid UTF-8"), "{lines:?}");
    assert_eq!(lines[2], "week view, 12 columns");
    assert_eq!(board.timescale.granularity().as_str(), "week");
}

#[test]
fn crlf_input_is_accepted() {
    let dir = data_dir();
    let mut board = open_board(&dir);
    assert_eq!(exec(&mut board, "scale day\r\nat 250\r\n"), vec!["day view, 12 columns", "2025-06-14"]);
}

#[test]
fn mutations_survive_reopen() {
    let dir = data_dir();
    {
        let mut board = open_board(&dir);
        exec(&mut board, "create wc-002 2025-07-10 2025-07-12 blocked Retool\ndelete wo-001\n");
        assert_eq!(board.store.assignments().len(), 8);
    }

    let mut board = open_board(&dir);
    assert_eq!(board.store.assignments().len(), 8);
    let listed = exec(&mut board, "list wc-002\n");
    assert_eq!(listed.len(), 2);
    assert!(listed[1].ends_with("[Blocked]  Retool"));

    let raw = FileKv::open(&dir).unwrap().get(ASSIGNMENTS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"resourceId\":\"wc-002\""));
    assert!(!raw.contains("wo-001"));
}

#[test]
fn corrupt_file_is_reseeded() {
    let dir = data_dir();
    std::fs::write(dir.join("resources.json"), "[]").unwrap();
    std::fs::write(dir.join("assignments.json"), "{not json").unwrap();
    let board = open_board(&dir);
    assert_eq!(board.store.resources().len(), 5);
    assert_eq!(board.store.assignments().len(), 8);
}
