//! Integration tests for separator recognition and mailbox scanning.

use std::path::Path;

use mboxfrom::config::ScanConfig;
use mboxfrom::parser::envelope::{copy_bounded, terminated};
use mboxfrom::parser::{is_from, FromLine};
use mboxfrom::scan::scan_path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const CANONICAL: &[u8] = b"From jdoe@example.com Thu Jan  1 00:00:00 1998";

// ─── Test 1: Canonical separator line ───────────────────────────────

#[test]
fn test_canonical_line() {
    let mut path = [0u8; 64];
    let mut time = 0i64;
    assert!(is_from(CANONICAL, Some(&mut path), Some(&mut time)));
    assert_eq!(terminated(&path), b"jdoe@example.com");
    let expected = chrono::DateTime::parse_from_rfc3339("1998-01-01T00:00:00Z")
        .unwrap()
        .timestamp();
    assert_eq!(time, expected);
}

// ─── Test 2: Lines that are not separators leave outputs untouched ──

#[test]
fn test_non_separators_do_not_write() {
    let lines: [&[u8]; 7] = [
        b"from jdoe@example.com Thu Jan  1 00:00:00 1998",
        b"FROM jdoe@example.com Thu Jan  1 00:00:00 1998",
        b">From jdoe@example.com Thu Jan  1 00:00:00 1998",
        b"From: John Doe <jdoe@example.com>",
        b"Fromjdoe@example.com Thu Jan  1 00:00:00 1998",
        b"From\tjdoe@example.com Thu Jan  1 00:00:00 1998",
        b"",
    ];
    for line in lines {
        let mut path = [0x55u8; 8];
        let mut time = 7i64;
        assert!(
            !is_from(line, Some(&mut path), Some(&mut time)),
            "unexpectedly recognized: {:?}",
            String::from_utf8_lossy(line)
        );
        assert_eq!(path, [0x55u8; 8]);
        assert_eq!(time, 7);
    }
}

// ─── Test 3: Empty envelope sender ──────────────────────────────────

#[test]
fn test_empty_sender_placeholder() {
    let mut path = [0x55u8; 8];
    assert!(is_from(b"From  Thu Jan 1 00:00:00 1998", Some(&mut path), None));
    assert_eq!(terminated(&path), b"");
    assert_eq!(path[0], 0);
}

// ─── Test 4: Bounded copy truncation ────────────────────────────────

#[test]
fn test_truncation_to_capacity_five() {
    let sender = b"twenty.chars@example";
    assert_eq!(sender.len(), 20);
    let line = [
        b"From ".as_slice(),
        sender.as_slice(),
        b" Thu Jan  1 00:00:00 1998".as_slice(),
    ]
    .concat();

    let mut backing = [0x55u8; 8];
    let (path, guard) = backing.split_at_mut(5);
    assert!(is_from(&line, Some(&mut *path), None));
    assert_eq!(path, b"twen\0");
    // nothing written past the declared capacity
    assert_eq!(guard, [0x55u8; 3]);
}

#[test]
fn test_zero_capacity_performs_no_writes() {
    let mut backing = [0x55u8; 4];
    let (path, guard) = backing.split_at_mut(0);
    assert!(is_from(CANONICAL, Some(path), None));
    assert_eq!(guard, [0x55u8; 4]);
    assert_eq!(copy_bounded(b"abc", &mut []), 0);
}

// ─── Test 5: Idempotence ────────────────────────────────────────────

#[test]
fn test_recognition_is_idempotent() {
    let mut first = ([0u8; 32], 0i64);
    let mut second = ([0u8; 32], 0i64);
    assert!(is_from(CANONICAL, Some(&mut first.0), Some(&mut first.1)));
    assert!(is_from(CANONICAL, Some(&mut second.0), Some(&mut second.1)));
    assert_eq!(first, second);
}

// ─── Test 6: Whitespace run-length does not matter ──────────────────

#[test]
fn test_whitespace_runs() {
    let narrow = FromLine::parse(b"From jdoe@example.com Thu Jan 1 00:00:00 1998").unwrap();
    let wide =
        FromLine::parse(b"From   jdoe@example.com   Thu   Jan   1   00:00:00   1998").unwrap();
    let tabs = FromLine::parse(b"From jdoe@example.com\tThu\tJan\t1\t00:00:00\t1998").unwrap();
    for other in [&wide, &tabs] {
        assert_eq!(narrow.sender(), other.sender());
        assert_eq!(narrow.calendar(), other.calendar());
        assert_eq!(narrow.timestamp(), other.timestamp());
    }
}

// ─── Test 7: Two- and four-digit years agree ────────────────────────

#[test]
fn test_two_and_four_digit_years() {
    let short = FromLine::parse(b"From jdoe Thu Jan  1 00:00:00 98").unwrap();
    let long = FromLine::parse(b"From jdoe Thu Jan  1 00:00:00 1998").unwrap();
    assert_eq!(short.calendar().year, 98);
    assert_eq!(short.calendar(), long.calendar());
    assert_eq!(short.timestamp(), long.timestamp());

    let y2k = FromLine::parse(b"From jdoe Sat Jan  1 00:00:00 00").unwrap();
    assert_eq!(y2k.calendar().full_year(), 2000);
}

// ─── Test 8: Concurrent recognition ─────────────────────────────────

#[test]
fn test_concurrent_recognition() {
    let lines: Vec<String> = (1..=28)
        .map(|day| format!("From user{day}@example.com Mon Feb {day:2} 12:00:00 2024"))
        .collect();
    let sequential: Vec<(bool, i64)> = lines
        .iter()
        .map(|l| {
            let mut t = 0;
            (is_from(l.as_bytes(), None, Some(&mut t)), t)
        })
        .collect();

    let lines = &lines;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(move || {
                    lines
                        .iter()
                        .map(|l| {
                            let mut t = 0;
                            (is_from(l.as_bytes(), None, Some(&mut t)), t)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), sequential);
        }
    });
    assert!(sequential.iter().all(|(ok, _)| *ok));
}

// ─── Test 9: Scan the sample mailbox ────────────────────────────────

#[test]
fn test_scan_sample_mbox() {
    let seps: Vec<_> = scan_path(fixture("sample.mbox"), &ScanConfig::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let summary: Vec<(u64, u64, &str, i64)> = seps
        .iter()
        .map(|s| (s.line_number, s.offset, s.sender.as_str(), s.timestamp))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, 0, "alice@example.com", 1_704_362_400),
            (8, 155, "", 1_704_454_200),
            (14, 258, "MAILER-DAEMON", 1_704_532_500),
            (18, 352, "carol@example.com", 1_704_671_999),
            (23, 453, "dave@example.com", 1_704_700_800),
        ]
    );
    assert!(!seps[3].preceded_by_blank);
}

// ─── Test 10: Strict scanning skips unseparated From lines ──────────

#[test]
fn test_scan_sample_mbox_strict() {
    let config = ScanConfig {
        require_blank_line: true,
        ..ScanConfig::default()
    };
    let senders: Vec<String> = scan_path(fixture("sample.mbox"), &config)
        .unwrap()
        .map(|s| s.unwrap().sender)
        .collect();
    assert_eq!(
        senders,
        ["alice@example.com", "", "MAILER-DAEMON", "dave@example.com"]
    );
}
