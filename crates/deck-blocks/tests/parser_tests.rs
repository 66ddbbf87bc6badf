//! Scanning realistic rc and hosts files.

use deck_blocks::{Error, Markers, line_at, remove_line, scan};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const ZSHRC: &str = r#"# ~/.zshrc
export PATH="$HOME/bin:$PATH"
export EDITOR=vim
alias gs='git status'
export GREETING='hello $USER'
# ========== EnvDeck Managed Variables ==========
# WARNING: This section is managed by EnvDeck. Do not edit manually.

export MANAGED="yes"

# ========== End of EnvDeck Managed Variables ==========
export FOO="a\$b"
"#;

const HOSTS: &str = "##
# Host Database
##
127.0.0.1\tlocalhost
255.255.255.255\tbroadcasthost
::1             localhost
# ========== EnvDeck Managed Hosts ==========
10.0.0.5 managed.local
# ========== End of EnvDeck Managed Hosts ==========
192.168.1.20 nas.lan nas # home server
";

#[test]
fn test_scan_shell_rc() {
    let found = scan(&Markers::variables(), ZSHRC);
    let summary: Vec<(&str, &str, usize)> = found
        .iter()
        .map(|d| (d.key.as_str(), d.value.as_str(), d.line_number))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("PATH", "$HOME/bin:$PATH", 2),
            ("EDITOR", "vim", 3),
            ("GREETING", "hello $USER", 5),
            ("FOO", "a$b", 12),
        ]
    );
    assert_eq!(found[3].raw_line, r#"export FOO="a\$b""#);
}

#[test]
fn test_scan_hosts_file() {
    let found = scan(&Markers::hosts(), HOSTS);
    let summary: Vec<(&str, &str, usize)> = found
        .iter()
        .map(|d| (d.key.as_str(), d.value.as_str(), d.line_number))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("127.0.0.1", "localhost", 4),
            ("255.255.255.255", "broadcasthost", 5),
            ("::1", "localhost", 6),
            ("192.168.1.20", "nas.lan", 10),
        ]
    );
    assert_eq!(found[3].comment.as_deref(), Some("home server"));
}

#[test]
fn test_scanned_line_numbers_point_at_raw_lines() {
    for (markers, content) in [(Markers::variables(), ZSHRC), (Markers::hosts(), HOSTS)] {
        for decl in scan(&markers, content) {
            assert_eq!(line_at(content, decl.line_number), Some(decl.raw_line.as_str()));
        }
    }
}

#[test]
fn test_remove_scanned_line() {
    let found = scan(&Markers::variables(), ZSHRC);
    let editor = found.iter().find(|d| d.key == "EDITOR").unwrap();

    let updated = remove_line(ZSHRC, editor.line_number).unwrap();
    assert!(!updated.contains("export EDITOR=vim"));
    assert_eq!(updated.split('\n').count(), ZSHRC.split('\n').count() - 1);

    let rescanned = scan(&Markers::variables(), &updated);
    assert_eq!(rescanned.len(), found.len() - 1);
}

#[test]
fn test_remove_line_bounds() {
    let count = HOSTS.split('\n').count();
    assert!(matches!(
        remove_line(HOSTS, 0),
        Err(Error::InvalidLineNumber { line: 0, .. })
    ));
    assert_eq!(
        remove_line(HOSTS, count + 1),
        Err(Error::InvalidLineNumber {
            line: count + 1,
            line_count: count
        })
    );
}

proptest! {
    #[test]
    fn test_remove_line_drops_exactly_one(lines in prop::collection::vec("[^\n]{0,16}", 1..10), pick in 0usize..10) {
        let content = lines.join("\n");
        let k = pick % lines.len() + 1;

        let updated = remove_line(&content, k).unwrap();
        let mut expected = lines.clone();
        expected.remove(k - 1);
        prop_assert_eq!(updated, expected.join("\n"));
    }
}
