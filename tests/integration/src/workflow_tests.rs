//! Workflow integration tests
//!
//! These tests drive the crates together the way the CLI does: a document on
//! disk, real target files in a temp directory, and the synchronizers
//! writing to them.

use std::path::PathBuf;
use std::sync::Arc;

use deck_blocks::{Markers, locate};
use deck_core::interchange::{export_env_json, import_env_json, prepare_imported};
use deck_core::{
    BackupRotator, DocumentStore, Elevation, EnvGroup, GroupList, HostEntry, HostGroup,
    HostsSynchronizer, ManagedGroup, Settings, ShellPrivilegedWriter, ShellSynchronizer,
    Variable, detect,
};
use deck_fs::OsFileSystem;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A home directory with a data dir, a shell startup script and a hosts file.
struct TestHome {
    temp: TempDir,
    fs: Arc<OsFileSystem>,
    store: DocumentStore,
    settings: Settings,
}

impl TestHome {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let fs = Arc::new(OsFileSystem::new());
        let store = DocumentStore::new(fs.clone(), temp.path().join("data/data.json"));
        let settings = Settings {
            config_file_path: Some(temp.path().join(".zshrc")),
            hosts_file_path: temp.path().join("hosts"),
            elevation: Elevation::Unprivileged,
            flush_command: Some("true".into()),
            ..Settings::default()
        };
        Self {
            temp,
            fs,
            store,
            settings,
        }
    }

    fn rc_path(&self) -> PathBuf {
        self.temp.path().join(".zshrc")
    }

    fn hosts_path(&self) -> PathBuf {
        self.temp.path().join("hosts")
    }

    fn write(&self, path: &PathBuf, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn read(&self, path: &PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    fn backups(&self) -> BackupRotator {
        BackupRotator::new(
            self.fs.clone(),
            self.temp.path().join("data/backups"),
            self.settings.max_backup_count,
        )
    }

    fn shell(&self) -> ShellSynchronizer {
        ShellSynchronizer::shell(self.rc_path(), self.fs.clone(), self.backups())
    }

    fn hosts(&self) -> HostsSynchronizer {
        let privileged = ShellPrivilegedWriter::new(
            self.settings.elevation,
            self.settings.flush_command(),
        );
        HostsSynchronizer::hosts(
            self.hosts_path(),
            self.fs.clone(),
            self.backups(),
            Arc::new(privileged),
        )
    }
}

fn env_group(name: &str, vars: &[(&str, &str)]) -> EnvGroup {
    let mut group = EnvGroup::create(name, "");
    group.is_enabled = true;
    group.variables = vars.iter().map(|(k, v)| Variable::new(*k, *v)).collect();
    group
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_first_run_sync_edit_migrate() {
    let home = TestHome::new();
    home.write(&home.rc_path(), "# my zshrc\nalias ll='ls -l'\n");

    let mut document = home.store.load().unwrap();
    GroupList::new(&mut document.groups)
        .set_enabled("Sample Group", true)
        .unwrap();
    home.shell().sync(&document.groups).unwrap();

    // The user appends a line by hand after the managed section.
    let mut content = home.read(&home.rc_path());
    content.push_str("\nexport NODE_ENV=development\n");
    home.write(&home.rc_path(), &content);

    let found = home.shell().scan_external().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].key, "NODE_ENV");
    let expected_line = content.split('\n').position(|l| l == "export NODE_ENV=development");
    assert_eq!(Some(found[0].line_number - 1), expected_line);

    let group_id = document.groups[0].id;
    home.shell()
        .migrate(&mut document.groups, group_id, &found[0])
        .unwrap();
    home.store.save(&mut document).unwrap();

    let content = home.read(&home.rc_path());
    assert!(content.starts_with("# my zshrc\nalias ll='ls -l'\n"));
    assert!(content.contains("export NODE_ENV=\"development\""));
    assert!(home.shell().scan_external().unwrap().is_empty());

    let reloaded = home.store.load().unwrap();
    let keys: Vec<&str> = reloaded.groups[0]
        .variables
        .iter()
        .map(|v| v.key.as_str())
        .collect();
    assert_eq!(keys, vec!["EXAMPLE_VAR", "NODE_ENV"]);
}

#[test]
fn test_last_group_in_order_wins() {
    let home = TestHome::new();
    let mut groups = vec![
        env_group("base", &[("JAVA_HOME", "/opt/jdk17")]),
        env_group("override", &[("JAVA_HOME", "/opt/jdk21")]),
    ];
    let mut list = GroupList::new(&mut groups);
    assert_eq!(list.len(), 2);

    let conflicts = detect(list.as_slice());
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].effective_value(), "/opt/jdk21");

    home.shell().sync(list.as_slice()).unwrap();
    let content = home.read(&home.rc_path());
    let jdk17 = content.find("/opt/jdk17").unwrap();
    let jdk21 = content.find("/opt/jdk21").unwrap();
    assert!(jdk17 < jdk21, "the effective value must be exported last");

    list.move_to("override", 0).unwrap();
    assert_eq!(detect(list.as_slice())[0].effective_value(), "/opt/jdk17");
}

#[test]
fn test_backup_retention_over_many_syncs() {
    let home = TestHome::new();
    home.write(&home.rc_path(), "export EDITOR=vim\n");
    let sync = home.shell();
    let groups = vec![env_group("work", &[("FOO", "bar")])];

    for _ in 0..15 {
        sync.sync(&groups).unwrap();
    }

    let backups = home.backups().list().unwrap();
    assert_eq!(backups.len(), home.settings.max_backup_count);
    assert!(backups.iter().all(|b| b.file_name.starts_with(".zshrc.")));
}

#[test]
fn test_stray_start_marker_is_repaired() {
    let home = TestHome::new();
    let markers = Markers::variables();
    home.write(
        &home.rc_path(),
        &format!("export A=1\n{}\nexport B=2\n", markers.section_start()),
    );

    home.shell()
        .sync(&[env_group("work", &[("C", "3")])])
        .unwrap();

    let content = home.read(&home.rc_path());
    assert!(content.starts_with("export A=1\n"));
    assert!(content.contains("export B=2"));
    assert_eq!(content.matches(markers.section_start()).count(), 1);
    let span = locate(&markers, &content).unwrap();
    assert!(span.end_line.is_some());

    let keys: Vec<String> = home
        .shell()
        .scan_external()
        .unwrap()
        .into_iter()
        .map(|d| d.key)
        .collect();
    assert_eq!(keys, vec!["A", "B"]);
}

#[test]
fn test_export_into_another_home() {
    let source = TestHome::new();
    let mut document = source.store.load().unwrap();
    document.groups.push(env_group("shared", &[("REGION", "eu-west-1")]));
    let text = export_env_json(&document.groups, true).unwrap();

    let target = TestHome::new();
    let mut other = target.store.load().unwrap();
    let imported = prepare_imported(import_env_json(&text).unwrap());
    let added = GroupList::new(&mut other.groups).extend(imported);
    target.store.save(&mut other).unwrap();

    assert_eq!(added, 2);
    let reloaded = target.store.load().unwrap();
    let summary: Vec<(String, usize, bool)> = reloaded
        .groups
        .iter()
        .map(|g| (g.name.clone(), g.order, g.is_enabled))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Sample Group".to_string(), 0, false),
            ("Sample Group".to_string(), 1, false),
            ("shared".to_string(), 2, false),
        ]
    );
    assert_ne!(reloaded.groups[2].id, document.groups[1].id);
}

#[cfg(unix)]
#[test]
fn test_hosts_migrate_and_restore() {
    let home = TestHome::new();
    let original = "127.0.0.1 localhost\n192.168.1.20 nas.lan # home\n";
    home.write(&home.hosts_path(), original);

    let mut groups = vec![HostGroup::create("lan", "")];
    groups[0].is_enabled = true;
    groups[0]
        .entries
        .push(HostEntry::new("192.168.1.30", "printer.lan", ""));

    let sync = home.hosts();
    let found = sync.scan_external().unwrap();
    let nas = found.iter().find(|d| d.value == "nas.lan").unwrap();
    assert_eq!(nas.line_number, 2);
    assert_eq!(nas.comment.as_deref(), Some("home"));

    let group_id = groups[0].id;
    let report = sync.migrate(&mut groups, group_id, nas).unwrap();
    assert!(report.warnings.is_empty());

    let content = home.read(&home.hosts_path());
    let markers = Markers::hosts();
    let span = locate(&markers, &content).unwrap();
    let nas_line = content
        .split('\n')
        .position(|l| l == "192.168.1.20 nas.lan # home")
        .unwrap();
    assert!(nas_line > span.start_line);
    assert_eq!(groups[0].entries.len(), 2);

    // The oldest backup is the file as it was before migration.
    let oldest = home.backups().list().unwrap().pop().unwrap();
    sync.restore(&oldest.path).unwrap();
    assert_eq!(home.read(&home.hosts_path()), original);
}
