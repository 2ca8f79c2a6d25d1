//! End-to-end runner tests against a live PostgreSQL server.
//!
//! Skipped unless `PGMIGRATE_TEST_DATABASE_URL` is set. Every test gets its
//! own schema via `search_path`, so the unqualified `migrations` table and
//! the migration SQL land there.

use pgm_core::MigrationFile;
use pgm_db::{DbResult, PostgresBackend};
use pgm_runner::{Reporter, RunError, RunSummary, Runner};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────────────

const URL_VAR: &str = "PGMIGRATE_TEST_DATABASE_URL";

struct Quiet;

impl Reporter for Quiet {
    fn applied(&mut self, _file: &MigrationFile, _duration: Duration) {}
    fn done(&mut self, _summary: &RunSummary) {}
}

struct Scratch {
    url: String,
    schema: String,
}

impl Scratch {
    fn new(label: &str) -> Option<Self> {
        let Ok(url) = std::env::var(URL_VAR) else {
            eprintln!("skipping: {URL_VAR} not set");
            return None;
        };
        let schema = format!("pgm_run_{label}_{}", std::process::id());
        let mut db = PostgresBackend::connect(&url).unwrap();
        db.batch_execute(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema}"
        ))
        .unwrap();
        Some(Self { url, schema })
    }

    fn connector(&self) -> impl Fn() -> DbResult<PostgresBackend> + Send + 'static {
        let url = self.url.clone();
        let schema = self.schema.clone();
        move || {
            let mut db = PostgresBackend::connect(&url)?;
            db.batch_execute(&format!("SET search_path TO {schema}"))?;
            Ok(db)
        }
    }

    fn query_i64(&self, sql: &str) -> i64 {
        let mut db = (self.connector())().unwrap();
        db.client().query_one(sql, &[]).unwrap().get(0)
    }

    fn table_exists(&self, table: &str) -> bool {
        self.query_i64(&format!(
            "SELECT count(*) FROM information_schema.tables
             WHERE table_schema = current_schema() AND table_name = '{table}'"
        )) > 0
    }

    fn ledger(&self) -> Vec<String> {
        let mut db = (self.connector())().unwrap();
        db.client()
            .query("SELECT filename FROM migrations ORDER BY migration_id", &[])
            .unwrap()
            .iter()
            .map(|row| row.get::<_, String>(0).trim_end().to_string())
            .collect()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if let Ok(mut db) = PostgresBackend::connect(&self.url) {
            let _ = db.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema));
        }
    }
}

fn write_all(dir: &Path, files: &[(&str, &str)]) {
    for (name, sql) in files {
        fs::write(dir.join(name), sql).unwrap();
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_apply_twice_is_idempotent() {
    let Some(s) = Scratch::new("idem") else {
        return;
    };
    let dir = TempDir::new().unwrap();
    write_all(
        dir.path(),
        &[
            ("0001_users.sql", "CREATE TABLE users (id int primary key);"),
            ("0002_seed.sql", "INSERT INTO users VALUES (1), (2);"),
        ],
    );
    let runner = Runner::new(s.connector(), dir.path());

    let first = runner.run(&mut Quiet).unwrap();
    let second = runner.run(&mut Quiet).unwrap();

    assert_eq!(first.applied.len(), 2);
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped.len(), 2);
    assert_eq!(s.query_i64("SELECT count(*) FROM users"), 2);
    assert_eq!(s.ledger(), vec!["0001_users.sql", "0002_seed.sql"]);
}

#[test]
fn test_failed_file_leaves_no_trace() {
    let Some(s) = Scratch::new("atomic") else {
        return;
    };
    let dir = TempDir::new().unwrap();
    write_all(
        dir.path(),
        &[
            ("0001_ok.sql", "CREATE TABLE first (id int);"),
            (
                "0002_broken.sql",
                "CREATE TABLE second (id int); INSERT INTO first VALUES (1); CREATE TABEL oops (id int);",
            ),
            ("0003_never.sql", "CREATE TABLE third (id int);"),
        ],
    );
    let runner = Runner::new(s.connector(), dir.path());

    let err = runner.run(&mut Quiet).unwrap_err();

    assert!(
        matches!(err, RunError::MigrationFailed { ref filename, .. } if filename == "0002_broken.sql")
    );
    assert_eq!(s.ledger(), vec!["0001_ok.sql"]);
    assert!(s.table_exists("first"));
    assert!(!s.table_exists("second"));
    assert!(!s.table_exists("third"));
    assert_eq!(s.query_i64("SELECT count(*) FROM first"), 0);
}

#[test]
fn test_concurrent_runners_apply_each_file_once() {
    let Some(s) = Scratch::new("race") else {
        return;
    };
    let dir = TempDir::new().unwrap();
    write_all(
        dir.path(),
        &[
            ("0001_counter.sql", "CREATE TABLE counter (n int);"),
            ("0002_bump.sql", "INSERT INTO counter VALUES (1);"),
            ("0003_bump.sql", "SELECT pg_sleep(0.2); INSERT INTO counter VALUES (1);"),
        ],
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let connector = s.connector();
            let path = dir.path().to_path_buf();
            std::thread::spawn(move || Runner::new(connector, path).run(&mut Quiet))
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        let summary = handle.join().unwrap().unwrap();
        applied += summary.applied.len();
    }

    assert_eq!(applied, 3);
    assert_eq!(s.query_i64("SELECT count(*) FROM counter"), 2);
    assert_eq!(
        s.ledger(),
        vec!["0001_counter.sql", "0002_bump.sql", "0003_bump.sql"]
    );
}

#[test]
fn test_status_reports_pending_files() {
    let Some(s) = Scratch::new("status") else {
        return;
    };
    let dir = TempDir::new().unwrap();
    write_all(dir.path(), &[("0001_a.sql", "CREATE TABLE a (id int);")]);
    let runner = Runner::new(s.connector(), dir.path());
    runner.run(&mut Quiet).unwrap();
    write_all(dir.path(), &[("0002_b.sql", "CREATE TABLE b (id int);")]);

    let status = runner.status().unwrap();

    assert_eq!(status.len(), 2);
    assert!(!status[0].is_pending());
    assert!(status[1].is_pending());
    assert!(!s.table_exists("b"));
}
