//! File naming for new migrations
//!
//! New files are named `<unix_timestamp>_<sanitized_name>.sql`. The timestamp
//! is bumped past the highest prefix already in the directory, and further
//! when needed, so a fresh file always sorts last as a string. That holds for
//! two files generated within the same second and for directories whose
//! prefixes are not zero-padded.

use crate::error::{CoreError, CoreResult};
use crate::migration_name::{MigrationName, MAX_MIGRATION_NAME_LEN};
use crate::source::{scan_names, MIGRATION_EXTENSION};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static NON_WORD: OnceLock<Regex> = OnceLock::new();

/// Replace every non-word character with `_`.
///
/// `"Add users table!"` becomes `"Add_users_table_"`.
pub fn sanitize_name(name: &str) -> String {
    NON_WORD
        .get_or_init(|| Regex::new(r"\W").expect("valid regex"))
        .replace_all(name, "_")
        .into_owned()
}

/// Largest number of digits a `u64` prefix can always carry.
const MAX_PREFIX_DIGITS: u32 = 19;

/// Pick the timestamp prefix for a new migration whose sanitized name is `slug`.
///
/// The floor is `now`, or one past the highest numeric prefix among
/// `existing` if that is later. Migrations run in string order, so the result
/// is the smallest number at or above the floor for which
/// `<prefix>_<slug>.sql` sorts after every existing name. With `1_a.sql` and
/// `2_b.sql` present, `1700000000_c.sql` would sort first, so the prefix is
/// raised to `3000000000`.
pub fn next_timestamp<'a, I>(existing: I, now: u64, slug: &str) -> CoreResult<u64>
where
    I: IntoIterator<Item = &'a MigrationName>,
{
    let existing: Vec<&MigrationName> = existing.into_iter().collect();
    let floor = existing
        .iter()
        .filter_map(|name| name.timestamp_prefix())
        .map(|ts| ts.saturating_add(1))
        .fold(now, u64::max);

    let Some(last) = existing.iter().map(|name| name.as_str()).max() else {
        return Ok(floor);
    };
    let tail = format!("_{slug}{MIGRATION_EXTENSION}");
    let sorts_last = |ts: u64| format!("{ts}{tail}").as_str() > last;

    // Within one digit count string order matches numeric order, so each
    // width is a sorted range that can be bisected.
    let floor_digits = floor.checked_ilog10().unwrap_or(0) + 1;
    for digits in floor_digits..=MAX_PREFIX_DIGITS {
        let lo = if digits == floor_digits {
            floor
        } else {
            10u64.pow(digits - 1)
        };
        let hi = 10u64.pow(digits) - 1;
        if let Some(ts) = lowest_match(lo, hi, sorts_last) {
            return Ok(ts);
        }
    }

    Err(CoreError::NoOrderedPrefix {
        last: last.to_string(),
    })
}

/// Smallest value in `lo..=hi` satisfying a predicate that is monotone over the range.
fn lowest_match(mut lo: u64, mut hi: u64, pred: impl Fn(u64) -> bool) -> Option<u64> {
    if lo > hi || !pred(hi) {
        return None;
    }
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Some(lo)
}

/// Build the file name for a migration called `name` at `timestamp`.
pub fn migration_filename(timestamp: u64, name: &str) -> CoreResult<MigrationName> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }

    let file_name = format!("{timestamp}_{}{MIGRATION_EXTENSION}", sanitize_name(name));
    let len = file_name.chars().count();
    if len > MAX_MIGRATION_NAME_LEN {
        return Err(CoreError::MigrationNameTooLong {
            len,
            name: file_name,
            max: MAX_MIGRATION_NAME_LEN,
        });
    }
    Ok(MigrationName::new(file_name))
}

/// Create an empty migration file in `dir` and return its path.
///
/// Creates `dir` when missing. Never touches the database.
pub fn create_migration(dir: &Path, name: &str, now: DateTime<Utc>) -> CoreResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let existing: Vec<MigrationName> = scan_names(dir)?.into_iter().map(|(n, _)| n).collect();
    let now = u64::try_from(now.timestamp()).unwrap_or(0);
    let timestamp = next_timestamp(&existing, now, &sanitize_name(name))?;
    if timestamp != now {
        log::debug!("Bumped migration timestamp from {now} to {timestamp} to keep ordering");
    }

    let file_name = migration_filename(timestamp, name)?;
    let path = dir.join(file_name.as_str());

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                CoreError::MigrationExists {
                    path: path.display().to_string(),
                }
            } else {
                CoreError::IoWithPath {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

    Ok(path)
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
