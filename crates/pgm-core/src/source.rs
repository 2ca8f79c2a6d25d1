//! Migration directory scanning
//!
//! Discovers candidate migration files in a single directory and orders them
//! by name. The scan never looks at the ledger: every run sees the full
//! candidate set and the applied/pending decision is made per file, inside
//! the transaction that would apply it.

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationFile;
use crate::migration_name::{MigrationName, MAX_MIGRATION_NAME_LEN};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension a migration must carry.
pub const MIGRATION_EXTENSION: &str = ".sql";

/// Whether a directory entry is a migration candidate.
///
/// Regular files only, ending in `.sql`, not hidden.
pub fn is_candidate(file_name: &str, is_file: bool) -> bool {
    is_file && !file_name.starts_with('.') && file_name.ends_with(MIGRATION_EXTENSION)
}

/// Scan `dir` (non-recursively) and return its migrations in ascending name order.
///
/// Ordering is plain byte order on the file name, so timestamp prefixes must
/// be fixed width to sort chronologically; see [`ordering_hazards`].
pub fn list_pending(dir: &Path) -> CoreResult<Vec<MigrationFile>> {
    scan_names(dir)?
        .into_iter()
        .map(|(name, path)| MigrationFile::load(name, &path))
        .collect()
}

/// Names and paths of the candidates in `dir`, sorted, without reading them.
pub fn scan_names(dir: &Path) -> CoreResult<Vec<(MigrationName, PathBuf)>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        // Follows symlinks, same as the read that loads the SQL.
        let is_file = path.is_file();
        if !is_candidate(&file_name, is_file) {
            continue;
        }
        let len = file_name.chars().count();
        if len > MAX_MIGRATION_NAME_LEN {
            return Err(CoreError::MigrationNameTooLong {
                len,
                name: file_name,
                max: MAX_MIGRATION_NAME_LEN,
            });
        }
        candidates.push((MigrationName::new(file_name), path));
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(candidates)
}

/// Two adjacent migrations whose string order disagrees with their timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingHazard {
    /// The file that sorts first
    pub first: MigrationName,

    /// The file that sorts right after it
    pub second: MigrationName,

    /// What is wrong with the pair
    pub kind: HazardKind,
}

/// Kinds of ordering hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    /// The later file has a smaller numeric prefix (unpadded timestamps)
    OutOfOrder,
    /// Both files share the same prefix; order falls back to the slug
    SamePrefix,
}

impl std::fmt::Display for OrderingHazard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HazardKind::OutOfOrder => write!(
                f,
                "'{}' sorts before '{}' but has a larger timestamp prefix",
                self.first, self.second
            ),
            HazardKind::SamePrefix => write!(
                f,
                "'{}' and '{}' share a timestamp prefix and are ordered by name",
                self.first, self.second
            ),
        }
    }
}

/// Find places where lexical order and timestamp order diverge.
///
/// `names` must already be in application order. Names without a numeric
/// prefix are ignored.
pub fn ordering_hazards<'a, I>(names: I) -> Vec<OrderingHazard>
where
    I: IntoIterator<Item = &'a MigrationName>,
{
    let prefixed: Vec<(&MigrationName, u64)> = names
        .into_iter()
        .filter_map(|n| n.timestamp_prefix().map(|ts| (n, ts)))
        .collect();

    prefixed
        .windows(2)
        .filter_map(|pair| {
            let (first, a) = pair[0];
            let (second, b) = pair[1];
            let kind = if a > b {
                HazardKind::OutOfOrder
            } else if a == b {
                HazardKind::SamePrefix
            } else {
                return None;
            };
            Some(OrderingHazard {
                first: first.clone(),
                second: second.clone(),
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
