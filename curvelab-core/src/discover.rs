//! Condition discovery over a directory namespace.
//!
//! Layout convention: one directory per condition, each holding one CSV per
//! run. Discovery only decides which directories count; whether individual
//! files parse is the loader's problem.

use crate::domain::ConditionSet;
use std::fs;
use std::path::Path;

/// Resolve named conditions under `base`.
///
/// With explicit names, each is probed at `base/name` and silently omitted
/// unless that directory holds at least one CSV; declaration order is kept.
/// Partial results are expected when sweeping configurations. Without
/// explicit names, every immediate child directory holding a CSV is included
/// under its own name, in enumeration order. A missing `base` yields an empty
/// set, matching the skip-and-continue policy.
pub fn discover(base: &Path, explicit: Option<&[&str]>) -> ConditionSet {
    let mut set = ConditionSet::new();
    match explicit {
        Some(names) => {
            for name in names {
                let dir = base.join(name);
                if has_csv(&dir) {
                    set.push(*name, dir);
                }
            }
        }
        None => {
            let Ok(entries) = fs::read_dir(base) else {
                return set;
            };
            for entry in entries.flatten() {
                let dir = entry.path();
                if dir.is_dir() && has_csv(&dir) {
                    if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                        let name = name.to_string();
                        set.push(name, dir);
                    }
                }
            }
        }
    }
    set
}

/// Whether `dir` contains at least one `.csv` entry.
fn has_csv(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|e| e.path().extension().and_then(|x| x.to_str()) == Some("csv"))
}
