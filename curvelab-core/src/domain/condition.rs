//! Named conditions and their ordered collection.

use std::path::{Path, PathBuf};

/// One named condition: a label and the directory holding its run sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub label: String,
    pub dir: PathBuf,
}

/// An ordered set of conditions. Order is declaration order (explicit
/// discovery) or enumeration order (auto-discovery) and becomes legend order
/// downstream, so it is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSet {
    entries: Vec<Condition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, dir: impl Into<PathBuf>) {
        self.entries.push(Condition {
            label: label.into(),
            dir: dir.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&Condition> {
        self.entries.iter().find(|c| c.label == label)
    }

    pub fn dir_of(&self, label: &str) -> Option<&Path> {
        self.get(label).map(|c| c.dir.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ConditionSet {
    type Item = Condition;
    type IntoIter = std::vec::IntoIter<Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
