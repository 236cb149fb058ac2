use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Something to find: the ids to click through, first required level first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTarget {
    pub name: String,
    pub path: Vec<String>,
}

impl QuizTarget {
    pub fn new<I, S>(name: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Pool identity: name plus full path. Two targets may share a node id.
    pub fn key(&self) -> String {
        format!("{}::{}", self.name, self.path.join(">"))
    }

    pub fn final_id(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}

/// Drops targets whose key was already seen and targets with an empty path.
pub fn dedupe_by_key(targets: Vec<QuizTarget>) -> Vec<QuizTarget> {
    let mut seen = BTreeSet::new();
    targets
        .into_iter()
        .filter(|t| !t.path.is_empty() && seen.insert(t.key()))
        .collect()
}
