//! Discovery of action references inside parsed workflow documents.

use std::collections::BTreeSet;

use serde_yaml::Value;

use crate::error::Result;
use crate::warning::UpdateWarning;

/// Mapping key under which workflow steps and jobs name an action
pub const DEFAULT_ACTION_KEY: &str = "uses";

/// Nesting depth past which the scanner stops descending
pub const MAX_SCAN_DEPTH: usize = 256;

/// A workflow document as a tree of mappings, sequences and scalars
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Map(Vec<(ConfigNode, ConfigNode)>),
    Sequence(Vec<ConfigNode>),
    Scalar(String),
    Null,
}

impl ConfigNode {
    /// Parse YAML text into a node tree
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text)?;
        Ok(ConfigNode::from(value))
    }

    fn as_scalar(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigNode::Null,
            Value::Bool(b) => ConfigNode::Scalar(b.to_string()),
            Value::Number(n) => ConfigNode::Scalar(n.to_string()),
            Value::String(s) => ConfigNode::Scalar(s),
            Value::Sequence(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            Value::Mapping(mapping) => ConfigNode::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (ConfigNode::from(k), ConfigNode::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => ConfigNode::from(tagged.value),
        }
    }
}

/// Collects every scalar stored under the action key, at any depth.
pub struct WorkflowScanner {
    key: String,
    max_depth: usize,
}

impl Default for WorkflowScanner {
    fn default() -> Self {
        WorkflowScanner::new(DEFAULT_ACTION_KEY)
    }
}

impl WorkflowScanner {
    pub fn new(key: impl Into<String>) -> Self {
        WorkflowScanner {
            key: key.into(),
            max_depth: MAX_SCAN_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Return the set of raw reference tokens found in `root`.
    ///
    /// Keys are compared case-sensitively. A matched key is not descended into.
    pub fn scan(&self, root: &ConfigNode) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut stack: Vec<(&ConfigNode, usize)> = vec![(root, 0)];
        let mut depth_warned = false;

        while let Some((node, depth)) = stack.pop() {
            let children: Vec<&ConfigNode> = match node {
                ConfigNode::Map(entries) => entries
                    .iter()
                    .filter_map(|(key, value)| {
                        if key.as_scalar() == Some(self.key.as_str()) {
                            if let Some(token) = value.as_scalar() {
                                found.insert(token.to_string());
                            }
                            None
                        } else {
                            Some(value)
                        }
                    })
                    .collect(),
                ConfigNode::Sequence(items) => items.iter().collect(),
                ConfigNode::Scalar(_) | ConfigNode::Null => continue,
            };

            for child in children {
                if !matches!(child, ConfigNode::Map(_) | ConfigNode::Sequence(_)) {
                    continue;
                }
                if depth + 1 > self.max_depth {
                    if !depth_warned {
                        UpdateWarning::ScanDepthExceeded {
                            limit: self.max_depth,
                        }
                        .emit();
                        depth_warned = true;
                    }
                    continue;
                }
                stack.push((child, depth + 1));
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(yaml: &str) -> Vec<String> {
        let root = ConfigNode::from_yaml_str(yaml).unwrap();
        WorkflowScanner::default().scan(&root).into_iter().collect()
    }

    #[test]
    fn test_scan_steps_and_reusable_workflows() {
        let yaml = r#"
name: CI
on: [push]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - name: Setup
        uses: actions/setup-python@v4
        with:
          python-version: "3.12"
  call:
    uses: octo-org/example/.github/workflows/reusable.yml@v1
"#;
        assert_eq!(
            scan(yaml),
            vec![
                "actions/checkout@v3",
                "actions/setup-python@v4",
                "octo-org/example/.github/workflows/reusable.yml@v1",
            ]
        );
    }

    #[test]
    fn test_scan_collapses_duplicates() {
        let yaml = r#"
jobs:
  a:
    steps:
      - uses: actions/checkout@v3
  b:
    steps:
      - uses: actions/checkout@v3
"#;
        assert_eq!(scan(yaml), vec!["actions/checkout@v3"]);
    }

    #[test]
    fn test_scan_is_case_sensitive() {
        let yaml = "steps:\n  - Uses: actions/checkout@v3\n  - USES: actions/cache@v3\n";
        assert!(scan(yaml).is_empty());
    }

    #[test]
    fn test_scan_ignores_non_scalar_values_under_key() {
        let yaml = "uses:\n  nested: actions/checkout@v3\n";
        assert!(scan(yaml).is_empty());
    }

    #[test]
    fn test_scan_depth_independent() {
        // Alternate mappings and sequences, with a reference at every level.
        let mut node = ConfigNode::Map(vec![(
            ConfigNode::Scalar("uses".into()),
            ConfigNode::Scalar("owner/repo-0@v1".into()),
        )]);
        for level in 1..40 {
            let reference = (
                ConfigNode::Scalar("uses".into()),
                ConfigNode::Scalar(format!("owner/repo-{}@v1", level)),
            );
            let wrapped = if level % 2 == 0 {
                ConfigNode::Sequence(vec![node])
            } else {
                ConfigNode::Map(vec![(ConfigNode::Scalar("inner".into()), node)])
            };
            node = ConfigNode::Map(vec![
                reference,
                (ConfigNode::Scalar("child".into()), wrapped),
            ]);
        }

        let found = WorkflowScanner::default().scan(&node);
        assert_eq!(found.len(), 40);
        for level in 0..40 {
            assert!(found.contains(&format!("owner/repo-{}@v1", level)));
        }
    }

    #[test]
    fn test_scan_stops_at_depth_limit() {
        let mut node = ConfigNode::Map(vec![(
            ConfigNode::Scalar("uses".into()),
            ConfigNode::Scalar("deep/action@v1".into()),
        )]);
        for _ in 0..10 {
            node = ConfigNode::Sequence(vec![node]);
        }

        assert!(WorkflowScanner::default().with_max_depth(5).scan(&node).is_empty());
        assert_eq!(WorkflowScanner::default().scan(&node).len(), 1);
    }

    #[test]
    fn test_scalar_root() {
        assert!(scan("just a string").is_empty());
    }
}
