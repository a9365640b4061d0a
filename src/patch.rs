//! In-place rewriting of action references in raw workflow text.

use std::collections::{BTreeSet, HashMap};

use regex::{Captures, Regex};

use crate::error::Result;

/// Rewrites whole reference tokens in workflow text.
///
/// A token is a maximal run of characters that are neither whitespace,
/// quotes nor YAML flow indicators (`[`, `]`, `{`, `}`, `,`), so a
/// replacement only ever applies to a complete `uses` value in block or flow
/// style: `actions/checkout@v2` never matches inside `actions/checkout@v2-rc1`.
/// All replacements happen in one pass over the original text, so a new
/// token is never itself rewritten by a later pair.
pub struct PatchEngine {
    token: Regex,
}

impl PatchEngine {
    pub fn new() -> Result<Self> {
        Ok(PatchEngine {
            token: Regex::new(r#"[^\s"'\[\]{},]+"#)?,
        })
    }

    /// Apply `(old_token, new_token)` pairs to `text`.
    ///
    /// Returns the updated text and whether anything changed. Text outside the
    /// replaced tokens is copied byte for byte.
    pub fn apply<'a, I>(&self, text: &str, replacements: I) -> (String, bool)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (updated, replaced) = self.apply_tracked(text, replacements);
        (updated, !replaced.is_empty())
    }

    /// Like [`PatchEngine::apply`], but returns the old tokens that were
    /// actually found and rewritten
    pub fn apply_tracked<'a, I>(&self, text: &str, replacements: I) -> (String, BTreeSet<String>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map: HashMap<&str, &str> = replacements
            .into_iter()
            .filter(|(old, new)| old != new)
            .collect();

        let mut replaced = BTreeSet::new();
        if map.is_empty() {
            return (text.to_string(), replaced);
        }

        let updated = self
            .token
            .replace_all(text, |caps: &Captures<'_>| {
                let matched = &caps[0];
                match map.get(matched) {
                    Some(new) => {
                        replaced.insert(matched.to_string());
                        new.to_string()
                    }
                    None => matched.to_string(),
                }
            })
            .into_owned();

        (updated, replaced)
    }
}
