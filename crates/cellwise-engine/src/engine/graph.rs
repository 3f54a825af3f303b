//! Dependency graph over string keys.
//!
//! An edge `(source, target)` means "target depends on source": target's
//! formula reads source.
//!
//! ```text
//! A1 → B1  means  "B1 depends on A1"  (A1 is a dependee of B1)
//! ```
//!
//! For example, with edges `{(a, b), (a, c), (b, d), (d, d)}`:
//!
//! - `dependents(a) = {b, c}`, `dependents(d) = {d}`
//! - `dependees(a) = {}`, `dependees(d) = {b, d}`

use std::collections::{HashMap, HashSet};

use super::error::GraphError;

/// Bidirectional dependency relation.
///
/// # Invariants
///
/// 1. **Transposed maps:** `t ∈ dependents[s]` iff `s ∈ dependees[t]`.
/// 2. **No dangling entries:** empty sets are removed, not stored.
/// 3. **Counted edges:** `len()` equals the number of distinct pairs.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// source -> {targets that depend on it}
    dependents: HashMap<String, HashSet<String>>,
    /// target -> {sources it depends on}
    dependees: HashMap<String, HashSet<String>>,
    size: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Nodes that depend on `node`.
    pub fn dependents<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.dependents
            .get(node)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Nodes that `node` depends on.
    pub fn dependees<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.dependees
            .get(node)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn has_dependents(&self, node: &str) -> bool {
        self.dependents.contains_key(node)
    }

    pub fn has_dependees(&self, node: &str) -> bool {
        self.dependees.contains_key(node)
    }

    /// Number of nodes `node` depends on.
    pub fn dependee_count(&self, node: &str) -> usize {
        self.dependees.get(node).map_or(0, HashSet::len)
    }

    /// Record that `target` depends on `source`. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        check_key(source)?;
        check_key(target)?;
        self.insert(source, target);
        Ok(())
    }

    /// Remove the edge `(source, target)` if present.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        check_key(source)?;
        check_key(target)?;
        self.unlink(source, target);
        Ok(())
    }

    /// Replace every edge `(source, *)` with `(source, t)` for each `t` in `targets`.
    pub fn replace_dependents<I, S>(&mut self, source: &str, targets: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_key(source)?;
        let targets = collect_keys(targets)?;

        if let Some(old) = self.dependents.get(source).cloned() {
            for target in old {
                self.unlink(source, &target);
            }
        }
        for target in &targets {
            self.insert(source, target);
        }
        Ok(())
    }

    /// Replace every edge `(*, target)` with `(s, target)` for each `s` in `sources`.
    pub fn replace_dependees<I, S>(&mut self, target: &str, sources: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_key(target)?;
        let sources = collect_keys(sources)?;

        if let Some(old) = self.dependees.get(target).cloned() {
            for source in old {
                self.unlink(&source, target);
            }
        }
        for source in &sources {
            self.insert(source, target);
        }
        Ok(())
    }

    fn insert(&mut self, source: &str, target: &str) {
        let added = self
            .dependents
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
        if added {
            self.dependees
                .entry(target.to_string())
                .or_default()
                .insert(source.to_string());
            self.size += 1;
        }
    }

    fn unlink(&mut self, source: &str, target: &str) {
        let Some(targets) = self.dependents.get_mut(source) else {
            return;
        };
        if !targets.remove(target) {
            return;
        }
        if targets.is_empty() {
            self.dependents.remove(source);
        }
        if let Some(sources) = self.dependees.get_mut(target) {
            sources.remove(source);
            if sources.is_empty() {
                self.dependees.remove(target);
            }
        }
        self.size -= 1;
    }
}

fn check_key(key: &str) -> Result<(), GraphError> {
    if key.is_empty() {
        Err(GraphError::EmptyKey)
    } else {
        Ok(())
    }
}

fn collect_keys<I, S>(keys: I) -> Result<Vec<String>, GraphError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|k| {
            let k = k.as_ref();
            check_key(k).map(|_| k.to_string())
        })
        .collect()
}
