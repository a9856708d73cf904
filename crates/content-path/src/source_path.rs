//! Source paths: a module id followed by a module path.
//!
//! `/content/blogs."blogs".0` splits into the module id `/content/blogs` and
//! the module path `"blogs".0`. Which prefix is the module id is decided by
//! the injected [`ModuleRegistry`]: the longest registered prefix wins.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::PathError;

fn module_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(?:/[^/"]+)*/[^/".]+$"#).unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// A slash-rooted module identifier without file extension, e.g.
/// `/content/blogs`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn parse(id: impl Into<String>) -> Result<Self, PathError> {
        let id = id.into();
        if !module_id_pattern().is_match(&id) {
            return Err(PathError::InvalidModuleId(id));
        }
        Ok(ModuleId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The source path of a value inside this module.
    pub fn source_path(&self, module_path: &str) -> String {
        join_source_path(&self.0, module_path)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModuleId {
    type Error = PathError;

    fn try_from(id: &str) -> Result<Self, Self::Error> {
        ModuleId::parse(id)
    }
}

/// Lookup table of known module ids.
pub trait ModuleRegistry {
    fn contains_module(&self, module_id: &str) -> bool;
}

impl<S: BuildHasher> ModuleRegistry for HashSet<String, S> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains(module_id)
    }
}

impl<V, S: BuildHasher> ModuleRegistry for HashMap<String, V, S> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains_key(module_id)
    }
}

impl ModuleRegistry for BTreeSet<String> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains(module_id)
    }
}

impl<V> ModuleRegistry for BTreeMap<String, V> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains_key(module_id)
    }
}

impl<V> ModuleRegistry for BTreeMap<ModuleId, V> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains_key(module_id)
    }
}

impl<V, S: BuildHasher> ModuleRegistry for IndexMap<String, V, S> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains_key(module_id)
    }
}

impl<V, S: BuildHasher> ModuleRegistry for IndexMap<ModuleId, V, S> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains_key(module_id)
    }
}

impl<S: BuildHasher> ModuleRegistry for IndexSet<String, S> {
    fn contains_module(&self, module_id: &str) -> bool {
        self.contains(module_id)
    }
}

impl ModuleRegistry for [&str] {
    fn contains_module(&self, module_id: &str) -> bool {
        self.iter().any(|id| *id == module_id)
    }
}

impl<const N: usize> ModuleRegistry for [&str; N] {
    fn contains_module(&self, module_id: &str) -> bool {
        self.iter().any(|id| *id == module_id)
    }
}

impl<R: ModuleRegistry + ?Sized> ModuleRegistry for &R {
    fn contains_module(&self, module_id: &str) -> bool {
        (**self).contains_module(module_id)
    }
}

/// Join a module id and a module path into a source path.
pub fn join_source_path(module_id: &str, module_path: &str) -> String {
    if module_path.is_empty() {
        return module_id.to_string();
    }
    let mut out = String::with_capacity(module_id.len() + module_path.len() + 1);
    out.push_str(module_id);
    out.push('.');
    out.push_str(module_path);
    out
}

/// Split a source path into `(module id, module path)`.
///
/// Candidates are the whole string and every prefix ending right before a
/// `.`; the longest one present in `registry` is the module id.
pub fn split_source_path<R>(source_path: &str, registry: &R) -> Result<(ModuleId, String), PathError>
where
    R: ModuleRegistry + ?Sized,
{
    let cuts = source_path
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .map(|(i, _)| i)
        .chain(std::iter::once(source_path.len()));
    let mut best: Option<usize> = None;
    for cut in cuts {
        if registry.contains_module(&source_path[..cut]) {
            best = Some(cut);
        }
    }
    let cut = best.ok_or_else(|| PathError::UnknownModule(source_path.to_string()))?;
    let module_id = ModuleId::parse(&source_path[..cut])?;
    let module_path = source_path[cut..].strip_prefix('.').unwrap_or("");
    Ok((module_id, module_path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_validation() {
        assert!(ModuleId::parse("/content/blogs").is_ok());
        assert!(ModuleId::parse("/pages/v1.2/home").is_ok());
        assert!(ModuleId::parse("content/blogs").is_err());
        assert!(ModuleId::parse("/content/blogs.val.ts").is_err());
        assert!(ModuleId::parse("/content//blogs").is_err());
        assert!(ModuleId::parse("/").is_err());
    }

    #[test]
    fn split_picks_longest_registered_prefix() {
        let registry = ["/content", "/content/blogs"];
        let (id, path) = split_source_path(r#"/content/blogs.0."title""#, &registry).unwrap();
        assert_eq!(id.as_str(), "/content/blogs");
        assert_eq!(path, r#"0."title""#);
    }

    #[test]
    fn split_root_of_module() {
        let registry = ["/content/blogs"];
        let (id, path) = split_source_path("/content/blogs", &registry).unwrap();
        assert_eq!(id.as_str(), "/content/blogs");
        assert_eq!(path, "");
    }

    #[test]
    fn split_ignores_dots_inside_quoted_keys() {
        let registry = ["/content/blogs"];
        let (_, path) = split_source_path(r#"/content/blogs."a.b""#, &registry).unwrap();
        assert_eq!(path, r#""a.b""#);
    }

    #[test]
    fn split_unknown_module() {
        let registry = ["/content/blogs"];
        let err = split_source_path("/content/pages.0", &registry).unwrap_err();
        assert_eq!(err, PathError::UnknownModule("/content/pages.0".to_string()));
    }

    #[test]
    fn join_round_trips_with_split() {
        let registry: BTreeSet<String> = ["/a/b".to_string()].into_iter().collect();
        let source = join_source_path("/a/b", r#""x".1"#);
        assert_eq!(source, r#"/a/b."x".1"#);
        let (id, path) = split_source_path(&source, &registry).unwrap();
        assert_eq!(id.source_path(&path), source);
    }
}
