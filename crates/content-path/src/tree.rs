//! Prefix utilities over slash-separated module ids.

use indexmap::IndexMap;

/// A prefix tree of `/`-separated paths. Children keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    pub children: IndexMap<String, PathTree>,
}

impl PathTree {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, component: &str) -> Option<&PathTree> {
        self.children.get(component)
    }

    /// Look up the subtree at a `/`-separated path.
    pub fn find(&self, path: &str) -> Option<&PathTree> {
        components(path).try_fold(self, |node, component| node.get(component))
    }

    /// All root-to-leaf paths, `/`-rooted, in insertion order.
    pub fn leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(&mut String::new(), &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &mut String, out: &mut Vec<String>) {
        for (component, child) in &self.children {
            let len = prefix.len();
            prefix.push('/');
            prefix.push_str(component);
            if child.is_empty() {
                out.push(prefix.clone());
            } else {
                child.collect_leaves(prefix, out);
            }
            prefix.truncate(len);
        }
    }

    fn insert(&mut self, path: &str) {
        let mut node = self;
        for component in components(path) {
            node = node.children.entry(component.to_string()).or_default();
        }
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Build a prefix tree out of paths such as module ids.
pub fn path_tree<I, S>(paths: I) -> PathTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = PathTree::default();
    for path in paths {
        tree.insert(path.as_ref());
    }
    tree
}

/// The deepest directory that contains every path.
///
/// Zero paths yield `None`; a single path is returned unmodified.
pub fn find_upper_directory<I, S>(paths: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = paths.into_iter();
    let first = iter.next()?;
    let first = first.as_ref();
    let mut common: Vec<&str> = first.split('/').collect();
    let mut count = 1usize;
    for path in iter {
        count += 1;
        let path = path.as_ref();
        let shared = common
            .iter()
            .zip(path.split('/'))
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }
    if count == 1 {
        return Some(first.to_string());
    }
    let joined = common.join("/");
    if joined.is_empty() && first.starts_with('/') {
        return Some("/".to_string());
    }
    Some(joined)
}
