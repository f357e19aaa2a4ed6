//! Nested, string-keyed containers of values.
//!
//! A [`Container`] lets one operation be applied independently to every
//! leaf of a tree (typically a tree of arrays), producing a tree with the
//! same keys.

use crate::error::Result;
use std::collections::BTreeMap;

/// A tree whose leaves hold values of type `T`, keyed by name at each level.
///
/// # Examples
///
/// ```
/// use array_set::Container;
///
/// let c = Container::node([
///     ("a", Container::leaf(1)),
///     ("b", Container::node([("c", Container::leaf(2))])),
/// ]);
/// let doubled = c.map(|v| v * 2);
/// assert_eq!(doubled.get("b/c"), Some(&4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Container<T> {
    /// A single value.
    Leaf(T),
    /// Named children, iterated in key order.
    Node(BTreeMap<String, Container<T>>),
}

impl<T> Container<T> {
    /// A leaf holding `value`.
    pub fn leaf(value: T) -> Self {
        Container::Leaf(value)
    }

    /// A node built from `(key, child)` pairs.
    pub fn node<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Container<T>)>,
    {
        Container::Node(
            children
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Look up a leaf by `/`-separated path. The empty path names a root leaf.
    pub fn get(&self, path: &str) -> Option<&T> {
        let mut current = self;
        for key in path.split('/').filter(|k| !k.is_empty()) {
            match current {
                Container::Node(children) => current = children.get(key)?,
                Container::Leaf(_) => return None,
            }
        }
        match current {
            Container::Leaf(value) => Some(value),
            Container::Node(_) => None,
        }
    }

    /// All leaves with their paths, in key order.
    pub fn leaves(&self) -> Vec<(String, &T)> {
        let mut out = Vec::new();
        self.collect_leaves(String::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: String, out: &mut Vec<(String, &'a T)>) {
        match self {
            Container::Leaf(value) => out.push((prefix, value)),
            Container::Node(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}/{}", prefix, key)
                    };
                    child.collect_leaves(path, out);
                }
            }
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Container::Leaf(_) => 1,
            Container::Node(children) => children.values().map(Container::leaf_count).sum(),
        }
    }

    /// Apply `f` to every leaf, keeping the key structure.
    pub fn map<U, F>(&self, mut f: F) -> Container<U>
    where
        F: FnMut(&T) -> U,
    {
        self.map_inner(&mut f)
    }

    fn map_inner<U, F>(&self, f: &mut F) -> Container<U>
    where
        F: FnMut(&T) -> U,
    {
        match self {
            Container::Leaf(value) => Container::Leaf(f(value)),
            Container::Node(children) => Container::Node(
                children
                    .iter()
                    .map(|(k, child)| (k.clone(), child.map_inner(f)))
                    .collect(),
            ),
        }
    }

    /// Apply a fallible `f` to every leaf, stopping at the first error.
    ///
    /// Leaves are visited in key order. The error is annotated with the
    /// path of the failing leaf (see [`crate::Error::AtKey`]).
    pub fn try_map<U, F>(&self, mut f: F) -> Result<Container<U>>
    where
        F: FnMut(&T) -> Result<U>,
    {
        self.try_map_inner(&mut f)
    }

    fn try_map_inner<U, F>(&self, f: &mut F) -> Result<Container<U>>
    where
        F: FnMut(&T) -> Result<U>,
    {
        match self {
            Container::Leaf(value) => f(value).map(Container::Leaf),
            Container::Node(children) => {
                let mut out = BTreeMap::new();
                for (key, child) in children {
                    let mapped = child.try_map_inner(f).map_err(|e| e.at_key(key))?;
                    out.insert(key.clone(), mapped);
                }
                Ok(Container::Node(out))
            }
        }
    }
}
