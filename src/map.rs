//! Ordered maps for read results.
//!
//! ROFF allows the same tag name, and the same key name within a tag, to appear more
//! than once. [`RoffData`] and [`TagMap`] keep names in first-seen order and collapse
//! repeats into a [`OneOrMany::Many`] list instead of overwriting.
//!
//! ## Examples
//!
//! ```rust
//! use roffio::{OneOrMany, TagMap, Value};
//!
//! let mut tag = TagMap::new();
//! tag.push("x", Value::from(1.0));
//! tag.push("x", Value::from(2.0));
//! tag.push("y", Value::from(3));
//!
//! assert_eq!(tag.len(), 2);
//! assert_eq!(
//!     tag.get("x"),
//!     Some(&OneOrMany::Many(vec![Value::Double(1.0), Value::Double(2.0)]))
//! );
//! assert_eq!(tag.get_value("y"), Some(&Value::Int(3)));
//! ```
//!
//! Both maps serialize as sequences of `(name, value)` pairs, so writing a read result
//! back repeats the names it repeated. Entries are grouped under the first occurrence of
//! their name: tags read as `a, b, a` are written back as `a, a, b`.

use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::slice;

/// A single entry, or the entries of a repeated name in order of appearance.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Adds another entry under the same name.
    pub fn push(&mut self, value: T) {
        match self {
            OneOrMany::Many(values) => values.push(value),
            OneOrMany::One(_) => {
                if let OneOrMany::One(first) =
                    std::mem::replace(self, OneOrMany::Many(Vec::with_capacity(2)))
                {
                    *self = OneOrMany::Many(vec![first, value]);
                }
            }
        }
    }

    /// Returns the entry if there is exactly one.
    #[must_use]
    pub fn as_one(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) if values.len() == 1 => values.first(),
            OneOrMany::Many(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        match self {
            OneOrMany::One(value) => slice::from_ref(value).iter(),
            OneOrMany::Many(values) => values.iter(),
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn serialize_pairs<'a, S, T, I>(serializer: S, len: usize, pairs: I) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + 'a,
    I: Iterator<Item = (&'a String, &'a OneOrMany<T>)>,
{
    let mut seq = serializer.serialize_seq(Some(len))?;
    for (name, entries) in pairs {
        for entry in entries {
            seq.serialize_element(&(name, entry))?;
        }
    }
    seq.end()
}

/// The keys of one tag, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap(IndexMap<String, OneOrMany<Value>>);

impl TagMap {
    #[must_use]
    pub fn new() -> Self {
        TagMap(IndexMap::new())
    }

    /// Adds a key. A repeated name collects its values in a [`OneOrMany::Many`].
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        match self.0.entry(name.into()) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().push(value),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(OneOrMany::One(value));
            }
        }
    }

    /// Sets a key to a single value, replacing whatever it held.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<OneOrMany<Value>> {
        self.0.insert(name.into(), OneOrMany::One(value))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OneOrMany<Value>> {
        self.0.get(name)
    }

    /// Returns the value of a key that appears exactly once.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.0.get(name).and_then(OneOrMany::as_one)
    }

    /// Removes a key, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<OneOrMany<Value>> {
        self.0.shift_remove(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of distinct key names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, OneOrMany<Value>> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, OneOrMany<Value>> {
        self.0.iter()
    }
}

impl Serialize for TagMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.0.values().map(OneOrMany::len).sum();
        serialize_pairs(serializer, len, self.0.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (name, value) in iter {
            map.push(name, value);
        }
        map
    }
}

impl IntoIterator for TagMap {
    type Item = (String, OneOrMany<Value>);
    type IntoIter = indexmap::map::IntoIter<String, OneOrMany<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagMap {
    type Item = (&'a String, &'a OneOrMany<Value>);
    type IntoIter = indexmap::map::Iter<'a, String, OneOrMany<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A whole ROFF file: tags in order of first appearance.
///
/// # Examples
///
/// ```rust
/// use roffio::{RoffData, Value};
///
/// let mut data = RoffData::new();
/// data.push("dimensions", [("nX", Value::from(4))].into_iter().collect());
///
/// let nx = data.get_tag("dimensions").and_then(|tag| tag.get_value("nX"));
/// assert_eq!(nx, Some(&Value::Int(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoffData(IndexMap<String, OneOrMany<TagMap>>);

impl RoffData {
    #[must_use]
    pub fn new() -> Self {
        RoffData(IndexMap::new())
    }

    /// Adds a tag. A repeated name collects its tags in a [`OneOrMany::Many`].
    pub fn push(&mut self, name: impl Into<String>, tag: TagMap) {
        match self.0.entry(name.into()) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().push(tag),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(OneOrMany::One(tag));
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OneOrMany<TagMap>> {
        self.0.get(name)
    }

    /// Returns a tag that appears exactly once.
    #[must_use]
    pub fn get_tag(&self, name: &str) -> Option<&TagMap> {
        self.0.get(name).and_then(OneOrMany::as_one)
    }

    /// Removes a tag, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<OneOrMany<TagMap>> {
        self.0.shift_remove(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of distinct tag names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, OneOrMany<TagMap>> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, OneOrMany<TagMap>> {
        self.0.iter()
    }
}

impl Serialize for RoffData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.0.values().map(OneOrMany::len).sum();
        serialize_pairs(serializer, len, self.0.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, TagMap)> for RoffData {
    fn from_iter<I: IntoIterator<Item = (K, TagMap)>>(iter: I) -> Self {
        let mut data = RoffData::new();
        for (name, tag) in iter {
            data.push(name, tag);
        }
        data
    }
}

impl IntoIterator for RoffData {
    type Item = (String, OneOrMany<TagMap>);
    type IntoIter = indexmap::map::IntoIter<String, OneOrMany<TagMap>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RoffData {
    type Item = (&'a String, &'a OneOrMany<TagMap>);
    type IntoIter = indexmap::map::Iter<'a, String, OneOrMany<TagMap>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
