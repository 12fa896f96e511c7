//! Shape Primitives
//!
//! The external analysis engine serializes tabular results through a layer
//! that collapses single-row frames into one-element arrays, so a section
//! that is conceptually "one summary object" can arrive either as an object
//! or as `[object]`. `OneOrMany` makes that ambiguity explicit at the
//! deserialization boundary; the expectation for each result field is
//! declared by typing the field `OneOrMany<T>` (single aggregate) or
//! `Vec<T>` (collection), never by ad hoc runtime checks downstream.

use serde::{Deserialize, Serialize};

/// A value that may be serialized as a single item or as a list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single item.
    One(T),
    /// A list of items (possibly empty).
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    /// Number of items carried.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    /// True when no items are carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduce to a single item: the item itself, or the first element of a
    /// non-empty list. `None` when the list is empty.
    pub fn into_single(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.into_iter().next(),
        }
    }

    /// Reduce to a single item, falling back to the type's default.
    pub fn into_single_or_default(self) -> T
    where
        T: Default,
    {
        self.into_single().unwrap_or_default()
    }

    /// Flatten into a list regardless of the source shape.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Summary {
        #[serde(default)]
        samples: u64,
        #[serde(default)]
        mean: f64,
    }

    #[test]
    fn test_deserialize_object() {
        let v: OneOrMany<Summary> =
            serde_json::from_value(json!({"samples": 10, "mean": 5.0})).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v.into_single().unwrap().samples, 10);
    }

    #[test]
    fn test_deserialize_list() {
        let v: OneOrMany<Summary> =
            serde_json::from_value(json!([{"samples": 3, "mean": 1.0}, {"samples": 4, "mean": 2.0}]))
                .unwrap();
        assert_eq!(v.len(), 2);
        // A single-aggregate reduction takes the first element.
        assert_eq!(v.into_single().unwrap().samples, 3);
    }

    #[test]
    fn test_deserialize_empty_list() {
        let v: OneOrMany<Summary> = serde_json::from_value(json!([])).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.into_single_or_default(), Summary::default());
    }

    #[test]
    fn test_single_reduction_is_idempotent() {
        // Normalizing an already-single object returns it unchanged, and the
        // one-element-list wrapping of the same object reduces to the same
        // value.
        let summary = Summary { samples: 7, mean: 3.5 };
        let direct = OneOrMany::One(summary.clone()).into_single().unwrap();
        let wrapped = OneOrMany::Many(vec![summary.clone()]).into_single().unwrap();
        assert_eq!(direct, summary);
        assert_eq!(wrapped, summary);
    }

    #[test]
    fn test_into_vec_flattens_both_shapes() {
        let one: OneOrMany<i32> = 5.into();
        assert_eq!(one.into_vec(), vec![5]);
        let many: OneOrMany<i32> = vec![1, 2, 3].into();
        assert_eq!(many.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_default_is_empty() {
        let v: OneOrMany<Summary> = OneOrMany::default();
        assert!(v.is_empty());
        assert!(v.into_single().is_none());
    }
}
