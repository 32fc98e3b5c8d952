//! Flat index: unique labels mapped to positions in insertion order.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{IndexError, IndexResult};
use crate::key::{Key, PositionSpec, Positions};
use crate::types::Label;

use super::Positional;

/// How a label range `a..=b` treats endpoints that are not in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// Missing start fails; missing end runs to the last position.
    #[default]
    Legacy,
    /// Both endpoints must be present.
    Strict,
}

/// Flat label index.
///
/// Construction walks the input once and maps every label to the position where it was seen.
/// A repeated label overwrites its earlier mapping, while [`Positional::label`] keeps the
/// first-seen order of distinct labels. So `Index::new(["a", "b", "a"])` has size 2, `label(0)`
/// is `a`, and `pos(a)` is 2. Frames rely on this, so it is kept as is; build a
/// [`super::CategoricalIndex`] when labels legitimately repeat.
#[derive(Debug, Clone)]
pub struct Index {
    labels: Vec<Label>,
    positions: HashMap<Label, usize>,
    name: Option<String>,
}

impl Index {
    /// Create an index from labels.
    pub fn new<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        let mut positions = HashMap::new();
        let mut ordered = Vec::new();
        for (i, label) in labels.into_iter().enumerate() {
            let label = label.into();
            if positions.insert(label.clone(), i).is_none() {
                ordered.push(label);
            }
        }
        Self {
            labels: ordered,
            positions,
            name: None,
        }
    }

    /// Create the default `0..n` index used for freshly built frames and join outputs.
    pub fn positional(n: usize) -> Self {
        Self::new((0..n).map(|i| Label::Int(i as i64)))
    }

    /// Set the index name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn with_name_opt(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Labels in position order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Resolves keys to positions.
    ///
    /// If any key names a present label, every key is treated as a label and positions come back
    /// in argument order. Otherwise integer keys (or one integer range) are positions. Anything
    /// else is an [`IndexError::InvalidLabel`] naming the first key.
    pub fn pos(&self, keys: &[Key]) -> IndexResult<Positions> {
        self.pos_with(keys, RangePolicy::Legacy)
    }

    /// Like [`Index::pos`], with an explicit policy for label ranges.
    pub fn pos_with(&self, keys: &[Key], policy: RangePolicy) -> IndexResult<Positions> {
        if keys.iter().any(|k| self.mentions(k)) {
            return self.label_positions(keys, policy);
        }
        if let Some(spec) = PositionSpec::from_keys(keys) {
            return spec.resolve(self.labels.len());
        }
        let first = keys.first().map(|k| k.head().clone()).unwrap_or(Label::Null);
        Err(IndexError::invalid_label(first))
    }

    fn mentions(&self, key: &Key) -> bool {
        match key {
            Key::Label(l) => self.positions.contains_key(l),
            Key::Range(a, b) => self.positions.contains_key(a) || self.positions.contains_key(b),
        }
    }

    fn label_positions(&self, keys: &[Key], policy: RangePolicy) -> IndexResult<Positions> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            match key {
                Key::Label(l) => out.push(self.position_of(l)?),
                Key::Range(a, b) => match policy {
                    RangePolicy::Legacy => out.extend(
                        self.by_range(a, b)
                            .ok_or_else(|| IndexError::invalid_label(a.clone()))?,
                    ),
                    RangePolicy::Strict => out.extend(self.by_range_strict(a, b)?),
                },
            }
        }
        Ok(match (keys, out.as_slice()) {
            ([Key::Label(_)], [p]) => Positions::Single(*p),
            _ => Positions::Multiple(out),
        })
    }

    fn position_of(&self, label: &Label) -> IndexResult<usize> {
        self.positions
            .get(label)
            .copied()
            .ok_or_else(|| IndexError::invalid_label(label.clone()))
    }

    /// Inclusive positions between two labels.
    ///
    /// Returns `None` when `start` is absent; when only `end` is absent the range runs to the
    /// last position.
    pub fn by_range(&self, start: &Label, end: &Label) -> Option<Vec<usize>> {
        let first = *self.positions.get(start)?;
        let last = match self.positions.get(end) {
            Some(p) => *p,
            None => self.labels.len().saturating_sub(1),
        };
        Some(inclusive(first, last))
    }

    /// Inclusive positions between two labels that must both be present.
    pub fn by_range_strict(&self, start: &Label, end: &Label) -> IndexResult<Vec<usize>> {
        let first = self.position_of(start)?;
        let last = self.position_of(end)?;
        Ok(inclusive(first, last))
    }

    /// New index with labels in natural order. Ties have no guaranteed order.
    pub fn sort(&self, ascending: bool) -> Self {
        let mut labels = self.labels.clone();
        labels.sort_unstable();
        if !ascending {
            labels.reverse();
        }
        Self::new(labels).with_name_opt(self.name.clone())
    }

    /// New index without the given labels; absent labels are ignored.
    pub fn except<L: Into<Label>>(&self, labels: impl IntoIterator<Item = L>) -> Self {
        let drop: HashSet<Label> = labels.into_iter().map(Into::into).collect();
        let kept = self.labels.iter().filter(|l| !drop.contains(l)).cloned();
        Self::new(kept).with_name_opt(self.name.clone())
    }

    /// New index with `labels` appended at the end.
    pub fn add<L: Into<Label>>(&self, labels: impl IntoIterator<Item = L>) -> Self {
        let all = self
            .labels
            .iter()
            .cloned()
            .chain(labels.into_iter().map(Into::into));
        Self::new(all).with_name_opt(self.name.clone())
    }

    /// New index holding the labels selected by `keys`.
    pub fn subset(&self, keys: &[Key]) -> IndexResult<Self> {
        let positions = self.pos(keys)?.into_vec();
        self.rebuild(self.keys_at(&positions)?)
    }

    /// Membership mask over the index: `true` where the entry is one of `labels`.
    pub fn is_values<L: Into<Label>>(&self, labels: impl IntoIterator<Item = L>) -> Vec<bool> {
        let wanted: HashSet<Label> = labels.into_iter().map(Into::into).collect();
        self.labels.iter().map(|l| wanted.contains(l)).collect()
    }

    /// True if every label was distinct at construction, so each maps to a position below `size`.
    pub fn is_unique(&self) -> bool {
        self.positions.values().all(|&p| p < self.labels.len())
    }

    /// True if `keys` resolve without error.
    pub fn is_valid(&self, keys: &[Key]) -> bool {
        self.pos(keys).is_ok()
    }
}

fn inclusive(first: usize, last: usize) -> Vec<usize> {
    if last < first {
        return Vec::new();
    }
    (first..=last).collect()
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels && self.name == other.name
    }
}

impl Positional for Index {
    type Item = Label;

    fn size(&self) -> usize {
        self.labels.len()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self, position: usize) -> Option<Label> {
        self.labels.get(position).cloned()
    }

    fn contains(&self, item: &Label) -> bool {
        self.positions.contains_key(item)
    }

    fn to_vec(&self) -> Vec<Label> {
        self.labels.clone()
    }

    fn rebuild(&self, items: Vec<Label>) -> IndexResult<Self> {
        Ok(Self::new(items).with_name_opt(self.name.clone()))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Index[{name}](")?,
            None => write!(f, "Index(")?,
        }
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::{Index, RangePolicy};
    use crate::error::IndexError;
    use crate::index::Positional;
    use crate::key::Positions;
    use crate::keys;
    use crate::types::Label;

    fn abc() -> Index {
        Index::new(["a", "b", "c"])
    }

    #[test]
    fn pos_of_label_and_out_of_bounds_position() {
        let idx = abc();
        assert_eq!(idx.pos(&keys!["b"]).unwrap(), Positions::Single(1));
        assert_eq!(
            idx.pos(&keys![5]).unwrap_err(),
            IndexError::InvalidPosition { position: 5, size: 3 }
        );
    }

    #[test]
    fn pos_keeps_argument_order_for_labels() {
        let idx = abc();
        assert_eq!(idx.pos(&keys!["c", "a"]).unwrap(), Positions::Multiple(vec![2, 0]));
    }

    #[test]
    fn pos_falls_back_to_positions_when_nothing_is_a_label() {
        let idx = abc();
        assert_eq!(idx.pos(&keys![2]).unwrap(), Positions::Single(2));
        assert_eq!(idx.pos(&keys![2, 0]).unwrap(), Positions::Multiple(vec![2, 0]));
        assert_eq!(idx.pos(&keys![0..=1]).unwrap(), Positions::Multiple(vec![0, 1]));
        assert_eq!(
            idx.pos(&keys!["z"]).unwrap_err(),
            IndexError::InvalidLabel { label: Label::from("z") }
        );
    }

    #[test]
    fn one_matching_label_makes_all_keys_labels() {
        let idx = Index::new([10, 20, 30]);
        assert_eq!(idx.pos(&keys![20]).unwrap(), Positions::Single(1));
        assert_eq!(idx.pos(&keys![0]).unwrap(), Positions::Single(0));
        // 10 is a label, so 0 must be a label too and is missing
        assert_eq!(
            idx.pos(&keys![10, 0]).unwrap_err(),
            IndexError::InvalidLabel { label: Label::from(0) }
        );
    }

    #[test]
    fn integer_labels_shadow_positions() {
        let idx = Index::new([2, 1, 0]);
        assert_eq!(idx.pos(&keys![0]).unwrap(), Positions::Single(2));
        assert_eq!(idx.pos(&keys![3]).unwrap_err(), IndexError::InvalidPosition { position: 3, size: 3 });
    }

    #[test]
    fn repeated_labels_keep_first_seen_order_but_last_position() {
        let idx = Index::new(["a", "b", "a"]);
        assert_eq!(idx.size(), 2);
        assert_eq!(idx.label(0), Some(Label::from("a")));
        assert_eq!(idx.label(1), Some(Label::from("b")));
        assert_eq!(idx.pos(&keys!["a"]).unwrap(), Positions::Single(2));
        assert!(!idx.is_unique());
        assert!(abc().is_unique());
    }

    #[test]
    fn label_range_is_inclusive() {
        let idx = Index::new(["a", "b", "c", "d"]);
        assert_eq!(idx.by_range(&Label::from("b"), &Label::from("c")), Some(vec![1, 2]));
        assert_eq!(idx.pos(&keys!["b"..="d"]).unwrap(), Positions::Multiple(vec![1, 2, 3]));
    }

    #[test]
    fn legacy_label_range_is_asymmetric() {
        let idx = Index::new(["a", "b", "c", "d"]);
        assert_eq!(idx.by_range(&Label::from("z"), &Label::from("c")), None);
        assert_eq!(idx.by_range(&Label::from("b"), &Label::from("z")), Some(vec![1, 2, 3]));
    }

    #[test]
    fn strict_label_range_requires_both_endpoints() {
        let idx = Index::new(["a", "b", "c", "d"]);
        assert_eq!(
            idx.pos_with(&keys!["b"..="z"], RangePolicy::Strict).unwrap_err(),
            IndexError::InvalidLabel { label: Label::from("z") }
        );
        assert_eq!(
            idx.pos_with(&keys!["b"..="z"], RangePolicy::Legacy).unwrap(),
            Positions::Multiple(vec![1, 2, 3])
        );
        assert_eq!(
            idx.pos_with(&keys!["a"..="b"], RangePolicy::Strict).unwrap(),
            Positions::Multiple(vec![0, 1])
        );
    }

    #[test]
    fn sort_orders_labels_naturally() {
        let idx = Index::new(["b", "c", "a"]).with_name("x");
        assert_eq!(idx.sort(true), Index::new(["a", "b", "c"]).with_name("x"));
        assert_eq!(idx.sort(false), Index::new(["c", "b", "a"]).with_name("x"));
    }

    #[test]
    fn except_add_and_subset_build_new_indices() {
        let idx = abc();
        assert_eq!(idx.except(["b", "zz"]), Index::new(["a", "c"]));
        let grown = idx.add(["d"]);
        assert_eq!(grown.pos(&keys!["d"]).unwrap(), Positions::Single(3));
        assert_eq!(idx.size(), 3);
        assert_eq!(idx.subset(&keys!["c", "a"]).unwrap(), Index::new(["c", "a"]));
    }

    #[test]
    fn is_values_and_is_valid() {
        let idx = abc();
        assert_eq!(idx.is_values(["a", "c"]), vec![true, false, true]);
        assert!(idx.is_valid(&keys!["a", "b"]));
        assert!(!idx.is_valid(&keys!["a", "q"]));
    }

    #[test]
    fn positional_index_and_display() {
        let idx = Index::positional(3);
        assert_eq!(idx, Index::new([0, 1, 2]));
        assert_eq!(idx.to_string(), "Index(0, 1, 2)");
        assert_eq!(abc().with_name("k").to_string(), "Index[k](a, b, c)");
    }
}
