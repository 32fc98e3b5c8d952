//! Label/position resolution engine.
//!
//! Three index variants translate user-facing labels into storage positions:
//!
//! - [`Index`]: flat, unique labels in insertion order
//! - [`MultiIndex`]: fixed-width tuples over nested levels
//! - [`CategoricalIndex`]: repeating labels partitioned into position lists
//!
//! They share the [`Positional`] contract: positional access (`at`), set algebra (`union`,
//! `intersection`) and `reorder` are implemented once on top of each variant's primitives.
//! [`AnyIndex`] is the tagged union consumers hold when the variant is only known at run time
//! (for example after [`MultiIndex::drop_left_level`]).
//!
//! ## Example
//!
//! ```rust
//! use rust_data_index::index::{CategoricalIndex, Index, MultiIndex, Positional};
//! use rust_data_index::{keys, Positions};
//!
//! let idx = Index::new(["a", "b", "c"]);
//! assert_eq!(idx.pos(&keys!["b"]).unwrap(), Positions::Single(1));
//!
//! let mi = MultiIndex::from_tuples([["a", "one"], ["a", "two"], ["b", "one"]]).unwrap();
//! assert_eq!(mi.pos(&keys!["a"]).unwrap(), Positions::Multiple(vec![0, 1]));
//!
//! let cat = CategoricalIndex::new(["a", "b", "a", "a", "c"]);
//! assert_eq!(cat.pos(&keys!["a"]).unwrap(), Positions::Multiple(vec![0, 2, 3]));
//! # let _ = idx.size();
//! ```

mod categorical;
mod flat;
mod lookup;
mod multi;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::error::{IndexError, IndexResult};
use crate::key::{Key, PositionSpec, Positions};
use crate::types::Label;

pub use categorical::CategoricalIndex;
pub use flat::{Index, RangePolicy};
pub use multi::{MultiIndex, Selected};

/// Shared positional contract implemented by every index variant.
///
/// Implementors provide the primitives (`size`, `label`, `contains`, `to_vec`, `rebuild`); the
/// positional slicing and set algebra come for free.
pub trait Positional: Clone + PartialEq + fmt::Debug + Sized {
    /// What one entry looks like: a [`Label`] for flat/categorical indices, a tuple for MultiIndex.
    type Item: Clone + Eq + Hash + fmt::Debug;

    /// Number of entries.
    fn size(&self) -> usize;

    /// Optional index name.
    fn name(&self) -> Option<&str>;

    /// Entry at `position`, or `None` if out of bounds.
    fn label(&self, position: usize) -> Option<Self::Item>;

    /// Membership test for a whole entry.
    fn contains(&self, item: &Self::Item) -> bool;

    /// Entries in position order.
    fn to_vec(&self) -> Vec<Self::Item>;

    /// Builds a same-class index (keeping the name) from entries.
    fn rebuild(&self, items: Vec<Self::Item>) -> IndexResult<Self>;

    /// True if the index has no entries.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Iterates entries in position order.
    fn iter(&self) -> impl Iterator<Item = Self::Item> + '_ {
        (0..self.size()).filter_map(move |p| self.label(p))
    }

    /// Entries at the given positions, validating every position.
    fn keys_at(&self, positions: &[usize]) -> IndexResult<Vec<Self::Item>> {
        positions
            .iter()
            .map(|&p| {
                self.label(p)
                    .ok_or_else(|| IndexError::invalid_position(p as i64, self.size()))
            })
            .collect()
    }

    /// Strictly positional access: integers are never interpreted as labels.
    ///
    /// A single position yields the entry; several positions or a range yield a same-class index.
    fn at(&self, spec: impl Into<PositionSpec>) -> IndexResult<Selection<Self>> {
        match spec.into().resolve(self.size())? {
            Positions::Single(p) => self
                .label(p)
                .map(Selection::Label)
                .ok_or_else(|| IndexError::invalid_position(p as i64, self.size())),
            Positions::Multiple(ps) => self.rebuild(self.keys_at(&ps)?).map(Selection::Index),
        }
    }

    /// Union with another index: left entries, then right-only entries in right order.
    fn union(&self, other: &Self) -> IndexResult<Self> {
        self.union_with(&other.to_vec())
    }

    /// Union with a raw entry sequence.
    fn union_with(&self, items: &[Self::Item]) -> IndexResult<Self> {
        let mut out = self.to_vec();
        out.extend(items.iter().filter(|item| !self.contains(item)).cloned());
        self.rebuild(out)
    }

    /// Intersection with another index: left entries that are members of the right.
    fn intersection(&self, other: &Self) -> IndexResult<Self> {
        let out = self.iter().filter(|item| other.contains(item)).collect();
        self.rebuild(out)
    }

    /// Intersection with a raw entry sequence.
    fn intersection_with(&self, items: &[Self::Item]) -> IndexResult<Self> {
        let members: HashSet<&Self::Item> = items.iter().collect();
        let out = self.iter().filter(|item| members.contains(item)).collect();
        self.rebuild(out)
    }

    /// Permutes entries by `positions`; the list must be exactly as long as the index.
    fn reorder(&self, positions: &[usize]) -> IndexResult<Self> {
        if positions.len() != self.size() {
            return Err(IndexError::shape(format!(
                "reorder expects {} positions, got {}",
                self.size(),
                positions.len()
            )));
        }
        self.rebuild(self.keys_at(positions)?)
    }
}

/// Result of [`Positional::at`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<I: Positional> {
    /// A single position was requested.
    Label(I::Item),
    /// Several positions were requested.
    Index(I),
}

impl<I: Positional> Selection<I> {
    /// The sub-index, if several positions were requested.
    pub fn into_index(self) -> Option<I> {
        match self {
            Self::Index(i) => Some(i),
            Self::Label(_) => None,
        }
    }

    /// The entry, if a single position was requested.
    pub fn into_label(self) -> Option<I::Item> {
        match self {
            Self::Label(l) => Some(l),
            Self::Index(_) => None,
        }
    }
}

macro_rules! set_operators {
    ($($t:ty),*) => {
        $(
            impl std::ops::BitOr for &$t {
                type Output = IndexResult<$t>;

                fn bitor(self, rhs: Self) -> Self::Output {
                    self.union(rhs)
                }
            }

            impl std::ops::BitAnd for &$t {
                type Output = IndexResult<$t>;

                fn bitand(self, rhs: Self) -> Self::Output {
                    self.intersection(rhs)
                }
            }
        )*
    };
}

set_operators!(Index, MultiIndex, CategoricalIndex);

/// Which variant an [`AnyIndex`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// [`Index`].
    Flat,
    /// [`MultiIndex`].
    Multi,
    /// [`CategoricalIndex`].
    Categorical,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Multi => write!(f, "multi"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// An index whose variant is decided at run time.
///
/// Equality requires the same variant ("same class") and then the variant's own equality.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyIndex {
    /// Flat unique labels.
    Flat(Index),
    /// Hierarchical tuples.
    Multi(MultiIndex),
    /// Repeating labels.
    Categorical(CategoricalIndex),
}

impl AnyIndex {
    /// Builds an index from labels: equal-width tuples (width ≥ 2) become a MultiIndex, anything
    /// else a flat [`Index`].
    pub fn infer(labels: Vec<Label>) -> IndexResult<Self> {
        let width = labels.first().and_then(Label::as_tuple).map(<[Label]>::len);
        match width {
            Some(w) if w >= 2 && labels.iter().all(|l| l.as_tuple().map(<[Label]>::len) == Some(w)) => {
                let tuples = labels
                    .into_iter()
                    .filter_map(|l| match l {
                        Label::Tuple(items) => Some(items),
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                MultiIndex::from_tuples(tuples).map(Self::Multi)
            }
            _ => Ok(Self::Flat(Index::new(labels))),
        }
    }

    /// Fails with [`IndexError::ConstructionError`] when some label resolves to a position at or
    /// past `size`, which happens for a flat index built from repeated labels.
    pub(crate) fn check_addressable(&self) -> IndexResult<()> {
        match self {
            Self::Flat(i) if !i.is_unique() => Err(IndexError::construction(format!(
                "flat index of size {} was built from repeated labels and cannot address data; \
                 use a CategoricalIndex for repeating labels",
                i.size()
            ))),
            _ => Ok(()),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Flat(_) => IndexKind::Flat,
            Self::Multi(_) => IndexKind::Multi,
            Self::Categorical(_) => IndexKind::Categorical,
        }
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        match self {
            Self::Flat(i) => i.size(),
            Self::Multi(i) => i.size(),
            Self::Categorical(i) => i.size(),
        }
    }

    /// True if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Optional index name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Flat(i) => i.name(),
            Self::Multi(i) => i.name(),
            Self::Categorical(i) => i.name(),
        }
    }

    /// Entry at `position`; MultiIndex entries come back as [`Label::Tuple`].
    pub fn label(&self, position: usize) -> Option<Label> {
        match self {
            Self::Flat(i) => i.label(position),
            Self::Multi(i) => i.label(position).map(Label::Tuple),
            Self::Categorical(i) => i.label(position),
        }
    }

    /// Entries in position order.
    pub fn to_vec(&self) -> Vec<Label> {
        (0..self.size()).filter_map(|p| self.label(p)).collect()
    }

    /// Membership test; for a MultiIndex a tuple label must match a whole entry.
    pub fn contains(&self, label: &Label) -> bool {
        match (self, label) {
            (Self::Flat(i), l) => i.contains(l),
            (Self::Categorical(i), l) => i.contains(l),
            (Self::Multi(i), Label::Tuple(items)) => i.contains(items),
            (Self::Multi(_), _) => false,
        }
    }

    /// Resolves keys to positions with the variant's disambiguation rules.
    pub fn pos(&self, keys: &[Key]) -> IndexResult<Positions> {
        self.pos_with(keys, RangePolicy::Legacy)
    }

    /// Like [`AnyIndex::pos`], choosing how flat label ranges treat missing endpoints.
    pub fn pos_with(&self, keys: &[Key], policy: RangePolicy) -> IndexResult<Positions> {
        match self {
            Self::Flat(i) => i.pos_with(keys, policy),
            Self::Multi(i) => i.pos(keys),
            Self::Categorical(i) => i.pos(keys),
        }
    }

    /// Same-class index holding the entries at `positions` (in that order).
    pub fn take(&self, positions: &[usize]) -> IndexResult<Self> {
        match self {
            Self::Flat(i) => i.rebuild(i.keys_at(positions)?).map(Self::Flat),
            Self::Multi(i) => i.rebuild(i.keys_at(positions)?).map(Self::Multi),
            Self::Categorical(i) => i.rebuild(i.keys_at(positions)?).map(Self::Categorical),
        }
    }

    /// Index over the entries at `positions`, one entry per position.
    ///
    /// Unlike [`AnyIndex::take`] repeated positions are kept: when the same-class index would
    /// collapse them, the result is a [`CategoricalIndex`] of the picked labels.
    pub fn select(&self, positions: &[usize]) -> IndexResult<Self> {
        let taken = self.take(positions)?;
        if taken.size() == positions.len() {
            return Ok(taken);
        }
        let labels = positions
            .iter()
            .map(|&p| {
                self.label(p)
                    .ok_or_else(|| IndexError::invalid_position(p as i64, self.size()))
            })
            .collect::<IndexResult<Vec<_>>>()?;
        let name = self.name().map(str::to_string);
        Ok(Self::Categorical(CategoricalIndex::new(labels).with_name_opt(name)))
    }

    /// Same-class index permuted by `positions`.
    pub fn reorder(&self, positions: &[usize]) -> IndexResult<Self> {
        match self {
            Self::Flat(i) => i.reorder(positions).map(Self::Flat),
            Self::Multi(i) => i.reorder(positions).map(Self::Multi),
            Self::Categorical(i) => i.reorder(positions).map(Self::Categorical),
        }
    }

    /// Grows the index by one entry at the end.
    ///
    /// A MultiIndex only accepts a tuple label of its own width.
    pub fn add(&self, label: Label) -> IndexResult<Self> {
        match self {
            Self::Flat(i) => Ok(Self::Flat(i.add([label]))),
            Self::Categorical(i) => Ok(Self::Categorical(i.add([label]))),
            Self::Multi(i) => match label {
                Label::Tuple(items) => i.add(items).map(Self::Multi),
                other => Err(IndexError::shape(format!(
                    "cannot add non-tuple label {other} to a MultiIndex of width {}",
                    i.width()
                ))),
            },
        }
    }

    /// Positions ordered by their labels; used to sort data along an axis.
    pub fn argsort(&self, ascending: bool) -> Vec<usize> {
        let labels = self.to_vec();
        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| labels[a].cmp(&labels[b]));
        if !ascending {
            order.reverse();
        }
        order
    }
}

impl From<Index> for AnyIndex {
    fn from(i: Index) -> Self {
        Self::Flat(i)
    }
}

impl From<MultiIndex> for AnyIndex {
    fn from(i: MultiIndex) -> Self {
        Self::Multi(i)
    }
}

impl From<CategoricalIndex> for AnyIndex {
    fn from(i: CategoricalIndex) -> Self {
        Self::Categorical(i)
    }
}

impl fmt::Display for AnyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(i) => i.fmt(f),
            Self::Multi(i) => i.fmt(f),
            Self::Categorical(i) => i.fmt(f),
        }
    }
}

/// Turns width-1 rows into a flat index (values unique) or a categorical index (values repeat),
/// and wider rows into a MultiIndex without de-duplication.
pub(crate) fn degrade(
    rows: Vec<Vec<Label>>,
    width: usize,
    name: Option<String>,
    level_names: Option<Vec<String>>,
) -> AnyIndex {
    if width >= 2 {
        return AnyIndex::Multi(MultiIndex::from_rows(rows, width, name, level_names));
    }
    let name = level_names.and_then(|names| names.into_iter().next()).or(name);
    let labels: Vec<Label> = rows.into_iter().filter_map(|row| row.into_iter().next()).collect();
    let distinct: HashSet<&Label> = labels.iter().collect();
    if distinct.len() == labels.len() {
        AnyIndex::Flat(Index::new(labels).with_name_opt(name))
    } else {
        AnyIndex::Categorical(CategoricalIndex::new(labels).with_name_opt(name))
    }
}
