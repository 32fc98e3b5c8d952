//! Grouping rows of a [`DataFrame`] by the values of key columns.
//!
//! The distinct keys become the group index: a flat [`Index`] for one key column, a
//! [`MultiIndex`] (one level per key column) for several. Each group keeps the ascending row
//! positions it was built from, which [`GroupBy::group`] passes back to
//! [`DataFrame::take_rows`].

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{IndexError, IndexResult};
use crate::frame::DataFrame;
use crate::index::{AnyIndex, Index, MultiIndex, Positional};
use crate::key::{Key, Positions};
use crate::resolve::{resolve, resolve_flat};
use crate::types::{Label, Value};
use crate::vector::Vector;

/// Order of the groups in the group index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// First-encounter order of each key.
    #[default]
    Encounter,
    /// Keys sorted ascending.
    Sorted,
}

/// Rows of a frame partitioned by key.
#[derive(Debug, Clone)]
pub struct GroupBy {
    frame: DataFrame,
    index: AnyIndex,
    groups: Vec<Vec<usize>>,
}

/// Groups `frame` by the columns named in `columns`.
///
/// ```rust
/// use rust_data_index::frame::DataFrame;
/// use rust_data_index::grouping::{group_by, GroupOrder};
/// use rust_data_index::{keys, Value};
///
/// let df = DataFrame::from_columns([
///     ("city", vec![Value::from("b"), Value::from("a"), Value::from("b")]),
///     ("n", vec![Value::from(1), Value::from(2), Value::from(3)]),
/// ])
/// .unwrap();
///
/// let grouped = group_by(&df, &keys!["city"], GroupOrder::Sorted).unwrap();
/// assert_eq!(grouped.groups(), &[vec![1], vec![0, 2]]);
/// assert_eq!(grouped.group(&keys!["b"]).unwrap().nrows(), 2);
/// ```
pub fn group_by(frame: &DataFrame, columns: &[Key], order: GroupOrder) -> IndexResult<GroupBy> {
    let key_columns = resolve_flat(frame.columns(), columns, frame.lookup_options())?.into_vec();
    if key_columns.is_empty() {
        return Err(IndexError::shape("group_by needs at least one key column"));
    }
    let names: Vec<String> = frame
        .columns()
        .keys_at(&key_columns)?
        .iter()
        .map(ToString::to_string)
        .collect();
    let values: Vec<&[Value]> = key_columns
        .iter()
        .map(|&c| {
            frame
                .column_values(c)
                .ok_or_else(|| IndexError::invalid_position(c as i64, frame.ncols()))
        })
        .collect::<IndexResult<_>>()?;

    let row_keys: Vec<Vec<Label>> = (0..frame.nrows())
        .into_par_iter()
        .map(|row| values.iter().map(|column| column[row].to_label()).collect())
        .collect();

    let mut slots: HashMap<&Vec<Label>, usize> = HashMap::new();
    let mut keys: Vec<Vec<Label>> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (row, key) in row_keys.iter().enumerate() {
        let slot = *slots.entry(key).or_insert_with(|| {
            keys.push(key.clone());
            groups.push(Vec::new());
            keys.len() - 1
        });
        groups[slot].push(row);
    }

    if order == GroupOrder::Sorted {
        let mut paired: Vec<(Vec<Label>, Vec<usize>)> = keys.into_iter().zip(groups).collect();
        paired.sort_by(|a, b| a.0.cmp(&b.0));
        (keys, groups) = paired.into_iter().unzip();
    }

    let index = group_index(keys, names)?;
    Ok(GroupBy {
        frame: frame.clone(),
        index,
        groups,
    })
}

fn group_index(keys: Vec<Vec<Label>>, mut names: Vec<String>) -> IndexResult<AnyIndex> {
    if names.len() == 1 {
        let labels = keys.into_iter().filter_map(|k| k.into_iter().next());
        return Ok(AnyIndex::Flat(Index::new(labels).with_name(names.remove(0))));
    }
    let width = names.len();
    let index = if keys.is_empty() {
        MultiIndex::from_rows(Vec::new(), width, None, None)
    } else {
        MultiIndex::from_tuples(keys)?
    };
    index.with_level_names(names).map(AnyIndex::Multi)
}

impl GroupBy {
    /// Index of distinct group keys.
    pub fn index(&self) -> &AnyIndex {
        &self.index
    }

    /// Row positions of every group, aligned with [`GroupBy::index`].
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if the frame had no rows to group.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows of the group named by `keys`.
    ///
    /// With a MultiIndex of keys a prefix selects several groups; their rows come back in frame
    /// order.
    pub fn group(&self, keys: &[Key]) -> IndexResult<DataFrame> {
        let rows = match resolve(&self.index, keys, self.frame.lookup_options())? {
            Positions::Single(g) => self.groups[g].clone(),
            Positions::Multiple(gs) => {
                let mut rows: Vec<usize> = gs.iter().flat_map(|&g| self.groups[g].iter().copied()).collect();
                rows.sort_unstable();
                rows
            }
        };
        self.frame.take_rows(&rows)
    }

    /// Number of rows per group, indexed by group key.
    pub fn sizes(&self) -> IndexResult<Vector> {
        let counts = self.groups.iter().map(|g| Value::Int64(g.len() as i64));
        Vector::new(counts, Some(self.index.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupOrder, group_by};
    use crate::error::IndexError;
    use crate::frame::DataFrame;
    use crate::index::{AnyIndex, Index, IndexKind, Positional};
    use crate::key::Positions;
    use crate::keys;
    use crate::types::{Label, Value};
    use crate::vector::Element;

    fn sales() -> DataFrame {
        let s = |x: &str| Value::from(x);
        DataFrame::from_columns([
            ("region", vec![s("west"), s("east"), s("west"), s("east"), s("west")]),
            ("kind", vec![s("b"), s("a"), s("a"), s("a"), s("b")]),
            ("units", vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4), Value::from(5)]),
        ])
        .unwrap()
    }

    #[test]
    fn single_column_groups_in_encounter_order() {
        let g = group_by(&sales(), &keys!["region"], GroupOrder::Encounter).unwrap();
        assert_eq!(g.index(), &AnyIndex::from(Index::new(["west", "east"]).with_name("region")));
        assert_eq!(g.groups(), &[vec![0, 2, 4], vec![1, 3]]);
        assert_eq!(g.len(), 2);

        let east = g.group(&keys!["east"]).unwrap();
        assert_eq!(east.index(), &AnyIndex::from(Index::new([1, 3])));
        assert_eq!(east.column(&keys!["units"]).unwrap().values(), &[Value::from(2), Value::from(4)]);
    }

    #[test]
    fn sorted_order_sorts_keys_and_groups_together() {
        let g = group_by(&sales(), &keys!["region"], GroupOrder::Sorted).unwrap();
        assert_eq!(g.index().to_vec(), vec![Label::from("east"), Label::from("west")]);
        assert_eq!(g.groups(), &[vec![1, 3], vec![0, 2, 4]]);
    }

    #[test]
    fn several_columns_build_a_multi_index() {
        let g = group_by(&sales(), &keys!["region", "kind"], GroupOrder::Sorted).unwrap();
        match g.index() {
            AnyIndex::Multi(mi) => {
                assert_eq!(
                    mi.to_vec(),
                    vec![
                        vec![Label::from("east"), Label::from("a")],
                        vec![Label::from("west"), Label::from("a")],
                        vec![Label::from("west"), Label::from("b")],
                    ]
                );
                assert_eq!(mi.level_names(), Some(&["region".to_string(), "kind".to_string()][..]));
            }
            other => panic!("expected a MultiIndex, got {other:?}"),
        }
        assert_eq!(g.index().pos(&keys!["west"]).unwrap(), Positions::Multiple(vec![1, 2]));

        let west = g.group(&keys!["west"]).unwrap();
        assert_eq!(west.index(), &AnyIndex::from(Index::new([0, 2, 4])));
        let west_b = g.group(&keys!["west", "b"]).unwrap();
        assert_eq!(west_b.nrows(), 2);
    }

    #[test]
    fn sizes_are_indexed_by_group_key() {
        let g = group_by(&sales(), &keys!["kind"], GroupOrder::Encounter).unwrap();
        let sizes = g.sizes().unwrap();
        assert_eq!(sizes.get(&keys!["a"]).unwrap(), Element::Value(Value::Int64(3)));
        assert_eq!(sizes.get(&keys!["b"]).unwrap(), Element::Value(Value::Int64(2)));
    }

    #[test]
    fn groups_partition_the_rows() {
        let df = sales();
        let g = group_by(&df, &keys!["region", "kind"], GroupOrder::Encounter).unwrap();
        let mut all: Vec<usize> = g.groups().iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..df.nrows()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_frame_and_bad_keys() {
        let empty = DataFrame::from_columns([("a", Vec::new()), ("b", Vec::new())]).unwrap();
        let g = group_by(&empty, &keys!["a", "b"], GroupOrder::Sorted).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.index().kind(), IndexKind::Multi);

        assert!(matches!(
            group_by(&sales(), &keys!["nope"], GroupOrder::Encounter),
            Err(IndexError::InvalidLabel { .. })
        ));
    }
}
