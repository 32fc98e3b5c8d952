//! Labelled one-dimensional data.
//!
//! A [`Vector`] pairs a list of [`Value`]s with an [`AnyIndex`] of the same size. Label lookups
//! go through [`crate::resolve::resolve`] with the vector's [`LookupOptions`].

use std::fmt;

use crate::error::{IndexError, IndexResult};
use crate::index::{AnyIndex, Index};
use crate::key::{Key, PositionSpec, Positions};
use crate::resolve::{LookupOptions, resolve};
use crate::types::{Label, Value};

/// What a vector lookup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// The keys named exactly one entry.
    Value(Value),
    /// The keys named several entries (or a MultiIndex prefix).
    Vector(Vector),
}

impl Element {
    /// The value, if exactly one entry was named.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Vector(_) => None,
        }
    }

    /// The sub-vector, if several entries were named.
    pub fn into_vector(self) -> Option<Vector> {
        match self {
            Self::Vector(v) => Some(v),
            Self::Value(_) => None,
        }
    }
}

/// Values addressed by label or position.
#[derive(Debug, Clone)]
pub struct Vector {
    name: Option<String>,
    index: AnyIndex,
    data: Vec<Value>,
    options: LookupOptions,
}

impl Vector {
    /// Create a vector; without an index the default positional index `0..n` is used.
    ///
    /// Fails with [`IndexError::ShapeMismatch`] when the index size differs from the data length
    /// and with [`IndexError::ConstructionError`] for a flat index built from repeated labels.
    pub fn new<V: Into<Value>>(
        data: impl IntoIterator<Item = V>,
        index: Option<AnyIndex>,
    ) -> IndexResult<Self> {
        let data: Vec<Value> = data.into_iter().map(Into::into).collect();
        let index = index.unwrap_or_else(|| AnyIndex::Flat(Index::positional(data.len())));
        index.check_addressable()?;
        if index.size() != data.len() {
            return Err(IndexError::shape(format!(
                "index of size {} cannot label {} values",
                index.size(),
                data.len()
            )));
        }
        Ok(Self {
            name: None,
            index,
            data,
            options: LookupOptions::default(),
        })
    }

    /// Set the vector name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use `options` for every label lookup made through this vector.
    pub fn with_lookup_options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }

    /// Vector name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Index labelling the values.
    pub fn index(&self) -> &AnyIndex {
        &self.index
    }

    /// Values in position order.
    pub fn values(&self) -> &[Value] {
        &self.data
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the vector holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(label, value)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &Value)> + '_ {
        self.index.to_vec().into_iter().zip(self.data.iter())
    }

    /// Label-or-position lookup.
    ///
    /// On a MultiIndex a prefix selects every matching entry and the consumed levels are dropped
    /// from the returned vector's index.
    pub fn get(&self, keys: &[Key]) -> IndexResult<Element> {
        match resolve(&self.index, keys, &self.options)? {
            Positions::Single(p) => self.value_at(p).map(Element::Value),
            Positions::Multiple(ps) => {
                let index = match self.index.select(&ps)? {
                    AnyIndex::Multi(sub) => sub.conform(keys)?,
                    other => other,
                };
                self.gather(&ps, index).map(Element::Vector)
            }
        }
    }

    /// Strictly positional lookup.
    pub fn at(&self, spec: impl Into<PositionSpec>) -> IndexResult<Element> {
        match spec.into().resolve(self.data.len())? {
            Positions::Single(p) => self.value_at(p).map(Element::Value),
            Positions::Multiple(ps) => {
                let index = self.index.select(&ps)?;
                self.gather(&ps, index).map(Element::Vector)
            }
        }
    }

    /// Assigns `value` to every entry labelled `label`, growing the vector by one entry when the
    /// label is absent.
    pub fn set(&mut self, label: impl Into<Label>, value: impl Into<Value>) -> IndexResult<()> {
        let label = label.into();
        let value = value.into();
        if !self.index.contains(&label) {
            self.index = self.index.add(label)?;
            self.data.push(value);
            return Ok(());
        }
        let keys: Vec<Key> = match (&self.index, &label) {
            (AnyIndex::Multi(_), Label::Tuple(items)) => items.iter().map(Key::from).collect(),
            _ => vec![Key::Label(label)],
        };
        let len = self.data.len();
        for p in resolve(&self.index, &keys, &self.options)?.into_vec() {
            let slot = self
                .data
                .get_mut(p)
                .ok_or_else(|| IndexError::invalid_position(p as i64, len))?;
            *slot = value.clone();
        }
        Ok(())
    }

    /// New vector with entries permuted by `positions` (a permutation of `0..len`).
    pub fn reorder(&self, positions: &[usize]) -> IndexResult<Self> {
        let index = self.index.reorder(positions)?;
        self.gather(positions, index)
    }

    /// New vector ordered by its labels.
    pub fn sort_index(&self, ascending: bool) -> IndexResult<Self> {
        self.reorder(&self.index.argsort(ascending))
    }

    fn value_at(&self, position: usize) -> IndexResult<Value> {
        self.data
            .get(position)
            .cloned()
            .ok_or_else(|| IndexError::invalid_position(position as i64, self.data.len()))
    }

    fn gather(&self, positions: &[usize], index: AnyIndex) -> IndexResult<Self> {
        let data = positions
            .iter()
            .map(|&p| self.value_at(p))
            .collect::<IndexResult<Vec<_>>>()?;
        Ok(Self {
            name: self.name.clone(),
            index,
            data,
            options: self.options.clone(),
        })
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.index == other.index && self.data == other.data
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Vector[{name}]({})", self.data.len())?,
            None => write!(f, "Vector({})", self.data.len())?,
        }
        for (label, value) in self.iter() {
            write!(f, "\n  {label}  {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Vector};
    use crate::error::IndexError;
    use crate::index::{AnyIndex, CategoricalIndex, Index, IndexKind, MultiIndex};
    use crate::keys;
    use crate::types::{Label, Value};

    fn letters() -> Vector {
        Vector::new([10, 20, 30], Some(Index::new(["a", "b", "c"]).into())).unwrap()
    }

    fn nested() -> Vector {
        let mi = MultiIndex::from_tuples([["a", "one"], ["a", "two"], ["b", "one"]]).unwrap();
        Vector::new([1, 2, 3], Some(mi.into())).unwrap()
    }

    #[test]
    fn new_checks_shape_and_defaults_to_positions() {
        let err = Vector::new([1, 2], Some(Index::new(["a"]).into())).unwrap_err();
        assert!(matches!(err, IndexError::ShapeMismatch { .. }));

        let v = Vector::new(["x", "y"], None).unwrap();
        assert_eq!(v.index(), &AnyIndex::from(Index::positional(2)));
    }

    #[test]
    fn get_by_label_or_position() {
        let v = letters();
        assert_eq!(v.get(&keys!["b"]).unwrap(), Element::Value(Value::Int64(20)));
        assert_eq!(v.get(&keys![2]).unwrap(), Element::Value(Value::Int64(30)));

        let sub = v.get(&keys!["c", "a"]).unwrap().into_vector().unwrap();
        assert_eq!(sub.values(), &[Value::Int64(30), Value::Int64(10)]);
        assert_eq!(sub.index(), &AnyIndex::from(Index::new(["c", "a"])));
    }

    #[test]
    fn prefix_get_drops_consumed_level() {
        let v = nested();
        let sub = v.get(&keys!["a"]).unwrap().into_vector().unwrap();
        assert_eq!(sub.index(), &AnyIndex::from(Index::new(["one", "two"])));
        assert_eq!(sub.values(), &[Value::Int64(1), Value::Int64(2)]);

        assert_eq!(v.get(&keys!["a", "two"]).unwrap(), Element::Value(Value::Int64(2)));

        let by_position = v.get(&keys![1..=2]).unwrap().into_vector().unwrap();
        assert_eq!(by_position.index().kind(), IndexKind::Multi);
    }

    #[test]
    fn at_is_strictly_positional() {
        let v = Vector::new([1, 2, 3], Some(Index::new([2, 1, 0]).into())).unwrap();
        assert_eq!(v.at(0).unwrap(), Element::Value(Value::Int64(1)));
        assert_eq!(v.get(&keys![0]).unwrap(), Element::Value(Value::Int64(3)));
        let tail = v.at(1..=-1).unwrap().into_vector().unwrap();
        assert_eq!(tail.values(), &[Value::Int64(2), Value::Int64(3)]);
    }

    #[test]
    fn repeated_positions_keep_every_value() {
        let v = letters();
        let sub = v.at(vec![0, 0]).unwrap().into_vector().unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.index(), &AnyIndex::from(CategoricalIndex::new(["a", "a"])));
    }

    #[test]
    fn set_overwrites_or_grows() {
        let mut v = letters();
        v.set("b", 99).unwrap();
        assert_eq!(v.get(&keys!["b"]).unwrap(), Element::Value(Value::Int64(99)));

        v.set("d", 40).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v.get(&keys!["d"]).unwrap(), Element::Value(Value::Int64(40)));

        let mut cat = Vector::new([1, 2, 3], Some(CategoricalIndex::new(["x", "y", "x"]).into())).unwrap();
        cat.set("x", 0).unwrap();
        assert_eq!(cat.values(), &[Value::Int64(0), Value::Int64(2), Value::Int64(0)]);

        let mut mv = nested();
        mv.set(("b", "one"), 30).unwrap();
        assert_eq!(mv.values()[2], Value::Int64(30));
        mv.set(("b", "two"), 4).unwrap();
        assert_eq!(mv.len(), 4);
        assert!(mv.set("c", 5).is_err());
    }

    #[test]
    fn flat_index_with_repeated_labels_is_rejected() {
        // size 2, but "a" maps to position 2
        let repeated = Index::new(["a", "b", "a"]);
        let err = Vector::new([1, 2], Some(repeated.into())).unwrap_err();
        assert!(matches!(err, IndexError::ConstructionError { .. }));

        let mut v = Vector::new([1, 2, 3], Some(CategoricalIndex::new(["a", "b", "a"]).into())).unwrap();
        v.set("a", 9).unwrap();
        assert_eq!(v.values(), &[Value::Int64(9), Value::Int64(2), Value::Int64(9)]);
    }

    #[test]
    fn reorder_keeps_repeated_tuples() {
        let mi = MultiIndex::from_tuples([
            ["a", "one", "x"],
            ["a", "one", "y"],
            ["a", "two", "x"],
            ["b", "one", "x"],
        ])
        .unwrap();
        let index = mi.remove_layer(1).unwrap();
        let v = Vector::new([1, 2, 3, 4], Some(index)).unwrap();

        let reversed = v.reorder(&[3, 2, 1, 0]).unwrap();
        assert_eq!(reversed.index().size(), 4);
        assert_eq!(reversed.values(), &[Value::Int64(4), Value::Int64(3), Value::Int64(2), Value::Int64(1)]);
        assert_eq!(reversed.index().label(1), Some(Label::from(("a", "x"))));
        assert_eq!(v.reorder(&[0, 1, 2, 3]).unwrap(), v);
    }

    #[test]
    fn reorder_and_sort_index() {
        let v = Vector::new([3, 1, 2], Some(Index::new(["c", "a", "b"]).into())).unwrap();
        let sorted = v.sort_index(true).unwrap();
        assert_eq!(sorted.index(), &AnyIndex::from(Index::new(["a", "b", "c"])));
        assert_eq!(sorted.values(), &[Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
        assert!(v.reorder(&[0, 1]).is_err());
        assert_eq!(v.reorder(&[0, 1, 2]).unwrap(), v);
    }

    #[test]
    fn display_lists_pairs() {
        let v = letters().with_name("n");
        assert_eq!(v.to_string(), "Vector[n](3)\n  a  10\n  b  20\n  c  30");
        let pairs: Vec<(Label, &Value)> = v.iter().collect();
        assert_eq!(pairs[0].0, Label::from("a"));
    }
}
