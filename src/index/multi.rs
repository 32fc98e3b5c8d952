//! Hierarchical index over fixed-width tuples.
//!
//! Storage is one list of distinct values per level plus one integer code per row and level, so
//! memory grows with the distinct values per level and the row count rather than with the raw
//! tuples. Prefix queries go through a lookup tree derived from the codes on first use.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{IndexError, IndexResult};
use crate::key::{Key, PositionSpec, Positions};
use crate::types::Label;

use super::lookup::LookupNode;
use super::{degrade, AnyIndex, Positional};

/// Result of [`MultiIndex::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    /// A full tuple (or a single position) named exactly one row.
    Position(usize),
    /// A prefix or several positions; consumed levels are dropped from the returned index.
    Index(AnyIndex),
}

/// Hierarchical index: de-duplicated tuples of a common width ≥ 2.
#[derive(Debug, Clone)]
pub struct MultiIndex {
    levels: Vec<Vec<Label>>,
    level_codes: Vec<HashMap<Label, usize>>,
    codes: Vec<Vec<usize>>,
    len: usize,
    name: Option<String>,
    level_names: Option<Vec<String>>,
    tree: OnceLock<LookupNode>,
}

impl MultiIndex {
    /// Create a MultiIndex from tuples, keeping the first occurrence of repeated tuples.
    ///
    /// Fails with [`IndexError::ConstructionError`] on an empty list and with
    /// [`IndexError::ShapeMismatch`] when widths differ or are below 2.
    pub fn from_tuples<T, L>(tuples: impl IntoIterator<Item = T>) -> IndexResult<Self>
    where
        T: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let tuples: Vec<Vec<Label>> = tuples
            .into_iter()
            .map(|t| t.into_iter().map(Into::into).collect())
            .collect();
        let Some(first) = tuples.first() else {
            return Err(IndexError::construction(
                "cannot build a MultiIndex from an empty tuple list",
            ));
        };
        let width = first.len();
        if let Some(other) = tuples.iter().find(|t| t.len() != width) {
            return Err(IndexError::shape(format!(
                "tuples {} and {} have different widths",
                show(first),
                show(other)
            )));
        }
        if width < 2 {
            return Err(IndexError::shape(format!(
                "tuple width {width} is too narrow for a MultiIndex, at least 2 levels are needed"
            )));
        }

        Ok(Self::from_rows(distinct(tuples), width, None, None))
    }

    /// Create a MultiIndex from one array per level (all of the same length).
    pub fn from_arrays<A, L>(arrays: impl IntoIterator<Item = A>) -> IndexResult<Self>
    where
        A: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let arrays: Vec<Vec<Label>> = arrays
            .into_iter()
            .map(|a| a.into_iter().map(Into::into).collect())
            .collect();
        let Some(first) = arrays.first() else {
            return Err(IndexError::construction(
                "cannot build a MultiIndex from an empty list of arrays",
            ));
        };
        let rows = first.len();
        if let Some(other) = arrays.iter().find(|a| a.len() != rows) {
            return Err(IndexError::shape(format!(
                "level arrays have different lengths: {rows} and {}",
                other.len()
            )));
        }
        let tuples = (0..rows).map(|r| arrays.iter().map(|a| a[r].clone()).collect::<Vec<_>>());
        Self::from_tuples(tuples)
    }

    /// Create the cartesian product of the given levels; the first level varies slowest.
    pub fn from_product<A, L>(levels: impl IntoIterator<Item = A>) -> IndexResult<Self>
    where
        A: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut tuples: Vec<Vec<Label>> = vec![Vec::new()];
        for level in levels {
            let values: Vec<Label> = level.into_iter().map(Into::into).collect();
            tuples = tuples
                .iter()
                .flat_map(|prefix| {
                    values.iter().map(move |v| {
                        let mut t = prefix.clone();
                        t.push(v.clone());
                        t
                    })
                })
                .collect();
        }
        tuples.retain(|t| !t.is_empty());
        Self::from_tuples(tuples)
    }

    /// Builds the level/code storage from rows of a known width, without validation or
    /// de-duplication.
    pub(crate) fn from_rows(
        rows: Vec<Vec<Label>>,
        width: usize,
        name: Option<String>,
        level_names: Option<Vec<String>>,
    ) -> Self {
        let mut levels: Vec<Vec<Label>> = vec![Vec::new(); width];
        let mut level_codes: Vec<HashMap<Label, usize>> = vec![HashMap::new(); width];
        let mut codes: Vec<Vec<usize>> = vec![Vec::with_capacity(rows.len()); width];
        let len = rows.len();
        for row in rows {
            for (depth, value) in row.into_iter().enumerate().take(width) {
                let next = levels[depth].len();
                let code = *level_codes[depth].entry(value.clone()).or_insert(next);
                if code == next {
                    levels[depth].push(value);
                }
                codes[depth].push(code);
            }
        }
        Self {
            levels,
            level_codes,
            codes,
            len,
            name,
            level_names,
            tree: OnceLock::new(),
        }
    }

    /// Set the index name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name every level; the number of names must equal the width.
    pub fn with_level_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> IndexResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.width() {
            return Err(IndexError::shape(format!(
                "expected {} level names, got {}",
                self.width(),
                names.len()
            )));
        }
        self.level_names = Some(names);
        Ok(self)
    }

    /// Number of levels.
    pub fn width(&self) -> usize {
        self.levels.len()
    }

    /// Distinct values per level, in first-occurrence order.
    pub fn levels(&self) -> &[Vec<Label>] {
        &self.levels
    }

    /// Per-level row codes: `codes()[level][row]` indexes into `levels()[level]`.
    pub fn codes(&self) -> &[Vec<usize>] {
        &self.codes
    }

    /// Level names, if set.
    pub fn level_names(&self) -> Option<&[String]> {
        self.level_names.as_deref()
    }

    fn tree(&self) -> &LookupNode {
        self.tree.get_or_init(|| LookupNode::build(&self.codes, self.len))
    }

    fn row(&self, position: usize) -> Option<Vec<Label>> {
        if position >= self.len {
            return None;
        }
        Some(
            self.levels
                .iter()
                .zip(&self.codes)
                .map(|(values, codes)| values[codes[position]].clone())
                .collect(),
        )
    }

    fn encode(&self, prefix: &[Label]) -> Option<Vec<usize>> {
        if prefix.len() > self.width() {
            return None;
        }
        prefix
            .iter()
            .zip(&self.level_codes)
            .map(|(label, codes)| codes.get(label).copied())
            .collect()
    }

    /// True if some row starts with `prefix`.
    pub fn contains_prefix(&self, prefix: &[Label]) -> bool {
        self.encode(prefix)
            .and_then(|path| self.tree().descend(&path).map(|n| !n.positions().is_empty()))
            .unwrap_or(false)
    }

    /// Integer keys (or one integer range) are positions unless a level-0 value matches.
    fn positional_spec(&self, keys: &[Key]) -> Option<PositionSpec> {
        let spec = PositionSpec::from_keys(keys)?;
        let shadowed = keys
            .iter()
            .filter_map(Key::as_label)
            .any(|l| self.level_codes.first().is_some_and(|c| c.contains_key(l)));
        (!shadowed).then_some(spec)
    }

    fn locate(&self, keys: &[Key]) -> IndexResult<&LookupNode> {
        let missing = || match keys {
            [key] => IndexError::invalid_label(key.head().clone()),
            _ => IndexError::invalid_label(Label::Tuple(keys.iter().map(|k| k.head().clone()).collect())),
        };
        if keys.is_empty() || keys.len() > self.width() {
            return Err(missing());
        }
        let mut path = Vec::with_capacity(keys.len());
        for (key, codes) in keys.iter().zip(&self.level_codes) {
            let label = key.as_label().ok_or_else(missing)?;
            path.push(*codes.get(label).ok_or_else(missing)?);
        }
        self.tree().descend(&path).ok_or_else(missing)
    }

    /// Resolves a tuple prefix (or positions) to row positions.
    ///
    /// - a full tuple → [`Positions::Single`]
    /// - a shorter prefix → every matching row, ascending
    /// - integers matching no level-0 value → positions validated against the size
    pub fn pos(&self, keys: &[Key]) -> IndexResult<Positions> {
        if let Some(spec) = self.positional_spec(keys) {
            return spec.resolve(self.len);
        }
        let node = self.locate(keys)?;
        Ok(match node.positions() {
            [p] if keys.len() == self.width() => Positions::Single(*p),
            ps => Positions::Multiple(ps.to_vec()),
        })
    }

    /// Index-shaped lookup: a full tuple yields its position, a prefix yields the matching rows
    /// with the consumed levels dropped (degrading to a flat index when one level remains).
    pub fn get(&self, keys: &[Key]) -> IndexResult<Selected> {
        if let Some(spec) = self.positional_spec(keys) {
            return match spec.resolve(self.len)? {
                Positions::Single(p) => Ok(Selected::Position(p)),
                Positions::Multiple(ps) => {
                    self.rebuild(self.keys_at(&ps)?).map(|mi| Selected::Index(AnyIndex::Multi(mi)))
                }
            };
        }
        let depth = keys.len();
        let node = self.locate(keys)?;
        Ok(match node.positions() {
            [p] if depth == self.width() => Selected::Position(*p),
            ps => Selected::Index(self.suffix_index(ps, depth)),
        })
    }

    fn suffix_index(&self, positions: &[usize], depth: usize) -> AnyIndex {
        let rows: Vec<Vec<Label>> = positions.iter().filter_map(|&p| self.row(p)).collect();
        if depth >= self.width() {
            return AnyIndex::Multi(Self::from_rows(
                rows,
                self.width(),
                self.name.clone(),
                self.level_names.clone(),
            ));
        }
        let rows = rows.into_iter().map(|r| r[depth..].to_vec()).collect();
        let names = self.level_names.as_ref().map(|n| n[depth..].to_vec());
        degrade(rows, self.width() - depth, self.name.clone(), names)
    }

    /// Strips the `by` outermost levels.
    ///
    /// The result is a MultiIndex while two or more levels remain; with one level left it is a
    /// flat [`super::Index`] when the values are unique and a [`super::CategoricalIndex`] when
    /// they repeat. Rows are never merged, so the size is unchanged.
    pub fn drop_left_level(&self, by: usize) -> IndexResult<AnyIndex> {
        if by >= self.width() {
            return Err(IndexError::shape(format!(
                "cannot drop {by} levels from a MultiIndex of width {}",
                self.width()
            )));
        }
        let rows = (0..self.len)
            .filter_map(|p| self.row(p))
            .map(|r| r[by..].to_vec())
            .collect();
        let names = self.level_names.as_ref().map(|n| n[by..].to_vec());
        Ok(degrade(rows, self.width() - by, self.name.clone(), names))
    }

    /// Removes one level, degrading like [`MultiIndex::drop_left_level`].
    pub fn remove_layer(&self, layer: usize) -> IndexResult<AnyIndex> {
        if layer >= self.width() {
            return Err(IndexError::shape(format!(
                "layer {layer} does not exist in a MultiIndex of width {}",
                self.width()
            )));
        }
        let rows = (0..self.len)
            .filter_map(|p| self.row(p))
            .map(|mut r| {
                r.remove(layer);
                r
            })
            .collect();
        let names = self.level_names.clone().map(|mut n| {
            n.remove(layer);
            n
        });
        Ok(degrade(rows, self.width() - 1, self.name.clone(), names))
    }

    /// Reshapes the index after a selection made with `keys`: a positional range or a full tuple
    /// keeps the full tuples, a label prefix drops the consumed levels.
    pub fn conform(&self, keys: &[Key]) -> IndexResult<AnyIndex> {
        match keys.first() {
            None | Some(Key::Range(..)) => Ok(AnyIndex::Multi(self.clone())),
            Some(_) if self.positional_spec(keys).is_some() => Ok(AnyIndex::Multi(self.clone())),
            Some(_) if keys.len() >= self.width() => Ok(AnyIndex::Multi(self.clone())),
            Some(_) => self.drop_left_level(keys.len()),
        }
    }

    /// Values of the next level under `prefix`, in first-occurrence order.
    pub fn sublevel(&self, prefix: &[Label]) -> IndexResult<Vec<Label>> {
        let depth = prefix.len();
        if depth >= self.width() {
            return Err(IndexError::shape(format!(
                "prefix of length {depth} leaves no level below it in a MultiIndex of width {}",
                self.width()
            )));
        }
        let node = self
            .encode(prefix)
            .and_then(|path| self.tree().descend(&path))
            .ok_or_else(|| IndexError::invalid_label(Label::Tuple(prefix.to_vec())))?;
        Ok(node
            .child_codes()
            .iter()
            .map(|&c| self.levels[depth][c].clone())
            .collect())
    }

    /// Rows for display: after the first, leading components equal to the previous row's are
    /// replaced by `None` (blank).
    pub fn sparse_tuples(&self) -> Vec<Vec<Option<Label>>> {
        let tuples = self.to_vec();
        let mut out = Vec::with_capacity(tuples.len());
        let mut prev: Option<&Vec<Label>> = None;
        for tuple in &tuples {
            let same = prev.map_or(0, |p| tuple.iter().zip(p).take_while(|(a, b)| a == b).count());
            out.push(
                tuple
                    .iter()
                    .enumerate()
                    .map(|(i, l)| (i >= same).then(|| l.clone()))
                    .collect(),
            );
            prev = Some(tuple);
        }
        out
    }

    /// New index with `tuple` appended (ignored if already present).
    pub fn add(&self, tuple: Vec<Label>) -> IndexResult<Self> {
        if self.contains(&tuple) {
            return Ok(self.clone());
        }
        let mut tuples = self.to_vec();
        tuples.push(tuple);
        self.rebuild(tuples)
    }
}

fn show(tuple: &[Label]) -> String {
    Label::Tuple(tuple.to_vec()).to_string()
}

impl PartialEq for MultiIndex {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.len == other.len
            && self.name == other.name
            && self.level_names == other.level_names
            && self.to_vec() == other.to_vec()
    }
}

impl Positional for MultiIndex {
    type Item = Vec<Label>;

    fn size(&self) -> usize {
        self.len
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self, position: usize) -> Option<Vec<Label>> {
        self.row(position)
    }

    fn contains(&self, item: &Vec<Label>) -> bool {
        item.len() == self.width() && self.contains_prefix(item)
    }

    fn to_vec(&self) -> Vec<Vec<Label>> {
        (0..self.len).filter_map(|p| self.row(p)).collect()
    }

    /// Keeps every row, repeats included; only width is checked.
    fn rebuild(&self, items: Vec<Vec<Label>>) -> IndexResult<Self> {
        if let Some(bad) = items.iter().find(|t| t.len() != self.width()) {
            return Err(IndexError::shape(format!(
                "tuple {} does not fit a MultiIndex of width {}",
                show(bad),
                self.width()
            )));
        }
        Ok(Self::from_rows(
            items,
            self.width(),
            self.name.clone(),
            self.level_names.clone(),
        ))
    }

    fn union_with(&self, items: &[Vec<Label>]) -> IndexResult<Self> {
        let mut out = self.to_vec();
        out.extend(items.iter().filter(|t| !self.contains(t)).cloned());
        self.rebuild(distinct(out))
    }

    fn intersection(&self, other: &Self) -> IndexResult<Self> {
        let out = self.iter().filter(|t| other.contains(t)).collect();
        self.rebuild(distinct(out))
    }

    fn intersection_with(&self, items: &[Vec<Label>]) -> IndexResult<Self> {
        let members: HashSet<&Vec<Label>> = items.iter().collect();
        let out = self.iter().filter(|t| members.contains(t)).collect();
        self.rebuild(distinct(out))
    }
}

/// First occurrence of every tuple, in order.
fn distinct(tuples: Vec<Vec<Label>>) -> Vec<Vec<Label>> {
    let mut seen = HashSet::with_capacity(tuples.len());
    tuples.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

impl fmt::Display for MultiIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "MultiIndex[{name}]({}x{})", self.len, self.width())?,
            None => write!(f, "MultiIndex({}x{})", self.len, self.width())?,
        }
        let rows: Vec<Vec<String>> = self
            .sparse_tuples()
            .into_iter()
            .map(|r| r.into_iter().map(|c| c.map(|l| l.to_string()).unwrap_or_default()).collect())
            .collect();
        let mut widths = vec![0usize; self.width()];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }
        for row in rows {
            let mut line = String::new();
            for (i, (cell, &width)) in row.iter().zip(&widths).enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                line.push_str(&format!("{cell:<width$}"));
            }
            write!(f, "\n  {}", line.trim_end())?;
        }
        Ok(())
    }
}
