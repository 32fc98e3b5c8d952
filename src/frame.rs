//! Column-major table with a row index and a flat column index.
//!
//! The row axis may be any index variant; the column axis is always a flat [`Index`] of unique
//! labels. Row selections gather every column in parallel with rayon.

use rayon::prelude::*;

use crate::error::{IndexError, IndexResult};
use crate::index::{AnyIndex, Index, Positional};
use crate::key::{Key, Positions};
use crate::resolve::{LookupOptions, resolve, resolve_flat};
use crate::types::{Label, Value};
use crate::vector::Vector;

/// What a row lookup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelection {
    /// The keys named exactly one row, returned as a vector indexed by column label.
    Row(Vector),
    /// The keys named several rows (or a MultiIndex prefix).
    Frame(DataFrame),
}

/// In-memory table.
#[derive(Debug, Clone)]
pub struct DataFrame {
    index: AnyIndex,
    columns: Index,
    data: Vec<Vec<Value>>,
    options: LookupOptions,
}

impl DataFrame {
    /// Create a frame from `(label, values)` columns.
    ///
    /// Without a row index the default positional index `0..n` is used. Column lengths must all
    /// match the row index size ([`IndexError::ShapeMismatch`]). Column labels must be unique and
    /// a flat row index must not be built from repeated labels ([`IndexError::ConstructionError`]).
    pub fn new<L: Into<Label>>(
        columns: impl IntoIterator<Item = (L, Vec<Value>)>,
        index: Option<AnyIndex>,
    ) -> IndexResult<Self> {
        let (labels, data): (Vec<Label>, Vec<Vec<Value>>) =
            columns.into_iter().map(|(l, v)| (l.into(), v)).unzip();
        let column_index = Index::new(labels.iter().cloned());
        if column_index.size() != labels.len() {
            return Err(IndexError::construction(format!(
                "column labels must be unique, got {} labels for {} columns",
                column_index.size(),
                labels.len()
            )));
        }
        let nrows = match &index {
            Some(i) => {
                i.check_addressable()?;
                i.size()
            }
            None => data.first().map_or(0, Vec::len),
        };
        if let Some((label, column)) = labels.iter().zip(&data).find(|(_, c)| c.len() != nrows) {
            return Err(IndexError::shape(format!(
                "column {label} has {} values, expected {nrows}",
                column.len()
            )));
        }
        Ok(Self {
            index: index.unwrap_or_else(|| AnyIndex::Flat(Index::positional(nrows))),
            columns: column_index,
            data,
            options: LookupOptions::default(),
        })
    }

    /// Create a frame with a fresh positional row index, as produced by joins.
    pub fn from_columns<L: Into<Label>>(
        columns: impl IntoIterator<Item = (L, Vec<Value>)>,
    ) -> IndexResult<Self> {
        Self::new(columns, None)
    }

    /// Use `options` for every label lookup made through this frame.
    pub fn with_lookup_options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }

    /// Row index.
    pub fn index(&self) -> &AnyIndex {
        &self.index
    }

    /// Column index.
    pub fn columns(&self) -> &Index {
        &self.columns
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.index.size()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.size()
    }

    pub(crate) fn column_values(&self, column: usize) -> Option<&[Value]> {
        self.data.get(column).map(Vec::as_slice)
    }

    pub(crate) fn lookup_options(&self) -> &LookupOptions {
        &self.options
    }

    /// The single column named by `keys`, as a vector sharing the row index.
    pub fn column(&self, keys: &[Key]) -> IndexResult<Vector> {
        let position = match resolve_flat(&self.columns, keys, &self.options)? {
            Positions::Single(c) => c,
            Positions::Multiple(cs) => {
                return Err(IndexError::shape(format!(
                    "expected one column, keys selected {}",
                    cs.len()
                )));
            }
        };
        let label = self
            .columns
            .label(position)
            .ok_or_else(|| IndexError::invalid_position(position as i64, self.ncols()))?;
        let values = self.data[position].clone();
        Ok(Vector::new(values, Some(self.index.clone()))?
            .with_name(label.to_string())
            .with_lookup_options(self.options.clone()))
    }

    /// New frame holding the columns named by `keys`, in key order.
    pub fn select(&self, keys: &[Key]) -> IndexResult<Self> {
        let positions = resolve_flat(&self.columns, keys, &self.options)?.into_vec();
        let labels = self.columns.keys_at(&positions)?;
        let columns = labels
            .into_iter()
            .zip(positions.iter().map(|&c| self.data[c].clone()));
        Ok(Self::new(columns, Some(self.index.clone()))?.with_lookup_options(self.options.clone()))
    }

    /// Label-or-position row lookup.
    ///
    /// On a MultiIndex row axis a prefix returns the matching rows with the consumed levels
    /// dropped from the row index.
    pub fn row(&self, keys: &[Key]) -> IndexResult<RowSelection> {
        match resolve(&self.index, keys, &self.options)? {
            Positions::Single(p) => self.row_at(p).map(RowSelection::Row),
            Positions::Multiple(ps) => {
                let index = match self.index.select(&ps)? {
                    AnyIndex::Multi(sub) => sub.conform(keys)?,
                    other => other,
                };
                self.gather_rows(&ps, index).map(RowSelection::Frame)
            }
        }
    }

    /// The row at `position`, as a vector indexed by column label and named by the row label.
    pub fn row_at(&self, position: usize) -> IndexResult<Vector> {
        let label = self
            .index
            .label(position)
            .ok_or_else(|| IndexError::invalid_position(position as i64, self.nrows()))?;
        let values: Vec<Value> = self.data.iter().map(|c| c[position].clone()).collect();
        Ok(Vector::new(values, Some(AnyIndex::Flat(self.columns.clone())))?
            .with_name(label.to_string())
            .with_lookup_options(self.options.clone()))
    }

    /// New frame without the given columns; absent labels are ignored.
    pub fn except<L: Into<Label>>(&self, labels: impl IntoIterator<Item = L>) -> Self {
        let columns = self.columns.except(labels);
        let data = self
            .columns
            .iter()
            .zip(&self.data)
            .filter(|(label, _)| columns.contains(label))
            .map(|(_, values)| values.clone())
            .collect();
        Self {
            index: self.index.clone(),
            columns,
            data,
            options: self.options.clone(),
        }
    }

    /// Replaces the column `label`, or appends it when the label is new.
    pub fn set_column<V: Into<Value>>(
        &mut self,
        label: impl Into<Label>,
        values: impl IntoIterator<Item = V>,
    ) -> IndexResult<()> {
        let label = label.into();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != self.nrows() {
            return Err(IndexError::shape(format!(
                "column {label} has {} values, expected {}",
                values.len(),
                self.nrows()
            )));
        }
        if self.columns.contains(&label) {
            let position = resolve_flat(&self.columns, &[Key::Label(label)], &self.options)?;
            for c in position.into_vec() {
                self.data[c] = values.clone();
            }
            return Ok(());
        }
        self.columns = self.columns.add([label]);
        self.data.push(values);
        Ok(())
    }

    /// New frame with rows permuted by `positions` (a permutation of `0..nrows`).
    pub fn reorder_rows(&self, positions: &[usize]) -> IndexResult<Self> {
        let index = self.index.reorder(positions)?;
        self.gather_rows(positions, index)
    }

    /// New frame holding the rows at `positions`, in that order; repeats are allowed.
    pub fn take_rows(&self, positions: &[usize]) -> IndexResult<Self> {
        let index = self.index.select(positions)?;
        self.gather_rows(positions, index)
    }

    /// New frame with rows ordered by their labels.
    pub fn sort_index(&self, ascending: bool) -> IndexResult<Self> {
        self.reorder_rows(&self.index.argsort(ascending))
    }

    fn gather_rows(&self, positions: &[usize], index: AnyIndex) -> IndexResult<Self> {
        let nrows = self.nrows();
        let data = self
            .data
            .par_iter()
            .map(|column| {
                positions
                    .iter()
                    .map(|&p| {
                        column
                            .get(p)
                            .cloned()
                            .ok_or_else(|| IndexError::invalid_position(p as i64, nrows))
                    })
                    .collect::<IndexResult<Vec<_>>>()
            })
            .collect::<IndexResult<Vec<_>>>()?;
        Ok(Self {
            index,
            columns: self.columns.clone(),
            data,
            options: self.options.clone(),
        })
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.columns == other.columns && self.data == other.data
    }
}
