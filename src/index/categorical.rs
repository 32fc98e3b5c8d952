//! Categorical index: labels may repeat and each category owns a list of positions.

use std::collections::HashMap;
use std::fmt;

use crate::error::{IndexError, IndexResult};
use crate::key::{Key, PositionSpec, Positions};
use crate::types::Label;

use super::Positional;

/// Index over repeating labels ("categories").
///
/// The per-category position lists partition `0..size`: every position belongs to exactly one
/// category. Categories are ordered by first occurrence.
#[derive(Debug, Clone)]
pub struct CategoricalIndex {
    categories: Vec<Label>,
    category_codes: HashMap<Label, usize>,
    positions: Vec<Vec<usize>>,
    codes: Vec<usize>,
    name: Option<String>,
}

impl CategoricalIndex {
    /// Create a categorical index from labels, repeats included.
    pub fn new<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        let mut categories = Vec::new();
        let mut category_codes = HashMap::new();
        let mut positions: Vec<Vec<usize>> = Vec::new();
        let mut codes = Vec::new();
        for (position, label) in labels.into_iter().enumerate() {
            let label = label.into();
            let code = match category_codes.get(&label) {
                Some(&code) => code,
                None => {
                    let code = categories.len();
                    category_codes.insert(label.clone(), code);
                    categories.push(label);
                    positions.push(Vec::new());
                    code
                }
            };
            positions[code].push(position);
            codes.push(code);
        }
        Self {
            categories,
            category_codes,
            positions,
            codes,
            name: None,
        }
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

    /// Distinct categories in first-occurrence order.
    pub fn categories(&self) -> &[Label] {
        &self.categories
    }

    /// Category code of every position (an index into [`CategoricalIndex::categories`]).
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Positions holding `category`, ascending.
    pub fn category_positions(&self, category: &Label) -> Option<&[usize]> {
        self.category_codes
            .get(category)
            .map(|&code| self.positions[code].as_slice())
    }

    /// Resolves keys to positions.
    ///
    /// Each key is tried as a category first and only then as a raw position in `[0, size)`.
    /// Unlike [`super::Index::pos`], several results come back sorted ascending rather than in
    /// argument order.
    pub fn pos(&self, keys: &[Key]) -> IndexResult<Positions> {
        let size = self.codes.len();
        let mut out = Vec::new();
        for key in keys {
            match key {
                Key::Label(label) => match self.category_positions(label) {
                    Some(ps) => out.extend_from_slice(ps),
                    None => out.push(self.raw_position(label)?),
                },
                Key::Range(start, end) => {
                    let spec = match (start.as_int(), end.as_int()) {
                        (Some(s), Some(e)) if !self.contains(start) && !self.contains(end) => {
                            PositionSpec::Span(s, e)
                        }
                        _ => return Err(IndexError::invalid_label(start.clone())),
                    };
                    out.extend(spec.resolve(size)?.into_vec());
                }
            }
        }
        if let [p] = out.as_slice() {
            return Ok(Positions::Single(*p));
        }
        out.sort_unstable();
        Ok(Positions::Multiple(out))
    }

    fn raw_position(&self, label: &Label) -> IndexResult<usize> {
        match label.as_int() {
            Some(p) if p >= 0 && (p as u128) < self.codes.len() as u128 => Ok(p as usize),
            _ => Err(IndexError::invalid_label(label.clone())),
        }
    }

    /// New index restricted to the positions selected by `keys`; repeats are kept.
    pub fn subset(&self, keys: &[Key]) -> IndexResult<Self> {
        let positions = self.pos(keys)?.into_vec();
        self.rebuild(self.keys_at(&positions)?)
    }

    /// New index with `labels` appended at the end of the position space.
    pub fn add<L: Into<Label>>(&self, labels: impl IntoIterator<Item = L>) -> Self {
        let all = self.iter().chain(labels.into_iter().map(Into::into));
        Self::new(all).with_name_opt(self.name.clone())
    }

    /// New index where every `from` entry reads `to`; if `to` already exists the two
    /// categories merge.
    pub fn rename_category(&self, from: &Label, to: impl Into<Label>) -> IndexResult<Self> {
        let code = *self
            .category_codes
            .get(from)
            .ok_or_else(|| IndexError::invalid_label(from.clone()))?;
        let to = to.into();
        let relabeled = self.codes.iter().map(|&c| {
            if c == code {
                to.clone()
            } else {
                self.categories[c].clone()
            }
        });
        Ok(Self::new(relabeled).with_name_opt(self.name.clone()))
    }
}

impl PartialEq for CategoricalIndex {
    /// Same size and same category → position-set mapping; names are not compared.
    fn eq(&self, other: &Self) -> bool {
        if self.codes.len() != other.codes.len() || self.categories.len() != other.categories.len() {
            return false;
        }
        self.categories.iter().zip(&self.positions).all(|(category, mine)| {
            other.category_positions(category).is_some_and(|theirs| {
                let mut a = mine.clone();
                let mut b = theirs.to_vec();
                a.sort_unstable();
                b.sort_unstable();
                a == b
            })
        })
    }
}

impl Positional for CategoricalIndex {
    type Item = Label;

    fn size(&self) -> usize {
        self.codes.len()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self, position: usize) -> Option<Label> {
        self.codes
            .get(position)
            .map(|&code| self.categories[code].clone())
    }

    fn contains(&self, item: &Label) -> bool {
        self.category_codes.contains_key(item)
    }

    fn to_vec(&self) -> Vec<Label> {
        self.codes
            .iter()
            .map(|&code| self.categories[code].clone())
            .collect()
    }

    fn rebuild(&self, items: Vec<Label>) -> IndexResult<Self> {
        Ok(Self::new(items).with_name_opt(self.name.clone()))
    }
}

impl fmt::Display for CategoricalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "CategoricalIndex[{name}](")?,
            None => write!(f, "CategoricalIndex(")?,
        }
        for (i, &code) in self.codes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.categories[code])?;
        }
        write!(f, ")")
    }
}
