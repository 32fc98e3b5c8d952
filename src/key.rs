//! Lookup arguments and lookup results.
//!
//! - [`Key`] is one argument to a label-or-position lookup (`pos`, `get`): a label or an inclusive
//!   range. Whether integers are labels or positions is decided by the index, not by the key.
//! - [`PositionSpec`] is the argument of strictly positional access (`at`).
//! - [`Positions`] is what a lookup resolves to.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{IndexError, IndexResult};
use crate::types::Label;

/// One argument to a label-or-position lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single label (or integer that may turn out to be a position).
    Label(Label),
    /// An inclusive range `start..=end` of labels or positions.
    Range(Label, Label),
}

impl Key {
    /// The label this key starts with; used to name the key in errors.
    pub fn head(&self) -> &Label {
        match self {
            Self::Label(l) | Self::Range(l, _) => l,
        }
    }

    pub(crate) fn as_label(&self) -> Option<&Label> {
        match self {
            Self::Label(l) => Some(l),
            Self::Range(..) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(l) => write!(f, "{l}"),
            Self::Range(a, b) => write!(f, "{a}..={b}"),
        }
    }
}

macro_rules! key_from_label {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Key {
                fn from(v: $t) -> Self {
                    Self::Label(Label::from(v))
                }
            }
        )*
    };
}

key_from_label!(Label, &Label, i64, i32, f64, bool, &str, String);

macro_rules! key_from_range {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<RangeInclusive<$t>> for Key {
                fn from(r: RangeInclusive<$t>) -> Self {
                    let (start, end) = r.into_inner();
                    Self::Range(Label::from(start), Label::from(end))
                }
            }
        )*
    };
}

key_from_range!(i64, i32, &str, Label);

/// Builds a `[Key; N]` array from heterogeneous arguments.
///
/// ```rust
/// use rust_data_index::{keys, Key, Label};
///
/// let k = keys!["a", 1, 2..=4];
/// assert_eq!(k[0], Key::Label(Label::from("a")));
/// assert_eq!(k[2], Key::Range(Label::from(2), Label::from(4)));
/// ```
#[macro_export]
macro_rules! keys {
    ($($k:expr),* $(,)?) => {
        [$($crate::Key::from($k)),*]
    };
}

/// Argument of strictly positional access.
///
/// Range endpoints may be negative and then count from the end (`-1` is the last position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSpec {
    /// A single position.
    One(i64),
    /// Several positions, in the requested order.
    Many(Vec<i64>),
    /// An inclusive range of positions.
    Span(i64, i64),
}

impl PositionSpec {
    /// Interprets lookup keys as positions: every key an integer, or exactly one integer range.
    pub(crate) fn from_keys(keys: &[Key]) -> Option<Self> {
        match keys {
            [Key::Range(Label::Int(a), Label::Int(b))] => Some(Self::Span(*a, *b)),
            [Key::Label(Label::Int(p))] => Some(Self::One(*p)),
            _ => keys
                .iter()
                .map(|k| k.as_label().and_then(Label::as_int))
                .collect::<Option<Vec<_>>>()
                .map(Self::Many),
        }
    }

    /// Checks the requested positions against an index of `size` entries.
    pub fn resolve(&self, size: usize) -> IndexResult<Positions> {
        match self {
            Self::One(p) => checked(*p, size).map(Positions::Single),
            Self::Many(ps) => ps
                .iter()
                .map(|p| checked(*p, size))
                .collect::<IndexResult<Vec<_>>>()
                .map(Positions::Multiple),
            Self::Span(start, end) => {
                let first = checked(from_end(*start, size), size)
                    .map_err(|_| IndexError::invalid_position(*start, size))?;
                let last = checked(from_end(*end, size), size)
                    .map_err(|_| IndexError::invalid_position(*end, size))?;
                if last < first {
                    return Ok(Positions::Multiple(Vec::new()));
                }
                Ok(Positions::Multiple((first..=last).collect()))
            }
        }
    }
}

fn from_end(p: i64, size: usize) -> i64 {
    if p < 0 { p + size as i64 } else { p }
}

fn checked(p: i64, size: usize) -> IndexResult<usize> {
    if p < 0 || p as u128 >= size as u128 {
        return Err(IndexError::invalid_position(p, size));
    }
    Ok(p as usize)
}

macro_rules! spec_from_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for PositionSpec {
                fn from(p: $t) -> Self {
                    Self::One(p as i64)
                }
            }

            impl From<Vec<$t>> for PositionSpec {
                fn from(ps: Vec<$t>) -> Self {
                    Self::Many(ps.into_iter().map(|p| p as i64).collect())
                }
            }

            impl From<&[$t]> for PositionSpec {
                fn from(ps: &[$t]) -> Self {
                    Self::Many(ps.iter().map(|p| *p as i64).collect())
                }
            }

            impl From<RangeInclusive<$t>> for PositionSpec {
                fn from(r: RangeInclusive<$t>) -> Self {
                    let (start, end) = r.into_inner();
                    Self::Span(start as i64, end as i64)
                }
            }
        )*
    };
}

spec_from_int!(i64, i32, usize);

/// Result of resolving a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positions {
    /// The lookup named exactly one entry.
    Single(usize),
    /// The lookup named a list (possibly of length one, e.g. a MultiIndex prefix).
    Multiple(Vec<usize>),
}

impl Positions {
    /// Number of resolved positions.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(ps) => ps.len(),
        }
    }

    /// True if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The position, if the lookup named exactly one entry.
    pub fn single(&self) -> Option<usize> {
        match self {
            Self::Single(p) => Some(*p),
            Self::Multiple(_) => None,
        }
    }

    /// Positions as a list, regardless of shape.
    pub fn into_vec(self) -> Vec<usize> {
        match self {
            Self::Single(p) => vec![p],
            Self::Multiple(ps) => ps,
        }
    }
}
