//! Core value types shared by every index variant.
//!
//! A [`Label`] identifies a row or column; a [`Value`] is a cell stored in a
//! [`crate::vector::Vector`] or [`crate::frame::DataFrame`]. Labels are hashable and totally
//! ordered (floats compare with [`f64::total_cmp`]) so they can key hash maps and be sorted.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A user-facing identifier for a row or column.
///
/// [`Label::Tuple`] is the label of one MultiIndex entry. Labels of different kinds never compare
/// equal (`Label::Int(1) != Label::Float(1.0)`); across kinds the order is
/// null < bool < int < float < string < tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// Missing label.
    Null,
    /// Boolean label.
    Bool(bool),
    /// Integer label. Integer labels compete with positions, see [`crate::index::Index::pos`].
    Int(i64),
    /// Floating point label.
    Float(f64),
    /// String label.
    Str(String),
    /// Fixed-width tuple of labels.
    Tuple(Vec<Label>),
}

impl Label {
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::Str(_) => 4,
            Self::Tuple(_) => 5,
        }
    }

    /// Returns the integer if this is an integer label.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string if this is a string label.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the components if this is a tuple label.
    pub fn as_tuple(&self) -> Option<&[Label]> {
        match self {
            Self::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Tuple(a), Self::Tuple(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            // total_cmp equality is bit equality, so hashing the bits is consistent with Eq.
            Self::Float(v) => v.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
            Self::Tuple(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Label {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Label {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Label {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for Label {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<&Label> for Label {
    fn from(v: &Label) -> Self {
        v.clone()
    }
}

impl From<Vec<Label>> for Label {
    fn from(items: Vec<Label>) -> Self {
        Self::Tuple(items)
    }
}

impl<A: Into<Label>, B: Into<Label>> From<(A, B)> for Label {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Label>, B: Into<Label>, C: Into<Label>> From<(A, B, C)> for Label {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Converts the cell into a label, e.g. to use a column's values as group keys.
    pub fn to_label(&self) -> Label {
        match self {
            Self::Null => Label::Null,
            Self::Bool(v) => Label::Bool(*v),
            Self::Int64(v) => Label::Int(*v),
            Self::Float64(v) => Label::Float(*v),
            Self::Utf8(s) => Label::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{Label, Value};

    #[test]
    fn labels_of_different_kinds_never_compare_equal() {
        assert_ne!(Label::from(1), Label::from(1.0));
        assert_ne!(Label::from("1"), Label::from(1));
        assert!(Label::Null < Label::from(false));
        assert!(Label::from(100) < Label::from(0.5));
        assert!(Label::from(0.5) < Label::from("a"));
        assert!(Label::from("z") < Label::from(("a", 1)));
    }

    #[test]
    fn float_labels_hash_consistently() {
        let mut set = HashSet::new();
        set.insert(Label::from(1.5));
        set.insert(Label::from(1.5));
        set.insert(Label::from(f64::NAN));
        set.insert(Label::from(f64::NAN));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn tuple_display_and_accessors() {
        let t = Label::from(("a", 1, true));
        assert_eq!(t.to_string(), "(a, 1, true)");
        assert_eq!(t.as_tuple().map(|s| s.len()), Some(3));
        assert_eq!(Label::from(7).as_int(), Some(7));
        assert_eq!(Label::from("x").as_str(), Some("x"));
        assert_eq!(Label::from("x").as_int(), None);
    }

    #[test]
    fn value_to_label() {
        assert_eq!(Value::Null.to_label(), Label::Null);
        assert_eq!(Value::from(3).to_label(), Label::Int(3));
        assert_eq!(Value::from("a").to_label(), Label::from("a"));
        assert_eq!(Value::from(2.5).to_label(), Label::Float(2.5));
    }

    #[test]
    fn labels_round_trip_through_json() {
        let labels = vec![Label::Null, Label::from(1), Label::from("a"), Label::from(("x", 2))];
        let text = serde_json::to_string(&labels).unwrap();
        assert_eq!(text, r#"[null,1,"a",["x",2]]"#);
        let back: Vec<Label> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, labels);
    }
}
