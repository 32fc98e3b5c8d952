//! JSON interop for labels and indices.
//!
//! Supported inputs:
//! - Scalars map to the matching [`Label`] (`null`, booleans, integers, floats, strings)
//! - Arrays map to [`Label::Tuple`] inside an index, or to the whole label list at the top level
//!
//! Objects have no label form and are rejected.

use serde_json::Value as JsonValue;

use crate::error::{IndexError, IndexResult};
use crate::index::AnyIndex;
use crate::types::Label;

impl Label {
    /// Converts a JSON value into a label.
    pub fn from_json(value: &JsonValue) -> IndexResult<Self> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    IndexError::construction(format!("json number {n} does not fit a label"))
                }),
            },
            JsonValue::String(s) => Ok(Self::Str(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<IndexResult<Vec<_>>>()
                .map(Self::Tuple),
            JsonValue::Object(_) => Err(IndexError::construction(
                "json objects cannot be used as labels",
            )),
        }
    }

    /// Converts the label into a JSON value; tuples become arrays.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => JsonValue::from(*f),
            Self::Str(s) => JsonValue::String(s.clone()),
            Self::Tuple(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl AnyIndex {
    /// Builds an index from a JSON array of labels, inferring the variant like
    /// [`AnyIndex::infer`].
    ///
    /// Anything other than an array is a [`IndexError::ConstructionError`].
    pub fn from_json(value: &JsonValue) -> IndexResult<Self> {
        let JsonValue::Array(items) = value else {
            return Err(IndexError::construction(format!(
                "index input must be a json array, got {}",
                json_kind(value)
            )));
        };
        let labels = items
            .iter()
            .map(Label::from_json)
            .collect::<IndexResult<Vec<_>>>()?;
        Self::infer(labels)
    }

    /// Parses JSON text and builds an index from it.
    pub fn from_json_str(input: &str) -> IndexResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IndexError::construction("json input is empty"));
        }
        let value = serde_json::from_str::<JsonValue>(trimmed)
            .map_err(|e| IndexError::construction(format!("invalid json: {e}")))?;
        Self::from_json(&value)
    }

    /// Entries as a JSON array.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.to_vec().iter().map(Label::to_json).collect())
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::IndexError;
    use crate::index::{AnyIndex, IndexKind};
    use crate::key::Positions;
    use crate::keys;
    use crate::types::Label;

    #[test]
    fn scalars_and_arrays_become_labels() {
        assert_eq!(Label::from_json(&json!(3)).unwrap(), Label::Int(3));
        assert_eq!(Label::from_json(&json!(1.5)).unwrap(), Label::Float(1.5));
        assert_eq!(Label::from_json(&json!(null)).unwrap(), Label::Null);
        assert_eq!(Label::from_json(&json!(["a", 1])).unwrap(), Label::from(("a", 1)));
        assert!(matches!(
            Label::from_json(&json!({"a": 1})),
            Err(IndexError::ConstructionError { .. })
        ));
    }

    #[test]
    fn index_from_json_infers_variant() {
        let flat = AnyIndex::from_json_str(r#"["a", "b", "c"]"#).unwrap();
        assert_eq!(flat.kind(), IndexKind::Flat);
        assert_eq!(flat.pos(&keys!["c"]).unwrap(), Positions::Single(2));

        let multi = AnyIndex::from_json(&json!([["a", "one"], ["a", "two"], ["b", "one"]])).unwrap();
        assert_eq!(multi.kind(), IndexKind::Multi);
        assert_eq!(multi.pos(&keys!["a"]).unwrap(), Positions::Multiple(vec![0, 1]));
        assert_eq!(multi.to_json(), json!([["a", "one"], ["a", "two"], ["b", "one"]]));
    }

    #[test]
    fn non_array_input_is_a_construction_error() {
        let err = AnyIndex::from_json(&json!(42)).unwrap_err();
        assert_eq!(
            err,
            IndexError::ConstructionError {
                message: "index input must be a json array, got a number".to_string()
            }
        );
        assert!(matches!(
            AnyIndex::from_json_str("{\"a\": 1}"),
            Err(IndexError::ConstructionError { .. })
        ));
        assert!(matches!(
            AnyIndex::from_json_str("[1, "),
            Err(IndexError::ConstructionError { .. })
        ));
        assert!(matches!(
            AnyIndex::from_json_str("   "),
            Err(IndexError::ConstructionError { .. })
        ));
    }
}
