//! `rust-data-index` is the label/position engine behind an in-memory Vector/DataFrame library.
//!
//! Every axis of a [`vector::Vector`] or [`frame::DataFrame`] carries an index that translates
//! user-facing labels into storage positions:
//!
//! - [`index::Index`]: flat, unique labels
//! - [`index::MultiIndex`]: hierarchical fixed-width tuples, queried by full tuple or prefix
//! - [`index::CategoricalIndex`]: repeating labels, each owning a list of positions
//!
//! All three share the [`index::Positional`] contract (positional `at`, set algebra, `reorder`).
//!
//! ## Labels or positions?
//!
//! Lookups take [`Key`]s, built most easily with the [`keys!`] macro. Integer keys are ambiguous:
//! they are labels when the index holds them and positions otherwise. [`index::Positional::at`]
//! is the strictly positional alternative.
//!
//! ```rust
//! use rust_data_index::index::{Index, Positional, Selection};
//! use rust_data_index::{keys, Label, Positions};
//!
//! let idx = Index::new([2, 1, 0]);
//! // 0 is a label here, stored at position 2
//! assert_eq!(idx.pos(&keys![0]).unwrap(), Positions::Single(2));
//! // `at` never looks at labels
//! assert_eq!(idx.at(0).unwrap(), Selection::Label(Label::from(2)));
//! ```
//!
//! ## Hierarchical lookups
//!
//! ```rust
//! use rust_data_index::index::{AnyIndex, Index, MultiIndex, Selected};
//! use rust_data_index::{keys, Positions};
//!
//! let mi = MultiIndex::from_tuples([["a", "one"], ["a", "two"], ["b", "one"]]).unwrap();
//! assert_eq!(mi.pos(&keys!["a"]).unwrap(), Positions::Multiple(vec![0, 1]));
//! assert_eq!(mi.pos(&keys!["a", "two"]).unwrap(), Positions::Single(1));
//! // a prefix drops the consumed level
//! assert_eq!(
//!     mi.get(&keys!["a"]).unwrap(),
//!     Selected::Index(AnyIndex::Flat(Index::new(["one", "two"])))
//! );
//! ```
//!
//! ## Modules
//!
//! - [`index`]: the three index variants, the positional contract and [`index::AnyIndex`]
//! - [`resolve`]: the observed lookup entrypoint and its [`resolve::LookupOptions`]
//! - [`observability`]: observer callbacks and severities
//! - [`vector`], [`frame`], [`grouping`]: consumers built on the index contract
//! - [`json`]: building indices from JSON
//! - [`error`]: error types shared by all of the above

pub mod error;
pub mod frame;
pub mod grouping;
pub mod index;
pub mod json;
pub mod key;
pub mod observability;
pub mod resolve;
pub mod types;
pub mod vector;

pub use error::{IndexError, IndexResult};
pub use key::{Key, PositionSpec, Positions};
pub use types::{Label, Value};
