//! A balanced ordered multiset with pluggable comparators
//!
//! [OrderedMultiset] keeps every element it is given, duplicates included, in sorted order. All
//! ordering and equality decisions go through a [Compare] policy, so elements only need a strict
//! weak "less than". They never need to be hashed or to have an identity. Insertion, removal,
//! counting and lower bound searches ([OrderedMultiset::search_higher_equal]) are all
//! logarithmic.
//!
//! For values that come from a dynamically typed source, [Value] models numbers, strings and
//! tuples with the usual rich-comparison ordering. [parse_sequence] turns a list or tuple literal
//! into such values, and is also available through `str::parse`.
//!
//! # Example
//!
//! ```
//! # use ordered_multiset::{OrderedMultiset, Value};
//! let mut set = OrderedMultiset::new();
//! set.add((100, 100));
//! set.add((100, 100));
//! assert_eq!(set.count(&(100, 100)), 2);
//! assert_eq!(set.count(&(0, 100)), 0);
//! assert_eq!(set.len(), 2);
//!
//! let parsed: OrderedMultiset<Value> = "[(100, 100), (100, 100)]".parse().unwrap();
//! assert_eq!(parsed.count(&Value::from((100, 100))), 2);
//! ```
#![warn(missing_docs)]

mod compare;
mod escape;
mod literal;
mod multiset;
mod value;

pub use compare::{Compare, Natural, Reverse};
pub use literal::{parse_sequence, MAX_EXPONENT, MAX_NESTING};
pub use multiset::{IntoIter, Iter, OrderedMultiset};
pub use value::Value;

/// An error from building or querying an [OrderedMultiset]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input to bulk construction was malformed
    ///
    /// This is produced when a sequence literal doesn't parse or holds values that can't be
    /// ordered against each other.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
    },
    /// No stored element is greater than or equal to the query
    #[error("no element is greater than or equal to the query")]
    NotFound,
    /// Storage for new elements couldn't be allocated
    #[error("failed to allocate room for {requested} more element(s)")]
    ResourceExhausted {
        /// How many elements were being added
        requested: usize,
    },
}
