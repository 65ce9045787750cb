//! Dynamically typed element values
use crate::escape::Escaped;
use num::rational::BigRational;
use num::BigInt;
use std::fmt::{self, Display, Formatter};

/// A dynamically typed value, as a scripting host would hand one to the multiset
///
/// Numbers are exact rationals, so `1`, `1.0` and `2/2` are the same value. Values of the same
/// kind order the way a host's rich comparison would: numbers numerically, strings
/// lexicographically and tuples element by element with a shorter prefix first. A host has no
/// ordering between different kinds. This type still needs a total [Ord], so it falls back to
/// `Number < Str < Tuple`. Use [Value::is_comparable] to reject such mixtures up front.
/// [parse_sequence](crate::parse_sequence) rejects any literal holding such a pair.
///
/// The [Display] form is the literal syntax accepted by [parse_sequence](crate::parse_sequence).
///
/// ```
/// # use ordered_multiset::Value;
/// let pair = Value::from((100, "abc"));
/// assert_eq!(pair.to_string(), r#"(100, "abc")"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// An exact number
    Number(BigRational),
    /// A string
    Str(String),
    /// A fixed sequence of values
    Tuple(Box<[Value]>),
}

impl Value {
    /// Whether a host would be able to order these two values
    ///
    /// Numbers compare with numbers and strings with strings. Tuples are comparable when every
    /// aligned pair of their elements is. Trailing elements of the longer tuple are never compared
    /// element-wise, they only make it sort after an equal prefix.
    pub fn is_comparable(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_), Value::Number(_)) | (Value::Str(_), Value::Str(_)) => true,
            (Value::Tuple(left), Value::Tuple(right)) => left
                .iter()
                .zip(right.iter())
                .all(|(lhs, rhs)| lhs.is_comparable(rhs)),
            _ => false,
        }
    }

    /// The number, if this is one
    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Value::Number(num) => Some(num),
            _ => None,
        }
    }

    /// The string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(string) => Some(string),
            _ => None,
        }
    }

    /// The tuple elements, if this is a tuple
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// The kinds seen at each position of a group of values
///
/// Refining one shape with every value of a group checks that all pairs in the group are
/// comparable, which checking each value against a single other value can't do for tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape {
    Number,
    Str,
    Tuple(Vec<Shape>),
}

impl Shape {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => Shape::Number,
            Value::Str(_) => Shape::Str,
            Value::Tuple(items) => Shape::Tuple(items.iter().map(Shape::of).collect()),
        }
    }

    /// Merge `value` into this shape, or return false if it conflicts with a value seen before
    pub(crate) fn refine(&mut self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Number, Value::Number(_)) | (Shape::Str, Value::Str(_)) => true,
            (Shape::Tuple(shapes), Value::Tuple(items)) => {
                for (i, item) in items.iter().enumerate() {
                    match shapes.get_mut(i) {
                        Some(shape) => {
                            if !shape.refine(item) {
                                return false;
                            }
                        }
                        None => shapes.push(Shape::of(item)),
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, out: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Value::Number(num) => write!(out, "{}", num),
            Value::Str(string) => write!(out, "\"{}\"", Escaped(string)),
            Value::Tuple(items) => {
                write!(out, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    write!(out, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(out, ",")?;
                }
                write!(out, ")")
            }
        }
    }
}

macro_rules! value_from_integer {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Value {
                fn from(num: $int) -> Self {
                    Value::Number(BigRational::from_integer(BigInt::from(num)))
                }
            }
        )*
    };
}

value_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Value {
    fn from(num: BigInt) -> Self {
        Value::Number(BigRational::from_integer(num))
    }
}

impl From<BigRational> for Value {
    fn from(num: BigRational) -> Self {
        Value::Number(num)
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Value::Str(string.to_owned())
    }
}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Value::Str(string)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(Box::new([a.into(), b.into()]))
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(Box::new([a.into(), b.into(), c.into()]))
    }
}
