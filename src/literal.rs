//! Parsing sequence literals into [Value]s
//!
//! A sequence literal is a bracketed list or parenthesized tuple of values, for example
//! `[5, 3, 5, 1]`, `((100, 100), (0, 100))` or `["b", "a"]`. Numbers may be integers, decimals
//! with optional exponents, or ratios such as `2/3`, and are all read as exact rationals.
//!
//! Exponents are limited to [MAX_EXPONENT] in magnitude and tuples may nest at most
//! [MAX_NESTING] deep, so hostile input is rejected instead of exhausting memory or stack.
use crate::escape::unescape;
use crate::value::{Shape, Value};
use crate::{Error, OrderedMultiset};
use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{escaped, tag},
    character::complete::{char, digit0, digit1, multispace0, none_of, one_of},
    combinator::{all_consuming, map, opt},
    error::ErrorKind,
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use num::rational::BigRational;
use num::{BigInt, Zero};
use std::str::FromStr;

/// Largest decimal exponent magnitude accepted in a number
pub const MAX_EXPONENT: i32 = 4096;

/// Deepest tuple nesting accepted inside a sequence
pub const MAX_NESTING: usize = 64;

/// Parse a sequence literal into its values, in order
///
/// # Errors
///
/// Returns [Error::InvalidArgument] when the input isn't a single list or tuple literal, when a
/// ratio has a zero denominator, when an exponent or the tuple nesting exceeds its limit, or when
/// the elements aren't all mutually comparable.
///
/// ```
/// # use ordered_multiset::{parse_sequence, Value};
/// let values = parse_sequence("[3, 1/2, -4.5e1]").unwrap();
/// assert_eq!(values[0], Value::from(3));
/// assert!(parse_sequence(r#"[1, "one"]"#).is_err());
/// ```
pub fn parse_sequence(input: &str) -> Result<Vec<Value>, Error> {
    let (_, values) = all_consuming(delimited(multispace0, sequence, multispace0))(input)
        .map_err(|err| {
            let err = Error::from(err);
            debug!("rejected sequence literal: {}", err);
            err
        })?;
    if let Some((first, rest)) = values.split_first() {
        let mut shape = Shape::of(first);
        if let Some(bad) = rest.iter().find(|value| !shape.refine(value)) {
            return Err(Error::InvalidArgument {
                message: format!("{} is not comparable with the elements before it", bad),
            });
        }
    }
    Ok(values)
}

impl OrderedMultiset<Value> {
    /// Build a multiset from a sequence literal
    ///
    /// This is identical to `literal.parse()`. See [parse_sequence] for the accepted syntax.
    pub fn from_literal(literal: &str) -> Result<Self, Error> {
        Ok(Self::from_sequence(parse_sequence(literal)?))
    }
}

impl FromStr for OrderedMultiset<Value> {
    type Err = Error;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        Self::from_literal(literal)
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        let message = match err {
            nom::Err::Incomplete(_) => "incomplete sequence literal".to_owned(),
            nom::Err::Error(err) | nom::Err::Failure(err) if err.input.is_empty() => {
                "unexpected end of sequence literal".to_owned()
            }
            nom::Err::Error(err) | nom::Err::Failure(err) => {
                format!("unexpected input at `{}`", err.input)
            }
        };
        Error::InvalidArgument { message }
    }
}

fn failure(input: &str, kind: ErrorKind) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, kind))
}

fn negate(input: &str) -> IResult<&str, bool> {
    let (input, res) = opt(one_of("+-"))(input)?;
    Ok((input, res == Some('-')))
}

fn decimal(input: &str) -> IResult<&str, BigRational> {
    let (res_input, (main_neg, (int, dec), exp)) = tuple((
        negate,
        alt((
            pair(
                digit1,
                map(opt(preceded(char('.'), digit0)), Option::unwrap_or_default),
            ),
            separated_pair(digit0, char('.'), digit1),
        )),
        opt(preceded(one_of("eE"), pair(negate, digit1))),
    ))(input)?;
    let digits = |text: &str| {
        text.parse::<BigInt>()
            .map_err(|_| failure(input, ErrorKind::Digit))
    };
    let mut res = if int.is_empty() {
        BigRational::zero()
    } else {
        BigRational::from_integer(digits(int)?)
    };
    if !dec.is_empty() {
        let pow: u32 = dec
            .len()
            .try_into()
            .map_err(|_| failure(input, ErrorKind::TooLarge))?;
        res += BigRational::new(digits(dec)?, BigInt::from(10).pow(pow));
    }
    if let Some((neg, exp)) = exp {
        let exp: i32 = exp
            .parse()
            .map_err(|_| failure(input, ErrorKind::TooLarge))?;
        if exp > MAX_EXPONENT {
            return Err(failure(input, ErrorKind::TooLarge));
        }
        res *= BigRational::from_integer(10.into()).pow(if neg { -exp } else { exp });
    }
    if main_neg {
        res = -res;
    }
    Ok((res_input, res))
}

fn number(input: &str) -> IResult<&str, BigRational> {
    let (res_input, (num, denom)) = pair(
        decimal,
        opt(preceded(delimited(multispace0, char('/'), multispace0), decimal)),
    )(input)?;
    match denom {
        Some(denom) if denom.is_zero() => Err(failure(input, ErrorKind::Verify)),
        Some(denom) => Ok((res_input, num / denom)),
        None => Ok((res_input, num)),
    }
}

fn string(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('"'),
            alt((escaped(none_of("\\\""), '\\', one_of("\\\"")), tag(""))),
            char('"'),
        ),
        |raw| unescape(raw).collect(),
    )(input)
}

/// Comma separated values, allowing a trailing comma after the last one
///
/// `depth` counts the tuples enclosing these values.
fn items(input: &str, depth: usize) -> IResult<&str, Vec<Value>> {
    alt((
        terminated(
            separated_list1(
                char(','),
                delimited(multispace0, |input| value(input, depth), multispace0),
            ),
            opt(pair(char(','), multispace0)),
        ),
        map(multispace0, |_| Vec::new()),
    ))(input)
}

fn nested_items(input: &str, depth: usize) -> IResult<&str, Vec<Value>> {
    if depth > MAX_NESTING {
        return Err(failure(input, ErrorKind::TooLarge));
    }
    items(input, depth)
}

fn value(input: &str, depth: usize) -> IResult<&str, Value> {
    alt((
        map(
            delimited(char('('), |input| nested_items(input, depth + 1), char(')')),
            Value::from,
        ),
        map(string, Value::Str),
        map(number, Value::Number),
    ))(input)
}

fn sequence(input: &str) -> IResult<&str, Vec<Value>> {
    alt((
        delimited(char('['), |input| items(input, 0), char(']')),
        delimited(char('('), |input| items(input, 0), char(')')),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::{parse_sequence, MAX_EXPONENT, MAX_NESTING};
    use crate::{Error, OrderedMultiset, Value};
    use num::rational::BigRational;
    use num::One;

    fn values<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Vec<Value> {
        items.into_iter().map(Into::into).collect()
    }

    #[test]
    fn test_decimal() {
        let (input, num) = super::decimal("3 ").unwrap();
        assert_eq!(input, " ");
        assert_eq!(num, BigRational::from_integer(3.into()));

        let (input, num) = super::decimal("-2.,").unwrap();
        assert_eq!(input, ",");
        assert_eq!(num, BigRational::from_integer((-2).into()));

        let (input, num) = super::decimal("+.56]").unwrap();
        assert_eq!(input, "]");
        assert_eq!(num, BigRational::new(56.into(), 100.into()));

        let (input, num) = super::decimal("3.14e-1 ").unwrap();
        assert_eq!(input, " ");
        assert_eq!(num, BigRational::new(314.into(), 1000.into()));
    }

    #[test]
    fn test_number() {
        let (input, num) = super::number("99/100,").unwrap();
        assert_eq!(input, ",");
        assert_eq!(num, BigRational::new(99.into(), 100.into()));

        let (input, num) = super::number(".1e3 / +1.e2)").unwrap();
        assert_eq!(input, ")");
        assert_eq!(num, BigRational::one());

        assert!(super::number("1/0").is_err());
    }

    #[test]
    fn test_string() {
        let (input, string) = super::string(r#""" "#).unwrap();
        assert_eq!(input, " ");
        assert_eq!(string, "");

        let (input, string) = super::string(r#""esca\"ped","#).unwrap();
        assert_eq!(input, ",");
        assert_eq!(string, "esca\"ped");
    }

    #[test]
    fn test_sequences() {
        assert_eq!(parse_sequence("[]").unwrap(), Vec::<Value>::new());
        assert_eq!(parse_sequence(" ( ) ").unwrap(), Vec::<Value>::new());
        assert_eq!(
            parse_sequence("[5, 3,5 ,1,]").unwrap(),
            values([5, 3, 5, 1])
        );
        assert_eq!(
            parse_sequence("((100, 100), (0, 100))").unwrap(),
            values([(100, 100), (0, 100)])
        );
        assert_eq!(
            parse_sequence(r#"[("a", 1), ("b",)]"#).unwrap(),
            [
                Value::from(("a", 1)),
                Value::from(vec![Value::from("b")]),
            ]
        );
    }

    #[test]
    fn test_invalid_sequences() {
        for literal in [
            "",
            "5",
            "[1, 2",
            "[1 2]",
            "{1}",
            "[1/0]",
            r#"["a", 1]"#,
            "[(1, 2), 3]",
            r#"[(1,), (1, "a"), (1, 2)]"#,
            "[,]",
            "(,)",
            "[1,,]",
        ] {
            match parse_sequence(literal) {
                Err(Error::InvalidArgument { .. }) => (),
                res => panic!("{:?} parsed as {:?}", literal, res),
            }
        }
    }

    #[test]
    fn test_mutually_comparable_tuples() {
        let values = parse_sequence(r#"[(1,), (1, "a"), (2, "b", (3,))]"#).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_exponent_limit() {
        let limit = format!("[1e{}, 1e-{}]", MAX_EXPONENT, MAX_EXPONENT);
        assert_eq!(parse_sequence(&limit).unwrap().len(), 2);

        for literal in ["[1e999999999]", "[1e-999999999]", "[1e4097]", "[1e99999999999]"] {
            match parse_sequence(literal) {
                Err(Error::InvalidArgument { .. }) => (),
                res => panic!("{:?} parsed as {:?}", literal, res),
            }
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("[{}1{}]", "(".repeat(depth), ")".repeat(depth));
        let values = parse_sequence(&nested(MAX_NESTING)).unwrap();
        assert_eq!(values.len(), 1);

        for depth in [MAX_NESTING + 1, 200_000] {
            match parse_sequence(&nested(depth)) {
                Err(Error::InvalidArgument { .. }) => (),
                res => panic!("nesting {} parsed as {:?}", depth, res.map(|v| v.len())),
            }
        }
    }

    #[test]
    fn test_display_reparses() {
        let cases = [
            Value::from(BigRational::new((-7).into(), 3.into())),
            Value::from("quote \" and \\ slash"),
            Value::from((1, ("x", 2), vec![Value::from(0)])),
        ];
        for value in cases {
            let literal = format!("[{}]", value);
            assert_eq!(parse_sequence(&literal).unwrap(), [value]);
        }
    }

    #[test]
    fn test_from_literal() {
        let set: OrderedMultiset<Value> = "[5, 3, 5, 1, 3, 3]".parse().unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.count(&Value::from(3)), 3);
        assert_eq!(
            OrderedMultiset::from_literal("[1.5, 3/2]").unwrap().count(&Value::from(
                BigRational::new(3.into(), 2.into())
            )),
            2
        );
    }
}
