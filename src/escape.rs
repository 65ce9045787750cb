//! Backslash escapes for quoted string values
use std::fmt::{self, Display, Formatter};
use std::iter::FusedIterator;
use std::str::Chars;

/// An iterator over the true characters of a raw, still escaped, string body
///
/// Only `\\` and `\"` are produced by the literal parser, but any escaped character simply stands
/// for itself.
#[derive(Debug, Clone)]
pub(crate) struct Unescaped<'a> {
    chars: Chars<'a>,
}

pub(crate) fn unescape(raw: &str) -> Unescaped<'_> {
    Unescaped { chars: raw.chars() }
}

impl<'a> Iterator for Unescaped<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self.chars.next() {
            Some('\\') => self.chars.next(),
            chr => chr,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (min, max) = self.chars.size_hint();
        ((min + 1) / 2, max)
    }
}

impl<'a> FusedIterator for Unescaped<'a> {}

/// Formats a string body with quotes and backslashes escaped
#[derive(Debug, Clone, Copy)]
pub(crate) struct Escaped<'a>(pub(crate) &'a str);

impl<'a> Display for Escaped<'a> {
    fn fmt(&self, out: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for chr in self.0.chars() {
            if matches!(chr, '\\' | '"') {
                write!(out, "\\")?;
            }
            write!(out, "{}", chr)?;
        }
        Ok(())
    }
}
