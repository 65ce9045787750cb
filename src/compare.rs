//! Comparator policies for [OrderedMultiset](crate::OrderedMultiset)
//!
//! All ordering and equality decisions in a multiset go through a single [Compare]
//! implementation. Two elements are considered equal when neither is less than the other, so a
//! type only has to support a strict weak "less than", never hashing or identity.
use std::cmp::Ordering;

/// A strict weak ordering over `T`
///
/// Implementations must be irreflexive and transitive, and incomparability must be transitive
/// too. Violating this won't cause memory unsafety, but the multiset's ordering, counts and
/// removals become unspecified.
///
/// Any closure `Fn(&T, &T) -> bool` is a comparator:
///
/// ```
/// # use ordered_multiset::OrderedMultiset;
/// let by_len = |a: &&str, b: &&str| a.len() < b.len();
/// let mut words = OrderedMultiset::with_comparator(by_len);
/// words.add("three");
/// words.add("one");
/// words.add("two");
/// assert_eq!(words.count(&"six"), 2);
/// ```
pub trait Compare<T: ?Sized> {
    /// Whether `a` sorts strictly before `b`
    fn less(&self, a: &T, b: &T) -> bool;

    /// The full [Ordering] implied by [Compare::less]
    fn ordering(&self, a: &T, b: &T) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// The natural ordering of an [Ord] type
///
/// This is the default comparator of [OrderedMultiset](crate::OrderedMultiset).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }

    fn ordering(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Reverses another comparator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reverse<C>(pub C);

impl<T: ?Sized, C: Compare<T>> Compare<T> for Reverse<C> {
    fn less(&self, a: &T, b: &T) -> bool {
        self.0.less(b, a)
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::{Compare, Natural, Reverse};
    use std::cmp::Ordering;

    #[test]
    fn test_natural() {
        assert!(Natural.less(&1, &2));
        assert!(!Natural.less(&2, &2));
        assert_eq!(Natural.ordering("b", "a"), Ordering::Greater);
    }

    #[test]
    fn test_reverse() {
        let rev = Reverse(Natural);
        assert!(rev.less(&2, &1));
        assert_eq!(rev.ordering(&1, &1), Ordering::Equal);
        assert_eq!(rev.ordering(&1, &2), Ordering::Greater);
    }

    #[test]
    fn test_closure() {
        let mod_ten = |a: &u32, b: &u32| a % 10 < b % 10;
        assert!(mod_ten.less(&21, &9));
        assert_eq!(mod_ten.ordering(&13, &3), Ordering::Equal);
    }
}
