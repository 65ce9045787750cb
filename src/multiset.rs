//! A balanced ordered multiset
//!
//! Elements live in an index arena of slots. Every occurrence gets its own node, even when equal
//! to another, so each stored value is owned exactly once and dropped exactly once. The nodes
//! form an AVL tree, and each node also records the size of its subtree, which makes rank,
//! select and count logarithmic.
use crate::compare::{Compare, Natural};
use crate::Error;
use log::{trace, warn};
use std::cmp::{self, Ordering};
use std::fmt::{self, Debug, Formatter};
use std::iter::{self, FusedIterator};
use std::mem;

type Link = Option<usize>;

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    left: Link,
    right: Link,
    height: u32,
    size: usize,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Self {
        Node {
            value,
            left: None,
            right: None,
            height: 1,
            size: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(Node<T>),
    /// Links to the next vacant slot
    Vacant(Link),
}

fn node<T>(slots: &[Slot<T>], id: usize) -> &Node<T> {
    match &slots[id] {
        Slot::Occupied(node) => node,
        Slot::Vacant(_) => unreachable!("tree links to vacant slot {}", id),
    }
}

/// An ordered collection that permits duplicates
///
/// Elements are kept sorted by the comparator `C`, which defaults to the natural [Ord] ordering.
/// Two elements are equal when neither is less than the other. Equal elements keep the order in
/// which they were added, so removal and [OrderedMultiset::search_higher_equal] always act on
/// the earliest one.
///
/// Insertion, removal, counting, rank and lower bound queries are all `O(log n)`, and
/// [OrderedMultiset::len] is `O(1)`.
///
/// # Example
///
/// ```
/// # use ordered_multiset::{Error, OrderedMultiset};
/// let mut set: OrderedMultiset<_> = [5, 3, 5, 1, 3, 3].into_iter().collect();
/// assert_eq!(set.count(&3), 3);
/// assert_eq!(set.search_higher_equal(&4), Ok(&5));
/// assert_eq!(set.search_higher_equal(&6), Err(Error::NotFound));
///
/// set.remove(&3);
/// assert_eq!(set.count(&3), 2);
/// assert_eq!(set.len(), 5);
/// ```
#[derive(Clone)]
pub struct OrderedMultiset<T, C = Natural> {
    slots: Vec<Slot<T>>,
    free: Link,
    root: Link,
    compare: C,
}

impl<T: Ord> OrderedMultiset<T> {
    /// Create an empty multiset using the natural ordering
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    /// Create a multiset holding every element of a sequence using the natural ordering
    ///
    /// This is identical to collecting with [FromIterator].
    pub fn from_sequence<I: IntoIterator<Item = T>>(seq: I) -> Self {
        Self::from_sequence_with(seq, Natural)
    }
}

impl<T, C> OrderedMultiset<T, C> {
    /// Create an empty multiset ordered by `compare`
    pub fn with_comparator(compare: C) -> Self {
        OrderedMultiset {
            slots: Vec::new(),
            free: None,
            root: None,
            compare,
        }
    }

    /// The comparator ordering this multiset
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// The total number of stored elements, counting every duplicate
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop every stored element
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.root = None;
    }

    /// The smallest element
    pub fn first(&self) -> Option<&T> {
        let mut link = self.root?;
        while let Some(left) = self.node(link).left {
            link = left;
        }
        Some(&self.node(link).value)
    }

    /// The largest element
    pub fn last(&self) -> Option<&T> {
        let mut link = self.root?;
        while let Some(right) = self.node(link).right {
            link = right;
        }
        Some(&self.node(link).value)
    }

    /// The element at position `index` in sorted order
    pub fn nth(&self, index: usize) -> Option<&T> {
        let mut index = index;
        let mut link = self.root;
        while let Some(at) = link {
            let node = self.node(at);
            let left_size = self.size(node.left);
            match index.cmp(&left_size) {
                Ordering::Less => link = node.left,
                Ordering::Equal => return Some(&node.value),
                Ordering::Greater => {
                    index -= left_size + 1;
                    link = node.right;
                }
            }
        }
        None
    }

    /// Remove and return the element at position `index` in sorted order
    pub fn remove_nth(&mut self, index: usize) -> Option<T> {
        let root = self.root?;
        if index >= self.len() {
            return None;
        }
        let (root, found) = self.unlink_nth(root, index);
        self.root = root;
        Some(self.release(found))
    }

    /// Remove and return the smallest element
    pub fn pop_first(&mut self) -> Option<T> {
        self.remove_nth(0)
    }

    /// Remove and return the largest element
    pub fn pop_last(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.remove_nth(last)
    }

    /// Iterate over every element in sorted order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.slots, self.root)
    }

    fn node(&self, id: usize) -> &Node<T> {
        node(&self.slots, id)
    }

    fn node_mut(&mut self, id: usize) -> &mut Node<T> {
        match &mut self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("tree links to vacant slot {}", id),
        }
    }

    fn size(&self, link: Link) -> usize {
        link.map_or(0, |id| self.node(id).size)
    }

    fn height(&self, link: Link) -> u32 {
        link.map_or(0, |id| self.node(id).height)
    }

    fn children(&self, id: usize) -> (Link, Link) {
        let node = self.node(id);
        (node.left, node.right)
    }

    fn alloc(&mut self, value: T) -> usize {
        let leaf = Slot::Occupied(Node::leaf(value));
        match self.free {
            Some(id) => {
                match mem::replace(&mut self.slots[id], leaf) {
                    Slot::Vacant(next) => self.free = next,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {}", id),
                }
                id
            }
            None => {
                self.slots.push(leaf);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) -> T {
        match mem::replace(&mut self.slots[id], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                node.value
            }
            Slot::Vacant(_) => unreachable!("released vacant slot {}", id),
        }
    }

    fn update(&mut self, id: usize) {
        let (left, right) = self.children(id);
        let height = 1 + cmp::max(self.height(left), self.height(right));
        let size = 1 + self.size(left) + self.size(right);
        let node = self.node_mut(id);
        node.height = height;
        node.size = size;
    }

    fn balance(&self, id: usize) -> i64 {
        let (left, right) = self.children(id);
        i64::from(self.height(left)) - i64::from(self.height(right))
    }

    fn rotate_right(&mut self, id: usize) -> usize {
        match self.node(id).left {
            Some(pivot) => {
                let inner = self.node(pivot).right;
                self.node_mut(id).left = inner;
                self.update(id);
                self.node_mut(pivot).right = Some(id);
                self.update(pivot);
                pivot
            }
            None => id,
        }
    }

    fn rotate_left(&mut self, id: usize) -> usize {
        match self.node(id).right {
            Some(pivot) => {
                let inner = self.node(pivot).left;
                self.node_mut(id).right = inner;
                self.update(id);
                self.node_mut(pivot).left = Some(id);
                self.update(pivot);
                pivot
            }
            None => id,
        }
    }

    /// Restore the AVL condition at `id` after one of its subtrees changed height by at most one,
    /// returning the new subtree root
    fn rebalance(&mut self, id: usize) -> usize {
        self.update(id);
        let balance = self.balance(id);
        if balance > 1 {
            if let Some(left) = self.node(id).left {
                if self.balance(left) < 0 {
                    let left = self.rotate_left(left);
                    self.node_mut(id).left = Some(left);
                }
            }
            self.rotate_right(id)
        } else if balance < -1 {
            if let Some(right) = self.node(id).right {
                if self.balance(right) > 0 {
                    let right = self.rotate_right(right);
                    self.node_mut(id).right = Some(right);
                }
            }
            self.rotate_left(id)
        } else {
            id
        }
    }

    /// Detach `id` from its subtree, returning the subtree's new root
    fn unlink(&mut self, id: usize) -> Link {
        match self.children(id) {
            (None, child) | (child, None) => child,
            (left @ Some(_), Some(right)) => {
                let (rest, successor) = self.unlink_min(right);
                let node = self.node_mut(successor);
                node.left = left;
                node.right = rest;
                Some(self.rebalance(successor))
            }
        }
    }

    fn unlink_min(&mut self, id: usize) -> (Link, usize) {
        match self.node(id).left {
            None => (self.node(id).right, id),
            Some(left) => {
                let (rest, min) = self.unlink_min(left);
                self.node_mut(id).left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    /// Detach the node at position `index` of the subtree rooted at `id`
    ///
    /// `index` must be less than the subtree size.
    fn unlink_nth(&mut self, id: usize, index: usize) -> (Link, usize) {
        let (left, right) = self.children(id);
        let left_size = self.size(left);
        match (index.cmp(&left_size), left, right) {
            (Ordering::Less, Some(left), _) => {
                let (rest, found) = self.unlink_nth(left, index);
                self.node_mut(id).left = rest;
                (Some(self.rebalance(id)), found)
            }
            (Ordering::Greater, _, Some(right)) => {
                let (rest, found) = self.unlink_nth(right, index - left_size - 1);
                self.node_mut(id).right = rest;
                (Some(self.rebalance(id)), found)
            }
            _ => (self.unlink(id), id),
        }
    }

    /// Link the sorted slots `lo..hi` into a perfectly balanced subtree
    fn build_balanced(&mut self, lo: usize, hi: usize) -> Link {
        if lo >= hi {
            return None;
        }
        let mid = lo + (hi - lo) / 2;
        let left = self.build_balanced(lo, mid);
        let right = self.build_balanced(mid + 1, hi);
        let node = self.node_mut(mid);
        node.left = left;
        node.right = right;
        self.update(mid);
        Some(mid)
    }
}

impl<T, C: Compare<T>> OrderedMultiset<T, C> {
    /// Create a multiset holding every element of a sequence, ordered by `compare`
    ///
    /// The result is the same as adding each element in sequence order. Rather than inserting
    /// one at a time, the elements are stably sorted and linked into a balanced tree directly.
    pub fn from_sequence_with<I: IntoIterator<Item = T>>(seq: I, compare: C) -> Self {
        let mut values: Vec<T> = seq.into_iter().collect();
        values.sort_by(|a, b| compare.ordering(a, b));
        trace!("building multiset from {} elements", values.len());
        let len = values.len();
        let mut set = Self::with_comparator(compare);
        set.slots = values
            .into_iter()
            .map(|value| Slot::Occupied(Node::leaf(value)))
            .collect();
        set.root = set.build_balanced(0, len);
        set
    }

    /// Add one occurrence of `value`
    ///
    /// It is placed after every element equal to it.
    pub fn add(&mut self, value: T) {
        let id = self.alloc(value);
        let root = self.root;
        self.root = Some(self.insert_at(root, id));
    }

    /// Add one occurrence of `value`, reporting allocation failure instead of aborting
    ///
    /// On error the multiset is left unchanged.
    pub fn try_add(&mut self, value: T) -> Result<(), Error> {
        if self.free.is_none() {
            self.slots.try_reserve(1).map_err(|err| {
                warn!("failed to grow multiset of {} elements: {}", self.len(), err);
                Error::ResourceExhausted { requested: 1 }
            })?;
        }
        self.add(value);
        Ok(())
    }

    /// Remove one element equal to `value`, if there is one
    ///
    /// The earliest added of the equal elements is removed and returned. Removing a value that
    /// isn't present does nothing.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let index = self.rank(value);
        let present = self
            .nth(index)
            .map_or(false, |found| !self.compare.less(value, found));
        if present {
            self.remove_nth(index)
        } else {
            None
        }
    }

    /// Remove every element equal to `value`, returning how many there were
    pub fn remove_all(&mut self, value: &T) -> usize {
        let count = self.count(value);
        if count > 0 {
            let index = self.rank(value);
            for _ in 0..count {
                self.remove_nth(index);
            }
        }
        count
    }

    /// The number of stored elements equal to `value`
    pub fn count(&self, value: &T) -> usize {
        self.rank_upper(value) - self.rank(value)
    }

    /// Whether at least one element equal to `value` is stored
    pub fn contains(&self, value: &T) -> bool {
        self.lower_bound(value)
            .map_or(false, |found| !self.compare.less(value, found))
    }

    /// The number of stored elements strictly less than `value`
    ///
    /// This is also the position of the first element not less than `value`, so
    /// `set.nth(set.rank(v))` is the same as `set.lower_bound(v)`.
    pub fn rank(&self, value: &T) -> usize {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(at) = link {
            let node = self.node(at);
            if self.compare.less(&node.value, value) {
                rank += self.size(node.left) + 1;
                link = node.right;
            } else {
                link = node.left;
            }
        }
        rank
    }

    fn rank_upper(&self, value: &T) -> usize {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(at) = link {
            let node = self.node(at);
            if self.compare.less(value, &node.value) {
                link = node.left;
            } else {
                rank += self.size(node.left) + 1;
                link = node.right;
            }
        }
        rank
    }

    /// The smallest stored element not less than `value`, if any
    pub fn lower_bound(&self, value: &T) -> Option<&T> {
        let mut best = None;
        let mut link = self.root;
        while let Some(at) = link {
            let node = self.node(at);
            if self.compare.less(&node.value, value) {
                link = node.right;
            } else {
                best = Some(&node.value);
                link = node.left;
            }
        }
        best
    }

    /// The smallest stored element not less than `value`
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] when every stored element is less than `value`, which includes
    /// an empty multiset.
    pub fn search_higher_equal(&self, value: &T) -> Result<&T, Error> {
        self.lower_bound(value).ok_or(Error::NotFound)
    }

    fn insert_at(&mut self, link: Link, id: usize) -> usize {
        match link {
            None => id,
            Some(at) => {
                let (left, right) = self.children(at);
                if self.compare.less(&self.node(id).value, &self.node(at).value) {
                    let left = self.insert_at(left, id);
                    self.node_mut(at).left = Some(left);
                } else {
                    let right = self.insert_at(right, id);
                    self.node_mut(at).right = Some(right);
                }
                self.rebalance(at)
            }
        }
    }
}

impl<T, C: Default> Default for OrderedMultiset<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for OrderedMultiset<T, C> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_sequence_with(iter, C::default())
    }
}

impl<T, C: Compare<T>> Extend<T> for OrderedMultiset<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Debug, C> Debug for OrderedMultiset<T, C> {
    fn fmt(&self, out: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        out.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for OrderedMultiset<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for OrderedMultiset<T, C> {}

impl<'a, T, C> IntoIterator for &'a OrderedMultiset<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C> IntoIterator for OrderedMultiset<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut ids = Iter::new(&self.slots, self.root);
        let order: Vec<usize> = iter::from_fn(|| ids.next_id()).collect();
        let mut values: Vec<Option<T>> = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Occupied(node) => Some(node.value),
                Slot::Vacant(_) => None,
            })
            .collect();
        let sorted: Vec<T> = order
            .into_iter()
            .filter_map(|id| values[id].take())
            .collect();
        IntoIter(sorted.into_iter())
    }
}

/// A sorted iterator over the elements of an [OrderedMultiset]
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    slots: &'a [Slot<T>],
    front: Vec<usize>,
    back: Vec<usize>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(slots: &'a [Slot<T>], root: Link) -> Self {
        let mut iter = Iter {
            slots,
            front: Vec::new(),
            back: Vec::new(),
            remaining: root.map_or(0, |id| node(slots, id).size),
        };
        iter.descend_left(root);
        iter.descend_right(root);
        iter
    }

    fn descend_left(&mut self, mut link: Link) {
        while let Some(id) = link {
            self.front.push(id);
            link = node(self.slots, id).left;
        }
    }

    fn descend_right(&mut self, mut link: Link) {
        while let Some(id) = link {
            self.back.push(id);
            link = node(self.slots, id).right;
        }
    }

    fn next_id(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front.pop()?;
        self.descend_left(node(self.slots, id).right);
        self.remaining -= 1;
        Some(id)
    }

    fn next_back_id(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back.pop()?;
        self.descend_right(node(self.slots, id).left);
        self.remaining -= 1;
        Some(id)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.next_id().map(|id| &node(slots, id).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.next_back_id().map(|id| &node(slots, id).value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

/// An owning iterator over the elements of an [OrderedMultiset] in sorted order
#[derive(Debug, Clone)]
pub struct IntoIter<T>(std::vec::IntoIter<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
