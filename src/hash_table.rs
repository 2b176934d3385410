//! The raw separately chained hash table.
//!
//! [`HashTable`] stores values in a flat entry array and threads collision
//! chains through it by index. A second flat array, the buckets, holds the
//! index of the first entry of each chain. Removed entries are pushed onto a
//! free list, also threaded through the entry array, and are reused before
//! any fresh slot is taken. When both the free list and the fresh slots are
//! exhausted the table doubles its capacity and rebuilds every chain.
//!
//! Unlike [`HashMap`](crate::HashMap), this table does not know how to hash
//! or compare keys: every operation takes a precomputed hash and an equality
//! predicate.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;
use core::num::NonZeroUsize;

use log::debug;
use log::trace;

use crate::error::Error;

/// Link value marking the end of a chain, an empty bucket, or an empty free
/// list.
const EMPTY: usize = usize::MAX;

#[inline(always)]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[derive(Clone, Debug)]
enum Slot<V> {
    Live { hash: u64, next: usize, value: V },
    Free { next: usize },
}

impl<V> Slot<V> {
    #[inline(always)]
    fn next(&self) -> usize {
        match self {
            Slot::Live { next, .. } | Slot::Free { next } => *next,
        }
    }

    #[inline(always)]
    fn set_next(&mut self, link: usize) {
        match self {
            Slot::Live { next, .. } | Slot::Free { next } => *next = link,
        }
    }

    #[inline(always)]
    fn value(&self) -> &V {
        match self {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => unreachable!("free slot reached through a live handle"),
        }
    }

    #[inline(always)]
    fn value_mut(&mut self) -> &mut V {
        match self {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => unreachable!("free slot reached through a live handle"),
        }
    }
}

/// Walks one bucket chain, yielding `(previous index, index, hash, value)`.
struct Chain<'a, V> {
    entries: &'a [Slot<V>],
    prev: usize,
    index: usize,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (usize, usize, u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index == EMPTY {
            return None;
        }

        match self.entries.get(self.index)? {
            Slot::Live { hash, next, value } => {
                let item = (self.prev, self.index, *hash, value);
                self.prev = self.index;
                self.index = *next;
                Some(item)
            }
            Slot::Free { .. } => {
                debug_assert!(false, "free slot {} linked into a bucket chain", self.index);
                None
            }
        }
    }
}

struct Link(usize);

impl Debug for Link {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 == EMPTY {
            f.write_str("-")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Summary statistics for inspecting a table's shape.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub populated: usize,
    /// Number of entry slots ever handed out (live plus free)
    pub allocated: usize,
    /// Number of slots waiting on the free list
    pub free: usize,
    /// Current bucket and entry array length
    pub capacity: usize,
    /// Number of buckets with a non-empty chain
    pub used_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Bytes reserved by the bucket and entry arrays
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} allocated, {} free",
            self.allocated, self.free
        );
        println!(
            "Buckets: {}/{} used, longest chain {}",
            self.used_buckets, self.capacity, self.longest_chain
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Histogram of chain lengths: `bins[n]` is the number of buckets whose
/// chain holds exactly `n` entries.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHistogram {
    /// Bucket counts indexed by chain length.
    pub bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ChainHistogram {
    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("chain histogram ({} buckets):", self.bins.iter().sum::<usize>());
        for (len, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }
}

/// A hash table resolving collisions by chaining through a flat entry array.
///
/// `HashTable<V>` stores values of type `V`. Callers provide the hash of
/// every value they insert and, for lookups, the hash together with an
/// equality predicate. Stored hashes are compared before the predicate is
/// called.
///
/// ## Layout
///
/// - `buckets`: one head link per bucket, `capacity` long.
/// - `entries`: the entry arena, reserved to `capacity`. Each live entry holds
///   its hash, its value, and the index of the next entry in its chain.
///   Indices are stable until the entry is removed, after which the slot is
///   recycled through the free list.
///
/// ## Example
///
/// ```rust
/// use chain_hash::hash_table::Entry;
/// use chain_hash::hash_table::HashTable;
///
/// let mut table = HashTable::try_with_capacity(4).unwrap();
/// let hash = 144;
///
/// match table.entry(hash, |v: &(&str, u32)| v.0 == "GI") {
///     Entry::Vacant(entry) => {
///         entry.insert(("GI", 1));
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// // Same hash, different value: both live in the same chain.
/// table.insert_unique(hash, ("FJ", 2));
///
/// assert_eq!(table.find(hash, |v| v.0 == "GI"), Some(&("GI", 1)));
/// assert_eq!(table.find(hash, |v| v.0 == "FJ"), Some(&("FJ", 2)));
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    buckets: Box<[usize]>,
    entries: Vec<Slot<V>>,
    capacity: usize,

    free_head: usize,
    free_count: usize,
}

impl<V: Debug> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("capacity", &self.capacity)
            .field("count", &self.entries.len())
            .field("free_count", &self.free_count)
            .field("free_head", &Link(self.free_head))
            .field(
                "buckets",
                &self.buckets.iter().map(|&b| Link(b)).collect::<Vec<_>>(),
            )
            .field("entries", &self.entries)
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a new table with room for exactly `capacity` entries before it
    /// has to grow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::num::NonZeroUsize;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(NonZeroUsize::new(16).unwrap());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            buckets: vec![EMPTY; capacity].into_boxed_slice(),
            entries: Vec::with_capacity(capacity),
            capacity,
            free_head: EMPTY,
            free_count: 0,
        }
    }

    /// Creates a new table with the given capacity, failing with
    /// [`Error::ZeroCapacity`] when `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::Error;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// assert!(HashTable::<u32>::try_with_capacity(8).is_ok());
    /// assert_eq!(HashTable::<u32>::try_with_capacity(0).unwrap_err(), Error::ZeroCapacity);
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(Error::ZeroCapacity)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_count
    }

    /// Returns `true` if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the length of the bucket and entry arrays.
    ///
    /// The table holds this many entries before it grows. Capacity never
    /// shrinks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn chain(&self, bucket: usize) -> Chain<'_, V> {
        Chain {
            entries: &self.entries,
            prev: EMPTY,
            index: self.buckets[bucket],
        }
    }

    /// Returns `(previous index, index)` of the entry matching `hash` and
    /// `eq`, where the previous index is `EMPTY` for a chain head.
    fn search(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<(usize, usize)> {
        self.chain(bucket_index(hash, self.capacity))
            .find(|&(_, _, stored, value)| stored == hash && eq(value))
            .map(|(prev, index, ..)| (prev, index))
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::try_with_capacity(4).unwrap();
    /// table.insert_unique(42, 42u64);
    ///
    /// assert_eq!(table.find(42, |&v| v == 42), Some(&42));
    /// assert_eq!(table.find(42, |&v| v == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let (_, index) = self.search(hash, eq)?;
        Some(self.entries[index].value())
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let (_, index) = self.search(hash, eq)?;
        Some(self.entries[index].value_mut())
    }

    /// Inserts a value without checking whether an equal value is already
    /// present, returning a mutable reference to it.
    ///
    /// Callers are responsible for uniqueness; use [`entry`](Self::entry) to
    /// insert only when absent.
    pub fn insert_unique(&mut self, hash: u64, value: V) -> &mut V {
        let index = self.link_new(hash, value);
        self.entries[index].value_mut()
    }

    /// Takes a slot, writes the entry into it, and makes it the head of its
    /// bucket's chain. Returns the entry index.
    fn link_new(&mut self, hash: u64, value: V) -> usize {
        let index = self.acquire_slot();
        // Computed after acquiring: growth changes the capacity.
        let bucket = bucket_index(hash, self.capacity);
        let slot = Slot::Live {
            hash,
            next: self.buckets[bucket],
            value,
        };

        if index == self.entries.len() {
            self.entries.push(slot);
        } else {
            self.entries[index] = slot;
        }
        self.buckets[bucket] = index;

        index
    }

    /// Pops the free list, or hands out the next fresh slot (growing first if
    /// there is none). A fresh slot's index equals `entries.len()`.
    fn acquire_slot(&mut self) -> usize {
        if self.free_count > 0 {
            let index = self.free_head;
            self.free_head = self.entries[index].next();
            self.free_count -= 1;
            trace!("reusing free slot {index} ({} left)", self.free_count);
            return index;
        }

        if self.entries.len() == self.capacity {
            let new_capacity = self
                .capacity
                .checked_mul(2)
                .expect("capacity overflow");
            self.grow(new_capacity);
        }

        self.entries.len()
    }

    /// Extends both arrays to `new_capacity` and rebuilds every chain.
    ///
    /// Entries keep their indices. Live entries are relinked in index order,
    /// each becoming the head of its new bucket; free slots stay on the free
    /// list untouched.
    fn grow(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity > self.capacity);
        debug!(
            "growing hash table from {} to {} slots ({} live, {} free)",
            self.capacity,
            new_capacity,
            self.len(),
            self.free_count
        );

        self.entries
            .reserve_exact(new_capacity - self.entries.len());

        let mut buckets = vec![EMPTY; new_capacity].into_boxed_slice();
        for (index, slot) in self.entries.iter_mut().enumerate() {
            if let Slot::Live { hash, next, .. } = slot {
                let bucket = bucket_index(*hash, new_capacity);
                *next = buckets[bucket];
                buckets[bucket] = index;
            }
        }

        self.buckets = buckets;
        self.capacity = new_capacity;
    }

    /// Removes and returns a value from the table.
    ///
    /// The freed slot is pushed onto the free list and handed out by the next
    /// insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::try_with_capacity(4).unwrap();
    /// table.insert_unique(42, 42u64);
    ///
    /// assert_eq!(table.remove(42, |&v| v == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&v| v == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let (prev, index) = self.search(hash, eq)?;
        Some(self.unlink(prev, index))
    }

    /// Splices the entry at `index` out of its chain and frees its slot.
    fn unlink(&mut self, prev: usize, index: usize) -> V {
        let freed = mem::replace(
            &mut self.entries[index],
            Slot::Free {
                next: self.free_head,
            },
        );
        let Slot::Live { hash, next, value } = freed else {
            unreachable!("unlinking free slot {index}");
        };

        if prev == EMPTY {
            self.buckets[bucket_index(hash, self.capacity)] = next;
        } else {
            self.entries[prev].set_next(next);
        }

        self.free_head = index;
        self.free_count += 1;

        value
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::try_with_capacity(4).unwrap();
    ///
    /// *table.entry(7, |v: &(u32, u32)| v.0 == 7).or_insert((7, 0)) = (7, 1);
    /// match table.entry(7, |v| v.0 == 7) {
    ///     Entry::Occupied(entry) => assert_eq!(entry.get(), &(7, 1)),
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.search(hash, eq) {
            Some((prev, index)) => Entry::Occupied(OccupiedEntry {
                table: self,
                prev,
                index,
            }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.fill(EMPTY);
        self.free_head = EMPTY;
        self.free_count = 0;
    }

    /// Returns an iterator over all values, in entry index order.
    ///
    /// The order is an implementation detail and changes as slots are
    /// reused.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let remaining = self.len();
        IterMut {
            inner: self.entries.iter_mut(),
            remaining,
        }
    }

    /// Removes and yields all values. The table is empty afterwards, even if
    /// the iterator is dropped early.
    pub fn drain(&mut self) -> Drain<'_, V> {
        let remaining = self.len();
        self.buckets.fill(EMPTY);
        self.free_head = EMPTY;
        self.free_count = 0;
        Drain {
            inner: self.entries.drain(..),
            remaining,
        }
    }

    /// Returns statistics about the table's shape.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let mut used_buckets = 0;
        let mut longest_chain = 0;
        for bucket in 0..self.capacity {
            let len = self.chain(bucket).count();
            if len > 0 {
                used_buckets += 1;
            }
            longest_chain = longest_chain.max(len);
        }

        DebugStats {
            populated: self.len(),
            allocated: self.entries.len(),
            free: self.free_count,
            capacity: self.capacity,
            used_buckets,
            longest_chain,
            load_factor: self.len() as f64 / self.capacity as f64,
            total_bytes: self.capacity
                * (mem::size_of::<usize>() + mem::size_of::<Slot<V>>()),
        }
    }

    /// Computes the distribution of chain lengths over all buckets.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> ChainHistogram {
        let mut bins = Vec::new();
        for bucket in 0..self.capacity {
            let len = self.chain(bucket).count();
            if bins.len() <= len {
                bins.resize(len + 1, 0);
            }
            bins[len] += 1;
        }
        ChainHistogram { bins }
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// No value matched the hash and predicate.
    Vacant(VacantEntry<'a, V>),
    /// A matching value is present.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies an occupied entry in place.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value, growing the table if needed, and returns a mutable
    /// reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.insert_unique(self.hash, value)
    }
}

/// A view into an occupied entry.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    prev: usize,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the entry index: a handle into the entry array that stays
    /// valid until the entry is removed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        self.table.entries[self.index].value()
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.entries[self.index].value_mut()
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        self.table.entries[self.index].value_mut()
    }

    /// Removes the entry and returns its value.
    pub fn remove(self) -> V {
        self.table.unlink(self.prev, self.index)
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`].
pub struct IterMut<'a, V> {
    inner: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, V> {
    inner: alloc::vec::Drain<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
