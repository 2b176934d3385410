use core::fmt::Debug;
use core::mem;
use core::num::NonZeroUsize;
use core::ops::Index;

use crate::error::Error;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::key::CharSum;
use crate::key::KeyHasher;
use crate::key::TableKey;

/// A key-value map stored in a chained [`HashTable`].
///
/// `HashMap<K, V, H>` hashes keys with a [`KeyHasher`] `H`, by default the
/// character-sum hash [`CharSum`]. Lookups and insertions report failures as
/// [`Error`] values rather than panicking:
///
/// - [`get`](Self::get) fails with [`Error::KeyNotFound`] for a missing key,
/// - [`add`](Self::add) fails with [`Error::DuplicateKey`] instead of
///   overwriting,
/// - [`remove`](Self::remove) reports a missing key as `Ok(false)`,
/// - every keyed operation fails with [`Error::NullKey`] for the null key.
///
/// # Examples
///
/// ```rust
/// use chain_hash::Error;
/// use chain_hash::HashMap;
///
/// let mut map = HashMap::try_new(4)?;
/// map.add("GI", 1)?;
/// map.add("FJ", 2)?; // same character sum, same bucket
///
/// assert_eq!(map.get(&"GI"), Ok(&1));
/// assert_eq!(map.add("GI", 3), Err(Error::DuplicateKey));
/// assert_eq!(map.remove(&"FJ"), Ok(true));
/// assert_eq!(map.get(&"FJ"), Err(Error::KeyNotFound));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, H = CharSum> {
    table: HashTable<(K, V)>,
    hasher: H,
}

impl<K, V, H> Debug for HashMap<K, V, H>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V> HashMap<K, V, CharSum>
where
    K: TableKey,
{
    /// Creates a map using the character-sum hash with room for `capacity`
    /// entries before it grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::num::NonZeroUsize;
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<String, u32> = HashMap::new(NonZeroUsize::new(8).unwrap());
    /// assert_eq!(map.capacity(), 8);
    /// ```
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_hasher(capacity, CharSum)
    }

    /// Creates a map using the character-sum hash, failing with
    /// [`Error::ZeroCapacity`] when `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        Self::try_with_hasher(capacity, CharSum)
    }
}

impl<K, V, H> HashMap<K, V, H> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a reference to the map's key hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys in arbitrary order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in arbitrary order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Removes and yields every key-value pair.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn raw_table(&self) -> &HashTable<(K, V)> {
        &self.table
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    K: TableKey,
    H: KeyHasher<K>,
{
    /// Creates a map with the given key hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::num::NonZeroUsize;
    /// # use chain_hash::HashMap;
    /// # use chain_hash::key::Hashed;
    /// # use std::hash::RandomState;
    /// #
    /// let mut map = HashMap::with_hasher(NonZeroUsize::new(4).unwrap(), Hashed(RandomState::new()));
    /// map.add(1u32, "one").unwrap();
    /// assert_eq!(map.get(&1), Ok(&"one"));
    /// ```
    pub fn with_hasher(capacity: NonZeroUsize, hasher: H) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hasher,
        }
    }

    /// Creates a map with the given key hasher, failing with
    /// [`Error::ZeroCapacity`] when `capacity` is zero.
    pub fn try_with_hasher(capacity: usize, hasher: H) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            hasher,
        })
    }

    fn hash(&self, key: &K) -> Result<u64, Error> {
        if key.is_null() {
            return Err(Error::NullKey);
        }
        Ok(self.hasher.hash_key(key))
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key, [`Error::KeyNotFound`] when no
    /// entry matches.
    pub fn get(&self, key: &K) -> Result<&V, Error> {
        let hash = self.hash(key)?;
        self.table
            .find(hash, |(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        let hash = self.hash(key)?;
        self.table
            .find_mut(hash, |(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the map holds an entry for `key`. The null key is
    /// never contained.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_ok()
    }

    /// Adds a new entry.
    ///
    /// The table grows, doubling its capacity, when no free or fresh slot is
    /// left.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key, [`Error::DuplicateKey`] when the
    /// key is already present. The map is left untouched in both cases.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::Error;
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::try_new(1)?;
    /// map.add("a".to_string(), 1)?;
    /// map.add("b".to_string(), 2)?;
    /// assert_eq!(map.capacity(), 2);
    /// assert_eq!(map.add("a".to_string(), 3), Err(Error::DuplicateKey));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Result<(), Error> {
        let hash = self.hash(&key)?;
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Occupied(_) => Err(Error::DuplicateKey),
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(())
            }
        }
    }

    /// Inserts or updates an entry, returning the previous value if the key
    /// was present.
    ///
    /// An updated entry keeps its slot and its original key.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::Error;
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::try_new(4)?;
    /// assert_eq!(map.set('x', 1)?, None);
    /// assert_eq!(map.set('x', 2)?, Some(1));
    /// assert_eq!(map.get(&'x'), Ok(&2));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        let hash = self.hash(&key)?;
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Occupied(mut entry) => {
                Ok(Some(mem::replace(&mut entry.get_mut().1, value)))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(None)
            }
        }
    }

    /// Removes the entry for `key`, returning whether one was present.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key. A missing key is not an error.
    pub fn remove(&mut self, key: &K) -> Result<bool, Error> {
        Ok(self.take(key)?.is_some())
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key.
    pub fn take(&mut self, key: &K) -> Result<Option<V>, Error> {
        let hash = self.hash(key)?;
        Ok(self.table.remove(hash, |(k, _)| k == key).map(|(_, v)| v))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] for the null key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::Error;
    /// # use chain_hash::HashMap;
    /// #
    /// let mut counts = HashMap::try_new(4)?;
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word)?.or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Ok(&2));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V>, Error> {
        let hash = self.hash(&key)?;
        Ok(match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }
}

impl<K, V, H> Index<&K> for HashMap<K, V, H>
where
    K: TableKey,
    H: KeyHasher<K>,
{
    type Output = V;

    /// Returns the value stored for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is null or not present.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
