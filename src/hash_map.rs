use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hasher;

use crate::Error;
use crate::Options;
use crate::hash_table::HashTable;
use crate::hash_table::Iter;
use crate::hash_table::occupied_hash;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given: an unseeded, and so
        /// deterministic, foldhash.
        pub type DefaultHashBuilder = foldhash::fast::FixedState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is given: std's SipHash with
        /// fixed keys.
        pub type DefaultHashBuilder =
            std::hash::BuildHasherDefault<std::hash::DefaultHasher>;
    } else {
        compile_error!("rhh needs the `foldhash` or the `std` feature to pick a default hasher");
    }
}

/// Hashes `key` with [`DefaultHashBuilder`]. Never returns `0`.
///
/// ```rust
/// use rhh::hash_key;
///
/// assert_eq!(hash_key(b"cpu"), hash_key(b"cpu"));
/// assert_ne!(hash_key(b""), 0);
/// ```
pub fn hash_key(key: &[u8]) -> u64 {
    hash_with(&DefaultHashBuilder::default(), key)
}

#[inline]
fn hash_with<S: BuildHasher>(hash_builder: &S, key: &[u8]) -> u64 {
    let mut hasher = hash_builder.build_hasher();
    hasher.write(key);
    occupied_hash(hasher.finish())
}

/// A map from byte-string keys to values, stored in a Robin Hood
/// [`HashTable`].
///
/// `HashMap<V, S>` hashes keys with the builder `S` and never removes
/// entries. Keys are owned by the map: `put` copies a borrowed `&[u8]` and
/// takes a `Vec<u8>` or `Box<[u8]>` as is.
///
/// # Examples
///
/// ```rust
/// use rhh::{HashMap, Options};
///
/// let mut map = HashMap::with_options(Options::DEFAULT.with_capacity(4).with_load_factor(75));
/// map.put(&b"cpu"[..], 1);
/// map.put(b"mem".to_vec(), 2);
///
/// assert_eq!(map.get(b"cpu"), Some(&1));
/// assert_eq!(map.get(b"disk"), None);
/// assert_eq!(map.keys(), [&b"cpu"[..], b"mem"]);
/// ```
#[derive(Clone)]
pub struct HashMap<V, S = DefaultHashBuilder> {
    table: HashTable<V>,
    hash_builder: S,
}

struct DebugKey<'a>(&'a [u8]);

impl Debug for DebugKey<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

impl<V, S> Debug for HashMap<V, S>
where
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&DebugKey(k), v);
        }
        map.finish()
    }
}

impl<V, S> HashMap<V, S>
where
    S: BuildHasher,
{
    /// Creates a new map from `options`, hashing keys with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if the options are rejected by [`Options::slots`]. See
    /// [`HashMap::try_with_options_and_hasher`].
    pub fn with_options_and_hasher(options: Options, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_options(options),
            hash_builder,
        }
    }

    /// Creates a new map from `options`, hashing keys with `hash_builder`,
    /// or returns why the options cannot be used.
    pub fn try_with_options_and_hasher(options: Options, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_options(options)?,
            hash_builder,
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots. Always a power of two, and never
    /// decreases.
    pub fn cap(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of entries the map holds before it doubles.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Returns the configured load factor, as a percentage.
    pub fn load_factor(&self) -> u8 {
        self.table.load_factor()
    }

    /// Returns the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &HashTable<V> {
        &self.table
    }

    /// Returns the value stored under `key`.
    ///
    /// ```rust
    /// use rhh::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.get(b"cpu"), None);
    /// map.put(&b"cpu"[..], "series-1");
    /// assert_eq!(map.get(b"cpu"), Some(&"series-1"));
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.table.find(hash_with(&self.hash_builder, key), key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.table.find_mut(hash_with(&self.hash_builder, key), key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, returning the previous value if the key
    /// was already present. An overwrite leaves [`HashMap::len`] unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the map needed to grow and could not allocate. See
    /// [`HashMap::try_put`].
    ///
    /// ```rust
    /// use rhh::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.put(&b"cpu"[..], 1), None);
    /// assert_eq!(map.put(&b"cpu"[..], 2), Some(1));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn put(&mut self, key: impl Into<Box<[u8]>>, value: V) -> Option<V> {
        let key = key.into();
        let hash = hash_with(&self.hash_builder, &key);
        self.table.insert(hash, key, value)
    }

    /// Stores `value` under `key`, returning an error instead of panicking if
    /// the map could not grow. On error the map is unchanged.
    pub fn try_put(&mut self, key: impl Into<Box<[u8]>>, value: V) -> Result<Option<V>, Error> {
        let key = key.into();
        let hash = hash_with(&self.hash_builder, &key);
        self.table.try_insert(hash, key, value)
    }

    /// Returns the mean number of probes needed to find a present key.
    /// Never below `1.0` for a non-empty map. An empty map reports `0.0`.
    pub fn average_probe_count(&self) -> f64 {
        self.table.average_probe_count()
    }

    /// Returns the entry in physical slot `index`, or `None` if that slot is
    /// empty or `index >= cap()`.
    pub fn elem(&self, index: usize) -> Option<(&[u8], &V)> {
        self.table.elem(index)
    }

    /// Returns every key in byte-lexicographic order.
    pub fn keys(&self) -> Vec<&[u8]> {
        self.table.keys()
    }

    /// Returns an iterator over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }
}

impl<V> HashMap<V, DefaultHashBuilder> {
    /// Creates a new map with [`Options::DEFAULT`]: 256 slots at a 90% load
    /// factor.
    pub fn new() -> Self {
        Self::with_options(Options::DEFAULT)
    }

    /// Creates a new map from `options` using the default hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if the options are rejected by [`Options::slots`].
    ///
    /// ```rust
    /// use rhh::{HashMap, Options};
    ///
    /// let map: HashMap<u32> = HashMap::with_options(Options::DEFAULT.with_capacity(1000));
    /// assert_eq!(map.cap(), 1024);
    /// ```
    pub fn with_options(options: Options) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }

    /// Creates a new map from `options` using the default hasher builder, or
    /// returns why the options cannot be used.
    ///
    /// ```rust
    /// use rhh::{Error, HashMap, Options};
    ///
    /// let err = HashMap::<u32>::try_with_options(Options::DEFAULT.with_load_factor(100));
    /// assert_eq!(err.unwrap_err(), Error::LoadFactor(100));
    /// ```
    pub fn try_with_options(options: Options) -> Result<Self, Error> {
        Self::try_with_options_and_hasher(options, DefaultHashBuilder::default())
    }
}

impl<V, S> Default for HashMap<V, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_options_and_hasher(Options::DEFAULT, S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<V, S>
where
    K: Into<Box<[u8]>>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<V, S>
where
    K: Into<Box<[u8]>>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, V, S> IntoIterator for &'a HashMap<V, S>
where
    S: BuildHasher,
{
    type IntoIter = Iter<'a, V>;
    type Item = (&'a [u8], &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
