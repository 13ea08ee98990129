//! The raw Robin Hood table.
//!
//! [`HashTable`] maps byte-string keys to values using hashes supplied by the
//! caller. Most users want [`HashMap`](crate::HashMap), which derives the
//! hashes itself.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use crate::Error;
use crate::Options;
use crate::options::threshold;

/// Reserved hash value marking an empty slot.
const EMPTY: u64 = 0;

/// Remaps a raw hash away from [`EMPTY`].
#[inline(always)]
pub(crate) const fn occupied_hash(hash: u64) -> u64 {
    if hash == EMPTY { 1 } else { hash }
}

/// Returns the probe distance of `hash` when stored in slot `index`.
///
/// This is the forward, wrapping distance from the hash's home slot
/// (`hash & (capacity - 1)`) to `index`. `capacity` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use rhh::hash_table::dist;
///
/// // Home slot.
/// assert_eq!(dist(13, 13 & 7, 8), 0);
/// // Home slot 7, stored in slot 1 after wrapping around.
/// assert_eq!(dist(15, 1, 8), 2);
/// ```
#[inline(always)]
pub fn dist(hash: u64, index: usize, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    let mask = capacity.wrapping_sub(1);
    index.wrapping_sub(hash as usize & mask) & mask
}

#[derive(Clone)]
struct Slot<V> {
    key: Box<[u8]>,
    value: V,
}

type Slots<V> = (Box<[u64]>, Box<[Option<Slot<V>>]>);

/// Allocates empty hash and slot arrays of `capacity` entries each.
///
/// Both arrays are reserved before either is filled, so a failure leaves
/// nothing half-built.
fn alloc_slots<V>(capacity: usize) -> Result<Slots<V>, Error> {
    let alloc_error = |source| Error::Alloc { capacity, source };

    let mut hashes = Vec::new();
    hashes.try_reserve_exact(capacity).map_err(alloc_error)?;
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity).map_err(alloc_error)?;

    hashes.resize(capacity, EMPTY);
    slots.resize_with(capacity, || None);

    Ok((hashes.into_boxed_slice(), slots.into_boxed_slice()))
}

/// A hash table mapping byte strings to values using Robin Hood hashing.
///
/// `HashTable<V>` does not hash keys itself: every operation takes the
/// key's 64-bit hash alongside the key. Callers must supply the same hash
/// for equal keys. A hash of `0` is remapped to `1`, since `0` marks an
/// empty slot.
///
/// Slots live in two parallel arrays (hashes and entries) whose length is
/// always a power of two. Insertion moves an entry out of its slot whenever
/// the incoming entry has travelled further from its home slot, which keeps
/// probe distances along any probe sequence non-decreasing. Lookups use that
/// ordering to stop early on a miss.
///
/// ## Example
///
/// ```rust
/// use rhh::HashTable;
///
/// let mut table = HashTable::new();
/// table.insert(0xfeed, &b"cpu,host=a"[..], 1u32);
///
/// assert_eq!(table.find(0xfeed, b"cpu,host=a"), Some(&1));
/// assert_eq!(table.find(0xfeed, b"cpu,host=b"), None);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    hashes: Box<[u64]>,
    slots: Box<[Option<Slot<V>>]>,

    populated: usize,
    threshold: usize,
    mask: usize,
    load_factor: u8,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let capacity = self.capacity();
        f.debug_struct("HashTable")
            .field(
                "slots",
                &self
                    .hashes
                    .chunks(8)
                    .enumerate()
                    .map(|(chunk, hashes)| {
                        hashes
                            .iter()
                            .enumerate()
                            .map(|(offset, &hash)| {
                                if hash == EMPTY {
                                    String::from("...................")
                                } else {
                                    let distance = dist(hash, chunk * 8 + offset, capacity);
                                    format!("{hash:016x}@{distance:02}")
                                }
                            })
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("threshold", &self.threshold)
            .field("capacity", &capacity)
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a new table with [`Options::DEFAULT`].
    pub fn new() -> Self {
        Self::with_options(Options::DEFAULT)
    }

    /// Creates a new table from `options`.
    ///
    /// # Panics
    ///
    /// Panics if the options are rejected by [`Options::slots`] or the slot
    /// arrays cannot be allocated. See [`HashTable::try_with_options`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rhh::{HashTable, Options};
    ///
    /// let table: HashTable<u64> = HashTable::with_options(Options::DEFAULT.with_capacity(100));
    /// assert_eq!(table.capacity(), 128);
    /// assert_eq!(table.threshold(), 115);
    /// ```
    pub fn with_options(options: Options) -> Self {
        match Self::try_with_options(options) {
            Ok(table) => table,
            Err(err) => panic!("invalid hash table options: {err}"),
        }
    }

    /// Creates a new table from `options`, returning an error for a load
    /// factor outside `1..=99`, an unrepresentable capacity, or a failed
    /// allocation.
    pub fn try_with_options(options: Options) -> Result<Self, Error> {
        let capacity = options.slots()?;
        let (hashes, slots) = alloc_slots(capacity)?;
        let threshold = threshold(capacity, options.load_factor);

        tracing::trace!(capacity, threshold, "allocated robin hood table");

        Ok(Self {
            hashes,
            slots,
            populated: 0,
            threshold,
            mask: capacity - 1,
            load_factor: options.load_factor,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.hashes.len()
    }

    /// Returns the number of entries the table holds before it doubles.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the configured load factor, as a percentage.
    pub fn load_factor(&self) -> u8 {
        self.load_factor
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present.
    ///
    /// On overwrite the stored key and hash are replaced as well and the
    /// entry stays in its slot. The table doubles first if a new entry would
    /// push it past its threshold.
    ///
    /// # Panics
    ///
    /// Panics if growing the table fails. See [`HashTable::try_insert`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rhh::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.insert(42, &b"key"[..], "a"), None);
    /// assert_eq!(table.insert(42, &b"key"[..], "b"), Some("a"));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, hash: u64, key: impl Into<Box<[u8]>>, value: V) -> Option<V> {
        match self.try_insert(hash, key, value) {
            Ok(previous) => previous,
            Err(err) => grow_failed(err),
        }
    }

    /// Inserts `value` under `key`, returning an error if the table needed to
    /// grow and could not.
    ///
    /// Growth allocates the larger arrays before touching the table, so on
    /// error the table is unchanged and `value` is dropped.
    pub fn try_insert(
        &mut self,
        hash: u64,
        key: impl Into<Box<[u8]>>,
        value: V,
    ) -> Result<Option<V>, Error> {
        let hash = occupied_hash(hash);
        let key = key.into();

        let populated = self.populated + 1;
        while populated > self.threshold {
            self.grow()?;
        }

        let previous = self.insert_slot(hash, key, value);
        if previous.is_none() {
            self.populated = populated;
        }
        Ok(previous)
    }

    /// Places an entry, stealing slots from entries closer to their home
    /// slot than the entry being carried.
    ///
    /// `hash` must be non-zero and the table must have an empty slot.
    fn insert_slot(&mut self, mut hash: u64, mut key: Box<[u8]>, mut value: V) -> Option<V> {
        debug_assert_ne!(hash, EMPTY);
        debug_assert!(self.populated < self.capacity());

        let capacity = self.capacity();
        let mut pos = hash as usize & self.mask;
        let mut distance = 0;

        loop {
            match self.slots[pos] {
                None => {
                    debug_assert_eq!(self.hashes[pos], EMPTY);
                    self.hashes[pos] = hash;
                    self.slots[pos] = Some(Slot { key, value });
                    return None;
                }
                Some(ref mut slot) => {
                    if slot.key == key {
                        self.hashes[pos] = hash;
                        slot.key = key;
                        return Some(mem::replace(&mut slot.value, value));
                    }

                    let slot_distance = dist(self.hashes[pos], pos, capacity);
                    if slot_distance < distance {
                        mem::swap(&mut self.hashes[pos], &mut hash);
                        mem::swap(&mut slot.key, &mut key);
                        mem::swap(&mut slot.value, &mut value);
                        distance = slot_distance;
                    }
                }
            }

            pos = (pos + 1) & self.mask;
            distance += 1;
        }
    }

    /// Doubles the slot count.
    #[cold]
    #[inline(never)]
    fn grow(&mut self) -> Result<(), Error> {
        let old_capacity = self.capacity();
        let capacity = old_capacity
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow(old_capacity))?;
        self.resize(capacity)
    }

    /// Moves every entry, in slot order, into fresh arrays of `capacity`
    /// slots. The table is untouched if they cannot be allocated.
    ///
    /// `capacity` must be a power of two larger than the current one.
    fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        debug_assert!(capacity.is_power_of_two() && capacity > self.capacity());
        let old_capacity = self.capacity();
        let (hashes, slots) = alloc_slots(capacity)?;

        tracing::debug!(
            from = old_capacity,
            to = capacity,
            len = self.populated,
            "growing robin hood table"
        );

        let old_hashes = mem::replace(&mut self.hashes, hashes);
        let old_slots = mem::replace(&mut self.slots, slots);
        self.mask = capacity - 1;
        self.threshold = threshold(capacity, self.load_factor);

        for (hash, slot) in old_hashes.iter().zip(old_slots.into_vec()) {
            if let Some(Slot { key, value }) = slot {
                self.insert_slot(*hash, key, value);
            }
        }

        Ok(())
    }

    /// Returns the slot index holding `key`, if any.
    fn index(&self, hash: u64, key: &[u8]) -> Option<usize> {
        let hash = occupied_hash(hash);
        let capacity = self.capacity();
        let mut pos = hash as usize & self.mask;
        let mut distance = 0;

        loop {
            let stored = self.hashes[pos];
            if stored == EMPTY || distance > dist(stored, pos, capacity) {
                return None;
            }
            if stored == hash
                && self.slots[pos]
                    .as_ref()
                    .is_some_and(|slot| &*slot.key == key)
            {
                return Some(pos);
            }

            pos = (pos + 1) & self.mask;
            distance += 1;
        }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// ```rust
    /// use rhh::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(7, &b"mem"[..], 10);
    /// assert_eq!(table.find(7, b"mem"), Some(&10));
    /// assert_eq!(table.find(8, b"disk"), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, key: &[u8]) -> Option<&V> {
        let index = self.index(hash, key)?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, key: &[u8]) -> Option<&mut V> {
        let index = self.index(hash, key)?;
        self.slots[index].as_mut().map(|slot| &mut slot.value)
    }

    /// Returns the entry in physical slot `index`, or `None` if the slot is
    /// empty or out of range.
    ///
    /// Every index in `0..capacity()` is valid to probe, so this can walk
    /// the raw slot array.
    ///
    /// ```rust
    /// use rhh::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(3, &b"k"[..], ());
    ///
    /// let occupied = (0..table.capacity()).filter_map(|i| table.elem(i)).count();
    /// assert_eq!(occupied, 1);
    /// assert!(table.elem(table.capacity()).is_none());
    /// ```
    pub fn elem(&self, index: usize) -> Option<(&[u8], &V)> {
        self.slots
            .get(index)?
            .as_ref()
            .map(|slot| (&*slot.key, &slot.value))
    }

    /// Returns every key in byte-lexicographic order.
    pub fn keys(&self) -> Vec<&[u8]> {
        let mut keys = Vec::with_capacity(self.populated);
        keys.extend((0..self.capacity()).filter_map(|i| self.elem(i).map(|(key, _)| key)));
        keys.sort_unstable();
        keys
    }

    /// Returns an iterator over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns the mean number of probes needed to find a present key: one
    /// more than the mean probe distance. An empty table reports `0.0`.
    ///
    /// ```rust
    /// use rhh::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.average_probe_count(), 0.0);
    ///
    /// // Same hash, so the entries sit at distances 0, 1 and 2.
    /// for key in [&b"a"[..], b"b", b"c"] {
    ///     table.insert(5, key, ());
    /// }
    /// assert_eq!(table.average_probe_count(), 2.0);
    /// ```
    pub fn average_probe_count(&self) -> f64 {
        if self.populated == 0 {
            return 0.0;
        }
        let sum: f64 = self.distances().map(|distance| distance as f64).sum();
        sum / self.populated as f64 + 1.0
    }

    /// Probe distance of every occupied slot, in slot order.
    pub(crate) fn distances(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.capacity();
        self.hashes
            .iter()
            .enumerate()
            .filter(|&(_, &hash)| hash != EMPTY)
            .map(move |(index, &hash)| dist(hash, index, capacity))
    }

    /// Bytes of slot storage per slot, counting both arrays.
    #[cfg(feature = "stats")]
    pub(crate) fn slot_bytes() -> usize {
        mem::size_of::<u64>() + mem::size_of::<Option<Slot<V>>>()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
#[inline(never)]
fn grow_failed(err: Error) -> ! {
    panic!("failed to grow hash table: {err}")
}

/// An iterator over the entries of a [`HashTable`], in slot order.
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Option<Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((&*slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}
