//! The Robin Hood probe engine.
//!
//! [`HashTable`] stores records of any type `T`. Callers hand it a 64-bit
//! digest and an equality predicate for every operation, so the table never
//! hashes or compares keys on its own. [`HashMap`](crate::HashMap) builds the
//! usual keyed interface on top of it.

use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

use crate::config::Deletion;
use crate::config::Growth;
use crate::config::TableConfig;
use crate::error::Error;
use crate::error::infallible;
use crate::hash::hashtag;
use crate::hash::ideal_index;
use crate::slots::EMPTY;
use crate::slots::SlotArray;
use crate::slots::TOMBSTONE;
use crate::slots::is_occupied;

/// The insert loop ran past every slot without finding a vacancy. The load
/// limit guarantees at least one empty slot, so this is a bug, not a
/// recoverable condition.
#[cold]
#[inline(never)]
#[track_caller]
fn probe_overrun(capacity: usize) -> ! {
    panic!("probe sequence exceeded all {capacity} slots; the load limit invariant was broken")
}

/// Debug statistics for hash table analysis.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of records currently in the table
    pub populated: usize,
    /// Number of tombstones currently in the table
    pub tombstones: usize,
    /// Total number of slots allocated
    pub capacity: usize,
    /// Maximum number of records before the next resize
    pub max_load: usize,
    /// Upper bound on the probe distance of any live record
    pub max_probe: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Mean probe distance over live records
    pub mean_probe: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load factor, limit {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_load
        );
        println!("Tombstones: {}", self.tombstones);
        println!(
            "Probe distance: mean {:.3}, bound {}",
            self.mean_probe, self.max_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Count of live records per probe distance.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `bins[d]` is the number of records living `d` slots past their ideal
    /// slot.
    pub bins: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of records counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if units % 8 > 0 {
                bar.push(partial[units % 8 - 1]);
            }
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// A cache-aware hash table using Robin Hood open addressing.
///
/// `HashTable<T>` stores values of type `T` in a single power-of-two sized
/// slot array. Each operation takes the record's 64-bit digest and an
/// equality predicate; the digest is cached per slot so probes compare a
/// one-byte tag and the digest before ever calling the predicate.
///
/// Inserts displace residents that sit closer to their ideal slot than the
/// incoming record (only on a strictly greater distance), lookups stop at the
/// first empty slot or once they have travelled further than any live record,
/// and removals shift the rest of the cluster back by one slot.
///
/// ## Performance Characteristics
///
/// - **Memory**: 1 tag byte and an 8 byte digest per slot, plus the size of
///   `T`.
/// - **Resize**: a full rehash into a fresh slot array, O(capacity), amortized
///   O(1) per insert.
///
/// ## Example
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use robin_hash::hash::FnvMixBuilder;
/// use robin_hash::hash_table::Entry;
/// use robin_hash::hash_table::HashTable;
///
/// #[derive(Debug, PartialEq)]
/// struct Symbol {
///     name: &'static str,
///     address: u32,
/// }
///
/// let hasher = FnvMixBuilder;
/// let mut table = HashTable::new();
/// let digest = hasher.hash_one("main");
///
/// match table.entry(digest, |s: &Symbol| s.name == "main") {
///     Entry::Vacant(entry) => {
///         entry.insert(Symbol {
///             name: "main",
///             address: 0x1000,
///         });
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// let found = table.find(digest, |s| s.name == "main").unwrap();
/// assert_eq!(found.address, 0x1000);
/// ```
pub struct HashTable<T> {
    slots: SlotArray<T>,
    config: TableConfig,

    populated: usize,
    tombstones: usize,
    max_load: usize,
    max_probe: usize,
}

impl<T> Debug for HashTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::vec::Vec;

        let tags = self
            .slots
            .tags()
            .chunks(16)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&tag| match tag {
                        EMPTY => String::from(".."),
                        TOMBSTONE => String::from("xx"),
                        tag => format!("{tag:02x}"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>();

        f.debug_struct("HashTable")
            .field("tags", &tags)
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.slots.capacity())
            .field("max_load", &self.max_load)
            .field("max_probe", &self.max_probe)
            .finish()
    }
}

impl<T> Clone for HashTable<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        let mut slots = infallible(SlotArray::try_new(self.slots.capacity()));

        // Copy slot by slot so the clone keeps the exact probe layout.
        for (index, &tag) in self.slots.tags().iter().enumerate() {
            if is_occupied(tag) {
                // SAFETY: The source slot is occupied, and the destination has
                // the same capacity and is still vacant at `index`.
                unsafe {
                    let record = self.slots.record(index).clone();
                    slots.write(index, self.slots.digest(index), record);
                }
            } else if tag == TOMBSTONE {
                slots.set_tag(index, TOMBSTONE);
            }
        }

        Self {
            slots,
            config: self.config,
            populated: self.populated,
            tombstones: self.tombstones,
            max_load: self.max_load,
            max_probe: self.max_probe,
        }
    }
}

impl<T> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HashTable<T> {
    /// Creates an empty table with the default configuration: 16 slots, a 70%
    /// load limit, elastic growth, backward-shift deletion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.max_load(), 11);
    /// ```
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Creates a table able to hold at least `capacity` records without
    /// resizing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.max_load() >= 100);
    /// assert!(table.capacity().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::try_with_capacity_and_config(
            capacity,
            TableConfig::default(),
        ))
    }

    /// Creates an empty table with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; see
    /// [`try_with_config`](Self::try_with_config).
    pub fn with_config(config: TableConfig) -> Self {
        infallible(Self::try_with_config(config))
    }

    /// Creates an empty table with the given configuration, reporting invalid
    /// settings and allocation failure.
    pub fn try_with_config(config: TableConfig) -> Result<Self, Error> {
        Self::try_with_capacity_and_config(0, config)
    }

    /// Creates a table able to hold at least `capacity` records under the
    /// given configuration.
    pub fn try_with_capacity_and_config(
        capacity: usize,
        config: TableConfig,
    ) -> Result<Self, Error> {
        let config = config.validate()?;
        let slot_count = config
            .capacity_for(capacity)
            .ok_or(Error::CapacityOverflow)?;
        let slots = SlotArray::try_new(slot_count)?;

        Ok(Self {
            slots,
            config,
            populated: 0,
            tombstones: 0,
            max_load: config.max_load(slot_count),
            max_probe: 0,
        })
    }

    /// Returns the number of records in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no records.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the slot array. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns the number of records the table can hold before the next
    /// insert of a new key triggers a resize.
    pub fn max_load(&self) -> usize {
        self.max_load
    }

    /// Returns the number of tombstones awaiting compaction. Always zero under
    /// [`Deletion::BackwardShift`].
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.populated as f64 / self.slots.capacity() as f64
    }

    /// Returns the configuration the table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns an iterator over all records in physical slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// #
    /// # use robin_hash::hash::FnvMixBuilder;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..4u64 {
    ///     table.entry(FnvMixBuilder.hash_one(n), |&v| v == n).or_insert(n);
    /// }
    ///
    /// let mut seen: Vec<u64> = table.iter().copied().collect();
    /// seen.sort();
    /// assert_eq!(seen, [0, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let (tags, records) = self.slots.tags_and_records();
        Iter {
            tags: tags.iter(),
            records: records.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to all records in
    /// physical slot order.
    ///
    /// Changing the part of a record that feeds its digest or equality
    /// predicate makes that record unreachable.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let remaining = self.populated;
        let (tags, records) = self.slots.tags_and_records_mut();
        IterMut {
            tags: tags.iter(),
            records: records.iter_mut(),
            remaining,
        }
    }

    /// Returns an iterator that removes and yields all records.
    ///
    /// The table is empty once the iterator is dropped, even if it was not
    /// run to completion. If the iterator is leaked the remaining contents
    /// are unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |&v: &u32| v == 7).or_insert(7);
    /// table.entry(9, |&v: &u32| v == 9).or_insert(9);
    ///
    /// let mut drained: Vec<u32> = table.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [7, 9]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Removes all records, keeping the current slot array.
    ///
    /// Every slot is reset to empty, so the cost is O(capacity).
    pub fn clear(&mut self) {
        self.slots.clear();
        self.populated = 0;
        self.tombstones = 0;
        self.max_probe = 0;
    }

    /// Shrinks the slot array to the smallest capacity whose load limit holds
    /// the current records, never below the configured minimum. Also drops
    /// any tombstones.
    ///
    /// A [`Growth::Fixed`] table keeps its capacity and only drops tombstones.
    ///
    /// Shrinking is best effort: if the smaller array cannot be allocated the
    /// table is left as it was.
    pub fn shrink_to_fit(&mut self) {
        let capacity = match self.config.growth {
            Growth::Fixed => self.slots.capacity(),
            Growth::Elastic => match self.config.capacity_for(self.populated) {
                Some(capacity) => capacity,
                None => return,
            },
        };
        if capacity < self.slots.capacity() || self.tombstones > 0 {
            let capacity = capacity.min(self.slots.capacity());
            if let Err(_err) = self.rehash(capacity) {
                log_warn!("shrink to {capacity} slots failed: {_err}");
            }
        }
    }

    /// Reserves room for at least `additional` more records.
    ///
    /// # Panics
    ///
    /// Panics if the table uses [`Growth::Fixed`] and cannot hold the
    /// records, or if the new capacity overflows. Aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if allocation
    /// fails.
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional))
    }

    /// Reserves room for at least `additional` more records.
    ///
    /// On error the table is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::Error;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u32> = HashTable::new();
    /// table.try_reserve(1000).unwrap();
    /// assert!(table.max_load() >= 1000);
    ///
    /// assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required.saturating_add(self.tombstones) <= self.max_load {
            return Ok(());
        }

        let capacity = self
            .config
            .capacity_for(required)
            .ok_or(Error::CapacityOverflow)?
            .max(self.slots.capacity());
        if capacity > self.slots.capacity() && self.config.growth == Growth::Fixed {
            return Err(Error::CapacityExhausted {
                capacity: self.slots.capacity(),
            });
        }
        self.rehash(capacity)
    }

    /// Removes and returns the record matching `digest` and `eq`.
    ///
    /// Returns `None`, leaving the table untouched, if there is no match.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// #
    /// # use robin_hash::hash::FnvMixBuilder;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// let digest = FnvMixBuilder.hash_one(42u64);
    /// table.entry(digest, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(digest, |&n| n == 42), Some(42));
    /// assert_eq!(table.remove(digest, |&n| n == 42), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, digest: u64, eq: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.find_index(digest, eq)?;
        let record = self.remove_index(index);
        self.maybe_shrink();
        Some(record)
    }

    /// Gets the entry for the given digest and equality predicate.
    ///
    /// Looking up the entry never resizes; a resize happens only when a
    /// vacant entry is filled and the table is at its load limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// #
    /// # use robin_hash::hash::FnvMixBuilder;
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// let digest = FnvMixBuilder.hash_one("hello");
    ///
    /// match table.entry(digest, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         entry.get_mut().push('!');
    ///     }
    /// }
    ///
    /// table
    ///     .entry(digest, |s: &String| s == "hello")
    ///     .and_modify(|s| s.push('!'));
    /// assert_eq!(table.find(digest, |s| s == "hello!"), Some(&"hello!".to_string()));
    /// ```
    pub fn entry(&mut self, digest: u64, eq: impl Fn(&T) -> bool) -> Entry<'_, T> {
        match self.find_index(digest, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => Entry::Vacant(VacantEntry {
                table: self,
                digest,
            }),
        }
    }

    /// Finds the record matching `digest` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(5, |&n: &u8| n == 5).or_insert(5);
    ///
    /// assert_eq!(table.find(5, |&n| n == 5), Some(&5));
    /// assert_eq!(table.find(6, |&n| n == 6), None);
    /// ```
    pub fn find(&self, digest: u64, eq: impl Fn(&T) -> bool) -> Option<&T> {
        let index = self.find_index(digest, eq)?;
        // SAFETY: `find_index` only returns occupied slots.
        Some(unsafe { self.slots.record(index) })
    }

    /// Finds the record matching `digest` and `eq` for modification.
    pub fn find_mut(&mut self, digest: u64, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let index = self.find_index(digest, eq)?;
        // SAFETY: `find_index` only returns occupied slots.
        Some(unsafe { self.slots.record_mut(index) })
    }

    #[inline(always)]
    fn probe_distance(&self, index: usize, digest: u64) -> usize {
        let mask = self.slots.mask();
        index.wrapping_sub(ideal_index(digest, mask)) & mask
    }

    /// Scans from the ideal slot until a match, an empty slot, or a distance
    /// beyond `max_probe`. Tombstones are skipped.
    #[inline]
    fn find_index(&self, digest: u64, eq: impl Fn(&T) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let mask = self.slots.mask();
        let tag = hashtag(digest);
        let tags = self.slots.tags();
        let mut index = ideal_index(digest, mask);

        for _ in 0..=self.max_probe {
            let slot_tag = tags[index];
            if slot_tag == EMPTY {
                return None;
            }
            // SAFETY: A tag equal to `hashtag(digest)` is an occupied tag, so
            // the slot's digest and record are initialized.
            if slot_tag == tag
                && unsafe { self.slots.digest(index) } == digest
                && eq(unsafe { self.slots.record(index) })
            {
                return Some(index);
            }
            index = (index + 1) & mask;
        }

        None
    }

    /// Places a record whose key is known to be absent and returns the slot
    /// it landed in.
    ///
    /// Walks forward from the ideal slot. Whenever the in-flight record has
    /// probed strictly further than the resident, the two trade places and
    /// the walk continues with the resident. The first vacant slot (empty or
    /// tombstone) ends the walk.
    ///
    /// The caller must have made room: `populated + tombstones < max_load`.
    fn place(&mut self, mut digest: u64, mut record: T) -> usize {
        debug_assert!(self.populated < self.slots.capacity());

        let mask = self.slots.mask();
        let mut index = ideal_index(digest, mask);
        let mut distance = 0usize;
        let mut landed = None;

        for _ in 0..self.slots.capacity() {
            let tag = self.slots.tags()[index];
            if !is_occupied(tag) {
                if tag == TOMBSTONE {
                    self.tombstones -= 1;
                }
                // SAFETY: `index` is masked into bounds and the slot is vacant.
                unsafe { self.slots.write(index, digest, record) };
                self.populated += 1;
                self.max_probe = self.max_probe.max(distance);
                return landed.unwrap_or(index);
            }

            // SAFETY: The slot is occupied.
            let resident = self.probe_distance(index, unsafe { self.slots.digest(index) });
            if distance > resident {
                // SAFETY: The slot is occupied.
                unsafe { self.slots.swap(index, &mut digest, &mut record) };
                self.max_probe = self.max_probe.max(distance);
                landed.get_or_insert(index);
                distance = resident;
            }

            index = (index + 1) & mask;
            distance += 1;
        }

        probe_overrun(self.slots.capacity())
    }

    /// Makes sure one more record can be placed, compacting or growing the
    /// slot array if the load limit would otherwise be exceeded.
    fn reserve_one(&mut self) -> Result<(), Error> {
        if self.populated + self.tombstones < self.max_load {
            return Ok(());
        }

        // Compact in place when tombstones are a real share of the load, or
        // when growing is not an option.
        let capacity = self.slots.capacity();
        let crowded = self.tombstones * 4 >= self.max_load || self.config.growth == Growth::Fixed;
        if self.tombstones > 0 && crowded && self.populated < self.max_load {
            log_debug!(
                "compacting {} tombstones in {capacity} slots",
                self.tombstones
            );
            return self.rehash(capacity);
        }

        match self.config.growth {
            Growth::Fixed => Err(Error::CapacityExhausted { capacity }),
            Growth::Elastic => {
                let required = self
                    .populated
                    .checked_add(1)
                    .ok_or(Error::CapacityOverflow)?;
                let doubled = capacity.checked_mul(2).ok_or(Error::CapacityOverflow)?;
                let target = self
                    .config
                    .capacity_for(required)
                    .ok_or(Error::CapacityOverflow)?
                    .max(doubled);
                log_debug!("growing from {capacity} to {target} slots");
                self.rehash(target)
            }
        }
    }

    /// Moves every live record into a fresh slot array of `capacity` slots.
    ///
    /// The new array is allocated before anything is touched, so on error
    /// the table is unchanged.
    fn rehash(&mut self, capacity: usize) -> Result<(), Error> {
        debug_assert!(self.config.max_load(capacity) >= self.populated);

        let fresh = SlotArray::try_new(capacity)?;
        let mut old = core::mem::replace(&mut self.slots, fresh);
        let populated = core::mem::replace(&mut self.populated, 0);
        self.tombstones = 0;
        self.max_probe = 0;
        self.max_load = self.config.max_load(capacity);

        for index in 0..old.capacity() {
            if is_occupied(old.tags()[index]) {
                // SAFETY: The slot is occupied. `take` marks it empty, so the
                // old array's drop will not touch the moved record.
                let (digest, record) = unsafe { old.take(index) };
                self.place(digest, record);
            }
        }

        debug_assert_eq!(self.populated, populated);
        Ok(())
    }

    /// Vacates an occupied slot and returns its record.
    fn remove_index(&mut self, index: usize) -> T {
        // SAFETY: Callers only pass indices returned by `find_index`.
        let (_, record) = unsafe { self.slots.take(index) };
        self.populated -= 1;

        match self.config.deletion {
            Deletion::BackwardShift => self.shift_back(index),
            Deletion::Tombstone => {
                self.slots.set_tag(index, TOMBSTONE);
                self.tombstones += 1;
            }
        }

        record
    }

    /// Closes the hole at `hole` by pulling each following displaced record
    /// back one slot, stopping at an empty slot or a record already in its
    /// ideal slot.
    fn shift_back(&mut self, mut hole: usize) {
        let mask = self.slots.mask();
        loop {
            let next = (hole + 1) & mask;
            if !is_occupied(self.slots.tags()[next]) {
                break;
            }
            // SAFETY: The slot is occupied.
            let digest = unsafe { self.slots.digest(next) };
            if self.probe_distance(next, digest) == 0 {
                break;
            }
            // SAFETY: `next` is occupied, `hole` is empty, and they differ
            // because at least one slot is always empty.
            unsafe { self.slots.relocate(next, hole) };
            hole = next;
        }
    }

    /// Halves the slot array when it has become sparse.
    ///
    /// Fires only when fewer than a quarter of the slots are used and the
    /// halved array would sit at no more than half its own load limit, so a
    /// table never shrinks straight after growing.
    fn maybe_shrink(&mut self) {
        if !self.config.shrink || self.config.growth == Growth::Fixed {
            return;
        }

        let capacity = self.slots.capacity();
        let half = capacity / 2;
        if half < self.config.min_capacity()
            || self.populated * 4 >= capacity
            || self.populated > self.config.max_load(half) / 2
        {
            return;
        }

        log_debug!("shrinking from {capacity} to {half} slots");
        if let Err(_err) = self.rehash(half) {
            log_warn!("shrink to {half} slots failed: {_err}");
        }
    }

    /// Counts live records by probe distance.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = alloc::vec![0usize; self.max_probe + 1];
        for (index, &tag) in self.slots.tags().iter().enumerate() {
            if is_occupied(tag) {
                // SAFETY: The slot is occupied.
                let distance = self.probe_distance(index, unsafe { self.slots.digest(index) });
                bins[distance] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let weighted: usize = histogram
            .bins
            .iter()
            .enumerate()
            .map(|(distance, &count)| distance * count)
            .sum();

        DebugStats {
            populated: self.populated,
            tombstones: self.tombstones,
            capacity: self.slots.capacity(),
            max_load: self.max_load,
            max_probe: self.max_probe,
            load_factor: self.load_factor(),
            mean_probe: if self.populated == 0 {
                0.0
            } else {
                weighted as f64 / self.populated as f64
            },
            total_bytes: self.slots.allocated_bytes(),
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, T> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, T>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, T>),
}

impl<'a, T> Entry<'a, T> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// *table.entry(1, |&(k, _): &(u8, u32)| k == 1).or_insert((1, 10)) = (1, 11);
    /// table.entry(1, |&(k, _): &(u8, u32)| k == 1).or_insert((1, 99));
    ///
    /// assert_eq!(table.find(1, |&(k, _)| k == 1), Some(&(1, 11)));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the record.
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the record if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

impl<'a, T> Entry<'a, T>
where
    T: Default,
{
    /// Inserts `T::default()` if the entry is vacant and returns a mutable
    /// reference to the record.
    pub fn or_default(self) -> &'a mut T {
        self.or_insert_with(T::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, T> {
    table: &'a mut HashTable<T>,
    digest: u64,
}

impl<'a, T> VacantEntry<'a, T> {
    /// Inserts `record` and returns a mutable reference to it.
    ///
    /// The record must hash to the digest this entry was looked up with and
    /// satisfy the same equality predicate, or it will not be found again.
    ///
    /// # Panics
    ///
    /// Panics if the table uses [`Growth::Fixed`] and is at its load limit.
    /// Aborts through [`handle_alloc_error`](alloc::alloc::handle_alloc_error)
    /// if a required resize cannot allocate.
    pub fn insert(self, record: T) -> &'a mut T {
        infallible(self.try_insert(record))
    }

    /// Inserts `record`, resizing first if the table is at its load limit.
    ///
    /// On error the record is dropped and the table is unchanged.
    pub fn try_insert(self, record: T) -> Result<&'a mut T, Error> {
        self.table.reserve_one()?;
        let index = self.table.place(self.digest, record);
        // SAFETY: `place` returns the slot the record was written to.
        Ok(unsafe { self.table.slots.record_mut(index) })
    }

    /// Returns the digest this entry was looked up with.
    pub fn digest(&self) -> u64 {
        self.digest
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, T> {
    table: &'a mut HashTable<T>,
    index: usize,
}

impl<'a, T> OccupiedEntry<'a, T> {
    /// Returns a reference to the record.
    pub fn get(&self) -> &T {
        // SAFETY: The entry was created from an occupied slot and holds the
        // table exclusively.
        unsafe { self.table.slots.record(self.index) }
    }

    /// Returns a mutable reference to the record.
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: As in `get`.
        unsafe { self.table.slots.record_mut(self.index) }
    }

    /// Converts the entry into a mutable reference to the record.
    pub fn into_mut(self) -> &'a mut T {
        // SAFETY: As in `get`.
        unsafe { self.table.slots.record_mut(self.index) }
    }

    /// Removes the record from the table and returns it.
    pub fn remove(self) -> T {
        let record = self.table.remove_index(self.index);
        self.table.maybe_shrink();
        record
    }
}

/// An iterator over the records of a [`HashTable`] in physical slot order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, T> {
    tags: core::slice::Iter<'a, u8>,
    records: core::slice::Iter<'a, MaybeUninit<T>>,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tags: self.tags.clone(),
            records: self.records.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let tag = *self.tags.next()?;
            let record = self.records.next()?;
            if is_occupied(tag) {
                self.remaining -= 1;
                // SAFETY: Occupied slots hold initialized records.
                return Some(unsafe { record.assume_init_ref() });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// A mutable iterator over the records of a [`HashTable`].
///
/// This struct is created by the [`iter_mut`] method on [`HashTable`].
///
/// [`iter_mut`]: HashTable::iter_mut
pub struct IterMut<'a, T> {
    tags: core::slice::Iter<'a, u8>,
    records: core::slice::IterMut<'a, MaybeUninit<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let tag = *self.tags.next()?;
            let record = self.records.next()?;
            if is_occupied(tag) {
                self.remaining -= 1;
                // SAFETY: Occupied slots hold initialized records.
                return Some(unsafe { record.assume_init_mut() });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// A draining iterator over the records of a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, T> {
    table: &'a mut HashTable<T>,
    index: usize,
}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        self.table.clear();
    }
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.table.populated > 0 && self.index < self.table.slots.capacity() {
            let index = self.index;
            self.index += 1;
            if is_occupied(self.table.slots.tags()[index]) {
                self.table.populated -= 1;
                // SAFETY: The slot is occupied.
                let (_, record) = unsafe { self.table.slots.take(index) };
                return Some(record);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

impl<T> FusedIterator for Drain<'_, T> {}

/// An owning iterator over the records of a [`HashTable`].
pub struct IntoIter<T> {
    table: HashTable<T>,
    index: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.table.populated > 0 && self.index < self.table.slots.capacity() {
            let index = self.index;
            self.index += 1;
            if is_occupied(self.table.slots.tags()[index]) {
                self.table.populated -= 1;
                // SAFETY: The slot is occupied.
                let (_, record) = unsafe { self.table.slots.take(index) };
                return Some(record);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for HashTable<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a HashTable<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
