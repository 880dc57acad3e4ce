//! Collision-free lookup tables for key sets known ahead of time.
//!
//! Construction uses hash-and-displace: keys are grouped into small buckets by
//! their digest, and each bucket searches for a seed that scatters all of its
//! keys into free slots. A lookup hashes once, reads its bucket's seed and
//! inspects exactly one slot.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Reverse;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::hash::fmix64;
use crate::hash_map::HashMap;

const KEYS_PER_BUCKET: usize = 4;
const MAX_SEED: u32 = 1 << 16;
const MAX_WIDENINGS: u32 = 3;
const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline(always)]
fn bucket_of(digest: u64, bucket_mask: usize) -> usize {
    (digest >> 32) as usize & bucket_mask
}

#[inline(always)]
fn slot_of(digest: u64, seed: u32, slot_mask: usize) -> usize {
    fmix64(digest ^ (seed as u64).wrapping_mul(SEED_MIX)) as usize & slot_mask
}

#[derive(Clone)]
struct StaticSlot<K, V> {
    digest: u64,
    key: K,
    value: V,
}

/// An immutable map whose every lookup touches a single slot.
///
/// Built once from a fixed set of key-value pairs. Membership can never
/// change afterwards, so there is no load limit and no resize: the slot array
/// is sized at construction and the per-bucket seeds guarantee that no two
/// keys share a slot.
///
/// # Examples
///
/// ```rust
/// use robin_hash::StaticTable;
/// use robin_hash::hash::FnvMixBuilder;
///
/// let opcodes = [("nop", 0x00u8), ("load", 0x01), ("store", 0x02), ("jump", 0x10)];
/// let table = StaticTable::try_from_iter_with_hasher(opcodes, FnvMixBuilder).unwrap();
///
/// assert_eq!(table.get("store"), Some(&0x02));
/// assert_eq!(table.get("halt"), None);
/// assert_eq!(table.len(), 4);
/// ```
#[derive(Clone)]
pub struct StaticTable<K, V, S> {
    seeds: Box<[u32]>,
    slots: Box<[Option<StaticSlot<K, V>>]>,
    len: usize,
    hash_builder: S,
}

impl<K, V, S> Debug for StaticTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> StaticTable<K, V, S> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the hasher builder used by the table.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over the entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.iter(),
            remaining: self.len,
        }
    }
}

impl<K, V, S> StaticTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Builds a table from `entries`, hashing keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] if a key appears more than once.
    /// - [`Error::PerfectHashFailed`] if no collision-free placement is found,
    ///   which happens when distinct keys share a full 64-bit digest.
    /// - [`Error::CapacityOverflow`] if the slot array cannot be sized.
    pub fn try_from_iter_with_hasher<I>(entries: I, hash_builder: S) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let items: Vec<(u64, K, V)> = entries
            .into_iter()
            .map(|(key, value)| (hash_builder.hash_one(&key), key, value))
            .collect();
        let digests: Vec<u64> = items.iter().map(|(digest, _, _)| *digest).collect();

        let layout = Layout::plan(&digests, |a, b| items[a].1 == items[b].1)?;
        Ok(Self::from_layout(layout, items, hash_builder))
    }

    /// Freezes the contents of a [`HashMap`] into a static table.
    ///
    /// The table hashes with a clone of the map's hasher, so `S` must clone
    /// into a builder that produces the same digests. Randomly seeded builders
    /// such as `foldhash::fast::RandomState` keep their seed when cloned.
    ///
    /// # Errors
    ///
    /// If no collision-free placement exists, the error is returned together
    /// with the untouched map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    /// use robin_hash::StaticTable;
    /// use robin_hash::hash::FnvMixBuilder;
    ///
    /// let mut map = HashMap::with_hasher(FnvMixBuilder);
    /// for n in 0..100u32 {
    ///     map.insert(n, n * n);
    /// }
    ///
    /// let table = StaticTable::try_from_map(map).unwrap();
    /// assert_eq!(table.get(&9), Some(&81));
    /// assert_eq!(table.len(), 100);
    /// ```
    pub fn try_from_map(map: HashMap<K, V, S>) -> Result<Self, (Error, HashMap<K, V, S>)>
    where
        S: Clone,
    {
        let hash_builder = map.hasher().clone();
        let digests: Vec<u64> = map.keys().map(|key| hash_builder.hash_one(key)).collect();

        // Map keys are distinct, so equal digests are never duplicates.
        let layout = match Layout::plan(&digests, |_, _| false) {
            Ok(layout) => layout,
            Err(err) => return Err((err, map)),
        };

        // Owned iteration visits records in the same slot order as `keys`.
        let items = digests
            .into_iter()
            .zip(map)
            .map(|(digest, (key, value))| (digest, key, value));
        Ok(Self::from_layout(layout, items, hash_builder))
    }

    fn from_layout<I>(layout: Layout, items: I, hash_builder: S) -> Self
    where
        I: IntoIterator<Item = (u64, K, V)>,
    {
        let mut slots: Box<[Option<StaticSlot<K, V>>]> =
            (0..layout.slot_count).map(|_| None).collect();
        for ((digest, key, value), slot) in items.into_iter().zip(layout.assignment) {
            slots[slot] = Some(StaticSlot { digest, key, value });
        }

        Self {
            seeds: layout.seeds,
            slots,
            len: layout.keys,
            hash_builder,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.len == 0 {
            return None;
        }

        let digest = self.hash_builder.hash_one(key);
        let slot = self.slot_index(digest);
        let slot = self.slots[slot].as_ref()?;
        (slot.digest == digest && slot.key.borrow() == key).then_some((&slot.key, &slot.value))
    }

    /// Returns `true` if the table contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    #[inline(always)]
    fn slot_index(&self, digest: u64) -> usize {
        let seed = self.seeds[bucket_of(digest, self.seeds.len() - 1)];
        slot_of(digest, seed, self.slots.len() - 1)
    }
}

impl<K, V, S> StaticTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a table from `entries` using the default hasher builder.
    pub fn try_from_iter<I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::try_from_iter_with_hasher(entries, S::default())
    }
}

/// Where every record of a static table goes, computed from digests alone.
struct Layout {
    seeds: Box<[u32]>,
    assignment: Vec<usize>,
    slot_count: usize,
    keys: usize,
}

impl Layout {
    /// Plans a collision-free placement for `digests`.
    ///
    /// `same_key(a, b)` reports whether the records at positions `a` and `b`
    /// carry equal keys; it is only asked about records with equal digests.
    fn plan(digests: &[u64], same_key: impl Fn(usize, usize) -> bool) -> Result<Self, Error> {
        let keys = digests.len();

        let bucket_count = keys
            .div_ceil(KEYS_PER_BUCKET)
            .max(1)
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow)?;
        let bucket_mask = bucket_count - 1;

        let mut buckets: Vec<Vec<usize>> = (0..bucket_count).map(|_| Vec::new()).collect();
        for (index, &digest) in digests.iter().enumerate() {
            buckets[bucket_of(digest, bucket_mask)].push(index);
        }

        // Equal keys share a digest and therefore a bucket.
        for bucket in &buckets {
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    if digests[a] != digests[b] {
                        continue;
                    }
                    if same_key(a, b) {
                        return Err(Error::DuplicateKey);
                    }
                    return Err(Error::PerfectHashFailed { keys });
                }
            }
        }

        // Largest buckets first, while most slots are still free.
        let mut order: Vec<usize> = (0..bucket_count).collect();
        order.sort_by_key(|&bucket| Reverse(buckets[bucket].len()));

        let mut slot_count = keys
            .checked_mul(10)
            .ok_or(Error::CapacityOverflow)?
            .div_ceil(9)
            .max(1)
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow)?;

        for attempt in 0..=MAX_WIDENINGS {
            if let Some((seeds, assignment)) = place_buckets(digests, &buckets, &order, slot_count)
            {
                log_debug!("static table placed {keys} keys in {slot_count} slots");
                return Ok(Self {
                    seeds,
                    assignment,
                    slot_count,
                    keys,
                });
            }

            if attempt < MAX_WIDENINGS {
                log_warn!(
                    "no placement for {keys} keys in {slot_count} slots, widening to {}",
                    slot_count * 2
                );
                slot_count = slot_count
                    .checked_mul(2)
                    .ok_or(Error::CapacityOverflow)?;
            }
        }

        Err(Error::PerfectHashFailed { keys })
    }
}

/// Finds a seed for every bucket so that all keys land in distinct slots.
///
/// Returns the per-bucket seeds and the slot chosen for each item, or `None`
/// if some bucket exhausts its seed range.
fn place_buckets(
    digests: &[u64],
    buckets: &[Vec<usize>],
    order: &[usize],
    slot_count: usize,
) -> Option<(Box<[u32]>, Vec<usize>)> {
    let slot_mask = slot_count - 1;
    let mut taken = alloc::vec![false; slot_count];
    let mut seeds = alloc::vec![0u32; buckets.len()].into_boxed_slice();
    let mut assignment = alloc::vec![0usize; digests.len()];
    let mut candidate = Vec::with_capacity(KEYS_PER_BUCKET * 4);

    for &bucket in order {
        let members = &buckets[bucket];
        if members.is_empty() {
            break;
        }

        let seed = (0..MAX_SEED).find(|&seed| {
            candidate.clear();
            for &item in members {
                let slot = slot_of(digests[item], seed, slot_mask);
                if taken[slot] || candidate.contains(&slot) {
                    return false;
                }
                candidate.push(slot);
            }
            true
        })?;

        for (&item, &slot) in members.iter().zip(&candidate) {
            taken[slot] = true;
            assignment[item] = slot;
        }
        seeds[bucket] = seed;
    }

    Some((seeds, assignment))
}

/// An iterator over the entries of a [`StaticTable`].
pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, Option<StaticSlot<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.inner.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a StaticTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    #[derive(Clone, Default)]
    struct ConstantHashBuilder;

    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            0xdead_beef
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for ConstantHashBuilder {
        type Hasher = ConstantHasher;

        fn build_hasher(&self) -> Self::Hasher {
            ConstantHasher
        }
    }

    impl<K, V, S> StaticTable<K, V, S>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        /// Every entry sits exactly in the slot its bucket seed maps it to.
        fn assert_single_probe(&self) {
            for (index, slot) in self.slots.iter().enumerate() {
                if let Some(slot) = slot {
                    assert_eq!(slot.digest, self.hash_builder.hash_one(&slot.key));
                    assert_eq!(self.slot_index(slot.digest), index);
                }
            }
        }
    }

    #[test]
    fn finds_every_member() {
        let table: StaticTable<u64, u64, SipHashBuilder> =
            StaticTable::try_from_iter((0..5000u64).map(|k| (k, k * 3))).unwrap();
        assert_eq!(table.len(), 5000);
        assert!(table.capacity().is_power_of_two());
        assert!(table.capacity() >= 5000);
        table.assert_single_probe();

        for k in 0..5000u64 {
            assert_eq!(table.get(&k), Some(&(k * 3)));
        }
        for k in 5000..6000u64 {
            assert!(!table.contains_key(&k));
        }
    }

    #[test]
    fn string_keys_and_borrowed_lookup() {
        let words = ["if", "else", "while", "for", "return", "break", "continue"];
        let table = StaticTable::try_from_iter_with_hasher(
            words.iter().enumerate().map(|(i, w)| (w.to_string(), i)),
            SipHashBuilder::default(),
        )
        .unwrap();

        for (i, word) in words.iter().enumerate() {
            assert_eq!(table.get(*word), Some(&i));
            assert_eq!(table.get_key_value(*word), Some((&word.to_string(), &i)));
        }
        assert_eq!(table.get("loop"), None);
        table.assert_single_probe();
    }

    #[test]
    fn empty_and_single() {
        let empty: StaticTable<u32, u32, SipHashBuilder> =
            StaticTable::try_from_iter(core::iter::empty()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.get(&1), None);
        assert_eq!(empty.iter().count(), 0);

        let single: StaticTable<u32, u32, SipHashBuilder> =
            StaticTable::try_from_iter([(7, 70)]).unwrap();
        assert_eq!(single.get(&7), Some(&70));
        assert_eq!(single.get(&8), None);
    }

    #[test]
    fn rejects_duplicates() {
        let result: Result<StaticTable<&str, u32, SipHashBuilder>, _> =
            StaticTable::try_from_iter([("a", 1), ("b", 2), ("a", 3)]);
        assert!(matches!(result, Err(Error::DuplicateKey)));

        let result: Result<StaticTable<&str, u32, _>, _> =
            StaticTable::try_from_iter_with_hasher([("x", 1), ("x", 1)], ConstantHashBuilder);
        assert!(matches!(result, Err(Error::DuplicateKey)));
    }

    #[test]
    fn identical_digests_cannot_be_separated() {
        let result: Result<StaticTable<u32, u32, _>, _> =
            StaticTable::try_from_iter_with_hasher([(1, 1), (2, 2)], ConstantHashBuilder);
        assert!(matches!(result, Err(Error::PerfectHashFailed { keys: 2 })));

        // A lone key is fine even under a constant hash.
        let table =
            StaticTable::try_from_iter_with_hasher([(1u32, 1u32)], ConstantHashBuilder).unwrap();
        assert_eq!(table.get(&1), Some(&1));
        assert_eq!(table.get(&2), None);
    }

    #[test]
    fn iteration_yields_all_entries() {
        let table: StaticTable<u32, String, SipHashBuilder> =
            StaticTable::try_from_iter((0..64u32).map(|k| (k, k.to_string()))).unwrap();
        let iter = table.iter();
        assert_eq!(iter.len(), 64);

        let mut keys: Vec<u32> = iter.map(|(k, _)| *k).collect();
        keys.sort();
        assert_eq!(keys, (0..64).collect::<Vec<_>>());
        for (k, v) in &table {
            assert_eq!(*v, k.to_string());
        }
    }

    #[test]
    fn freezes_a_map() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for k in 0..300u32 {
            map.insert(k, k + 1);
        }
        map.remove(&10);

        let table = StaticTable::try_from_map(map).unwrap();
        assert_eq!(table.len(), 299);
        assert_eq!(table.get(&10), None);
        assert_eq!(table.get(&299), Some(&300));
        table.assert_single_probe();
    }

    #[test]
    fn failed_freeze_returns_the_map() {
        let mut map = HashMap::with_hasher(ConstantHashBuilder);
        map.insert(1u32, "a");
        map.insert(2, "b");
        assert_eq!(map.get(&1), Some(&"a"));

        let (err, map) = match StaticTable::try_from_map(map) {
            Ok(_) => panic!("constant digests cannot be separated"),
            Err(failure) => failure,
        };
        assert_eq!(err, Error::PerfectHashFailed { keys: 2 });
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"a"));
        assert_eq!(map.get(&2), Some(&"b"));
    }
}
