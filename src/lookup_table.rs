use core::borrow::Borrow;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::hash_map;
use crate::hash_map::HashMap;
use crate::static_table;
use crate::static_table::StaticTable;

/// A read interface over either a growable [`HashMap`] or a precomputed
/// [`StaticTable`].
///
/// Callers that know their key set ahead of time (opcode tables, command
/// names, register maps) pick `Static`; everything else stays `Dynamic`.
/// Lookups behave the same either way.
///
/// # Examples
///
/// ```rust
/// use robin_hash::HashMap;
/// use robin_hash::LookupTable;
/// use robin_hash::hash::FnvMixBuilder;
///
/// let mut commands = HashMap::with_hasher(FnvMixBuilder);
/// commands.insert("reset", 1u8);
/// commands.insert("status", 2);
///
/// let mut table = LookupTable::from(commands);
/// assert!(!table.is_static());
///
/// table = table.try_freeze().unwrap();
/// assert!(table.is_static());
/// assert_eq!(table.get("status"), Some(&2));
/// assert_eq!(table.get("halt"), None);
/// ```
#[derive(Clone, Debug)]
pub enum LookupTable<K, V, S> {
    /// Entries kept in a Robin Hood table that can still change.
    Dynamic(HashMap<K, V, S>),
    /// Entries frozen into a collision-free table.
    Static(StaticTable<K, V, S>),
}

impl<K, V, S> LookupTable<K, V, S> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        match self {
            LookupTable::Dynamic(map) => map.len(),
            LookupTable::Static(table) => table.len(),
        }
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for the static variant.
    pub fn is_static(&self) -> bool {
        matches!(self, LookupTable::Static(_))
    }

    /// Returns the dynamic map for modification, or `None` if the entries
    /// have been frozen.
    pub fn as_dynamic_mut(&mut self) -> Option<&mut HashMap<K, V, S>> {
        match self {
            LookupTable::Dynamic(map) => Some(map),
            LookupTable::Static(_) => None,
        }
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        match self {
            LookupTable::Dynamic(map) => Iter::Dynamic(map.iter()),
            LookupTable::Static(table) => Iter::Static(table.iter()),
        }
    }
}

impl<K, V, S> LookupTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            LookupTable::Dynamic(map) => map.get(key),
            LookupTable::Static(table) => table.get(key),
        }
    }

    /// Returns the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            LookupTable::Dynamic(map) => map.get_key_value(key),
            LookupTable::Static(table) => table.get_key_value(key),
        }
    }

    /// Returns `true` if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Converts a dynamic table into a static one. A static table is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// If the entries cannot be placed without collisions, the error comes
    /// back together with the table, still dynamic and with every entry in
    /// place.
    pub fn try_freeze(self) -> Result<Self, (Error, Self)>
    where
        S: Clone,
    {
        match self {
            LookupTable::Dynamic(map) => match StaticTable::try_from_map(map) {
                Ok(table) => Ok(LookupTable::Static(table)),
                Err((err, map)) => Err((err, LookupTable::Dynamic(map))),
            },
            table @ LookupTable::Static(_) => Ok(table),
        }
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for LookupTable<K, V, S> {
    fn from(map: HashMap<K, V, S>) -> Self {
        LookupTable::Dynamic(map)
    }
}

impl<K, V, S> From<StaticTable<K, V, S>> for LookupTable<K, V, S> {
    fn from(table: StaticTable<K, V, S>) -> Self {
        LookupTable::Static(table)
    }
}

impl<'a, K, V, S> IntoIterator for &'a LookupTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`LookupTable`].
pub enum Iter<'a, K, V> {
    /// Iterating a dynamic table.
    Dynamic(hash_map::Iter<'a, K, V>),
    /// Iterating a static table.
    Static(static_table::Iter<'a, K, V>),
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Dynamic(iter) => iter.next(),
            Iter::Static(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Dynamic(iter) => iter.size_hint(),
            Iter::Static(iter) => iter.size_hint(),
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
